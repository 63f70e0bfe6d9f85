// ABOUTME: Synchronous facade over the async session for callers without a runtime.
// ABOUTME: Each session owns a current-thread tokio runtime that drives its connection.

use crate::ssh::{self, Error, ExecutionResult, Result, RusshTransport, SessionBuilder, Transport};
use tokio::runtime::Runtime;

/// A [`ssh::RemoteSession`] whose calls block the current thread.
///
/// Do not use from inside an async runtime; the calls would panic.
pub struct RemoteSession<T: Transport = RusshTransport> {
    runtime: Runtime,
    inner: ssh::RemoteSession<T>,
}

impl<T: Transport> std::fmt::Debug for RemoteSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("blocking::RemoteSession")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)
}

impl<T: Transport> RemoteSession<T> {
    /// Wrap an already authenticated transport.
    pub fn new(transport: T) -> Result<Self> {
        Ok(Self {
            runtime: runtime()?,
            inner: ssh::RemoteSession::new(transport),
        })
    }

    /// See [`ssh::RemoteSession::run`].
    pub fn run(&mut self, command: &str) -> Result<ExecutionResult> {
        self.runtime.block_on(self.inner.run(command))
    }

    /// See [`ssh::RemoteSession::close`].
    pub fn close(&mut self) {
        self.runtime.block_on(self.inner.close());
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl SessionBuilder {
    /// Like [`SessionBuilder::build`], blocking until connected.
    pub fn build_blocking(self) -> Result<RemoteSession> {
        let config = self.resolve()?;
        let runtime = runtime()?;
        let inner = runtime.block_on(ssh::connect(config))?;
        Ok(RemoteSession { runtime, inner })
    }
}
