// ABOUTME: SSH client module for running commands on remote hosts.
// ABOUTME: Key-based authentication via russh, host key checking opt-in.

mod builder;
mod error;
mod handler;
mod keys;
mod result;
mod session;
mod transport;

pub use builder::{DEFAULT_PORT, DEFAULT_USER, ResolvedConfig, SessionBuilder, connect};
pub use error::{DialFailure, Error, Result};
pub use handler::HostKeyPolicy;
pub use keys::default_key_path;
pub use result::{CommandError, ExecutionResult};
pub use session::RemoteSession;
pub use transport::{Channel, ChannelEvent, RusshChannel, RusshTransport, Transport};
