// ABOUTME: Fluent builder that resolves connection settings and dials the host.
// ABOUTME: Applies key discovery, user/port defaults and the host key policy.

use super::error::{DialFailure, Error, Result};
use super::handler::{ClientHandler, HostKeyPolicy};
use super::keys;
use super::session::RemoteSession;
use super::transport::RusshTransport;
use russh::client;
use russh::keys::PrivateKeyWithHashAlg;
use russh::keys::ssh_key::PrivateKey;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 22;
pub const DEFAULT_USER: &str = "root";

/// Collects connection parameters for [`SessionBuilder::build`].
///
/// Setters only store values. Validation and defaulting happen at build time.
#[derive(Clone, Default)]
pub struct SessionBuilder {
    host: String,
    port: u16,
    user: String,
    key: Option<Vec<u8>>,
    key_path: Option<PathBuf>,
    passphrase: Option<String>,
    home_dir: Option<PathBuf>,
    host_key_policy: HostKeyPolicy,
    command_timeout: Option<Duration>,
}

impl std::fmt::Debug for SessionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .field("key_path", &self.key_path)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("home_dir", &self.home_dir)
            .field("host_key_policy", &self.host_key_policy)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

/// Settings after validation and defaulting, ready to dial.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub key: PrivateKey,
    pub host_key_policy: HostKeyPolicy,
    pub command_timeout: Option<Duration>,
}

impl ResolvedConfig {
    /// `host:port`, with IPv6 literals bracketed.
    pub fn addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Private key material in OpenSSH or PEM format.
    ///
    /// Ignored whenever a key path is set.
    pub fn private_key_bytes(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn private_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn key_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Port 0 means the default, 22.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Home directory for locating `~/.ssh/id_rsa`. Defaults to `$HOME`.
    pub fn home_dir(mut self, home: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(home.into());
        self
    }

    pub fn host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// Validate settings, load and parse the key, and apply defaults.
    pub fn resolve(self) -> Result<ResolvedConfig> {
        if self.host.is_empty() {
            return Err(Error::Configuration("ssh host cannot be empty".to_string()));
        }

        let key_bytes =
            keys::resolve_key_bytes(self.key, self.key_path, self.home_dir.as_deref())?;
        let passphrase = self.passphrase.filter(|p| !p.is_empty());
        let key = keys::parse_private_key(&key_bytes, passphrase.as_deref())?;

        let user = if self.user.is_empty() {
            DEFAULT_USER.to_string()
        } else {
            self.user
        };
        let port = if self.port == 0 { DEFAULT_PORT } else { self.port };

        Ok(ResolvedConfig {
            host: self.host,
            port,
            user,
            key,
            host_key_policy: self.host_key_policy,
            command_timeout: self.command_timeout,
        })
    }

    /// Resolve settings, connect and authenticate.
    pub async fn build(self) -> Result<RemoteSession> {
        let config = self.resolve()?;
        connect(config).await
    }
}

/// Dial the host and authenticate with the resolved key.
pub async fn connect(config: ResolvedConfig) -> Result<RemoteSession> {
    let addr = config.addr();
    let dial_error = |source: DialFailure| Error::Dial {
        addr: addr.clone(),
        source,
    };

    tracing::info!(
        host = %config.host,
        port = config.port,
        user = %config.user,
        "connecting to SSH"
    );

    let handler = ClientHandler::new(config.host.clone(), config.port, config.host_key_policy);
    let mut handle = client::connect(
        Arc::new(client::Config::default()),
        (config.host.as_str(), config.port),
        handler,
    )
    .await
    .map_err(|e| dial_error(e.into()))?;

    let hash_alg = handle
        .best_supported_rsa_hash()
        .await
        .map_err(|e| dial_error(e.into()))?
        .flatten();

    let auth = handle
        .authenticate_publickey(
            &config.user,
            PrivateKeyWithHashAlg::new(Arc::new(config.key), hash_alg),
        )
        .await
        .map_err(|e| dial_error(e.into()))?;

    if !auth.success() {
        return Err(dial_error(DialFailure::AuthenticationRejected { user: config.user }));
    }

    tracing::info!(host = %config.host, "SSH connected and authenticated");

    Ok(RemoteSession::new(RusshTransport::new(handle)).with_command_timeout(config.command_timeout))
}
