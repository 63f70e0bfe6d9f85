// ABOUTME: russh client handler deciding whether to trust the server's host key.
// ABOUTME: Accepts any key unless known_hosts verification is opted into.

use russh::client;
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, known_host_keys, known_host_keys_path,
    learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::ssh_key;
use std::path::PathBuf;

/// How the server's host key is checked during the handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Accept any host key without verification.
    ///
    /// This leaves the connection open to on-path impersonation. It is the
    /// default so existing automation against unverified hosts keeps working.
    #[default]
    AcceptAny,
    /// Verify the host key against a known_hosts file.
    KnownHosts {
        /// known_hosts file to use; `~/.ssh/known_hosts` when `None`.
        path: Option<PathBuf>,
        /// Accept and record hosts missing from the file.
        /// A host whose key changed is always rejected.
        trust_on_first_use: bool,
    },
}

impl HostKeyPolicy {
    /// Strict verification against the default known_hosts file.
    pub fn strict() -> Self {
        Self::KnownHosts {
            path: None,
            trust_on_first_use: false,
        }
    }
}

pub(crate) struct ClientHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

impl ClientHandler {
    pub(crate) fn new(host: String, port: u16, policy: HostKeyPolicy) -> Self {
        Self { host, port, policy }
    }
}

impl client::Handler for ClientHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let (path, trust_on_first_use) = match &self.policy {
            HostKeyPolicy::AcceptAny => {
                tracing::warn!(
                    "host key verification disabled: accepting key for {}:{} unchecked",
                    self.host,
                    self.port
                );
                return Ok(true);
            }
            HostKeyPolicy::KnownHosts {
                path,
                trust_on_first_use,
            } => (path, *trust_on_first_use),
        };

        let check_result = match path {
            Some(path) => check_known_hosts_path(&self.host, self.port, server_public_key, path),
            None => check_known_hosts(&self.host, self.port, server_public_key),
        };

        match check_result {
            Ok(true) => Ok(true),
            Ok(false) if trust_on_first_use => {
                // A recorded key of another type still pins the host.
                let recorded = match path {
                    Some(path) => known_host_keys_path(&self.host, self.port, path),
                    None => known_host_keys(&self.host, self.port),
                };
                if recorded.is_ok_and(|keys| !keys.is_empty()) {
                    tracing::warn!(
                        "host key for {}:{} differs from the one in known_hosts",
                        self.host,
                        self.port
                    );
                    return Ok(false);
                }
                tracing::warn!(
                    "Trust-On-First-Use: accepting unknown host key for {}:{}",
                    self.host,
                    self.port
                );
                let learn_result = match path {
                    Some(path) => {
                        learn_known_hosts_path(&self.host, self.port, server_public_key, path)
                    }
                    None => learn_known_hosts(&self.host, self.port, server_public_key),
                };
                if let Err(e) = learn_result {
                    tracing::warn!("Failed to save host key to known_hosts: {}", e);
                }
                Ok(true)
            }
            Ok(false) => {
                tracing::warn!("unknown host key for {}:{}", self.host, self.port);
                Ok(false)
            }
            Err(russh::keys::Error::KeyChanged { .. }) => {
                tracing::warn!(
                    "host key for {}:{} does not match known_hosts",
                    self.host,
                    self.port
                );
                Ok(false)
            }
            // Unreadable known_hosts counts as an unknown host.
            Err(_) => Ok(trust_on_first_use),
        }
    }
}
