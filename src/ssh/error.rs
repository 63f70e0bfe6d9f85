// ABOUTME: Error types for session setup and channel handling.
// ABOUTME: Remote command failures are not errors here; they live in ExecutionResult.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("failed to read private key file {}: {source}", .path.display())]
    KeyLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse private key{}: {source}", passphrase_note(.encrypted))]
    KeyParse {
        /// Whether a passphrase was supplied for decryption.
        encrypted: bool,
        #[source]
        source: russh::keys::Error,
    },

    #[error("failed to connect to {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: DialFailure,
    },

    #[error("failed to open session channel: {0}")]
    Session(#[source] russh::Error),

    #[error("session is closed")]
    ClosedSession,

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Why dialing the remote host failed.
#[derive(Debug, Error)]
pub enum DialFailure {
    #[error(transparent)]
    Transport(#[from] russh::Error),

    #[error("public key rejected for user {user}")]
    AuthenticationRejected { user: String },
}

fn passphrase_note(encrypted: &bool) -> &'static str {
    if *encrypted { " with passphrase" } else { "" }
}

pub type Result<T> = std::result::Result<T, Error>;
