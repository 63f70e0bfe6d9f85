// ABOUTME: Private key discovery, loading and parsing.
// ABOUTME: A key path, explicit or defaulted to ~/.ssh/id_rsa, always wins over inline key bytes.

use super::error::{Error, Result};
use russh::keys::ssh_key::PrivateKey;
use russh::keys::decode_secret_key;
use std::io;
use std::path::{Path, PathBuf};

/// Key file used when neither key bytes nor a key path were given.
pub fn default_key_path(home: &Path) -> PathBuf {
    home.join(".ssh").join("id_rsa")
}

/// Home directory from an explicit override, falling back to `$HOME`.
pub(crate) fn home_dir(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(home) = explicit {
        return Some(home.to_path_buf());
    }
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Decide where the key comes from and return its raw bytes.
///
/// If `path` is unset and `bytes` is empty, the path defaults to
/// `<home>/.ssh/id_rsa`. Whenever a path is set its contents replace `bytes`.
pub(crate) fn resolve_key_bytes(
    bytes: Option<Vec<u8>>,
    path: Option<PathBuf>,
    home: Option<&Path>,
) -> Result<Vec<u8>> {
    let bytes = bytes.filter(|b| !b.is_empty());
    let path = path.filter(|p| !p.as_os_str().is_empty());

    let path = match (bytes, path) {
        (_, Some(path)) => path,
        (Some(bytes), None) => return Ok(bytes),
        (None, None) => match home_dir(home) {
            Some(home) => default_key_path(&home),
            None => {
                return Err(Error::KeyLoad {
                    path: default_key_path(Path::new("")),
                    source: io::Error::new(io::ErrorKind::NotFound, "home directory is not set"),
                });
            }
        },
    };

    tracing::debug!(path = %path.display(), "loading private key");
    std::fs::read(&path).map_err(|source| Error::KeyLoad { path, source })
}

/// Parse key material, decrypting it when a passphrase is given.
///
/// An unencrypted key parses fine even when a passphrase is supplied.
pub(crate) fn parse_private_key(bytes: &[u8], passphrase: Option<&str>) -> Result<PrivateKey> {
    let encrypted = passphrase.is_some();
    let text = std::str::from_utf8(bytes).map_err(|_| Error::KeyParse {
        encrypted,
        source: russh::keys::Error::CouldNotReadKey,
    })?;
    decode_secret_key(text, passphrase).map_err(|source| Error::KeyParse { encrypted, source })
}
