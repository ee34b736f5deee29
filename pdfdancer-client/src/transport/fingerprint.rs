//! Anonymous client fingerprint sent with token requests.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use sha2::{Digest, Sha256};
use tracing::debug;

const SDK_LANGUAGE: &str = "rust";

/// `~/.pdfdancer/fingerprint.salt`
pub(crate) fn default_salt_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(".pdfdancer").join("fingerprint.salt"))
}

/// SHA-256 hex digest identifying this installation
pub(crate) fn generate(salt_path: Option<&Path>) -> String {
    let components = [
        env_or_unknown(&["USER", "USERNAME", "LOGNAME"]),
        std::env::consts::OS.to_string(),
        SDK_LANGUAGE.to_string(),
        Local::now().offset().to_string(),
        locale(),
        hostname(),
        salt_path.map(load_or_create_salt).unwrap_or_else(new_salt),
    ];

    let mut hasher = Sha256::new();
    for component in &components {
        hasher.update(component.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

fn env_or_unknown(keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| std::env::var(key).ok().filter(|value| !value.is_empty()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn locale() -> String {
    ["LC_ALL", "LANG"]
        .iter()
        .find_map(|key| std::env::var(key).ok().filter(|value| !value.is_empty()))
        .map(|value| value.split('.').next().unwrap_or_default().to_string())
        .unwrap_or_else(|| "en_US".to_string())
}

fn hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn new_salt() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Read the persisted install salt, creating it on first use.
/// An unwritable location still yields a (non-persistent) salt.
pub(crate) fn load_or_create_salt(path: &Path) -> String {
    if let Ok(existing) = fs::read_to_string(path) {
        let existing = existing.trim();
        if !existing.is_empty() {
            return existing.to_string();
        }
    }

    let salt = new_salt();
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        debug!(error = %e, path = %parent.display(), "Could not create fingerprint directory");
        return salt;
    }
    if let Err(e) = fs::write(path, &salt) {
        debug!(error = %e, path = %path.display(), "Could not persist fingerprint salt");
    }
    salt
}
