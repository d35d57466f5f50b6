use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rand::RngCore;
use rocket::data::{Limits, ToByteUnit};
use rocket::figment::Figment;
use sha2::{Digest, Sha256};

pub const TEMPLATE_DIR: &str = "website/templates";
pub const STATIC_DIR: &str = "website/static";
pub const DEFAULT_DATABASE_PATH: &str = "website/db/site.db";
pub const DEFAULT_UPLOAD_DIR: &str = "website/uploads";
pub const SECRET_KEY_FILE: &str = "website/.secret_key";

const DEFAULT_TURNSTILE_SITE_KEY: &str = "0x4AAAAAACcmRED-ctEXXMpk";
const DEFAULT_TURNSTILE_SECRET_KEY: &str = "0x4AAAAAACcmRBOWo71-slF2mJbq6BtLBLQ";

/// Largest accepted upload, in MiB.
pub const MAX_UPLOAD_MIB: u64 = 4;

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secret_key: String,
    pub turnstile_site_key: String,
    pub turnstile_secret_key: String,
    pub site_name: String,
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
}

impl AppConfig {
    /// Reads the environment. A missing `SECRET_KEY` falls back to a key
    /// persisted in `website/.secret_key` so sessions survive restarts.
    pub fn from_env() -> Result<Self, String> {
        let secret_key = match env_nonempty("SECRET_KEY") {
            Some(k) => k,
            None => stable_secret(Path::new(SECRET_KEY_FILE))?,
        };

        Ok(AppConfig {
            secret_key,
            turnstile_site_key: env_nonempty("TURNSTILE_SITE_KEY")
                .unwrap_or_else(|| DEFAULT_TURNSTILE_SITE_KEY.to_string()),
            turnstile_secret_key: env_nonempty("TURNSTILE_SECRET_KEY")
                .unwrap_or_else(|| DEFAULT_TURNSTILE_SECRET_KEY.to_string()),
            site_name: env_nonempty("SITE_NAME").unwrap_or_else(|| "Portfolio".to_string()),
            database_path: env_nonempty("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
            upload_dir: env_nonempty("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
        })
    }

    /// Rocket's figment with our secret key, template dir and upload limits
    /// layered over Rocket.toml / ROCKET_* values.
    pub fn figment(&self) -> Figment {
        let limits = Limits::default()
            .limit("file", MAX_UPLOAD_MIB.mebibytes())
            .limit("data-form", MAX_UPLOAD_MIB.mebibytes());

        rocket::Config::figment()
            .merge(("secret_key", rocket_secret_key(&self.secret_key)))
            .merge(("template_dir", TEMPLATE_DIR))
            .merge(("limits", limits))
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Rocket only takes 256/512-bit hex keys here; any other string is hashed
/// into one so arbitrary `SECRET_KEY` values still work.
pub fn rocket_secret_key(raw: &str) -> String {
    let raw = raw.trim();
    let is_hex_key = (raw.len() == 64 || raw.len() == 128)
        && raw.chars().all(|c| c.is_ascii_hexdigit());
    if is_hex_key {
        return raw.to_string();
    }
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

/// Load the key at `path`, generating and writing 32 random hex bytes the
/// first time.
pub fn stable_secret(path: &Path) -> Result<String, String> {
    if path.exists() {
        let key = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let key = key.trim().to_string();
        if !key.is_empty() {
            return Ok(key);
        }
    }

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let key = hex::encode(bytes);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    fs::write(path, &key).map_err(|e| e.to_string())?;
    log::info!("Generated new secret key at {}", path.display());
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_secret_is_generated_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(".secret_key");

        let first = stable_secret(&path).unwrap();
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));

        let second = stable_secret(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn stable_secret_reads_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".secret_key");
        std::fs::write(&path, "abc123\n").unwrap();
        assert_eq!(stable_secret(&path).unwrap(), "abc123");
    }

    #[test]
    fn plain_secrets_are_hashed_into_rocket_keys() {
        let hex_key = "ab".repeat(32);
        assert_eq!(rocket_secret_key(&hex_key), hex_key);

        let derived = rocket_secret_key("change-me-in-production");
        assert_eq!(derived.len(), 64);
        assert!(derived.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(derived, rocket_secret_key("change-me-in-production"));
        assert_ne!(derived, rocket_secret_key("abc123"));
    }
}
