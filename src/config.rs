//! Controller configuration.
//!
//! A [`Config`] carries the identity the controller announces in every frame
//! and the username that scopes its Mercury topics. It can be built in code
//! or loaded from a small TOML file:
//!
//! ```toml
//! username = "spotify-user"
//! device_id = "5f3c2a..."
//! ```
//!
//! Both keys are optional. Without a `device_id` one is derived from the
//! machine id, so that a controller keeps its identity across restarts.

use std::{fs, path::Path};

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Config {
    /// Identity stamped into the `ident` field of outbound frames.
    pub device_id: String,

    /// Username scoping the `hm://remote/user/<username>/` topics.
    ///
    /// When `None`, the login username of the session is used.
    pub username: Option<String>,
}

/// On-disk representation of a [`Config`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    device_id: Option<String>,
    username: Option<String>,
}

impl Config {
    /// Configuration files should be small; anything larger is rejected
    /// before reading.
    const MAX_FILE_SIZE: u64 = 1024;

    #[must_use]
    pub fn new() -> Self {
        Self {
            device_id: Self::default_device_id(),
            username: None,
        }
    }

    #[must_use]
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::new()
        }
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is larger than 1 KiB, is
    /// not valid TOML, contains unknown keys, or holds an empty `device_id`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Prevent out-of-memory condition: the file should be small.
        let file_size = fs::metadata(path)?.len();
        if file_size > Self::MAX_FILE_SIZE {
            return Err(Error::out_of_range(format!(
                "{} is too large ({file_size} bytes)",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        debug!("loaded configuration from {}", path.display());

        Ok(config)
    }

    fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents)?;

        let device_id = match file.device_id {
            Some(device_id) if device_id.trim().is_empty() => {
                return Err(Error::invalid_argument("device_id should not be empty"));
            }
            Some(device_id) => device_id,
            None => Self::default_device_id(),
        };

        // An empty username means: fall back to the session login.
        let username = file.username.filter(|username| !username.is_empty());

        Ok(Self {
            device_id,
            username,
        })
    }

    /// Derives a stable device id from the machine id, or a random one if
    /// the machine id is unavailable.
    fn default_device_id() -> String {
        let device_id = match machine_uid::get() {
            Ok(machine_id) => {
                let namespace = Uuid::new_v5(&Uuid::NAMESPACE_DNS, b"spclient.wg.spotify.com");
                Uuid::new_v5(&namespace, machine_id.as_bytes())
            }
            Err(e) => {
                warn!("could not get machine id, using random device id: {e}");
                Uuid::new_v4()
            }
        };

        let device_id = device_id.simple().to_string();
        trace!("device id: {device_id}");
        device_id
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::{env, path::PathBuf};

    use super::*;
    use crate::error::ErrorKind;

    /// Writes `contents` to a uniquely named file in the temporary directory.
    fn temp_file(contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("spotcontrol-{}.toml", Uuid::new_v4().simple()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_small_file() {
        let path = temp_file("username = \"alice\"\ndevice_id = \"kitchen-remote\"\n");
        let config = Config::from_file(&path);
        fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.device_id, "kitchen-remote");
    }

    #[test]
    fn rejects_oversized_file() {
        let padding = "#".repeat(2048);
        let path = temp_file(&format!("username = \"alice\"\n{padding}\n"));
        let err = Config::from_file(&path);
        fs::remove_file(&path).unwrap();

        assert_eq!(err.unwrap_err().kind, ErrorKind::OutOfRange);
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = env::temp_dir().join(format!("spotcontrol-missing-{}.toml", Uuid::new_v4().simple()));
        let err = Config::from_file(path).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn parses_username_and_device_id() {
        let config = Config::from_toml(
            r#"
            username = "alice"
            device_id = "0123456789abcdef"
            "#,
        )
        .unwrap();

        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.device_id, "0123456789abcdef");
    }

    #[test]
    fn empty_username_falls_back_to_session() {
        let config = Config::from_toml(r#"username = """#).unwrap();
        assert_eq!(config.username, None);
        assert_eq!(config.device_id.len(), 32);
    }

    #[test]
    fn rejects_empty_device_id() {
        let err = Config::from_toml(r#"device_id = "  ""#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = Config::from_toml(r#"arl = "secret""#).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }
}
