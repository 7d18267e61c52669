//! Configuration for naslink.
//!
//! Values are layered with [`figment`], later layers winning:
//!
//! 1. Built-in defaults.
//! 2. A TOML file: the one given with `--config`, or `naslink.toml` in the
//!    platform config directory if it exists.
//! 3. `NASLINK_*` environment variables, with `__` separating nested keys
//!    (`NASLINK_SERVER__PORT=9000`).
//!
//! ```toml
//! database = "/srv/naslink/naslink.db"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "NASLINK_";
const CONFIG_FILE: &str = "naslink.toml";
const DATABASE_FILE: &str = "naslink.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database holding the registry. Created on first use.
    pub database: PathBuf,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self { database: default_database(), server: ServerConfig::default() }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl Config {
    /// Load the layered configuration.
    ///
    /// An explicit file must exist; the default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let file = match explicit {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::FileNotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_file().filter(|path| path.is_file()),
        };
        match &file {
            Some(path) => tracing::debug!(path = %path.display(), "Loading config file"),
            None => tracing::debug!("No config file; using defaults and environment"),
        }
        Self::extract(Self::figment(file.as_deref()))
    }

    /// The layered provider, without any file discovery.
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn extract(figment: Figment) -> Result<Self> {
        figment.extract().or_raise(|| ErrorKind::Invalid)
    }

    /// `naslink.toml` in the platform config directory
    /// (`~/.config/naslink/` on Linux).
    pub fn default_file() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "naslink")
}

/// `naslink.db` next to the executable, so a copy of the binary dropped onto a
/// NAS share carries its registry with it. Falls back to the platform data
/// directory, then to the working directory.
fn default_database() -> PathBuf {
    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        return dir.join(DATABASE_FILE);
    }
    project_dirs().map_or_else(|| PathBuf::from(DATABASE_FILE), |dirs| dirs.data_dir().join(DATABASE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_| {
            let config = Config::extract(Config::figment(None)).unwrap();
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 8080);
            assert!(config.database.ends_with("naslink.db"));
            Ok(())
        });
    }

    #[test]
    fn test_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "naslink.toml",
                r#"
                database = "/srv/naslink/links.db"

                [server]
                port = 9000
                "#,
            )?;
            let config = Config::extract(Config::figment(Some(Path::new("naslink.toml")))).unwrap();
            assert_eq!(config.database, PathBuf::from("/srv/naslink/links.db"));
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 9000);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("naslink.toml", "[server]\nhost = \"127.0.0.1\"\nport = 9000\n")?;
            jail.set_env("NASLINK_SERVER__PORT", "9100");
            jail.set_env("NASLINK_DATABASE", "/tmp/other.db");
            let config = Config::extract(Config::figment(Some(Path::new("naslink.toml")))).unwrap();
            assert_eq!(config.server.host, "127.0.0.1");
            assert_eq!(config.server.port, 9100);
            assert_eq!(config.database, PathBuf::from("/tmp/other.db"));
            Ok(())
        });
    }

    #[rstest]
    #[case("[server]\nport = \"not a port\"\n")]
    #[case("[server]\nport = 70000\n")]
    #[case("database = [1, 2, 3]\n")]
    fn test_invalid_values_are_rejected(#[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file("naslink.toml", contents)?;
            let err = Config::extract(Config::figment(Some(Path::new("naslink.toml")))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::FileNotFound(_)));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[server]\nhost = \"::1\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.host, "::1");
    }
}
