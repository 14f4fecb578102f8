//! Layered configuration.
//!
//! Values are merged from, in increasing order of precedence:
//!
//! 1. built-in defaults,
//! 2. a configuration file (TOML, YAML or JSON, picked by extension),
//! 3. environment variables prefixed with `FICTRACK_` (e.g.
//!    `FICTRACK_LIBRARY=/srv/fics`).
//!
//! Command-line flags are applied on top by the binary.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use fictrack_source::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "FICTRACK_";
const CONFIG_FILENAME: &str = "config.toml";
const LIBRARY_DIRNAME: &str = "works";
const KEYS: &[&str] = &["library", "base_url", "user_agent", "timeout_secs"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding one sub-directory per tracked work.
    pub library: PathBuf,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}
impl Default for Config {
    fn default() -> Self {
        let library = project_dirs()
            .map(|dirs| dirs.data_dir().join(LIBRARY_DIRNAME))
            .unwrap_or_else(|| PathBuf::from(LIBRARY_DIRNAME));
        Self {
            library,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}
impl Config {
    /// Loads the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location (see
    /// [`default_config_path`]) is used when there is a file there, and
    /// skipped otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path().filter(|path| path.is_file()),
        };
        match &file {
            Some(path) => tracing::debug!(path = %path.display(), "Loading configuration file"),
            None => tracing::debug!("No configuration file, using defaults"),
        }
        Self::extract(figment(file.as_deref())?)
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().map_err(|e| ErrorKind::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("timeout_secs must be greater than zero".to_string()));
        }
        if self.base_url.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("base_url must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Builds the provider stack: defaults, then `file` (if any), then the
/// environment.
pub fn figment(file: Option<&Path>) -> Result<Figment> {
    let mut figment = Figment::from(Serialized::defaults(Config::default()));
    if let Some(path) = file {
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
        figment = match extension.as_deref() {
            Some("toml") => figment.merge(Toml::file_exact(path)),
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
            Some("json") => figment.merge(Json::file_exact(path)),
            _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
        };
    }
    Ok(figment.merge(Env::prefixed(ENV_PREFIX).only(KEYS)))
}

/// `config.toml` in the platform's configuration directory for fictrack.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "fictrack")
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::extract(figment(None).unwrap()).unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.base_url, "https://archiveofourown.org");
            assert_eq!(config.timeout(), Duration::from_secs(30));
            assert!(config.library.ends_with("works"));
            Ok(())
        });
    }

    #[rstest]
    #[case("config.toml", "library = \"/srv/fics\"\ntimeout_secs = 5\n")]
    #[case("config.yaml", "library: /srv/fics\ntimeout_secs: 5\n")]
    #[case("config.yml", "library: /srv/fics\ntimeout_secs: 5\n")]
    #[case("config.json", r#"{"library": "/srv/fics", "timeout_secs": 5}"#)]
    fn test_file_formats(#[case] filename: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(filename, contents)?;
            let config = Config::load(Some(Path::new(filename))).unwrap();
            assert_eq!(config.library, PathBuf::from("/srv/fics"));
            assert_eq!(config.timeout_secs, 5);
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "library = \"/from/file\"\nuser_agent = \"file-agent\"\n")?;
            jail.set_env("FICTRACK_LIBRARY", "/from/env");
            let config = Config::load(Some(Path::new("config.toml"))).unwrap();
            assert_eq!(config.library, PathBuf::from("/from/env"));
            assert_eq!(config.user_agent, "file-agent");
            Ok(())
        });
    }

    #[test]
    fn test_unrelated_environment_ignored() {
        Jail::expect_with(|jail| {
            jail.set_env("FICTRACK_TIMEOUT_SECS", 7);
            jail.set_env("FICTRACK_SOMETHING_ELSE", "ignored");
            let config = Config::extract(figment(None).unwrap()).unwrap();
            assert_eq!(config.timeout_secs, 7);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_jail| {
            let err = Config::load(Some(Path::new("nope.toml"))).unwrap_err();
            assert_eq!(&*err, &ErrorKind::NotFound(PathBuf::from("nope.toml")));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_format() {
        Jail::expect_with(|jail| {
            jail.create_file("config.ini", "library=/srv")?;
            let err = Config::load(Some(Path::new("config.ini"))).unwrap_err();
            assert_eq!(&*err, &ErrorKind::UnsupportedFormat(PathBuf::from("config.ini")));
            Ok(())
        });
    }

    #[rstest]
    #[case("timeout_secs = 0\n")]
    #[case("timeout_secs = \"soon\"\n")]
    #[case("base_url = \"  \"\n")]
    #[case("libary = \"/typo\"\n")]
    fn test_invalid(#[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", contents)?;
            let err = Config::load(Some(Path::new("config.toml"))).unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
            assert!(!err.is_retryable());
            Ok(())
        });
    }
}
