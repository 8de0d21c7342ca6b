use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};

pub const DEFAULT_BASE_URL: &str = "https://your-app-domain";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONFIG_PATH: &str = "/etc/dailysync/trigger.toml";

/// Variables the scheduler hands to every trigger invocation.
pub const BASE_URL_VAR: &str = "APP_BASE_URL";
pub const API_KEY_VAR: &str = "INTERNAL_API_KEY";
/// Points at an optional TOML file when `--config` is not given.
pub const CONFIG_PATH_VAR: &str = "DAILYSYNC_CONFIG";

/// Settings as they come out of the provider stack, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawConfig {
    #[serde(default)]
    app_base_url: Option<String>,
    #[serde(default)]
    internal_api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    connect_timeout_secs: u64,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            app_base_url: None,
            internal_api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Command-line overrides. They sit on top of every other layer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(rename = "app_base_url", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Validated trigger configuration. Built once per invocation.
#[derive(Clone)]
pub struct TriggerConfig {
    /// Base URL of the DailySync service, without trailing slash.
    pub base_url: String,
    api_key: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl std::fmt::Debug for TriggerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl TriggerConfig {
    /// Build the provider stack. Later layers win:
    ///
    ///   1. built-in defaults
    ///   2. TOML file (explicit path > DAILYSYNC_CONFIG > /etc/dailysync/trigger.toml)
    ///   3. DAILYSYNC_TIMEOUT_SECS / DAILYSYNC_CONNECT_TIMEOUT_SECS
    ///   4. APP_BASE_URL / INTERNAL_API_KEY
    ///   5. command-line overrides
    ///
    /// Every layer lives in the default profile so that merge order alone
    /// decides precedence. A file named by `--config` or DAILYSYNC_CONFIG must
    /// exist; the fallback path is optional.
    pub fn figment(config_path: Option<&str>, overrides: &Overrides) -> Result<Figment> {
        let explicit = config_path
            .map(String::from)
            .or_else(|| std::env::var(CONFIG_PATH_VAR).ok())
            .filter(|p| !p.is_empty());
        let path = match explicit {
            Some(p) => {
                let path = absolute(Path::new(&p));
                if !path.is_file() {
                    return Err(ConfigError::ConfigFileNotFound {
                        path: path.display().to_string(),
                    });
                }
                path
            }
            None => PathBuf::from(DEFAULT_CONFIG_PATH),
        };

        let mut figment = Figment::new()
            .merge(Serialized::defaults(RawConfig::default()))
            .merge(Toml::file(&path))
            .merge(Env::prefixed("DAILYSYNC_").only(&["timeout_secs", "connect_timeout_secs"]));

        // Read as plain strings: a purely numeric key must not be coerced into an integer.
        for (var, key) in [(BASE_URL_VAR, "app_base_url"), (API_KEY_VAR, "internal_api_key")] {
            if let Ok(value) = std::env::var(var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }

        Ok(figment.merge(Serialized::defaults(overrides)))
    }

    /// Resolve configuration from the file, the environment and `overrides`.
    pub fn load(config_path: Option<&str>, overrides: &Overrides) -> Result<Self> {
        Self::from_figment(Self::figment(config_path, overrides)?)
    }

    /// Extract and validate. Fails before anything touches the network.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let raw: RawConfig = figment.extract()?;

        // `${APP_BASE_URL:-default}`: empty behaves like unset.
        let base_url = raw
            .app_base_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = validate_base_url(&base_url)?;

        // The header carries the key byte for byte, so it is never trimmed.
        let api_key = raw
            .internal_api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingSetting { name: API_KEY_VAR })?;
        if !api_key.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(ConfigError::InvalidSetting {
                name: API_KEY_VAR,
                reason: "must contain only visible ASCII characters (no whitespace)".to_string(),
            });
        }

        if raw.timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if raw.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                name: "connect_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        tracing::debug!(base_url = %base_url, timeout_secs = raw.timeout_secs, "configuration resolved");

        Ok(Self {
            base_url,
            api_key,
            timeout_secs: raw.timeout_secs,
            connect_timeout_secs: raw.connect_timeout_secs,
        })
    }

    /// Value for the `X-Internal-Api-Key` header.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Construct directly, bypassing providers. Validation rules still apply.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::from_figment(
            Figment::new()
                .merge(Serialized::defaults(RawConfig::default()))
                .merge(Serialized::default("app_base_url", base_url))
                .merge(Serialized::default("internal_api_key", api_key)),
        )
    }
}

/// Parse the base URL and return it normalised, without trailing slash.
/// Endpoint paths are appended to it, so a query or fragment would swallow them.
fn validate_base_url(raw: &str) -> Result<String> {
    let invalid = |reason: String| ConfigError::InvalidSetting {
        name: BASE_URL_VAR,
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(format!("{raw:?} is not a URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "expected an http or https URL, got scheme {:?}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(invalid(format!("{raw:?} has no host")));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(format!("{raw:?} must not carry a query or fragment")));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

/// Relative paths resolve against the working directory only, never its parents.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn load_in(jail: &Jail, overrides: &Overrides) -> Result<TriggerConfig> {
        let path = jail.directory().join("trigger.toml");
        if !path.exists() {
            std::fs::write(&path, "").unwrap();
        }
        TriggerConfig::load(path.to_str(), overrides)
    }

    #[test]
    fn missing_api_key_is_rejected() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let err = load_in(jail, &Overrides::default()).unwrap_err();
            assert!(matches!(err, ConfigError::MissingSetting { name: "INTERNAL_API_KEY" }));
            assert!(err.to_string().contains("INTERNAL_API_KEY"));
            Ok(())
        });
    }

    #[test]
    fn blank_api_key_is_rejected() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env(API_KEY_VAR, "   ");
            let err = load_in(jail, &Overrides::default()).unwrap_err();
            assert_eq!(err.code(), "MISSING_SETTING");
            Ok(())
        });
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env(API_KEY_VAR, "s3cret");
            let cfg = load_in(jail, &Overrides::default()).map_err(|e| e.to_string())?;
            assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
            assert_eq!(cfg.api_key(), "s3cret");
            assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
            assert_eq!(cfg.connect_timeout_secs, DEFAULT_CONNECT_TIMEOUT_SECS);
            Ok(())
        });
    }

    #[test]
    fn empty_base_url_falls_back_to_default() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env(API_KEY_VAR, "k");
            jail.set_env(BASE_URL_VAR, "");
            let cfg = load_in(jail, &Overrides::default()).map_err(|e| e.to_string())?;
            assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
            Ok(())
        });
    }

    #[test]
    fn numeric_api_key_stays_a_string() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env(API_KEY_VAR, "0012345");
            let cfg = load_in(jail, &Overrides::default()).map_err(|e| e.to_string())?;
            assert_eq!(cfg.api_key(), "0012345");
            Ok(())
        });
    }

    #[test]
    fn env_beats_file_and_cli_beats_env() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "trigger.toml",
                r#"
                    app_base_url = "https://from-file.example"
                    internal_api_key = "file-key"
                    timeout_secs = 5
                "#,
            )?;

            let cfg = load_in(jail, &Overrides::default()).map_err(|e| e.to_string())?;
            assert_eq!(cfg.base_url, "https://from-file.example");
            assert_eq!(cfg.api_key(), "file-key");
            assert_eq!(cfg.timeout_secs, 5);

            jail.set_env(BASE_URL_VAR, "https://from-env.example/");
            jail.set_env(API_KEY_VAR, "env-key");
            jail.set_env("DAILYSYNC_TIMEOUT_SECS", "12");
            let cfg = load_in(jail, &Overrides::default()).map_err(|e| e.to_string())?;
            assert_eq!(cfg.base_url, "https://from-env.example");
            assert_eq!(cfg.api_key(), "env-key");
            assert_eq!(cfg.timeout_secs, 12);

            let overrides = Overrides {
                base_url: Some("http://from-cli.example".to_string()),
                timeout_secs: Some(3),
            };
            let cfg = load_in(jail, &overrides).map_err(|e| e.to_string())?;
            assert_eq!(cfg.base_url, "http://from-cli.example");
            assert_eq!(cfg.timeout_secs, 3);
            Ok(())
        });
    }

    #[test]
    fn config_path_env_var_is_honoured() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file("alt.toml", r#"internal_api_key = "alt-key""#)?;
            let alt = jail.directory().join("alt.toml");
            jail.set_env(CONFIG_PATH_VAR, alt.display());
            let cfg = TriggerConfig::load(None, &Overrides::default()).map_err(|e| e.to_string())?;
            assert_eq!(cfg.api_key(), "alt-key");
            Ok(())
        });
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let err = TriggerConfig::new("ftp://example.com", "k").unwrap_err();
        assert_eq!(err.code(), "INVALID_SETTING");
    }

    #[test]
    fn zero_timeout_is_rejected() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env(API_KEY_VAR, "k");
            let overrides = Overrides {
                base_url: None,
                timeout_secs: Some(0),
            };
            let err = load_in(jail, &overrides).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidSetting { name: "timeout_secs", .. }));
            Ok(())
        });
    }

    #[test]
    fn explicit_config_file_must_exist() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env(API_KEY_VAR, "k");
            let err = TriggerConfig::load(Some("missing.toml"), &Overrides::default()).unwrap_err();
            assert!(matches!(err, ConfigError::ConfigFileNotFound { .. }));

            jail.set_env(CONFIG_PATH_VAR, "also-missing.toml");
            let err = TriggerConfig::load(None, &Overrides::default()).unwrap_err();
            assert_eq!(err.code(), "CONFIG_FILE_NOT_FOUND");
            Ok(())
        });
    }

    #[test]
    fn relative_config_path_does_not_search_parents() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.set_env(API_KEY_VAR, "k");
            jail.create_file("trigger.toml", r#"timeout_secs = 9"#)?;
            let nested = jail.directory().join("nested");
            std::fs::create_dir(&nested).unwrap();
            std::env::set_current_dir(&nested).unwrap();
            let err = TriggerConfig::load(Some("trigger.toml"), &Overrides::default()).unwrap_err();
            assert!(matches!(err, ConfigError::ConfigFileNotFound { .. }));
            Ok(())
        });
    }

    #[test]
    fn api_key_is_kept_byte_for_byte() {
        let cfg = TriggerConfig::new("https://example.com", "Ab-_.~9=").unwrap();
        assert_eq!(cfg.api_key(), "Ab-_.~9=");
    }

    #[test]
    fn api_key_with_unsendable_characters_is_rejected() {
        for key in ["k\u{e9}y\u{1}", " padded ", "two words", "line\n"] {
            let err = TriggerConfig::new("https://example.com", key).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidSetting { name: "INTERNAL_API_KEY", .. }),
                "{key:?} accepted"
            );
        }
    }

    #[test]
    fn base_url_with_query_or_fragment_is_rejected() {
        for base in ["http://127.0.0.1:8080/?x=1", "https://example.com/#frag", "https://example.com?"] {
            let err = TriggerConfig::new(base, "k").unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidSetting { name: "APP_BASE_URL", .. }),
                "{base:?} accepted"
            );
        }
    }

    #[test]
    fn base_url_scheme_is_case_insensitive_and_normalised() {
        let cfg = TriggerConfig::new("HTTPS://Standup.Example.com/", "k").unwrap();
        assert_eq!(cfg.base_url, "https://standup.example.com");

        let cfg = TriggerConfig::new("http://gw.example.com/dailysync/", "k").unwrap();
        assert_eq!(cfg.base_url, "http://gw.example.com/dailysync");
    }

    #[test]
    fn base_url_without_host_is_rejected() {
        assert!(TriggerConfig::new("http://", "k").is_err());
        assert!(TriggerConfig::new("exa mple", "k").is_err());
    }

    #[test]
    fn debug_output_redacts_key() {
        let cfg = TriggerConfig::new("https://example.com", "super-secret").unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
