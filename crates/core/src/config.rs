use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub features: FeatureFlags,
    pub logging: LoggingConfig,
}

/// Carrier gateway connection settings. `enabled = false` selects the
/// deterministic simulation adapter; no credentials are required in
/// that mode.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub environment: GatewayEnvironment,
    pub enabled: bool,
    pub base_url: Option<String>,
    pub api_token: SecretString,
    pub partner_id: String,
    pub request_timeout_secs: u64,
    pub health_timeout_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureFlags {
    pub esignature: bool,
    pub acord: bool,
    pub dtcc: bool,
    pub suitability_checks: bool,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayEnvironment {
    Sandbox,
    Production,
}

impl GatewayEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sandbox => "sandbox",
            Self::Production => "production",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox.api.firelight.example.com/v1",
            Self::Production => "https://api.firelight.example.com/v1",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub environment: Option<GatewayEnvironment>,
    pub gateway_enabled: Option<bool>,
    pub base_url: Option<String>,
    pub api_token: Option<String>,
    pub partner_id: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                environment: GatewayEnvironment::Sandbox,
                enabled: false,
                base_url: None,
                api_token: String::new().into(),
                partner_id: String::new(),
                request_timeout_secs: 30,
                health_timeout_secs: 5,
            },
            features: FeatureFlags {
                esignature: true,
                acord: true,
                dtcc: true,
                suitability_checks: true,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for GatewayEnvironment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(ConfigError::Validation(format!(
                "unsupported gateway environment `{other}` (expected sandbox|production)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("bindery.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides)?;
        config.validate()?;

        Ok(config)
    }

    /// Effective base URL: explicit override wins, otherwise the
    /// environment's well-known endpoint.
    pub fn gateway_base_url(&self) -> &str {
        self.gateway
            .base_url
            .as_deref()
            .unwrap_or_else(|| self.gateway.environment.default_base_url())
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(gateway) = patch.gateway {
            if let Some(environment) = gateway.environment {
                self.gateway.environment = environment;
            }
            if let Some(enabled) = gateway.enabled {
                self.gateway.enabled = enabled;
            }
            if let Some(base_url) = gateway.base_url {
                self.gateway.base_url = Some(base_url);
            }
            if let Some(api_token_value) = gateway.api_token {
                self.gateway.api_token = api_token_value.into();
            }
            if let Some(partner_id) = gateway.partner_id {
                self.gateway.partner_id = partner_id;
            }
            if let Some(request_timeout_secs) = gateway.request_timeout_secs {
                self.gateway.request_timeout_secs = request_timeout_secs;
            }
            if let Some(health_timeout_secs) = gateway.health_timeout_secs {
                self.gateway.health_timeout_secs = health_timeout_secs;
            }
        }

        if let Some(features) = patch.features {
            if let Some(esignature) = features.esignature {
                self.features.esignature = esignature;
            }
            if let Some(acord) = features.acord {
                self.features.acord = acord;
            }
            if let Some(dtcc) = features.dtcc {
                self.features.dtcc = dtcc;
            }
            if let Some(suitability_checks) = features.suitability_checks {
                self.features.suitability_checks = suitability_checks;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("BINDERY_GATEWAY_ENVIRONMENT") {
            self.gateway.environment = value.parse()?;
        }
        if let Some(value) = read_env("BINDERY_GATEWAY_ENABLED") {
            self.gateway.enabled = parse_bool("BINDERY_GATEWAY_ENABLED", &value)?;
        }
        if let Some(value) = read_env("BINDERY_GATEWAY_BASE_URL") {
            self.gateway.base_url = Some(value);
        }
        if let Some(value) = read_env("BINDERY_GATEWAY_API_TOKEN") {
            self.gateway.api_token = value.into();
        }
        if let Some(value) = read_env("BINDERY_GATEWAY_PARTNER_ID") {
            self.gateway.partner_id = value;
        }
        if let Some(value) = read_env("BINDERY_GATEWAY_REQUEST_TIMEOUT_SECS") {
            self.gateway.request_timeout_secs =
                parse_u64("BINDERY_GATEWAY_REQUEST_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("BINDERY_GATEWAY_HEALTH_TIMEOUT_SECS") {
            self.gateway.health_timeout_secs =
                parse_u64("BINDERY_GATEWAY_HEALTH_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("BINDERY_FEATURE_ESIGNATURE") {
            self.features.esignature = parse_bool("BINDERY_FEATURE_ESIGNATURE", &value)?;
        }
        if let Some(value) = read_env("BINDERY_FEATURE_ACORD") {
            self.features.acord = parse_bool("BINDERY_FEATURE_ACORD", &value)?;
        }
        if let Some(value) = read_env("BINDERY_FEATURE_DTCC") {
            self.features.dtcc = parse_bool("BINDERY_FEATURE_DTCC", &value)?;
        }
        if let Some(value) = read_env("BINDERY_FEATURE_SUITABILITY_CHECKS") {
            self.features.suitability_checks =
                parse_bool("BINDERY_FEATURE_SUITABILITY_CHECKS", &value)?;
        }

        let log_level = read_env("BINDERY_LOGGING_LEVEL").or_else(|| read_env("BINDERY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("BINDERY_LOGGING_FORMAT").or_else(|| read_env("BINDERY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(environment) = overrides.environment {
            self.gateway.environment = environment;
        }
        if let Some(enabled) = overrides.gateway_enabled {
            self.gateway.enabled = enabled;
        }
        if let Some(base_url) = overrides.base_url {
            self.gateway.base_url = Some(base_url);
        }
        if let Some(api_token) = overrides.api_token {
            self.gateway.api_token = api_token.into();
        }
        if let Some(partner_id) = overrides.partner_id {
            self.gateway.partner_id = partner_id;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gateway(&self.gateway)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("bindery.toml"), PathBuf::from("config/bindery.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_gateway(gateway: &GatewayConfig) -> Result<(), ConfigError> {
    if gateway.enabled {
        if gateway.api_token.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "gateway.api_token is required when gateway.enabled is true".to_string(),
            ));
        }
        if gateway.partner_id.trim().is_empty() {
            return Err(ConfigError::Validation(
                "gateway.partner_id is required when gateway.enabled is true".to_string(),
            ));
        }
    }

    if let Some(base_url) = &gateway.base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "gateway.base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    if gateway.request_timeout_secs == 0 || gateway.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "gateway.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }
    if gateway.health_timeout_secs == 0 || gateway.health_timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "gateway.health_timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    gateway: Option<GatewayPatch>,
    features: Option<FeaturesPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayPatch {
    environment: Option<GatewayEnvironment>,
    enabled: Option<bool>,
    base_url: Option<String>,
    api_token: Option<String>,
    partner_id: Option<String>,
    request_timeout_secs: Option<u64>,
    health_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct FeaturesPatch {
    esignature: Option<bool>,
    acord: Option<bool>,
    dtcc: Option<bool>,
    suitability_checks: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, GatewayEnvironment, LoadOptions};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_select_simulation_mode() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;
        ensure(!config.gateway.enabled, "gateway must default to disabled (simulation)")?;
        ensure(
            config.gateway_base_url().contains("sandbox"),
            "default base url should be the sandbox endpoint",
        )?;
        ensure(config.gateway.request_timeout_secs == 30, "default request timeout is 30s")?;
        ensure(config.gateway.health_timeout_secs == 5, "default health timeout is 5s")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_GATEWAY_TOKEN", "tok-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("bindery.toml");
            fs::write(
                &path,
                r#"
[gateway]
enabled = true
api_token = "${TEST_GATEWAY_TOKEN}"
partner_id = "PARTNER-9"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.gateway.api_token.expose_secret() == "tok-from-env",
                "api token should be loaded from environment",
            )?;
            ensure(config.gateway.partner_id == "PARTNER-9", "partner id should come from file")
        })();

        clear_vars(&["TEST_GATEWAY_TOKEN"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BINDERY_GATEWAY_PARTNER_ID", "PARTNER-ENV");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("bindery.toml");
            fs::write(
                &path,
                r#"
[gateway]
environment = "production"
partner_id = "PARTNER-FILE"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    environment: Some(GatewayEnvironment::Sandbox),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.gateway.environment == GatewayEnvironment::Sandbox,
                "programmatic override should win over file",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.gateway.partner_id == "PARTNER-ENV",
                "env partner id should win over file",
            )
        })();

        clear_vars(&["BINDERY_GATEWAY_PARTNER_ID"]);
        result
    }

    #[test]
    fn enabled_gateway_without_credentials_fails_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BINDERY_GATEWAY_ENABLED", "true");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("gateway.api_token")
            );
            ensure(has_message, "validation failure should mention gateway.api_token")
        })();

        clear_vars(&["BINDERY_GATEWAY_ENABLED"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("BINDERY_GATEWAY_API_TOKEN", "tok-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("tok-secret-value"), "debug output should not contain token")
        })();

        clear_vars(&["BINDERY_GATEWAY_API_TOKEN"]);
        result
    }
}
