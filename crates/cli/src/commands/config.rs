use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use bindery_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_key: &str| {
        field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "gateway.environment",
        config.gateway.environment.as_str(),
        source("gateway.environment", "BINDERY_GATEWAY_ENVIRONMENT"),
    ));
    lines.push(render_line(
        "gateway.enabled",
        &config.gateway.enabled.to_string(),
        source("gateway.enabled", "BINDERY_GATEWAY_ENABLED"),
    ));
    lines.push(render_line(
        "gateway.base_url",
        config.gateway_base_url(),
        source("gateway.base_url", "BINDERY_GATEWAY_BASE_URL"),
    ));
    lines.push(render_line(
        "gateway.api_token",
        redact_token(config.gateway.api_token.expose_secret()),
        source("gateway.api_token", "BINDERY_GATEWAY_API_TOKEN"),
    ));
    lines.push(render_line(
        "gateway.partner_id",
        if config.gateway.partner_id.is_empty() {
            "<unset>"
        } else {
            config.gateway.partner_id.as_str()
        },
        source("gateway.partner_id", "BINDERY_GATEWAY_PARTNER_ID"),
    ));
    lines.push(render_line(
        "gateway.request_timeout_secs",
        &config.gateway.request_timeout_secs.to_string(),
        source("gateway.request_timeout_secs", "BINDERY_GATEWAY_REQUEST_TIMEOUT_SECS"),
    ));
    lines.push(render_line(
        "gateway.health_timeout_secs",
        &config.gateway.health_timeout_secs.to_string(),
        source("gateway.health_timeout_secs", "BINDERY_GATEWAY_HEALTH_TIMEOUT_SECS"),
    ));

    lines.push(render_line(
        "features.esignature",
        &config.features.esignature.to_string(),
        source("features.esignature", "BINDERY_FEATURE_ESIGNATURE"),
    ));
    lines.push(render_line(
        "features.acord",
        &config.features.acord.to_string(),
        source("features.acord", "BINDERY_FEATURE_ACORD"),
    ));
    lines.push(render_line(
        "features.dtcc",
        &config.features.dtcc.to_string(),
        source("features.dtcc", "BINDERY_FEATURE_DTCC"),
    ));
    lines.push(render_line(
        "features.suitability_checks",
        &config.features.suitability_checks.to_string(),
        source("features.suitability_checks", "BINDERY_FEATURE_SUITABILITY_CHECKS"),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", "BINDERY_LOGGING_LEVEL"),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format),
        source("logging.format", "BINDERY_LOGGING_FORMAT"),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("bindery.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/bindery.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> &'static str {
    if token.trim().is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}
