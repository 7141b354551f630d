use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use concierge_core::config::AppConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use toml::Value;

use crate::commands::{load_config, CommandResult};

const COMMAND: &str = "config";

#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

pub fn run() -> CommandResult {
    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let entries = effective_entries(&config)
        .into_iter()
        .map(|(key, value, env_keys)| ConfigEntry {
            key,
            value,
            source: field_source(key, env_keys, config_file_doc.as_ref(), config_file_path.as_deref()),
        })
        .collect::<Vec<_>>();

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(entries.iter().map(render_line));
    CommandResult::with_data(COMMAND, lines.join("\n"), entries)
}

type Entry = (&'static str, String, &'static [&'static str]);

fn effective_entries(config: &AppConfig) -> Vec<Entry> {
    let gateway = &config.gateway;
    let search = &config.search;
    let llm = &config.llm;

    vec![
        entry(
            "gateway.url",
            gateway.url.clone().unwrap_or_else(|| "<unset>".to_string()),
            &["CONCIERGE_GATEWAY_URL"],
        ),
        entry(
            "gateway.access_token",
            redact_secret(gateway.access_token.as_ref()),
            &["CONCIERGE_GATEWAY_ACCESS_TOKEN"],
        ),
        entry(
            "gateway.control_timeout_secs",
            gateway.control_timeout_secs.to_string(),
            &["CONCIERGE_GATEWAY_CONTROL_TIMEOUT_SECS"],
        ),
        entry(
            "gateway.data_timeout_secs",
            gateway.data_timeout_secs.to_string(),
            &["CONCIERGE_GATEWAY_DATA_TIMEOUT_SECS"],
        ),
        entry("gateway.client_name", gateway.client_name.clone(), &["CONCIERGE_GATEWAY_CLIENT_NAME"]),
        entry(
            "search.api_key",
            redact_secret(search.api_key.as_ref()),
            &["CONCIERGE_SEARCH_API_KEY", "SERPAPI_API_KEY"],
        ),
        entry("search.endpoint", search.endpoint.clone(), &["CONCIERGE_SEARCH_ENDPOINT"]),
        entry("search.amazon_domain", search.amazon_domain.clone(), &["CONCIERGE_SEARCH_AMAZON_DOMAIN"]),
        entry("search.min_rating", search.min_rating.to_string(), &["CONCIERGE_SEARCH_MIN_RATING"]),
        entry("search.timeout_secs", search.timeout_secs.to_string(), &["CONCIERGE_SEARCH_TIMEOUT_SECS"]),
        entry("llm.region", llm.region.clone(), &["CONCIERGE_LLM_REGION", "AWS_REGION"]),
        entry("llm.shopping_model", llm.shopping_model.clone(), &["CONCIERGE_LLM_SHOPPING_MODEL"]),
        entry(
            "llm.shopping_temperature",
            llm.shopping_temperature.to_string(),
            &["CONCIERGE_LLM_SHOPPING_TEMPERATURE"],
        ),
        entry("llm.cart_model", llm.cart_model.clone(), &["CONCIERGE_LLM_CART_MODEL"]),
        entry(
            "llm.cart_temperature",
            llm.cart_temperature.to_string(),
            &["CONCIERGE_LLM_CART_TEMPERATURE"],
        ),
        entry(
            "shopping.dispatch",
            config.shopping.dispatch.as_str().to_string(),
            &["CONCIERGE_SHOPPING_DISPATCH"],
        ),
        entry(
            "logging.level",
            config.logging.level.clone(),
            &["CONCIERGE_LOGGING_LEVEL", "CONCIERGE_LOG_LEVEL"],
        ),
        entry(
            "logging.format",
            config.logging.format.as_str().to_string(),
            &["CONCIERGE_LOGGING_FORMAT", "CONCIERGE_LOG_FORMAT"],
        ),
    ]
}

fn entry(key: &'static str, value: String, env_keys: &'static [&'static str]) -> Entry {
    (key, value, env_keys)
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("concierge.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/concierge.toml");
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
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
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

fn render_line(entry: &ConfigEntry) -> String {
    format!("- {} = {} (source: {})", entry.key, entry.value, entry.source)
}

fn redact_secret(secret: Option<&SecretString>) -> String {
    match secret.map(|secret| secret.expose_secret().trim().is_empty()) {
        None => "<unset>".to_string(),
        Some(true) => "<empty>".to_string(),
        Some(false) => "<redacted>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use toml::Value;

    use super::{contains_path, redact_secret};

    #[test]
    fn secrets_are_never_rendered() {
        let secret = SecretString::from("sk-live-123".to_string());
        let blank = SecretString::from("  ".to_string());
        assert_eq!(redact_secret(Some(&secret)), "<redacted>");
        assert_eq!(redact_secret(None), "<unset>");
        assert_eq!(redact_secret(Some(&blank)), "<empty>");
    }

    #[test]
    fn dotted_paths_resolve_through_tables() {
        let doc = "[search]\nmin_rating = 4.0\n".parse::<Value>().expect("valid toml");
        assert!(contains_path(&doc, "search.min_rating"));
        assert!(!contains_path(&doc, "search.api_key"));
        assert!(!contains_path(&doc, "gateway.url"));
    }
}
