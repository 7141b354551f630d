use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_SHOPPING_MODEL: &str = "us.anthropic.claude-3-5-sonnet-20241022-v2:0";
pub const DEFAULT_CART_MODEL: &str = "anthropic.claude-haiku-4-5-20251001-v1:0";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub shopping: ShoppingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub url: Option<String>,
    pub access_token: Option<SecretString>,
    pub control_timeout_secs: u64,
    pub data_timeout_secs: u64,
    pub client_name: String,
}

#[derive(Clone, Debug)]
pub struct SearchConfig {
    pub api_key: Option<SecretString>,
    pub endpoint: String,
    pub amazon_domain: String,
    pub min_rating: f64,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub region: String,
    pub shopping_model: String,
    pub shopping_temperature: f32,
    pub cart_model: String,
    pub cart_temperature: f32,
}

#[derive(Clone, Debug)]
pub struct ShoppingConfig {
    pub dispatch: ShoppingDispatch,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// How the shopping subagent picks its tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShoppingDispatch {
    /// Keyword routing straight to a gateway tool.
    Direct,
    /// Model-driven tool use with a direct-search shortcut for simple queries.
    Agent,
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
    pub gateway_url: Option<String>,
    pub gateway_access_token: Option<String>,
    pub search_api_key: Option<String>,
    pub min_rating: Option<f64>,
    pub shopping_dispatch: Option<ShoppingDispatch>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
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
                url: None,
                access_token: None,
                control_timeout_secs: 10,
                data_timeout_secs: 30,
                client_name: "shopping-assistant".to_string(),
            },
            search: SearchConfig {
                api_key: None,
                endpoint: "https://serpapi.com/search.json".to_string(),
                amazon_domain: "amazon.com".to_string(),
                min_rating: 3.5,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                region: "us-east-1".to_string(),
                shopping_model: DEFAULT_SHOPPING_MODEL.to_string(),
                shopping_temperature: 0.2,
                cart_model: DEFAULT_CART_MODEL.to_string(),
                cart_temperature: 0.1,
            },
            shopping: ShoppingConfig { dispatch: ShoppingDispatch::Direct },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for ShoppingDispatch {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "agent" => Ok(Self::Agent),
            other => Err(ConfigError::Validation(format!(
                "unsupported shopping dispatch `{other}` (expected direct|agent)"
            ))),
        }
    }
}

impl ShoppingDispatch {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Agent => "agent",
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

impl LogFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
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
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from("concierge.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(gateway) = patch.gateway {
            if let Some(url) = gateway.url {
                self.gateway.url = Some(url);
            }
            if let Some(access_token) = gateway.access_token {
                self.gateway.access_token = Some(secret_value(access_token));
            }
            if let Some(control_timeout_secs) = gateway.control_timeout_secs {
                self.gateway.control_timeout_secs = control_timeout_secs;
            }
            if let Some(data_timeout_secs) = gateway.data_timeout_secs {
                self.gateway.data_timeout_secs = data_timeout_secs;
            }
            if let Some(client_name) = gateway.client_name {
                self.gateway.client_name = client_name;
            }
        }

        if let Some(search) = patch.search {
            if let Some(api_key) = search.api_key {
                self.search.api_key = Some(secret_value(api_key));
            }
            if let Some(endpoint) = search.endpoint {
                self.search.endpoint = endpoint;
            }
            if let Some(amazon_domain) = search.amazon_domain {
                self.search.amazon_domain = amazon_domain;
            }
            if let Some(min_rating) = search.min_rating {
                self.search.min_rating = min_rating;
            }
            if let Some(timeout_secs) = search.timeout_secs {
                self.search.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(region) = llm.region {
                self.llm.region = region;
            }
            if let Some(shopping_model) = llm.shopping_model {
                self.llm.shopping_model = shopping_model;
            }
            if let Some(shopping_temperature) = llm.shopping_temperature {
                self.llm.shopping_temperature = shopping_temperature;
            }
            if let Some(cart_model) = llm.cart_model {
                self.llm.cart_model = cart_model;
            }
            if let Some(cart_temperature) = llm.cart_temperature {
                self.llm.cart_temperature = cart_temperature;
            }
        }

        if let Some(shopping) = patch.shopping {
            if let Some(dispatch) = shopping.dispatch {
                self.shopping.dispatch = dispatch;
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
        if let Some(value) = read_env("CONCIERGE_GATEWAY_URL") {
            self.gateway.url = Some(value);
        }
        if let Some(value) = read_env("CONCIERGE_GATEWAY_ACCESS_TOKEN") {
            self.gateway.access_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("CONCIERGE_GATEWAY_CONTROL_TIMEOUT_SECS") {
            self.gateway.control_timeout_secs =
                parse_u64("CONCIERGE_GATEWAY_CONTROL_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("CONCIERGE_GATEWAY_DATA_TIMEOUT_SECS") {
            self.gateway.data_timeout_secs =
                parse_u64("CONCIERGE_GATEWAY_DATA_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("CONCIERGE_GATEWAY_CLIENT_NAME") {
            self.gateway.client_name = value;
        }

        let search_key =
            read_env("CONCIERGE_SEARCH_API_KEY").or_else(|| read_env("SERPAPI_API_KEY"));
        if let Some(value) = search_key {
            self.search.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("CONCIERGE_SEARCH_ENDPOINT") {
            self.search.endpoint = value;
        }
        if let Some(value) = read_env("CONCIERGE_SEARCH_AMAZON_DOMAIN") {
            self.search.amazon_domain = value;
        }
        if let Some(value) = read_env("CONCIERGE_SEARCH_MIN_RATING") {
            self.search.min_rating = parse_f64("CONCIERGE_SEARCH_MIN_RATING", &value)?;
        }
        if let Some(value) = read_env("CONCIERGE_SEARCH_TIMEOUT_SECS") {
            self.search.timeout_secs = parse_u64("CONCIERGE_SEARCH_TIMEOUT_SECS", &value)?;
        }

        let region = read_env("CONCIERGE_LLM_REGION").or_else(|| read_env("AWS_REGION"));
        if let Some(value) = region {
            self.llm.region = value;
        }
        if let Some(value) = read_env("CONCIERGE_LLM_SHOPPING_MODEL") {
            self.llm.shopping_model = value;
        }
        if let Some(value) = read_env("CONCIERGE_LLM_SHOPPING_TEMPERATURE") {
            self.llm.shopping_temperature =
                parse_f32("CONCIERGE_LLM_SHOPPING_TEMPERATURE", &value)?;
        }
        if let Some(value) = read_env("CONCIERGE_LLM_CART_MODEL") {
            self.llm.cart_model = value;
        }
        if let Some(value) = read_env("CONCIERGE_LLM_CART_TEMPERATURE") {
            self.llm.cart_temperature = parse_f32("CONCIERGE_LLM_CART_TEMPERATURE", &value)?;
        }

        if let Some(value) = read_env("CONCIERGE_SHOPPING_DISPATCH") {
            self.shopping.dispatch = value.parse()?;
        }

        let log_level =
            read_env("CONCIERGE_LOGGING_LEVEL").or_else(|| read_env("CONCIERGE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CONCIERGE_LOGGING_FORMAT").or_else(|| read_env("CONCIERGE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(gateway_url) = overrides.gateway_url {
            self.gateway.url = Some(gateway_url);
        }
        if let Some(access_token) = overrides.gateway_access_token {
            self.gateway.access_token = Some(secret_value(access_token));
        }
        if let Some(api_key) = overrides.search_api_key {
            self.search.api_key = Some(secret_value(api_key));
        }
        if let Some(min_rating) = overrides.min_rating {
            self.search.min_rating = min_rating;
        }
        if let Some(dispatch) = overrides.shopping_dispatch {
            self.shopping.dispatch = dispatch;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gateway(&self.gateway)?;
        validate_search(&self.search)?;
        validate_llm(&self.llm)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("concierge.toml"), PathBuf::from("config/concierge.toml")]
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

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn validate_timeout(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 || value > 300 {
        return Err(ConfigError::Validation(format!("{key} must be in range 1..=300")));
    }
    Ok(())
}

fn validate_gateway(gateway: &GatewayConfig) -> Result<(), ConfigError> {
    if let Some(url) = &gateway.url {
        if !is_http_url(url.trim()) {
            return Err(ConfigError::Validation(
                "gateway.url must start with http:// or https://".to_string(),
            ));
        }
    }

    validate_timeout("gateway.control_timeout_secs", gateway.control_timeout_secs)?;
    validate_timeout("gateway.data_timeout_secs", gateway.data_timeout_secs)?;

    if gateway.client_name.trim().is_empty() {
        return Err(ConfigError::Validation("gateway.client_name must not be empty".to_string()));
    }

    Ok(())
}

fn validate_search(search: &SearchConfig) -> Result<(), ConfigError> {
    if !is_http_url(search.endpoint.trim()) {
        return Err(ConfigError::Validation(
            "search.endpoint must start with http:// or https://".to_string(),
        ));
    }

    if search.amazon_domain.trim().is_empty() {
        return Err(ConfigError::Validation("search.amazon_domain must not be empty".to_string()));
    }

    if !(0.0..=5.0).contains(&search.min_rating) {
        return Err(ConfigError::Validation(
            "search.min_rating must be in range 0..=5".to_string(),
        ));
    }

    validate_timeout("search.timeout_secs", search.timeout_secs)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.region.trim().is_empty() {
        return Err(ConfigError::Validation("llm.region must not be empty".to_string()));
    }

    for (key, model) in [("llm.shopping_model", &llm.shopping_model), ("llm.cart_model", &llm.cart_model)]
    {
        if model.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{key} must not be empty")));
        }
    }

    for (key, temperature) in [
        ("llm.shopping_temperature", llm.shopping_temperature),
        ("llm.cart_temperature", llm.cart_temperature),
    ] {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(ConfigError::Validation(format!("{key} must be in range 0..=1")));
        }
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

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| invalid_override(key, value))
}

fn parse_f32(key: &str, value: &str) -> Result<f32, ConfigError> {
    value.trim().parse::<f32>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    gateway: Option<GatewayPatch>,
    search: Option<SearchPatch>,
    llm: Option<LlmPatch>,
    shopping: Option<ShoppingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayPatch {
    url: Option<String>,
    access_token: Option<String>,
    control_timeout_secs: Option<u64>,
    data_timeout_secs: Option<u64>,
    client_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPatch {
    api_key: Option<String>,
    endpoint: Option<String>,
    amazon_domain: Option<String>,
    min_rating: Option<f64>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    region: Option<String>,
    shopping_model: Option<String>,
    shopping_temperature: Option<f32>,
    cart_model: Option<String>,
    cart_temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct ShoppingPatch {
    dispatch: Option<ShoppingDispatch>,
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

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, ShoppingDispatch};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const TOUCHED_VARS: &[&str] = &[
        "CONCIERGE_GATEWAY_URL",
        "CONCIERGE_GATEWAY_ACCESS_TOKEN",
        "CONCIERGE_SEARCH_API_KEY",
        "CONCIERGE_SEARCH_MIN_RATING",
        "CONCIERGE_SHOPPING_DISPATCH",
        "CONCIERGE_LLM_REGION",
        "CONCIERGE_LOG_LEVEL",
        "CONCIERGE_LOG_FORMAT",
        "SERPAPI_API_KEY",
        "AWS_REGION",
        "TEST_GATEWAY_TOKEN",
    ];

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
    fn defaults_cover_every_section() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOUCHED_VARS);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.gateway.url.is_none(), "gateway url has no default")?;
        ensure(config.gateway.control_timeout_secs == 10, "control timeout defaults to 10s")?;
        ensure(config.gateway.data_timeout_secs == 30, "data timeout defaults to 30s")?;
        ensure(config.gateway.client_name == "shopping-assistant", "client name default")?;
        ensure(config.search.endpoint == "https://serpapi.com/search.json", "endpoint default")?;
        ensure(config.search.min_rating == 3.5, "min rating defaults to 3.5")?;
        ensure(config.llm.region == "us-east-1", "region defaults to us-east-1")?;
        ensure(config.shopping.dispatch == ShoppingDispatch::Direct, "dispatch defaults to direct")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOUCHED_VARS);
        env::set_var("TEST_GATEWAY_TOKEN", "token-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("concierge.toml");
            fs::write(
                &path,
                r#"
[gateway]
url = "https://gateway.example.com/mcp"
access_token = "${TEST_GATEWAY_TOKEN}"

[shopping]
dispatch = "agent"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.gateway.access_token.as_ref().map(|token| token.expose_secret())
                    == Some("token-from-env"),
                "gateway token should be interpolated from the environment",
            )?;
            ensure(config.shopping.dispatch == ShoppingDispatch::Agent, "dispatch from file")
        })();

        clear_vars(TOUCHED_VARS);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOUCHED_VARS);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("concierge.toml");
        fs::write(&path, "[search]\napi_key = \"${CONCIERGE_TEST_UNSET_KEY}\"\n")
            .map_err(|err| err.to_string())?;

        let error = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            .err()
            .ok_or_else(|| "load should fail".to_string())?;
        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "CONCIERGE_TEST_UNSET_KEY"),
            "error should name the missing variable",
        )
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOUCHED_VARS);
        env::set_var("CONCIERGE_GATEWAY_URL", "https://from-env.example.com");
        env::set_var("CONCIERGE_SEARCH_MIN_RATING", "4.0");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("concierge.toml");
            fs::write(
                &path,
                r#"
[gateway]
url = "https://from-file.example.com"

[search]
min_rating = 3.0
timeout_secs = 12

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    shopping_dispatch: Some(ShoppingDispatch::Agent),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.gateway.url.as_deref() == Some("https://from-env.example.com"),
                "env gateway url should win over the file",
            )?;
            ensure(config.search.min_rating == 4.0, "env min rating should win over the file")?;
            ensure(config.search.timeout_secs == 12, "file timeout should win over the default")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.shopping.dispatch == ShoppingDispatch::Agent, "override dispatch wins")
        })();

        clear_vars(TOUCHED_VARS);
        result
    }

    #[test]
    fn region_and_search_key_fall_back_to_provider_variables() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOUCHED_VARS);
        env::set_var("AWS_REGION", "eu-west-1");
        env::set_var("SERPAPI_API_KEY", "serp-from-env");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            ensure(config.llm.region == "eu-west-1", "AWS_REGION should set the region")?;
            ensure(
                config.search.api_key.as_ref().map(|key| key.expose_secret())
                    == Some("serp-from-env"),
                "SERPAPI_API_KEY should set the search key",
            )
        })();

        clear_vars(TOUCHED_VARS);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOUCHED_VARS);
        env::set_var("CONCIERGE_LOG_LEVEL", "warn");
        env::set_var("CONCIERGE_LOG_FORMAT", "json");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Json),
                "json logging format should be set from env var",
            )
        })();

        clear_vars(TOUCHED_VARS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOUCHED_VARS);
        env::set_var("CONCIERGE_GATEWAY_URL", "ftp://gateway.example.com");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("gateway.url")
            );
            ensure(has_message, "validation failure should mention gateway.url")
        })();

        clear_vars(TOUCHED_VARS);
        result
    }

    #[test]
    fn out_of_range_values_are_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOUCHED_VARS);

        let mut config = AppConfig::default();
        config.search.min_rating = 5.5;
        ensure(config.validate().is_err(), "min rating above five is invalid")?;

        let mut config = AppConfig::default();
        config.llm.cart_temperature = 1.5;
        ensure(config.validate().is_err(), "temperature above one is invalid")?;

        let mut config = AppConfig::default();
        config.gateway.data_timeout_secs = 0;
        ensure(config.validate().is_err(), "zero timeout is invalid")?;

        env::set_var("CONCIERGE_SEARCH_MIN_RATING", "high");
        let error = AppConfig::load(LoadOptions::default()).err();
        clear_vars(TOUCHED_VARS);
        ensure(
            matches!(error, Some(ConfigError::InvalidEnvOverride { ref key, .. }) if key == "CONCIERGE_SEARCH_MIN_RATING"),
            "unparseable env override should be reported",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(TOUCHED_VARS);
        env::set_var("CONCIERGE_GATEWAY_ACCESS_TOKEN", "gateway-secret-value");
        env::set_var("CONCIERGE_SEARCH_API_KEY", "serp-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("gateway-secret-value"),
                "debug output should not contain the gateway token",
            )?;
            ensure(
                !debug.contains("serp-secret-value"),
                "debug output should not contain the search key",
            )?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )
        })();

        clear_vars(TOUCHED_VARS);
        result
    }
}
