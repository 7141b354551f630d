//! SerpApi Amazon engine behind the core [`SearchProvider`] seam.

use std::time::Duration;

use async_trait::async_trait;
use concierge_core::config::SearchConfig;
use concierge_core::{ProviderError, RawProduct, SearchProvider, SearchQuery};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

const ENGINE: &str = "amazon";
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Clone)]
pub struct SerpApiProvider {
    client: Client,
    endpoint: String,
    amazon_domain: String,
    api_key: SecretString,
    timeout_secs: u64,
}

impl std::fmt::Debug for SerpApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiProvider")
            .field("endpoint", &self.endpoint)
            .field("amazon_domain", &self.amazon_domain)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl SerpApiProvider {
    /// Fails with [`ProviderError::Configuration`] when no API key is set.
    pub fn from_config(config: &SearchConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| ProviderError::Configuration("search.api_key is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| {
                ProviderError::Configuration(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            amazon_domain: config.amazon_domain.clone(),
            api_key,
            timeout_secs: config.timeout_secs,
        })
    }

    fn query_params(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("engine", ENGINE.to_string()),
            ("amazon_domain", self.amazon_domain.clone()),
            ("k", query.optimized.clone()),
            ("api_key", self.api_key.expose_secret().to_string()),
        ];
        if let Some(low) = query.price_range.low_price() {
            params.push(("low_price", low.to_string()));
        }
        if let Some(high) = query.price_range.high_price() {
            params.push(("high_price", high.to_string()));
        }
        params
    }

    fn request_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout { timeout_secs: self.timeout_secs }
        } else {
            // Strip the URL: it carries the api key as a query parameter.
            ProviderError::Transport(err.without_url().to_string())
        }
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawProduct>, ProviderError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|err| self.request_error(err))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| self.request_error(err))?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: error_summary(&body),
            });
        }

        decode_organic_results(&body)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    organic_results: Option<Value>,
}

/// Reads `organic_results` record by record; a record that does not decode is
/// skipped rather than failing the whole response.
pub fn decode_organic_results(body: &str) -> Result<Vec<RawProduct>, ProviderError> {
    let envelope = serde_json::from_str::<SearchEnvelope>(body)
        .map_err(|err| ProviderError::Decode(err.to_string()))?;

    if let Some(error) = envelope.error.as_ref().and_then(error_text) {
        return Err(ProviderError::Provider(error));
    }

    let records = match envelope.organic_results {
        Some(Value::Array(records)) => records,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(ProviderError::Decode(format!(
                "organic_results should be an array, got {}",
                json_kind(&other)
            )))
        }
    };

    let total = records.len();
    let decoded = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<RawProduct>(record) {
            Ok(product) => Some(product),
            Err(err) => {
                warn!(
                    event_name = "search.serpapi.record_skipped",
                    index,
                    error = %err,
                    "skipping undecodable search record"
                );
                None
            }
        })
        .collect::<Vec<_>>();

    debug!(
        event_name = "search.serpapi.decoded",
        total,
        decoded = decoded.len(),
        "decoded organic results"
    );
    Ok(decoded)
}

fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Error field of a JSON body when present, else the body cut to a readable size.
fn error_summary(body: &str) -> String {
    let from_json = serde_json::from_str::<SearchEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.as_ref().and_then(error_text));
    from_json.unwrap_or_else(|| body.trim().chars().take(ERROR_BODY_LIMIT).collect())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use concierge_core::config::AppConfig;
    use concierge_core::{Price, Product, ProviderError, SearchQuery};

    use super::{decode_organic_results, error_summary, SerpApiProvider};

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let config = AppConfig::default();
        let error = SerpApiProvider::from_config(&config.search).err();
        assert!(matches!(error, Some(ProviderError::Configuration(_))));
    }

    #[test]
    fn zero_bounds_are_left_out_of_the_request() {
        let mut config = AppConfig::default().search;
        config.api_key = Some("key".to_string().into());
        let provider = SerpApiProvider::from_config(&config).expect("provider");

        let params = provider.query_params(&SearchQuery::parse("socks $0-$25"));
        let names = params.iter().map(|(name, _)| *name).collect::<Vec<_>>();
        assert_eq!(names, vec!["engine", "amazon_domain", "k", "api_key", "high_price"]);
        assert_eq!(params[4].1, "25");
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let body = r#"{
            "organic_results": [
                {"asin": "B01", "title": "Bottle", "price": "$1,299.00", "rating": "4.5"},
                "not a record",
                {"asin": "B02", "price": {"value": 9.5}, "rating": 4.0, "reviews": "1,024"}
            ]
        }"#;

        let records = decode_organic_results(body).expect("decodes");
        let products = records.into_iter().map(Product::from).collect::<Vec<_>>();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price.to_string(), "$1299.00");
        assert_eq!(products[0].rating, 4.5);
        assert_eq!(products[1].reviews, 1024);
        assert!(matches!(products[1].price, Price::Amount(_)));
    }

    #[test]
    fn body_error_field_becomes_provider_error() {
        let error = decode_organic_results(r#"{"error": "Google hasn't returned any results"}"#);
        assert_eq!(
            error,
            Err(ProviderError::Provider("Google hasn't returned any results".to_string()))
        );
    }

    #[test]
    fn missing_results_are_an_empty_list() {
        assert_eq!(decode_organic_results(r#"{"search_metadata": {}}"#), Ok(Vec::new()));
        assert!(matches!(
            decode_organic_results(r#"{"organic_results": 3}"#),
            Err(ProviderError::Decode(_))
        ));
        assert!(matches!(decode_organic_results("<html>"), Err(ProviderError::Decode(_))));
    }

    #[test]
    fn error_summary_prefers_json_error_field() {
        assert_eq!(error_summary(r#"{"error": "Invalid API key."}"#), "Invalid API key.");
        assert_eq!(error_summary(&"x".repeat(500)).len(), 200);
    }
}
