use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// A marketplace listing that survived decoding.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Product {
    pub asin: String,
    pub title: String,
    pub link: String,
    pub price: Price,
    /// 0.0 means the provider did not report a rating.
    pub rating: f64,
    pub reviews: u64,
    pub thumbnail: String,
    pub delivery: String,
    pub prime: bool,
    pub sponsored: bool,
}

impl Product {
    pub fn has_identifier(&self) -> bool {
        !self.asin.trim().is_empty()
    }

    pub fn has_rating(&self) -> bool {
        self.rating > 0.0
    }

    pub fn product_url(&self) -> String {
        format!("https://www.amazon.com/dp/{}", self.asin)
    }
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Self {
            asin: raw.asin.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            link: raw.link.unwrap_or_default(),
            price: raw.price.map(Price::from).unwrap_or(Price::Unavailable),
            rating: raw.rating.map(|rating| rating.as_rating()).unwrap_or(0.0),
            reviews: raw.reviews.map(|reviews| reviews.as_count()).unwrap_or(0),
            thumbnail: raw.thumbnail.unwrap_or_default(),
            delivery: raw.delivery.unwrap_or_default(),
            prime: raw.prime,
            sponsored: raw.sponsored,
        }
    }
}

/// Listing price after decoding whatever shape the provider sent.
#[derive(Clone, Debug, PartialEq)]
pub enum Price {
    Amount(Decimal),
    /// Text the provider sent that carries no recognizable amount, kept verbatim.
    Unparsed(String),
    Unavailable,
}

impl Price {
    pub fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Amount(amount) => Some(*amount),
            Self::Unparsed(_) | Self::Unavailable => None,
        }
    }

    /// Pulls the first `$1,234.56`-style figure out of free text.
    pub fn parse_text(raw: &str) -> Self {
        let amount = price_pattern()
            .captures(raw)
            .and_then(|captures| captures.get(1))
            .and_then(|figure| {
                let digits = figure.as_str().replace(',', "");
                Decimal::from_str(digits.trim_end_matches('.')).ok()
            });

        match amount {
            Some(amount) => Self::Amount(amount),
            None => Self::Unparsed(raw.to_string()),
        }
    }

    fn from_number(number: &Number) -> Self {
        Decimal::from_str(&number.to_string())
            .or_else(|_| Decimal::from_scientific(&number.to_string()))
            .map(Self::Amount)
            .unwrap_or(Self::Unavailable)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(amount) => {
                let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                write!(f, "${rounded:.2}")
            }
            Self::Unparsed(raw) => f.write_str(raw),
            Self::Unavailable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Price {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.amount() {
            Some(amount) => match amount.to_f64() {
                Some(value) => serializer.serialize_f64(value),
                None => serializer.serialize_str(&amount.to_string()),
            },
            None => serializer.collect_str(self),
        }
    }
}

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$?([\d,]+\.?\d*)").expect("price pattern is valid"))
}

/// Wire shape of one provider record. Every field is optional and decoded
/// leniently so a single odd field never drops the listing.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient_text")]
    pub asin: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub link: Option<String>,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default)]
    pub rating: Option<RawNumber>,
    #[serde(default)]
    pub reviews: Option<RawNumber>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub delivery: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub prime: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub sponsored: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawPrice {
    Number(Number),
    Text(String),
    Structured { value: Option<Value> },
    Other(Value),
}

impl From<RawPrice> for Price {
    fn from(raw: RawPrice) -> Self {
        match raw {
            RawPrice::Number(number) => Price::from_number(&number),
            RawPrice::Text(text) => Price::parse_text(&text),
            // Structured values are taken as given: numbers stay amounts, text stays verbatim.
            RawPrice::Structured { value: Some(Value::Number(number)) } => {
                Price::from_number(&number)
            }
            RawPrice::Structured { value: Some(Value::String(text)) } => Price::Unparsed(text),
            RawPrice::Structured { .. } | RawPrice::Other(_) => Price::Unavailable,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawNumber {
    Number(Number),
    Text(String),
    Other(Value),
}

impl RawNumber {
    pub fn as_rating(&self) -> f64 {
        let value = match self {
            Self::Number(number) => number.as_f64(),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
            Self::Other(_) => None,
        };
        value.filter(|rating| rating.is_finite() && *rating > 0.0).unwrap_or(0.0)
    }

    pub fn as_count(&self) -> u64 {
        match self {
            Self::Number(number) => number
                .as_u64()
                .or_else(|| number.as_f64().filter(|v| v.is_finite() && *v > 0.0).map(|v| v as u64))
                .unwrap_or(0),
            Self::Text(text) => text.trim().replace(',', "").parse::<u64>().unwrap_or(0),
            Self::Other(_) => 0,
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Array(items)) => {
            let parts = items
                .iter()
                .filter_map(|item| item.as_str())
                .filter(|part| !part.trim().is_empty())
                .collect::<Vec<_>>();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(matches!(value, Some(Value::Bool(true))))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{Price, Product, RawProduct};

    fn decode(value: serde_json::Value) -> Product {
        let raw: RawProduct = serde_json::from_value(value).expect("record should decode");
        Product::from(raw)
    }

    #[test]
    fn price_text_with_thousands_separator_becomes_amount() {
        assert_eq!(Price::parse_text("$1,299.99"), Price::Amount(Decimal::new(129_999, 2)));
        assert_eq!(Price::parse_text("Now $24"), Price::Amount(Decimal::new(24, 0)));
    }

    #[test]
    fn price_text_without_figure_is_kept_verbatim() {
        assert_eq!(Price::parse_text("See options"), Price::Unparsed("See options".to_string()));
        assert_eq!(Price::parse_text(","), Price::Unparsed(",".to_string()));
    }

    #[test]
    fn price_renders_two_decimals_or_raw_text() {
        assert_eq!(Price::Amount(Decimal::new(1999, 2)).to_string(), "$19.99");
        assert_eq!(Price::Amount(Decimal::new(5, 0)).to_string(), "$5.00");
        assert_eq!(Price::Unparsed("Free".to_string()).to_string(), "Free");
        assert_eq!(Price::Unavailable.to_string(), "N/A");
    }

    #[test]
    fn structured_and_numeric_prices_decode() {
        let structured = decode(json!({"asin": "B1", "price": {"value": 12.5, "currency": "USD"}}));
        assert_eq!(structured.price, Price::Amount(Decimal::new(125, 1)));

        let numeric = decode(json!({"asin": "B2", "price": 7}));
        assert_eq!(numeric.price, Price::Amount(Decimal::new(7, 0)));

        let structured_text = decode(json!({"asin": "B3", "price": {"value": "ask seller"}}));
        assert_eq!(structured_text.price, Price::Unparsed("ask seller".to_string()));

        let missing = decode(json!({"asin": "B4"}));
        assert_eq!(missing.price, Price::Unavailable);
    }

    #[test]
    fn malformed_fields_fall_back_instead_of_failing_the_record() {
        let product = decode(json!({
            "asin": "B00TEST",
            "title": "Trail Bottle",
            "rating": "not a number",
            "reviews": "1,204",
            "prime": "yes",
            "delivery": ["FREE delivery Tue", "Or fastest Mon"],
            "sponsored": null
        }));

        assert_eq!(product.rating, 0.0);
        assert_eq!(product.reviews, 1204);
        assert!(!product.prime);
        assert!(!product.sponsored);
        assert_eq!(product.delivery, "FREE delivery Tue, Or fastest Mon");
    }

    #[test]
    fn numeric_asin_is_kept_as_text() {
        let product = decode(json!({"asin": 12345, "rating": 4.2}));
        assert_eq!(product.asin, "12345");
        assert!(product.has_identifier());
        assert_eq!(product.product_url(), "https://www.amazon.com/dp/12345");
    }

    #[test]
    fn amount_serializes_as_number_and_other_prices_as_text() {
        let amount = serde_json::to_value(Price::Amount(Decimal::new(1999, 2))).expect("serialize");
        assert_eq!(amount, json!(19.99));
        let unavailable = serde_json::to_value(Price::Unavailable).expect("serialize");
        assert_eq!(unavailable, json!("N/A"));
        let unparsed = serde_json::to_value(Price::parse_text("See options")).expect("serialize");
        assert_eq!(unparsed, json!("See options"));
    }

    #[test]
    fn only_decoded_amounts_expose_a_figure() {
        assert_eq!(Price::parse_text("$8.25").amount(), Some(Decimal::new(825, 2)));
        assert_eq!(Price::Unparsed("Free".to_string()).amount(), None);
        assert_eq!(Price::Unavailable.amount(), None);
    }
}
