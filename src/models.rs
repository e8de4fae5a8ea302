use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cycle {
    Monthly,
    Yearly,
}

/// A recurring payment as stored in the subscription document.
///
/// Decoding is lenient about `price`, `currency` and `date` so that hand-edited
/// or imported documents still load; see [`lenient_price`]. A missing or null
/// `category` stays `None` and is not the same bucket as an empty name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default = "default_currency", deserialize_with = "lenient_currency")]
    pub currency: String,
    pub cycle: Cycle,
    #[serde(deserialize_with = "lenient_date")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Subscription {
    pub fn monthly_equivalent(&self) -> f64 {
        match self.cycle {
            Cycle::Monthly => self.price,
            Cycle::Yearly => self.price / 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

/// Form payload for creating or editing a subscription. A blank `id` means "new".
#[derive(Debug, Deserialize)]
pub struct SubscriptionForm {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(deserialize_with = "strict_price")]
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    pub cycle: Cycle,
    #[serde(deserialize_with = "lenient_date")]
    pub date: NaiveDate,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub cycle: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub label: String,
    pub value: f64,
    pub color: String,
    #[serde(default)]
    pub placeholder: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub total_monthly: f64,
    pub total_yearly: f64,
    pub slices: Vec<CategorySlice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub subscription_id: String,
    pub title: String,
    pub body: String,
    pub due_on: NaiveDate,
    pub days_left: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub reload_required: bool,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Numbers pass through, numeric strings are parsed, everything else is 0.
pub fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let price = match value {
        Value::Number(number) => number.as_f64().unwrap_or(0.0),
        Value::String(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(if price.is_finite() { price } else { 0.0 })
}

fn lenient_currency<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let currency = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    let currency = currency.trim();
    Ok(if currency.is_empty() {
        default_currency()
    } else {
        currency.to_string()
    })
}

/// Form input: a number or a numeric string, anything else is an error.
fn strict_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("price is out of range")),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| serde::de::Error::custom(format!("price '{text}' is not a number"))),
        other => Err(serde::de::Error::custom(format!("price must be a number, got {other}"))),
    }
}

/// Accepts `YYYY-MM-DD` or any ISO timestamp and keeps its date part.
fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let day = text.split('T').next().unwrap_or_default().trim();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(serde::de::Error::custom)
}
