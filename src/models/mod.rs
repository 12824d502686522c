use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::format;

pub mod market;

pub use market::{MetricField, MetricValues};

/// One row of the board: identity plus the live metrics the feed perturbs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub id: String,
    pub token_address: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_image: String,
    /// Seconds since listing. Seed files may give either a number or a
    /// unit string such as `"45s"`.
    #[serde(rename = "timeAgo", deserialize_with = "deserialize_age")]
    pub age_secs: u64,
    pub market_cap: f64,
    pub volume: f64,
    pub solana_price: f64,
    pub transactions: u64,
    pub holders: u64,
    pub pro_traders: u64,
    pub views: u64,
    pub holder_percent: f64,
    pub snipe_percent: f64,
    pub ghost_percent: f64,
    pub boxes_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chef_percent: Option<ChefPercent>,
}

/// Dev-held share badge. Seed files carry either a number, shown as a
/// percentage, or a ready-made label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChefPercent {
    Number(f64),
    Label(String),
}

impl fmt::Display for ChefPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChefPercent::Number(value) => write!(f, "{}%", value),
            ChefPercent::Label(label) => f.write_str(label),
        }
    }
}

impl TokenRecord {
    pub fn time_ago(&self) -> String {
        format::format_age(self.age_secs)
    }

    /// All eleven tracked values, for feeding a change classifier.
    pub fn metrics(&self) -> MetricValues {
        MetricValues {
            market_cap: Some(self.market_cap),
            volume: Some(self.volume),
            solana_price: Some(self.solana_price),
            transactions: Some(self.transactions as f64),
            holders: Some(self.holders as f64),
            pro_traders: Some(self.pro_traders as f64),
            views: Some(self.views as f64),
            holder_percent: Some(self.holder_percent),
            snipe_percent: Some(self.snipe_percent),
            ghost_percent: Some(self.ghost_percent),
            boxes_percent: Some(self.boxes_percent),
        }
    }
}

fn deserialize_age<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AgeInput {
        Seconds(u64),
        Text(String),
    }

    Ok(match AgeInput::deserialize(deserializer)? {
        AgeInput::Seconds(secs) => secs,
        AgeInput::Text(text) => format::parse_age(&text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED_JSON: &str = r#"{
        "id": "1",
        "tokenAddress": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
        "tokenName": "Pepe Classic",
        "tokenSymbol": "PEPEC",
        "tokenImage": "/images/pepe.webp",
        "timeAgo": "3m",
        "marketCap": 1250000.0,
        "volume": 48000.0,
        "solanaPrice": 0.0042,
        "transactions": 512,
        "holders": 230,
        "proTraders": 14,
        "views": 88,
        "holderPercent": 12.0,
        "snipePercent": 3.0,
        "ghostPercent": 0.0,
        "boxesPercent": 41.0
    }"#;

    #[test]
    fn test_seed_age_accepts_unit_string() {
        let token: TokenRecord = serde_json::from_str(SEED_JSON).unwrap();
        assert_eq!(token.age_secs, 180);
        assert_eq!(token.time_ago(), "3m");
        assert_eq!(token.chef_percent, None);
    }

    #[test]
    fn test_seed_age_accepts_seconds() {
        let json = SEED_JSON.replace("\"3m\"", "42");
        let token: TokenRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(token.age_secs, 42);
        assert_eq!(token.time_ago(), "42s");
    }

    fn with_chef(value: &str) -> String {
        SEED_JSON.replace(
            "\"boxesPercent\": 41.0",
            &format!("\"boxesPercent\": 41.0, \"chefPercent\": {}", value),
        )
    }

    #[test]
    fn test_chef_percent_accepts_number_or_label() {
        let token: TokenRecord = serde_json::from_str(&with_chef("20")).unwrap();
        assert_eq!(token.chef_percent, Some(ChefPercent::Number(20.0)));
        assert_eq!(token.chef_percent.unwrap().to_string(), "20%");

        let token: TokenRecord = serde_json::from_str(&with_chef("\"DS\"")).unwrap();
        assert_eq!(token.chef_percent, Some(ChefPercent::Label("DS".to_string())));
        assert_eq!(token.chef_percent.unwrap().to_string(), "DS");
    }

    #[test]
    fn test_chef_percent_survives_serialization() {
        let mut token: TokenRecord = serde_json::from_str(SEED_JSON).unwrap();
        token.chef_percent = Some(ChefPercent::Number(12.5));
        let json = serde_json::to_string(&token).unwrap();
        assert!(json.contains("\"chefPercent\":12.5"));
        let back: TokenRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chef_percent, Some(ChefPercent::Number(12.5)));
    }

    #[test]
    fn test_metrics_exposes_every_tracked_field() {
        let token: TokenRecord = serde_json::from_str(SEED_JSON).unwrap();
        let metrics = token.metrics();
        for field in MetricField::ALL {
            assert!(metrics.get(field).is_some(), "{} missing", field);
        }
        assert_eq!(metrics.transactions, Some(512.0));
    }
}
