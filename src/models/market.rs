use serde::{Deserialize, Serialize};
use std::fmt;

/// The eleven numeric fields tracked for change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricField {
    MarketCap,
    Volume,
    SolanaPrice,
    Transactions,
    Holders,
    ProTraders,
    Views,
    HolderPercent,
    SnipePercent,
    GhostPercent,
    BoxesPercent,
}

impl MetricField {
    pub const ALL: [MetricField; 11] = [
        MetricField::MarketCap,
        MetricField::Volume,
        MetricField::SolanaPrice,
        MetricField::Transactions,
        MetricField::Holders,
        MetricField::ProTraders,
        MetricField::Views,
        MetricField::HolderPercent,
        MetricField::SnipePercent,
        MetricField::GhostPercent,
        MetricField::BoxesPercent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetricField::MarketCap => "marketCap",
            MetricField::Volume => "volume",
            MetricField::SolanaPrice => "solanaPrice",
            MetricField::Transactions => "transactions",
            MetricField::Holders => "holders",
            MetricField::ProTraders => "proTraders",
            MetricField::Views => "views",
            MetricField::HolderPercent => "holderPercent",
            MetricField::SnipePercent => "snipePercent",
            MetricField::GhostPercent => "ghostPercent",
            MetricField::BoxesPercent => "boxesPercent",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A partial set of metric values. Used both as the classifier input
/// (fields a display currently knows about) and as the per-token snapshot
/// of last-seen values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricValues {
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub solana_price: Option<f64>,
    pub transactions: Option<f64>,
    pub holders: Option<f64>,
    pub pro_traders: Option<f64>,
    pub views: Option<f64>,
    pub holder_percent: Option<f64>,
    pub snipe_percent: Option<f64>,
    pub ghost_percent: Option<f64>,
    pub boxes_percent: Option<f64>,
}

impl MetricValues {
    pub fn get(&self, field: MetricField) -> Option<f64> {
        match field {
            MetricField::MarketCap => self.market_cap,
            MetricField::Volume => self.volume,
            MetricField::SolanaPrice => self.solana_price,
            MetricField::Transactions => self.transactions,
            MetricField::Holders => self.holders,
            MetricField::ProTraders => self.pro_traders,
            MetricField::Views => self.views,
            MetricField::HolderPercent => self.holder_percent,
            MetricField::SnipePercent => self.snipe_percent,
            MetricField::GhostPercent => self.ghost_percent,
            MetricField::BoxesPercent => self.boxes_percent,
        }
    }

    pub fn set(&mut self, field: MetricField, value: Option<f64>) {
        let slot = match field {
            MetricField::MarketCap => &mut self.market_cap,
            MetricField::Volume => &mut self.volume,
            MetricField::SolanaPrice => &mut self.solana_price,
            MetricField::Transactions => &mut self.transactions,
            MetricField::Holders => &mut self.holders,
            MetricField::ProTraders => &mut self.pro_traders,
            MetricField::Views => &mut self.views,
            MetricField::HolderPercent => &mut self.holder_percent,
            MetricField::SnipePercent => &mut self.snipe_percent,
            MetricField::GhostPercent => &mut self.ghost_percent,
            MetricField::BoxesPercent => &mut self.boxes_percent,
        };
        *slot = value;
    }

    pub fn with(mut self, field: MetricField, value: f64) -> Self {
        self.set(field, Some(value));
        self
    }

    /// Returns `self` with every field defined in `newer` overwritten.
    pub fn merged_with(&self, newer: &MetricValues) -> MetricValues {
        let mut merged = *self;
        for field in MetricField::ALL {
            if let Some(value) = newer.get(field) {
                merged.set(field, Some(value));
            }
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        MetricField::ALL.iter().all(|f| self.get(*f).is_none())
    }
}
