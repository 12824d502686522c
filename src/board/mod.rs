//! Board-level views over the token collection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::TokenRecord;

pub mod dashboard;

pub use dashboard::{Dashboard, RowUpdate};

const NEW_PAIRS_LEN: usize = 5;
const FINAL_STRETCH_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Column {
    NewPairs,
    FinalStretch,
    Migrated,
}

impl Column {
    /// Column of the token at `index` in board order.
    pub fn for_index(index: usize) -> Self {
        if index < NEW_PAIRS_LEN {
            Column::NewPairs
        } else if index < NEW_PAIRS_LEN + FINAL_STRETCH_LEN {
            Column::FinalStretch
        } else {
            Column::Migrated
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Column::NewPairs => "New Pairs",
            Column::FinalStretch => "Final Stretch",
            Column::Migrated => "Migrated",
        }
    }
}

/// The three Pulse columns, in board order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Columns {
    pub new_pairs: Vec<TokenRecord>,
    pub final_stretch: Vec<TokenRecord>,
    pub migrated: Vec<TokenRecord>,
}

/// First five tokens are new pairs, the next three are in the final
/// stretch, everything after has migrated.
pub fn split_columns(tokens: &[TokenRecord]) -> Columns {
    let first_cut = tokens.len().min(NEW_PAIRS_LEN);
    let second_cut = tokens.len().min(NEW_PAIRS_LEN + FINAL_STRETCH_LEN);
    Columns {
        new_pairs: tokens[..first_cut].to_vec(),
        final_stretch: tokens[first_cut..second_cut].to_vec(),
        migrated: tokens[second_cut..].to_vec(),
    }
}

/// Summary of another token that shares an image with the one displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReusedImageToken {
    pub id: String,
    pub token_name: String,
    pub token_symbol: String,
    pub time_ago: String,
    pub transactions: u64,
    pub market_cap: f64,
}

impl From<&TokenRecord> for ReusedImageToken {
    fn from(token: &TokenRecord) -> Self {
        Self {
            id: token.id.clone(),
            token_name: token.token_name.clone(),
            token_symbol: token.token_symbol.clone(),
            time_ago: token.time_ago(),
            transactions: token.transactions,
            market_cap: token.market_cap,
        }
    }
}

/// Tokens grouped by image reference, in board order within each group.
#[derive(Debug, Default)]
pub struct ImageIndex {
    by_image: HashMap<String, Vec<TokenRecord>>,
}

impl ImageIndex {
    pub fn build(tokens: &[TokenRecord]) -> Self {
        let mut by_image: HashMap<String, Vec<TokenRecord>> = HashMap::new();
        for token in tokens {
            by_image
                .entry(token.token_image.clone())
                .or_default()
                .push(token.clone());
        }
        Self { by_image }
    }

    pub fn group(&self, image: &str) -> &[TokenRecord] {
        self.by_image.get(image).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Up to `limit` other tokens using the same image as `token`, or
    /// `None` if it is the only one.
    pub fn other_tokens(&self, token: &TokenRecord, limit: usize) -> Option<Vec<ReusedImageToken>> {
        let others: Vec<ReusedImageToken> = self
            .group(&token.token_image)
            .iter()
            .filter(|other| other.id != token.id)
            .take(limit)
            .map(ReusedImageToken::from)
            .collect();
        if others.is_empty() {
            None
        } else {
            Some(others)
        }
    }
}
