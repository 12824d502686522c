use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::models::{ChefPercent, TokenRecord};

pub fn validate_token(token: &TokenRecord) -> Result<()> {
    if token.id.trim().is_empty() {
        return Err(Error::ValidationError("Token must have a non-empty id".to_string()));
    }
    if token.token_name.trim().is_empty() {
        return Err(Error::ValidationError(format!(
            "Token {} must have a valid tokenName",
            token.id
        )));
    }
    for (name, value) in [
        ("marketCap", token.market_cap),
        ("volume", token.volume),
        ("solanaPrice", token.solana_price),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::ValidationError(format!(
                "Token {}: {} must be a non-negative number",
                token.id, name
            )));
        }
    }
    for (name, value) in [
        ("holderPercent", token.holder_percent),
        ("snipePercent", token.snipe_percent),
        ("ghostPercent", token.ghost_percent),
        ("boxesPercent", token.boxes_percent),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(Error::ValidationError(format!(
                "Token {}: {} must lie in [0, 100]",
                token.id, name
            )));
        }
    }
    if let Some(ChefPercent::Number(value)) = token.chef_percent {
        if !(0.0..=100.0).contains(&value) {
            return Err(Error::ValidationError(format!(
                "Token {}: chefPercent must lie in [0, 100]",
                token.id
            )));
        }
    }
    Ok(())
}

/// Checks every record and that ids are unique across the board.
pub fn validate_seed(tokens: &[TokenRecord]) -> Result<()> {
    let mut seen = HashSet::new();
    for token in tokens {
        validate_token(token)?;
        if !seen.insert(token.id.as_str()) {
            return Err(Error::ValidationError(format!("Duplicate token id: {}", token.id)));
        }
    }
    Ok(())
}
