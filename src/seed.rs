//! Seed boards for the feed.

use log::info;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::models::TokenRecord;
use crate::validation::validate_seed;

// id, name, symbol, image, age (s), market cap, volume, sol price,
// txns, holders, pro traders, views, [holder, snipe, ghost, boxes] %
type SeedRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    u64,
    f64,
    f64,
    f64,
    u64,
    u64,
    u64,
    u64,
    [f64; 4],
);

#[rustfmt::skip]
const BOARD: [SeedRow; 10] = [
    ("1", "Pepe Classic", "PEPEC", "/tokens/pepe.webp", 12, 8_420.0, 1_250.0, 0.000_042, 18, 9, 1, 14, [12.0, 0.0, 3.0, 22.0]),
    ("2", "Solana Cat", "SCAT", "/tokens/cat.webp", 47, 15_300.0, 4_800.0, 0.000_081, 64, 31, 3, 40, [18.0, 4.0, 0.0, 35.0]),
    ("3", "Moon Frog", "MFROG", "/tokens/frog.webp", 95, 6_100.0, 920.0, 0.000_030, 9, 5, 0, 7, [7.0, 1.0, 1.0, 10.0]),
    ("4", "Pepe Reborn", "PEPER", "/tokens/pepe.webp", 180, 22_750.0, 9_900.0, 0.000_115, 121, 58, 6, 96, [21.0, 9.0, 2.0, 41.0]),
    ("5", "Doge Wif Cap", "DWC", "/tokens/doge.webp", 420, 48_000.0, 17_300.0, 0.000_240, 233, 104, 11, 180, [15.0, 3.0, 5.0, 28.0]),
    ("6", "Bonk Jr", "BONKJR", "/tokens/bonk.webp", 2_700, 310_000.0, 82_000.0, 0.001_550, 1_240, 611, 38, 920, [9.0, 2.0, 0.0, 17.0]),
    ("7", "Solana Cat 2.0", "SCAT2", "/tokens/cat.webp", 5_400, 575_000.0, 140_500.0, 0.002_870, 2_050, 980, 52, 1_610, [11.0, 6.0, 4.0, 19.0]),
    ("8", "Giga Chad", "GIGA", "/tokens/chad.webp", 9_000, 1_420_000.0, 305_000.0, 0.007_100, 3_890, 2_210, 97, 4_400, [6.0, 1.0, 2.0, 12.0]),
    ("9", "Pepe Prime", "PEPEP", "/tokens/pepe.webp", 90_000, 3_150_000.0, 512_000.0, 0.015_700, 8_120, 5_300, 210, 9_870, [4.0, 0.0, 1.0, 8.0]),
    ("10", "Whale Coin", "WHALE", "/tokens/whale.webp", 259_200, 18_400_000.0, 2_300_000.0, 0.092_000, 21_400, 14_100, 640, 30_500, [3.0, 0.0, 0.0, 5.0]),
];

/// The built-in ten-token board. Several tokens share an image so the
/// reused-image lookup has something to find.
pub fn default_board() -> Vec<TokenRecord> {
    BOARD
        .iter()
        .map(|row| {
            let &(id, name, symbol, image, age_secs, market_cap, volume, solana_price, ..) = row;
            let &(.., transactions, holders, pro_traders, views, percents) = row;
            let [holder, snipe, ghost, boxes] = percents;
            TokenRecord {
                id: id.to_string(),
                token_address: synthetic_address(id, symbol),
                token_name: name.to_string(),
                token_symbol: symbol.to_string(),
                token_image: image.to_string(),
                age_secs,
                market_cap,
                volume,
                solana_price,
                transactions,
                holders,
                pro_traders,
                views,
                holder_percent: holder,
                snipe_percent: snipe,
                ghost_percent: ghost,
                boxes_percent: boxes,
                chef_percent: None,
            }
        })
        .collect()
}

fn synthetic_address(id: &str, symbol: &str) -> String {
    format!("{}{:0>4}pump", symbol, id)
}

/// Reads a JSON array of token records and validates it.
pub fn load(path: &Path) -> Result<Vec<TokenRecord>> {
    let raw = fs::read_to_string(path)?;
    let tokens: Vec<TokenRecord> = serde_json::from_str(&raw)?;
    validate_seed(&tokens)?;
    info!("Loaded {} seed tokens from {:?}", tokens.len(), path);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::ChefPercent;

    #[test]
    fn test_default_board_shape() {
        let board = default_board();
        assert_eq!(board.len(), 10);
        assert_eq!(board[0].token_address, "PEPEC0001pump");
        assert_eq!(board[9].time_ago(), "3d");
    }

    #[test]
    fn test_load_round_trips_default_board() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        fs::write(&path, serde_json::to_string_pretty(&default_board()).unwrap()).unwrap();
        let loaded = load(&path).unwrap();
        let expected = default_board();
        assert_eq!(loaded.len(), expected.len());
        for (got, want) in loaded.iter().zip(expected.iter()) {
            assert_eq!(got.id, want.id);
            assert_eq!(got.token_image, want.token_image);
            assert_eq!(got.age_secs, want.age_secs);
            assert_eq!(got.transactions, want.transactions);
            assert!((got.market_cap - want.market_cap).abs() < 1e-6);
        }
    }

    #[test]
    fn test_load_accepts_numeric_chef_percent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        let mut value = serde_json::to_value(&default_board()[..2]).unwrap();
        value[0]["chefPercent"] = serde_json::json!(20);
        value[1]["chefPercent"] = serde_json::json!("DS");
        fs::write(&path, value.to_string()).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded[0].chef_percent, Some(ChefPercent::Number(20.0)));
        assert_eq!(loaded[1].chef_percent, Some(ChefPercent::Label("DS".to_string())));
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        fs::write(&path, "[{\"id\": 1}]").unwrap();
        assert!(matches!(load(&path), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(load(&dir.path().join("nope.json")), Err(Error::IoError(_))));
    }
}
