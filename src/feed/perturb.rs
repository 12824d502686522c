//! Pure next-state functions applied by the feed timers.

use rand::Rng;
use std::time::Duration;

use crate::models::TokenRecord;

const MARKET_CAP_FACTOR: (f64, f64) = (0.95, 1.05);
const VOLUME_FACTOR: (f64, f64) = (0.90, 1.10);
const SOLANA_PRICE_FACTOR: (f64, f64) = (0.98, 1.02);

// Half-open integer offset ranges.
const TRANSACTIONS_OFFSET: (i64, i64) = (-5, 5);
const HOLDERS_OFFSET: (i64, i64) = (-2, 3);
const PRO_TRADERS_OFFSET: (i64, i64) = (-1, 2);
const VIEWS_OFFSET: (i64, i64) = (-5, 5);

const PERCENT_DRIFT: f64 = 1.0;

/// Draws the delay before the next metric tick, uniform in `[min_ms, max_ms)`.
pub fn next_metric_delay<R: Rng + ?Sized>(rng: &mut R, min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rng.gen_range(min_ms..max_ms))
}

/// One metric tick for one token. The listing age is left alone.
pub fn perturb_metrics<R: Rng + ?Sized>(token: &TokenRecord, rng: &mut R) -> TokenRecord {
    TokenRecord {
        market_cap: scale(token.market_cap, MARKET_CAP_FACTOR, rng),
        volume: scale(token.volume, VOLUME_FACTOR, rng),
        solana_price: scale(token.solana_price, SOLANA_PRICE_FACTOR, rng),
        transactions: offset_count(token.transactions, TRANSACTIONS_OFFSET, rng),
        holders: offset_count(token.holders, HOLDERS_OFFSET, rng),
        pro_traders: offset_count(token.pro_traders, PRO_TRADERS_OFFSET, rng),
        views: offset_count(token.views, VIEWS_OFFSET, rng),
        holder_percent: drift_percent(token.holder_percent, rng),
        snipe_percent: drift_percent(token.snipe_percent, rng),
        ghost_percent: drift_percent(token.ghost_percent, rng),
        boxes_percent: drift_percent(token.boxes_percent, rng),
        ..token.clone()
    }
}

/// One age tick for one token.
pub fn advance_age(token: &TokenRecord) -> TokenRecord {
    TokenRecord {
        age_secs: token.age_secs.saturating_add(1),
        ..token.clone()
    }
}

fn scale<R: Rng + ?Sized>(value: f64, (low, high): (f64, f64), rng: &mut R) -> f64 {
    value * rng.gen_range(low..high)
}

fn offset_count<R: Rng + ?Sized>(value: u64, (low, high): (i64, i64), rng: &mut R) -> u64 {
    let delta = rng.gen_range(low..high);
    if delta < 0 {
        value.saturating_sub(delta.unsigned_abs())
    } else {
        value.saturating_add(delta as u64)
    }
}

fn drift_percent<R: Rng + ?Sized>(value: f64, rng: &mut R) -> f64 {
    let drifted = value + rng.gen_range(-PERCENT_DRIFT..=PERCENT_DRIFT);
    drifted.clamp(0.0, 100.0).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_counts_never_negative_and_percents_bounded() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut token = seed::default_board().remove(0);
        token.transactions = 0;
        token.holders = 0;
        token.pro_traders = 0;
        token.views = 1;
        token.holder_percent = 0.0;
        token.boxes_percent = 100.0;

        for _ in 0..2_000 {
            token = perturb_metrics(&token, &mut rng);
            for percent in [
                token.holder_percent,
                token.snipe_percent,
                token.ghost_percent,
                token.boxes_percent,
            ] {
                assert!((0.0..=100.0).contains(&percent));
                assert_eq!(percent, percent.round());
            }
        }
    }

    const EPS: f64 = 1e-9;

    #[test]
    fn test_scale_factors_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let token = seed::default_board().remove(0);
        for _ in 0..500 {
            let next = perturb_metrics(&token, &mut rng);
            let cap = next.market_cap / token.market_cap;
            let vol = next.volume / token.volume;
            let sol = next.solana_price / token.solana_price;
            assert!((0.95 - EPS..=1.05 + EPS).contains(&cap));
            assert!((0.90 - EPS..=1.10 + EPS).contains(&vol));
            assert!((0.98 - EPS..=1.02 + EPS).contains(&sol));
            assert!(next.transactions + 5 >= token.transactions);
            assert!(next.transactions <= token.transactions + 4);
            assert!(next.holders + 2 >= token.holders);
            assert!(next.holders <= token.holders + 2);
            assert!(next.pro_traders + 1 >= token.pro_traders);
            assert!(next.pro_traders <= token.pro_traders + 1);
        }
    }

    #[test]
    fn test_metric_tick_leaves_identity_and_age_alone() {
        let mut rng = StdRng::seed_from_u64(5);
        let token = seed::default_board().remove(2);
        let next = perturb_metrics(&token, &mut rng);
        assert_eq!(next.id, token.id);
        assert_eq!(next.token_name, token.token_name);
        assert_eq!(next.age_secs, token.age_secs);
    }

    #[test]
    fn test_advance_age_adds_one_second() {
        let mut token = seed::default_board().remove(0);
        token.age_secs = 59;
        let next = advance_age(&token);
        assert_eq!(next.age_secs, 60);
        assert_eq!(next.time_ago(), "1m");
        assert_eq!(next.market_cap, token.market_cap);
    }

    #[test]
    fn test_metric_delay_bounds() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1_000 {
            let delay = next_metric_delay(&mut rng, 1000, 3000);
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay < Duration::from_millis(3000));
        }
        assert_eq!(next_metric_delay(&mut rng, 500, 500), Duration::from_millis(500));
    }
}
