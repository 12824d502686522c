use pulse_feed::config::FeedConfig;
use pulse_feed::feed::{self, FeedHandle};
use pulse_feed::models::TokenRecord;
use pulse_feed::scheduler::ManualScheduler;
use pulse_feed::seed;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

// Helper to start the default board on a virtual clock
pub fn start_manual_feed(rng_seed: u64) -> (Arc<ManualScheduler>, FeedHandle) {
    let scheduler = Arc::new(ManualScheduler::new());
    let handle = feed::initialize(
        seed::default_board(),
        scheduler.clone(),
        StdRng::seed_from_u64(rng_seed),
        &FeedConfig::default(),
    );
    (scheduler, handle)
}

pub fn assert_board_invariants(tokens: &[TokenRecord]) {
    for token in tokens {
        for percent in [
            token.holder_percent,
            token.snipe_percent,
            token.ghost_percent,
            token.boxes_percent,
        ] {
            assert!((0.0..=100.0).contains(&percent), "{}: {}", token.id, percent);
            assert_eq!(percent.fract(), 0.0, "{}: {}", token.id, percent);
        }
        assert!(token.market_cap >= 0.0);
        assert!(token.volume >= 0.0);
        assert!(token.solana_price >= 0.0);
    }
}
