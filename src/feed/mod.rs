//! Synthetic market feed: an owned token collection advanced by two timers.
//!
//! The metric timer re-arms itself with a freshly drawn delay after every
//! fire; the age timer runs at a fixed period. Both replace the whole
//! collection with a value computed from the latest one, and readers see
//! it through a `watch` channel.

use log::{debug, info};
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;

use crate::config::FeedConfig;
use crate::metrics::{AGE_TICKS, METRIC_TICKS};
use crate::models::TokenRecord;
use crate::scheduler::{lock, CancelToken, Scheduler};

pub mod perturb;

pub type TokenSnapshot = Arc<Vec<TokenRecord>>;

struct FeedShared {
    tokens: watch::Sender<TokenSnapshot>,
    rng: Mutex<StdRng>,
    scheduler: Arc<dyn Scheduler>,
    price_tick_min_ms: u64,
    price_tick_max_ms: u64,
    metric_timer: Mutex<Option<CancelToken>>,
    age_timer: Mutex<Option<CancelToken>>,
    torn_down: AtomicBool,
}

/// Owner of a running feed. Dropping the handle tears the feed down.
pub struct FeedHandle {
    shared: Arc<FeedShared>,
}

/// Stores `seed` as the current collection and starts both timers.
pub fn initialize(
    seed: Vec<TokenRecord>,
    scheduler: Arc<dyn Scheduler>,
    rng: StdRng,
    config: &FeedConfig,
) -> FeedHandle {
    let (tokens, _) = watch::channel(Arc::new(seed));
    let shared = Arc::new(FeedShared {
        tokens,
        rng: Mutex::new(rng),
        scheduler,
        price_tick_min_ms: config.price_tick_min_ms,
        price_tick_max_ms: config.price_tick_max_ms,
        metric_timer: Mutex::new(None),
        age_timer: Mutex::new(None),
        torn_down: AtomicBool::new(false),
    });

    arm_metric_tick(&shared);
    start_age_tick(&shared, config);

    info!(
        "Feed started with {} tokens (metric tick {}..{}ms, age tick {}ms)",
        shared.tokens.borrow().len(),
        config.price_tick_min_ms,
        config.price_tick_max_ms,
        config.age_tick_ms
    );
    FeedHandle { shared }
}

fn arm_metric_tick(shared: &Arc<FeedShared>) {
    if shared.torn_down.load(Ordering::SeqCst) {
        return;
    }
    let delay = {
        let mut rng = lock(&shared.rng);
        perturb::next_metric_delay(&mut *rng, shared.price_tick_min_ms, shared.price_tick_max_ms)
    };
    let weak: Weak<FeedShared> = Arc::downgrade(shared);
    let token = shared.scheduler.after(
        delay,
        Box::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.run_metric_tick();
                arm_metric_tick(&shared);
            }
        }),
    );
    store_timer(shared, &shared.metric_timer, token);
    debug!("Next metric tick in {:?}", delay);
}

fn start_age_tick(shared: &Arc<FeedShared>, config: &FeedConfig) {
    let weak: Weak<FeedShared> = Arc::downgrade(shared);
    let token = shared.scheduler.every(
        config.age_tick(),
        Arc::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.run_age_tick();
            }
        }),
    );
    store_timer(shared, &shared.age_timer, token);
}

// The torn_down check happens under the slot lock so a timer armed while
// teardown is in progress is cancelled rather than leaked.
fn store_timer(shared: &FeedShared, slot: &Mutex<Option<CancelToken>>, token: CancelToken) {
    let mut slot = lock(slot);
    if shared.torn_down.load(Ordering::SeqCst) {
        token.cancel();
    } else {
        *slot = Some(token);
    }
}

impl FeedShared {
    fn run_metric_tick(&self) {
        if self.torn_down.load(Ordering::SeqCst) {
            return;
        }
        let mut rng = lock(&self.rng);
        self.tokens.send_modify(|tokens| {
            let next: Vec<TokenRecord> = tokens
                .iter()
                .map(|token| perturb::perturb_metrics(token, &mut *rng))
                .collect();
            *tokens = Arc::new(next);
        });
        METRIC_TICKS.inc();
        debug!("Metric tick applied to {} tokens", self.tokens.borrow().len());
    }

    fn run_age_tick(&self) {
        if self.torn_down.load(Ordering::SeqCst) {
            return;
        }
        self.tokens.send_modify(|tokens| {
            let next: Vec<TokenRecord> = tokens.iter().map(perturb::advance_age).collect();
            *tokens = Arc::new(next);
        });
        AGE_TICKS.inc();
    }

    fn teardown(&self) -> bool {
        if self.torn_down.swap(true, Ordering::SeqCst) {
            return false;
        }
        for slot in [&self.metric_timer, &self.age_timer] {
            if let Some(token) = lock(slot).take() {
                token.cancel();
            }
        }
        true
    }
}

impl FeedHandle {
    /// The current collection.
    pub fn tokens(&self) -> TokenSnapshot {
        self.shared.tokens.borrow().clone()
    }

    /// A receiver notified after every tick.
    pub fn subscribe(&self) -> watch::Receiver<TokenSnapshot> {
        self.shared.tokens.subscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.shared.torn_down.load(Ordering::SeqCst)
    }

    /// Cancels both timers. Safe to call any number of times.
    pub fn teardown(&self) {
        if self.shared.teardown() {
            info!("Feed torn down");
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}
