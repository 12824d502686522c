//! Per-token change signalling.
//!
//! A [`ChangeClassifier`] compares each new set of metric values against the
//! last one it saw and publishes an increase/decrease signal per field. The
//! whole signal map is cleared together once `clear_after` has passed since
//! the most recent change event; a newer change event re-arms the clear
//! timer from scratch.

use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use crate::metrics::{CHANGE_SIGNALS, COLOR_CLEARS};
use crate::models::{MetricField, MetricValues};
use crate::scheduler::{lock, CancelToken, Scheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeState {
    Increase,
    Decrease,
}

/// How a display should emphasise a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl ChangeState {
    pub fn tone(self) -> Tone {
        match self {
            ChangeState::Increase => Tone::Positive,
            ChangeState::Decrease => Tone::Negative,
        }
    }
}

/// The tone for `state`, or `default` when the field has no signal.
pub fn tone_or(state: Option<ChangeState>, default: Tone) -> Tone {
    state.map(ChangeState::tone).unwrap_or(default)
}

/// Signals keyed by field. Fields without a signal are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorStates {
    states: BTreeMap<MetricField, ChangeState>,
}

impl ColorStates {
    pub fn get(&self, field: MetricField) -> Option<ChangeState> {
        self.states.get(&field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricField, ChangeState)> + '_ {
        self.states.iter().map(|(field, state)| (*field, *state))
    }
}

impl FromIterator<(MetricField, ChangeState)> for ColorStates {
    fn from_iter<I: IntoIterator<Item = (MetricField, ChangeState)>>(iter: I) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}

fn classify(current: Option<f64>, previous: Option<f64>) -> Option<ChangeState> {
    match current?.partial_cmp(&previous?)? {
        CmpOrdering::Greater => Some(ChangeState::Increase),
        CmpOrdering::Less => Some(ChangeState::Decrease),
        CmpOrdering::Equal => None,
    }
}

/// Compares every tracked field. A field is signalled only when both sides
/// are defined and differ.
pub fn diff(current: &MetricValues, previous: &MetricValues) -> ColorStates {
    MetricField::ALL
        .iter()
        .filter_map(|&field| {
            classify(current.get(field), previous.get(field)).map(|state| (field, state))
        })
        .collect()
}

#[derive(Default)]
struct ColorSlot {
    states: ColorStates,
    generation: u64,
    pending_clear: Option<CancelToken>,
}

struct ClassifierShared {
    scheduler: Arc<dyn Scheduler>,
    clear_after: Duration,
    previous: Mutex<MetricValues>,
    colors: Mutex<ColorSlot>,
}

pub struct ChangeClassifier {
    shared: Arc<ClassifierShared>,
}

impl ChangeClassifier {
    /// Starts tracking from `initial`, which becomes the first snapshot.
    pub fn new(
        initial: MetricValues,
        scheduler: Arc<dyn Scheduler>,
        clear_after: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(ClassifierShared {
                scheduler,
                clear_after,
                previous: Mutex::new(initial),
                colors: Mutex::new(ColorSlot::default()),
            }),
        }
    }

    /// Diffs `current` against `previous`. When anything changed, the new
    /// map replaces the published one and the clear timer is re-armed.
    /// Returns the map and the next snapshot.
    pub fn classify_and_schedule(
        &self,
        current: &MetricValues,
        previous: &MetricValues,
    ) -> (ColorStates, MetricValues) {
        let states = diff(current, previous);
        if !states.is_empty() {
            CHANGE_SIGNALS.inc_by(states.len() as u64);
            self.publish(states.clone(), true);
        }
        (states, previous.merged_with(current))
    }

    /// Runs [`Self::classify_and_schedule`] against the stored snapshot and
    /// stores the next one.
    pub fn observe(&self, current: &MetricValues) -> ColorStates {
        let mut previous = lock(&self.shared.previous);
        let (states, next) = self.classify_and_schedule(current, &previous);
        *previous = next;
        states
    }

    /// Diffs and publishes like [`Self::observe`] without arming the clear
    /// timer. Any pending clear still fires.
    pub fn update_values(&self, current: &MetricValues) -> ColorStates {
        let mut previous = lock(&self.shared.previous);
        let states = diff(current, &previous);
        *previous = previous.merged_with(current);
        self.publish(states.clone(), false);
        states
    }

    /// The currently published signals.
    pub fn color_states(&self) -> ColorStates {
        lock(&self.shared.colors).states.clone()
    }

    pub fn previous_values(&self) -> MetricValues {
        *lock(&self.shared.previous)
    }

    /// Clears all signals now and drops any pending clear timer.
    pub fn clear(&self) {
        let mut slot = lock(&self.shared.colors);
        slot.states = ColorStates::default();
        slot.generation += 1;
        if let Some(token) = slot.pending_clear.take() {
            token.cancel();
        }
    }

    fn publish(&self, states: ColorStates, arm_clear: bool) {
        let mut slot = lock(&self.shared.colors);
        slot.states = states;
        if !arm_clear {
            return;
        }
        slot.generation += 1;
        if let Some(previous) = slot.pending_clear.take() {
            previous.cancel();
        }

        let generation = slot.generation;
        let weak: Weak<ClassifierShared> = Arc::downgrade(&self.shared);
        let token = self.shared.scheduler.after(
            self.shared.clear_after,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.expire(generation);
                }
            }),
        );
        slot.pending_clear = Some(token);
    }
}

impl ClassifierShared {
    // A clear armed for an older change event is a no-op, even if it was
    // already running when it got superseded.
    fn expire(&self, generation: u64) {
        let mut slot = lock(&self.colors);
        if slot.generation != generation {
            return;
        }
        slot.states = ColorStates::default();
        slot.pending_clear = None;
        COLOR_CLEARS.inc();
        debug!("Color states cleared after {:?}", self.clear_after);
    }
}

impl Drop for ChangeClassifier {
    fn drop(&mut self) {
        if let Some(token) = lock(&self.shared.colors).pending_clear.take() {
            token.cancel();
        }
    }
}
