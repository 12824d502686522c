use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::board::Column;
use crate::classifier::{tone_or, ChangeClassifier, ColorStates, Tone};
use crate::format;
use crate::models::{MetricField, TokenRecord};
use crate::scheduler::Scheduler;

/// What a display needs to redraw one token row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowUpdate {
    pub id: String,
    pub symbol: String,
    pub column: Column,
    pub time_ago: String,
    pub market_cap: String,
    pub volume: String,
    pub transactions: u64,
    /// Signals produced by this update. Empty when nothing moved.
    pub changes: ColorStates,
}

impl RowUpdate {
    /// One console line, with `+`/`-` marking fields that just moved.
    pub fn render(&self) -> String {
        let mark = |field: MetricField| match tone_or(self.changes.get(field), Tone::Neutral) {
            Tone::Positive => "+",
            Tone::Negative => "-",
            Tone::Neutral => " ",
        };
        format!(
            "[{:<13}] {:<7} {:>4}  MC {}{:<9} V {}{:<9} TX {}{}",
            self.column.title(),
            self.symbol,
            self.time_ago,
            mark(MetricField::MarketCap),
            self.market_cap,
            mark(MetricField::Volume),
            self.volume,
            mark(MetricField::Transactions),
            self.transactions,
        )
    }
}

/// Keeps one change classifier per token and turns feed snapshots into
/// row updates.
pub struct Dashboard {
    scheduler: Arc<dyn Scheduler>,
    clear_after: Duration,
    classifiers: HashMap<String, ChangeClassifier>,
}

impl Dashboard {
    pub fn new(scheduler: Arc<dyn Scheduler>, clear_after: Duration) -> Self {
        Self {
            scheduler,
            clear_after,
            classifiers: HashMap::new(),
        }
    }

    /// Feeds every token through its classifier. A token seen for the first
    /// time starts its snapshot from the current values and reports no
    /// change.
    pub fn apply(&mut self, tokens: &[TokenRecord]) -> Vec<RowUpdate> {
        tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                let metrics = token.metrics();
                let changes = match self.classifiers.get(&token.id) {
                    Some(classifier) => classifier.observe(&metrics),
                    None => {
                        debug!("Tracking token {} ({})", token.id, token.token_symbol);
                        let scheduler = self.scheduler.clone();
                        let clear_after = self.clear_after;
                        let classifier = ChangeClassifier::new(metrics, scheduler, clear_after);
                        self.classifiers.insert(token.id.clone(), classifier);
                        ColorStates::default()
                    }
                };
                RowUpdate {
                    id: token.id.clone(),
                    symbol: token.token_symbol.clone(),
                    column: Column::for_index(index),
                    time_ago: token.time_ago(),
                    market_cap: format::format_currency(token.market_cap),
                    volume: format::format_currency(token.volume),
                    transactions: token.transactions,
                    changes,
                }
            })
            .collect()
    }

    /// Signals currently lit for `id`, including ones from earlier updates
    /// that have not been cleared yet.
    pub fn color_states(&self, id: &str) -> ColorStates {
        self.classifiers
            .get(id)
            .map(ChangeClassifier::color_states)
            .unwrap_or_default()
    }

    pub fn tracked(&self) -> usize {
        self.classifiers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ChangeState;
    use crate::scheduler::ManualScheduler;
    use crate::seed;

    #[test]
    fn test_first_sight_reports_no_change() {
        let scheduler = Arc::new(ManualScheduler::new());
        let mut dashboard = Dashboard::new(scheduler, Duration::from_millis(2500));
        let rows = dashboard.apply(&seed::default_board());

        assert_eq!(rows.len(), 10);
        assert_eq!(dashboard.tracked(), 10);
        assert!(rows.iter().all(|row| row.changes.is_empty()));
        assert_eq!(rows[0].market_cap, "$8.42K");
        assert_eq!(rows[9].market_cap, "$18.4M");
        assert_eq!(rows[9].column, Column::Migrated);
    }

    #[test]
    fn test_changes_light_up_then_clear() {
        let scheduler = Arc::new(ManualScheduler::new());
        let mut dashboard = Dashboard::new(scheduler.clone(), Duration::from_millis(2500));
        let mut board = seed::default_board();
        dashboard.apply(&board);

        board[1].market_cap += 100.0;
        board[1].views = 0;
        let rows = dashboard.apply(&board);
        assert_eq!(rows[1].changes.get(MetricField::MarketCap), Some(ChangeState::Increase));
        assert_eq!(rows[1].changes.get(MetricField::Views), Some(ChangeState::Decrease));
        assert!(rows[0].changes.is_empty());
        assert!(rows[1].render().contains("MC +$15.40K"));

        scheduler.advance(Duration::from_millis(2500));
        assert!(dashboard.color_states("2").is_empty());
        assert!(dashboard.color_states("unknown").is_empty());
    }
}
