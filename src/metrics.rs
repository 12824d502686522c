use lazy_static::lazy_static;
use prometheus::{IntCounter, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    pub static ref METRIC_TICKS: IntCounter = IntCounter::new(
        "feed_metric_ticks_total",
        "Total number of randomized metric perturbation ticks"
    ).expect("valid metric definition");

    pub static ref AGE_TICKS: IntCounter = IntCounter::new(
        "feed_age_ticks_total",
        "Total number of listing-age ticks"
    ).expect("valid metric definition");

    pub static ref CHANGE_SIGNALS: IntCounter = IntCounter::new(
        "classifier_change_signals_total",
        "Total number of increase/decrease signals emitted"
    ).expect("valid metric definition");

    pub static ref COLOR_CLEARS: IntCounter = IntCounter::new(
        "classifier_color_clears_total",
        "Total number of color state maps cleared by timer"
    ).expect("valid metric definition");
}

pub fn init() -> Result<(), prometheus::Error> {
    REGISTRY.register(Box::new(METRIC_TICKS.clone()))?;
    REGISTRY.register(Box::new(AGE_TICKS.clone()))?;
    REGISTRY.register(Box::new(CHANGE_SIGNALS.clone()))?;
    REGISTRY.register(Box::new(COLOR_CLEARS.clone()))?;
    Ok(())
}

/// Renders the registry in the prometheus text format.
pub fn render() -> String {
    use prometheus::Encoder;

    let mut buffer = Vec::new();
    let encoder = prometheus::TextEncoder::new();
    if encoder.encode(&REGISTRY.gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
