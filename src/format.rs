//! Display helpers shared by every view of the board.

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// Compact dollar amount: `$2.50M`, `$15.0M`, `$1.50K`, `$999`.
pub fn format_currency(value: f64) -> String {
    if value >= 1_000_000.0 {
        let millions = value / 1_000_000.0;
        if millions >= 10.0 {
            return format!("${}M", fixed(millions, 1));
        }
        format!("${}M", fixed(millions, 2))
    } else if value >= 1_000.0 {
        format!("${}K", fixed(value / 1_000.0, 2))
    } else {
        format!("${}", fixed(value, 0))
    }
}

/// Like [`format_currency`] without the dollar sign and always two decimals.
pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{}M", fixed(value / 1_000_000.0, 2))
    } else if value >= 1_000.0 {
        format!("{}K", fixed(value / 1_000.0, 2))
    } else {
        fixed(value, 0)
    }
}

// `{:.N}` settles exact ties on the even digit; board figures round ties up.
fn fixed(value: f64, decimals: usize) -> String {
    let factor = 10f64.powi(decimals as i32);
    format!("{:.*}", decimals, (value * factor).round() / factor)
}

/// Formats an elapsed-seconds counter into its largest whole unit.
pub fn format_age(seconds: u64) -> String {
    if seconds < MINUTE {
        format!("{}s", seconds)
    } else if seconds < HOUR {
        format!("{}m", seconds / MINUTE)
    } else if seconds < DAY {
        format!("{}h", seconds / HOUR)
    } else {
        format!("{}d", seconds / DAY)
    }
}

/// Reads a unit string back into seconds. The leading digits are taken as
/// the count; anything unparseable counts as zero.
pub fn parse_age(text: &str) -> u64 {
    let text = text.trim();
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    let count: u64 = digits.parse().unwrap_or(0);
    let unit = match text.chars().last() {
        Some('s') => 1,
        Some('m') => MINUTE,
        Some('h') => HOUR,
        Some('d') => DAY,
        _ => return 0,
    };
    count.saturating_mul(unit)
}
