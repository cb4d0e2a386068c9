//! Date parsing and display formatting
//!
//! Display dates always use the pt-BR locale and fixed patterns, so the same
//! document renders the same text on every machine.

use chrono::{DateTime, FixedOffset, Locale, TimeZone, Timelike};
use chrono_tz::Tz;

/// Locale for every displayed date
pub const DISPLAY_LOCALE: Locale = Locale::pt_BR;

/// `dd MMM yyyy`
const DATE_FORMAT: &str = "%d %b %Y";

/// Parse a CMS timestamp such as `2021-03-25T19:25:28+0000`
pub fn parse_cms_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .ok()
}

/// Format a publication date (`25 mar 2021`); missing dates render empty
pub fn format_date(date: Option<&DateTime<FixedOffset>>, tz: &Tz) -> String {
    match date {
        Some(date) => date
            .with_timezone(tz)
            .format_localized(DATE_FORMAT, DISPLAY_LOCALE)
            .to_string(),
        None => String::new(),
    }
}

/// Format a full timestamp as `dd MMM yyyy', às' k':'m`
/// (`25 mar 2021, às 19:5`). `k` is the 1-24 hour, `m` the unpadded minute.
pub fn format_date_time(date: &DateTime<FixedOffset>, tz: &Tz) -> String {
    let local = date.with_timezone(tz);
    let hour = match local.hour() {
        0 => 24,
        h => h,
    };
    format!(
        "{}, às {}:{}",
        local.format_localized(DATE_FORMAT, DISPLAY_LOCALE),
        hour,
        local.minute()
    )
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Z: TimeZone>(date: &DateTime<Z>) -> String
where
    Z::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
