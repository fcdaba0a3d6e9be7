use chrono::{DateTime, NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Today as `YYYY-MM-DD`, the ISO timestamp truncated to its date part.
    fn today_string(&self) -> String {
        format_date(self.today())
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for tests.
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn on(date: &str) -> Self {
        let day = parse_date(date).unwrap_or_default();
        FixedClock(day.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Accepts a bare date or an ISO timestamp and keeps the date component.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

pub fn normalize_date(value: &str) -> Option<String> {
    parse_date(value).map(format_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_truncate_to_date() {
        assert_eq!(
            normalize_date("2026-10-16T23:59:59.000Z").as_deref(),
            Some("2026-10-16")
        );
        assert_eq!(normalize_date("2026-10-16").as_deref(), Some("2026-10-16"));
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date(""), None);
    }

    #[test]
    fn fixed_clock_reports_its_day() {
        let clock = FixedClock::on("2026-03-01");
        assert_eq!(clock.today_string(), "2026-03-01");
    }
}
