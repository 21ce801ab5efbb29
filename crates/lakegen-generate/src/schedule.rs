use chrono::{Duration, NaiveDateTime, NaiveTime};

/// Timestamp format of Falcon validity bounds.
pub const FALCON_TIME_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

/// Day offset for process validity starts (first run is tomorrow).
pub const PROCESS_DAY_OFFSET: i64 = 1;
/// Day offset for feed validity starts.
pub const FEED_DAY_OFFSET: i64 = 0;

/// Local `HH:MM` on `now + day_offset` days, shifted to UTC by subtracting
/// `utc_offset_hours`.
///
/// Returns `None` when `hhmm` is not a valid time.
pub fn utc_start(
    now: NaiveDateTime,
    hhmm: &str,
    day_offset: i64,
    utc_offset_hours: i64,
) -> Option<String> {
    let time = NaiveTime::parse_from_str(hhmm, "%H:%M").ok()?;
    let day = now.date().checked_add_signed(Duration::days(day_offset))?;
    let local = day.and_time(time);
    let utc = local.checked_sub_signed(Duration::hours(utc_offset_hours))?;
    Some(utc.format(FALCON_TIME_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn process_start_is_tomorrow_in_utc() {
        assert_eq!(
            utc_start(noon(2026, 3, 10), "03:01", PROCESS_DAY_OFFSET, 8).as_deref(),
            Some("2026-03-10T19:01Z")
        );
    }

    #[test]
    fn feed_start_crosses_month_boundary() {
        assert_eq!(
            utc_start(noon(2026, 3, 1), "00:00", FEED_DAY_OFFSET, 8).as_deref(),
            Some("2026-02-28T16:00Z")
        );
        assert_eq!(
            utc_start(noon(2026, 3, 1), "10:30", FEED_DAY_OFFSET, 8).as_deref(),
            Some("2026-03-01T02:30Z")
        );
    }

    #[test]
    fn rejects_malformed_time() {
        assert_eq!(utc_start(noon(2026, 3, 1), "25:00", 0, 8), None);
    }
}
