use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Builds ICS reminder files for recurring alarm maintenance.
pub struct ReminderCalendar;

impl ReminderCalendar {
    /// Build an ICS calendar with a single monthly-recurring event.
    ///
    /// The event starts at 09:00 UTC on `start_date` (today when absent)
    /// and recurs monthly `count` times. Lines use CRLF endings as RFC
    /// 5545 requires.
    pub fn monthly_ics(
        summary: &str,
        description: &str,
        count: u32,
        start_date: Option<NaiveDate>,
    ) -> String {
        let uid = format!("{}@alarm-compliance", Uuid::new_v4());
        let start = Self::start_datetime(start_date);
        let stamp = Utc::now();

        let lines = [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "PRODID:-//Alarm Compliance//Checklist Engine//EN".to_string(),
            "CALSCALE:GREGORIAN".to_string(),
            "METHOD:PUBLISH".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("UID:{uid}"),
            format!("DTSTAMP:{}", Self::format_dt(stamp)),
            format!("DTSTART:{}", Self::format_dt(start)),
            format!("SUMMARY:{summary}"),
            format!("DESCRIPTION:{description}"),
            format!("RRULE:FREQ=MONTHLY;COUNT={count}"),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ];
        let mut out = lines.join("\r\n");
        out.push_str("\r\n");
        out
    }

    /// Default reminder: test smoke and CO alarms monthly for a year.
    pub fn monthly_test_reminder() -> String {
        Self::monthly_ics(
            "Test smoke/CO alarms",
            "Monthly test reminder",
            12,
            None,
        )
    }

    fn start_datetime(start: Option<NaiveDate>) -> DateTime<Utc> {
        let date = start.unwrap_or_else(|| Utc::now().date_naive());
        date.and_hms_opt(9, 0, 0)
            .expect("09:00:00 is a valid time")
            .and_utc()
    }

    fn format_dt(dt: DateTime<Utc>) -> String {
        dt.format("%Y%m%dT%H%M%SZ").to_string()
    }
}
