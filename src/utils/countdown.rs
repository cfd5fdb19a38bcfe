use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Timelike, Utc, Weekday};
use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::WIB_OFFSET_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct CountdownTime {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub is_expired: bool,
}

impl CountdownTime {
    const EXPIRED: CountdownTime = CountdownTime {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        is_expired: true,
    };
}

pub fn calculate_countdown_at<Tz: TimeZone>(target: &DateTime<Tz>, now: DateTime<Utc>) -> CountdownTime {
    let difference = target.with_timezone(&Utc) - now;
    let millis = difference.num_milliseconds();
    if millis <= 0 {
        return CountdownTime::EXPIRED;
    }

    const SECOND: i64 = 1000;
    const MINUTE: i64 = 60 * SECOND;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;

    CountdownTime {
        days: millis / DAY,
        hours: (millis % DAY) / HOUR,
        minutes: (millis % HOUR) / MINUTE,
        seconds: (millis % MINUTE) / SECOND,
        is_expired: false,
    }
}

pub fn calculate_countdown<Tz: TimeZone>(target: &DateTime<Tz>) -> CountdownTime {
    calculate_countdown_at(target, Utc::now())
}

pub fn is_rsvp_deadline_passed<Tz: TimeZone>(deadline: &DateTime<Tz>, now: DateTime<Utc>) -> bool {
    now > deadline.with_timezone(&Utc)
}

fn wib() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_SECS).expect("WIB offset is in range")
}

const MONTHS: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni", "Juli", "Agustus", "September",
    "Oktober", "November", "Desember",
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Senin",
        Weekday::Tue => "Selasa",
        Weekday::Wed => "Rabu",
        Weekday::Thu => "Kamis",
        Weekday::Fri => "Jumat",
        Weekday::Sat => "Sabtu",
        Weekday::Sun => "Minggu",
    }
}

/// "Kamis, 15 Januari 2026"
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    let local = date.with_timezone(&wib());
    format!(
        "{}, {} {} {}",
        weekday_name(local.weekday()),
        local.day(),
        MONTHS[local.month0() as usize],
        local.year()
    )
}

/// "15.30"
pub fn format_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    let local = date.with_timezone(&wib());
    format!("{:02}.{:02}", local.hour(), local.minute())
}

/// "15/01/2026, 15.30"
pub fn format_date_time<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    let local = date.with_timezone(&wib());
    format!("{}, {}", local.format("%d/%m/%Y"), format_time(&local))
}
