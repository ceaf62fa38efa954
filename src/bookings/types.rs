use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

const GRAPH_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.7f";

/// Graph `dateTimeTimeZone`: a local date-time string plus its zone name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    pub date_time: String,
    pub time_zone: String,
}

impl DateTimeTimeZone {
    pub fn utc(at: DateTime<Utc>) -> Self {
        Self {
            date_time: at.format(GRAPH_DATE_TIME_FORMAT).to_string(),
            time_zone: "UTC".to_string(),
        }
    }

    /// The instant, when the zone is UTC and the string parses.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        if !self.time_zone.eq_ignore_ascii_case("UTC") {
            return None;
        }
        NaiveDateTime::parse_from_str(&self.date_time, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .or_else(|_| {
                DateTime::parse_from_rfc3339(&self.date_time).map(|dt| dt.with_timezone(&Utc))
            })
            .ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StaffRole {
    Guest,
    Administrator,
    Viewer,
    ExternalGuest,
    Scheduler,
    TeamMember,
    UnknownFutureValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReminderRecipients {
    AllAttendees,
    Staff,
    Customer,
    UnknownFutureValue,
}

/// A reminder sent `offset` before an appointment starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReminder {
    pub message: String,
    /// ISO-8601 duration, e.g. `PT1H`.
    pub offset: String,
    pub recipients: ReminderRecipients,
}

impl BookingReminder {
    pub fn new(message: &str, offset: TimeDelta, recipients: ReminderRecipients) -> Self {
        Self {
            message: message.to_string(),
            offset: iso_duration(offset),
            recipients,
        }
    }
}

/// Whole-second ISO-8601 duration (`P1D`, `PT1H30M`, `PT0S`).
pub fn iso_duration(delta: TimeDelta) -> String {
    let total = delta.num_seconds().max(0);
    let (days, rest) = (total / 86_400, total % 86_400);
    let (hours, minutes, seconds) = (rest / 3600, rest % 3600 / 60, rest % 60);

    let mut out = String::from("P");
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if rest > 0 || days == 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if seconds > 0 || rest == 0 {
            out.push_str(&format!("{seconds}S"));
        }
    }
    out
}
