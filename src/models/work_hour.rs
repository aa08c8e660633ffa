use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{self, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "monday",
            Weekday::Tuesday => "tuesday",
            Weekday::Wednesday => "wednesday",
            Weekday::Thursday => "thursday",
            Weekday::Friday => "friday",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|day| day.as_str() == lower)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkHour {
    pub id: i64,
    pub day: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// One availability block about to be written for an owner.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkHourBlock {
    pub day: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Accepts `HH:MM` or `HH:MM:SS[.f]`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Turns a `{"monday": ["09:00", "17:00"], ...}` body into blocks.
///
/// Values that are not two-element arrays are skipped. A two-element entry
/// with an unknown day or an unreadable time fails the whole body. Keys that
/// name the same day in different case yield one block, the last in key order.
pub fn parse_week(body: &Value) -> Result<Vec<WorkHourBlock>, FieldErrors> {
    let obj = validation::object(body)?;
    let mut errors = FieldErrors::new();
    let mut by_day = BTreeMap::new();

    for (key, value) in obj {
        let pair = match value {
            Value::Array(items) if items.len() == 2 => items,
            _ => continue,
        };

        let Some(day) = Weekday::parse(key) else {
            errors.add(key, format!("\"{key}\" is not a valid day of the week."));
            continue;
        };

        let start = pair[0].as_str().and_then(parse_time);
        let end = pair[1].as_str().and_then(parse_time);
        match (start, end) {
            (Some(start_time), Some(end_time)) => {
                by_day.insert(
                    day,
                    WorkHourBlock {
                        day,
                        start_time,
                        end_time,
                    },
                );
            }
            _ => errors.add(
                key,
                "Time has wrong format. Use one of these formats instead: hh:mm[:ss[.uuuuuu]].",
            ),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(by_day.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn t(s: &str) -> NaiveTime {
        parse_time(s).unwrap()
    }

    #[test]
    fn test_parse_weekday_case_insensitive() {
        assert_eq!(Weekday::parse("Monday"), Some(Weekday::Monday));
        assert_eq!(Weekday::parse("sunday"), Some(Weekday::Sunday));
        assert_eq!(Weekday::parse("mon"), None);
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(t("09:00"), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(t("17:30:15"), NaiveTime::from_hms_opt(17, 30, 15).unwrap());
        assert!(parse_time("25:00").is_none());
        assert!(parse_time("nine").is_none());
    }

    #[test]
    fn test_parse_week_orders_by_day() {
        let blocks = parse_week(&json!({
            "tuesday": ["10:00", "16:00"],
            "monday": ["09:00", "17:00"]
        }))
        .unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].day, Weekday::Monday);
        assert_eq!(blocks[0].start_time, t("09:00"));
        assert_eq!(blocks[1].day, Weekday::Tuesday);
        assert_eq!(blocks[1].end_time, t("16:00"));
    }

    #[test]
    fn test_parse_week_skips_malformed_pairs() {
        let blocks = parse_week(&json!({
            "monday": ["09:00"],
            "tuesday": ["09:00", "12:00", "17:00"],
            "wednesday": "09:00-17:00",
            "thursday": ["08:00", "12:00"]
        }))
        .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].day, Weekday::Thursday);
    }

    #[test]
    fn test_parse_week_collapses_case_variants_of_a_day() {
        let blocks = parse_week(&json!({
            "MONDAY": ["09:00", "17:00"],
            "Monday": ["09:00", "12:00"],
            "monday": ["09:00", "17:00"],
            "Tuesday": ["10:00", "16:00"]
        }))
        .unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].day, Weekday::Monday);
        assert_eq!(blocks[1].day, Weekday::Tuesday);
    }

    #[test]
    fn test_parse_week_empty_is_ok() {
        assert!(parse_week(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_parse_week_rejects_unknown_day_and_bad_time() {
        let errors = parse_week(&json!({
            "funday": ["09:00", "17:00"],
            "friday": ["late", "17:00"]
        }))
        .unwrap_err();
        assert!(errors.contains("funday"));
        assert!(errors.contains("friday"));
    }

    #[test]
    fn test_parse_week_rejects_non_object() {
        assert!(parse_week(&json!([["09:00", "17:00"]])).is_err());
    }

    #[test]
    fn test_work_hour_serializes_seconds() {
        let hour = WorkHour {
            id: 1,
            day: Weekday::Monday,
            start_time: t("09:00"),
            end_time: t("17:00"),
        };
        let json = serde_json::to_value(hour).unwrap();
        assert_eq!(json["day"], "monday");
        assert_eq!(json["start_time"], "09:00:00");
        assert_eq!(json["end_time"], "17:00:00");
    }
}
