use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// One event as served by the upstream API.
///
/// The upstream is not consistent about key casing, so field names are
/// matched case-insensitively (`ID`, `Id` and `id` are all accepted) and
/// unknown keys are ignored. Missing string fields fall back to their
/// defaults; a missing or malformed date is a parse error.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: i64,
    pub name: String,
    pub program: String,
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub url: String,
    pub owner: String,
}

// The upstream sends either plain dates or datetimes, with or without an
// offset. Only the calendar date matters downstream.
fn parse_event_date(raw: &str) -> Result<NaiveDate, String> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime.date());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(datetime.date_naive());
    }
    Err(format!("invalid event date: {raw:?}"))
}

impl<'de> Deserialize<'de> for EventRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = EventRecord;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an event object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<EventRecord, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut id = None;
                let mut name = None;
                let mut program = None;
                let mut date_start = None;
                let mut date_end = None;
                let mut url = None;
                let mut owner = None;

                while let Some(key) = map.next_key::<String>()? {
                    if key.eq_ignore_ascii_case("id") {
                        id = Some(map.next_value()?);
                    } else if key.eq_ignore_ascii_case("name") {
                        name = Some(map.next_value()?);
                    } else if key.eq_ignore_ascii_case("program") {
                        program = Some(map.next_value()?);
                    } else if key.eq_ignore_ascii_case("datestart") {
                        let raw: String = map.next_value()?;
                        date_start = Some(parse_event_date(&raw).map_err(de::Error::custom)?);
                    } else if key.eq_ignore_ascii_case("dateend") {
                        let raw: String = map.next_value()?;
                        date_end = Some(parse_event_date(&raw).map_err(de::Error::custom)?);
                    } else if key.eq_ignore_ascii_case("url") {
                        url = Some(map.next_value()?);
                    } else if key.eq_ignore_ascii_case("owner") {
                        owner = Some(map.next_value()?);
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }

                Ok(EventRecord {
                    id: id.unwrap_or_default(),
                    name: name.unwrap_or_default(),
                    program: program.unwrap_or_default(),
                    date_start: date_start.ok_or_else(|| de::Error::missing_field("dateStart"))?,
                    date_end: date_end.ok_or_else(|| de::Error::missing_field("dateEnd"))?,
                    url: url.unwrap_or_default(),
                    owner: owner.unwrap_or_default(),
                })
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}
