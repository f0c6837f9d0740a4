use chrono::{NaiveDate, NaiveTime, Timelike, Utc};
use std::fmt;

static USER_FORMAT: &'static str = "%Y-%m-%d";
static TIME_FORMAT: &'static str = "%H:%M";
pub static NOW: &str = "now";

#[derive(Debug, PartialEq)]
pub enum ParseError {
    ChronoError(chrono::format::ParseError),
    DateInThePastError(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::ChronoError(err) => write!(f, "{}", err),
            ParseError::DateInThePastError(msg) => write!(f, "{}", msg),
        }
    }
}

pub fn parse_date_from_str(date: &str) -> Result<NaiveDate, ParseError> {
    if date == NOW {
        return Ok(Utc::now().naive_local().date());
    }
    let parsed = NaiveDate::parse_from_str(date, USER_FORMAT).map_err(ParseError::ChronoError)?;
    if parsed < Utc::now().naive_local().date() {
        return Err(ParseError::DateInThePastError(format!(
            "{} is in the past!",
            parsed.format(USER_FORMAT)
        )));
    }
    Ok(parsed)
}

/// Hour of a raw "HH:MM" departure string, minutes truncated.
pub fn departure_hour(time: &str) -> Result<u32, ParseError> {
    let parsed = NaiveTime::parse_from_str(time, TIME_FORMAT).map_err(ParseError::ChronoError)?;
    Ok(parsed.hour())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(USER_FORMAT).to_string()
}

pub mod naive_date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, super::USER_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// The availability column of the TGVmax table holds "OUI"/"NON" strings.
pub mod oui_non {
    use serde::{self, Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "OUI" => Ok(true),
            "NON" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected OUI or NON, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::date::{departure_hour, format_date, parse_date_from_str, ParseError, NOW};
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_parse_date_from_str_now() {
        assert_eq!(
            parse_date_from_str(NOW).unwrap(),
            Utc::now().naive_local().date()
        );
    }

    #[test]
    fn test_parse_date_from_str() {
        let today = Utc::now().naive_local().date();
        assert_eq!(
            parse_date_from_str(&today.format("%Y-%m-%d").to_string()).unwrap(),
            today,
        );
    }

    #[test]
    fn test_parse_date_from_str_in_the_past() {
        assert_eq!(
            parse_date_from_str("2020-03-30").unwrap_err(),
            ParseError::DateInThePastError("2020-03-30 is in the past!".to_string()),
        )
    }

    #[test]
    fn test_parse_date_from_str_invalid() -> Result<(), String> {
        match parse_date_from_str("foo") {
            Err(ParseError::ChronoError(_)) => Ok(()),
            _ => Err("Should fail with ParseError::ChronoError".to_string()),
        }
    }

    #[test]
    fn test_departure_hour_truncates_minutes() {
        assert_eq!(departure_hour("07:59").unwrap(), 7);
        assert_eq!(departure_hour("23:00").unwrap(), 23);
    }

    #[test]
    fn test_departure_hour_malformed() -> Result<(), String> {
        for time in &["8h00", "25:00", "foo", ""] {
            match departure_hour(time) {
                Err(ParseError::ChronoError(_)) => continue,
                other => return Err(format!("{} parsed to {:?}, should fail!", time, other)),
            }
        }
        Ok(())
    }

    #[test]
    fn test_format_date_pads_with_zeroes() {
        assert_eq!(
            format_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            "2024-06-01"
        );
    }
}
