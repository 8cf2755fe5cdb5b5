use std::str::FromStr;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::error::{Error, Result};

const UNLIMITED: &str = "UNLIMITED";
const UNKNOWN: &str = "Unknown";
const HMS_FMT: &str = "%H:%M:%S";

/// A job `TimeLimit` or partition `MaxTime` as printed by `scontrol`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlurmTimeLimit {
    Unlimited,
    Limited(TimeDelta),
}

impl FromStr for SlurmTimeLimit {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        if value.contains(UNLIMITED) {
            return Ok(SlurmTimeLimit::Unlimited);
        }
        parse_slurm_duration(value).map(SlurmTimeLimit::Limited)
    }
}

/// Parses `[days-]H:M:S`. Anything else, including more than one `-`, is an error.
pub fn parse_slurm_duration(value: &str) -> Result<TimeDelta> {
    let fields: Vec<&str> = value.trim().split('-').collect();
    match fields.as_slice() {
        [hms] => parse_hms(value, hms),
        [days, hms] => {
            let days: i64 = days.parse().map_err(|_| Error::InvalidDuration(value.to_string()))?;
            if days < 0 {
                return Err(Error::InvalidDuration(value.to_string()));
            }
            Ok(TimeDelta::days(days) + parse_hms(value, hms)?)
        }
        _ => Err(Error::InvalidDuration(value.to_string())),
    }
}

fn parse_hms(value: &str, hms: &str) -> Result<TimeDelta> {
    let time = NaiveTime::parse_from_str(hms, HMS_FMT).map_err(|_| Error::InvalidDuration(value.to_string()))?;
    Ok(TimeDelta::hours(time.hour() as i64) + TimeDelta::minutes(time.minute() as i64) + TimeDelta::seconds(time.second() as i64))
}

pub fn parse_slurm_datetime(value: &str, format: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, format)
        .map_err(|_| Error::InvalidTimestamp { value: value.to_string(), format: format.to_string() })
}

/// `EndTime=Unknown` (and friends) mean the controller has not scheduled an end yet.
pub fn parse_optional_slurm_datetime(value: &str, format: &str) -> Result<Option<NaiveDateTime>> {
    if value.contains(UNKNOWN) || value == "None" || value == "N/A" {
        return Ok(None);
    }
    parse_slurm_datetime(value, format).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::SHOW_OBJ_TIME_FMT;

    #[test]
    fn test_parse_slurm_duration() {
        assert_eq!(
            parse_slurm_duration("10:20:30").unwrap(),
            TimeDelta::hours(10) + TimeDelta::minutes(20) + TimeDelta::seconds(30)
        );
        assert_eq!(parse_slurm_duration("2-01:30:00").unwrap(), TimeDelta::days(2) + TimeDelta::minutes(90));
    }

    #[test]
    fn test_parse_slurm_duration_rejects_bad_shapes() {
        for value in ["1-2-03:00:00", "abc", "1-xx:00:00", "x-01:00:00", "25:00:00", ""] {
            assert!(matches!(parse_slurm_duration(value), Err(Error::InvalidDuration(_))), "{} should not parse", value);
        }
    }

    #[test]
    fn test_unlimited_time_limit() {
        assert_eq!("UNLIMITED".parse::<SlurmTimeLimit>().unwrap(), SlurmTimeLimit::Unlimited);
        assert_eq!("1-00:00:00".parse::<SlurmTimeLimit>().unwrap(), SlurmTimeLimit::Limited(TimeDelta::days(1)));
    }

    #[test]
    fn test_parse_optional_datetime() {
        assert_eq!(parse_optional_slurm_datetime("Unknown", SHOW_OBJ_TIME_FMT).unwrap(), None);
        let parsed = parse_optional_slurm_datetime("2021-10-07T11:30:26", SHOW_OBJ_TIME_FMT).unwrap().unwrap();
        assert_eq!(parsed.format("%d.%m.%Y %H:%M:%S").to_string(), "07.10.2021 11:30:26");
        assert!(matches!(parse_slurm_datetime("yesterday", SHOW_OBJ_TIME_FMT), Err(Error::InvalidTimestamp { .. })));
    }
}
