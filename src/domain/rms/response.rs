use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::domain::rms::slurm_time::{parse_optional_slurm_datetime, parse_slurm_datetime};
use crate::domain::utils::id::{JobId, PartitionName};
use crate::error::{Error, Result};

/// Parse `<key>=<value>` pairs from one record of `scontrol show <object>` output.
/// Values may themselves contain `=` (e.g. `TRES=cpu=4,mem=7600M`).
pub fn get_scontrol_items(output: &str) -> HashMap<&str, &str> {
    let mut map = HashMap::new();
    for line in output.lines() {
        for item in line.split_whitespace() {
            if let Some((key, value)) = item.split_once('=') {
                map.insert(key, value);
            }
        }
    }
    map
}

/// Splits `scontrol show` output into records, which are separated by blank lines.
pub fn split_scontrol_records(output: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut start: Option<usize> = None;
    let mut offset = 0;

    for line in output.split_inclusive('\n') {
        let blank = line.trim().is_empty();
        match (blank, start) {
            (false, None) => start = Some(offset),
            (true, Some(begin)) => {
                records.push(&output[begin..offset]);
                start = None;
            }
            _ => {}
        }
        offset += line.len();
    }
    if let Some(begin) = start {
        records.push(&output[begin..]);
    }
    records
}

struct Record<'a> {
    object: &'a str,
    items: HashMap<&'a str, &'a str>,
}

impl<'a> Record<'a> {
    fn new(object: &'a str, output: &'a str) -> Record<'a> {
        Record { object, items: get_scontrol_items(output) }
    }

    fn get(&self, field: &str) -> Result<&'a str> {
        self.items
            .get(field)
            .copied()
            .ok_or_else(|| Error::MissingField { object: self.object.to_string(), field: field.to_string() })
    }

    fn get_any(&self, fields: &[&str]) -> Result<&'a str> {
        fields
            .iter()
            .find_map(|field| self.items.get(field).copied())
            .ok_or_else(|| Error::MissingField { object: self.object.to_string(), field: fields.join("|") })
    }

    fn get_optional(&self, field: &str) -> Option<&'a str> {
        self.items.get(field).copied().filter(|value| !is_null(value))
    }
}

fn is_null(value: &str) -> bool {
    value.is_empty() || value == "(null)" || value == "None" || value == "N/A"
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value.map(|v| v.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect()).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionState {
    Up,
    Down,
    Drain,
    Inactive,
    Other(String),
}

impl From<&str> for PartitionState {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "UP" => PartitionState::Up,
            "DOWN" => PartitionState::Down,
            "DRAIN" => PartitionState::Drain,
            "INACTIVE" => PartitionState::Inactive,
            other => PartitionState::Other(other.to_string()),
        }
    }
}

/// Snapshot of `scontrol show partition <name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    pub name: PartitionName,
    pub state: PartitionState,
    pub is_default: bool,
    pub is_shared: bool,
    pub is_exclusive_user: bool,
    /// Kept verbatim; the window calculator decides how to read it.
    pub max_time: String,
}

impl PartitionInfo {
    pub fn from_scontrol(output: &str) -> Result<PartitionInfo> {
        let record = Record::new("partition", output);

        Ok(PartitionInfo {
            name: PartitionName::new(record.get("PartitionName")?),
            state: PartitionState::from(record.get("State")?),
            is_default: record.get("Default")? == "YES",
            // Newer Slurm releases renamed `Shared` to `OverSubscribe`.
            is_shared: record.get_any(&["Shared", "OverSubscribe"])? != "NO",
            is_exclusive_user: record.get("ExclusiveUser")? == "YES",
            max_time: record.get("MaxTime")?.to_string(),
        })
    }
}

/// Snapshot of `scontrol show job <id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    pub job_id: JobId,
    pub job_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    /// Kept verbatim, may be `UNLIMITED`.
    pub time_limit: String,
    pub reservation: Option<String>,
}

impl JobInfo {
    pub fn from_scontrol(output: &str, time_format: &str) -> Result<JobInfo> {
        let record = Record::new("job", output);

        Ok(JobInfo {
            job_id: JobId::new(record.get("JobId")?),
            job_name: record.get("JobName")?.to_string(),
            start_time: parse_slurm_datetime(record.get("StartTime")?, time_format)?,
            end_time: parse_optional_slurm_datetime(record.get("EndTime")?, time_format)?,
            time_limit: record.get("TimeLimit")?.to_string(),
            reservation: record.get_optional("Reservation").map(str::to_string),
        })
    }
}

/// Snapshot of `scontrol show reservation <name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationInfo {
    pub name: String,
    pub users: Vec<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub flags: Vec<String>,
    pub features: Vec<String>,
}

impl ReservationInfo {
    pub fn from_scontrol(output: &str, time_format: &str) -> Result<ReservationInfo> {
        let record = Record::new("reservation", output);

        Ok(ReservationInfo {
            name: record.get("ReservationName")?.to_string(),
            users: split_list(record.get_optional("Users")),
            start_time: parse_slurm_datetime(record.get("StartTime")?, time_format)?,
            end_time: parse_slurm_datetime(record.get("EndTime")?, time_format)?,
            flags: split_list(record.get_optional("Flags")),
            features: split_list(record.get_optional("Features")),
        })
    }
}
