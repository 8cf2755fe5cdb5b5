use std::fmt::Debug;

use crate::domain::rms::response::{JobInfo, PartitionInfo, ReservationInfo};
use crate::domain::utils::id::{JobId, PartitionName, UserName};
use crate::error::Result;

/// Everything needed to create one reservation. Timestamps are already
/// rendered in the controller's creation format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub name: String,
    pub owner: UserName,
    pub start_time: String,
    pub end_time: String,
    pub nodes: Option<String>,
    pub flags: Vec<String>,
    pub features: Vec<String>,
}

/// The cluster resource manager as seen by the hook.
///
/// Queries return `Ok(None)` when the object does not exist; any other
/// failure is an `Err`, so "absent" and "broken" are never confused.
pub trait ResourceManager: Debug {
    // scontrol show partition <name>
    fn show_partition(&self, partition: &PartitionName) -> Result<Option<PartitionInfo>>;

    // scontrol show job <id>
    fn show_job(&self, job_id: &JobId) -> Result<Option<JobInfo>>;

    // scontrol show reservation <name>
    fn show_reservation(&self, name: &str) -> Result<Option<ReservationInfo>>;

    // scontrol create reservation ...
    fn create_reservation(&self, request: &ReservationRequest) -> Result<()>;

    // scontrol update ReservationName=<name> StartTime=<start>
    fn update_reservation_start(&self, name: &str, start_time: &str) -> Result<()>;

    // scontrol delete ReservationName=<name>
    fn delete_reservation(&self, name: &str) -> Result<()>;
}
