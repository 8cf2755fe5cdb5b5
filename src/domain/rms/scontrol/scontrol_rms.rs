use std::time::Duration;

use crate::domain::rms::resource_manager_trait::{ReservationRequest, ResourceManager};
use crate::domain::rms::response::{JobInfo, PartitionInfo, ReservationInfo, split_scontrol_records};
use crate::domain::rms::scontrol::command::{CommandOutput, run_with_timeout};
use crate::domain::settings::HilSettings;
use crate::domain::utils::id::{JobId, PartitionName};
use crate::error::{Error, Result};

/// `ResourceManager` backed by the `scontrol` command line tool.
#[derive(Debug, Clone)]
pub struct ScontrolRms {
    pub scontrol_path: String,
    pub timeout: Duration,
    pub show_time_format: String,
}

impl ScontrolRms {
    pub fn new(settings: &HilSettings) -> ScontrolRms {
        ScontrolRms {
            scontrol_path: settings.scontrol_path.clone(),
            timeout: settings.command_timeout,
            show_time_format: settings.show_time_format.clone(),
        }
    }

    fn run(&self, args: Vec<String>) -> Result<CommandOutput> {
        run_with_timeout(&self.scontrol_path, &args, self.timeout)
    }

    fn command_failed(&self, args: &[String], output: &CommandOutput) -> Error {
        Error::CommandFailed {
            command: format!("{} {}", self.scontrol_path, args.join(" ")),
            status: output.status.to_string(),
            stderr: output.stderr.trim().to_string(),
        }
    }

    /// Runs a mutation and turns a non-zero exit into `Error::CommandFailed`.
    fn mutate(&self, args: Vec<String>) -> Result<()> {
        let output = self.run(args.clone())?;
        if !output.success() {
            let error = self.command_failed(&args, &output);
            log::error!("{}", error);
            return Err(error);
        }
        if !output.stdout.trim().is_empty() {
            log::debug!("scontrol output: {}", output.stdout.trim());
        }
        Ok(())
    }

    /// Runs `scontrol show <object> <name>` and returns the first record,
    /// or `None` when the controller does not know the object.
    fn show(&self, object: &str, name: &str) -> Result<Option<String>> {
        let args = show_args(object, name);
        let output = self.run(args.clone())?;

        if !output.success() {
            if is_not_found(&output.stderr) {
                log::debug!("scontrol show {} `{}`: not found", object, name);
                return Ok(None);
            }
            let error = self.command_failed(&args, &output);
            log::error!("{}", error);
            return Err(error);
        }

        log::debug!("scontrol output: {}", output.stdout.trim());
        Ok(split_scontrol_records(&output.stdout).first().map(|record| record.to_string()))
    }
}

fn is_not_found(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    stderr.contains("not found") || stderr.contains("invalid job id") || stderr.contains("invalid reservation name")
}

pub fn show_args(object: &str, name: &str) -> Vec<String> {
    vec!["show".to_string(), object.to_string(), name.to_string()]
}

pub fn create_reservation_args(request: &ReservationRequest) -> Vec<String> {
    let mut args = vec![
        "create".to_string(),
        "reservation".to_string(),
        format!("ReservationName={}", request.name),
        format!("Users={}", request.owner),
        format!("StartTime={}", request.start_time),
        format!("EndTime={}", request.end_time),
    ];
    match &request.nodes {
        Some(nodes) => args.push(format!("Nodes={}", nodes)),
        None => args.push("Nodes=ALL".to_string()),
    }
    if !request.flags.is_empty() {
        args.push(format!("Flags={}", request.flags.join(",")));
    }
    if !request.features.is_empty() {
        args.push(format!("Features={}", request.features.join("&")));
    }
    args
}

pub fn update_reservation_start_args(name: &str, start_time: &str) -> Vec<String> {
    vec!["update".to_string(), format!("ReservationName={}", name), format!("StartTime={}", start_time)]
}

pub fn delete_reservation_args(name: &str) -> Vec<String> {
    vec!["delete".to_string(), format!("ReservationName={}", name)]
}

impl ResourceManager for ScontrolRms {
    fn show_partition(&self, partition: &PartitionName) -> Result<Option<PartitionInfo>> {
        self.show("partition", partition.as_str())?.map(|record| PartitionInfo::from_scontrol(&record)).transpose()
    }

    fn show_job(&self, job_id: &JobId) -> Result<Option<JobInfo>> {
        self.show("job", job_id.as_str())?
            .map(|record| JobInfo::from_scontrol(&record, &self.show_time_format))
            .transpose()
    }

    fn show_reservation(&self, name: &str) -> Result<Option<ReservationInfo>> {
        self.show("reservation", name)?
            .map(|record| ReservationInfo::from_scontrol(&record, &self.show_time_format))
            .transpose()
    }

    fn create_reservation(&self, request: &ReservationRequest) -> Result<()> {
        self.mutate(create_reservation_args(request))
    }

    fn update_reservation_start(&self, name: &str, start_time: &str) -> Result<()> {
        self.mutate(update_reservation_start_args(name, start_time))
    }

    fn delete_reservation(&self, name: &str) -> Result<()> {
        self.mutate(delete_reservation_args(name))
    }
}
