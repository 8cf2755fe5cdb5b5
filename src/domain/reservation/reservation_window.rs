use chrono::{NaiveDateTime, TimeDelta};

use crate::domain::rms::response::{JobInfo, PartitionInfo};
use crate::domain::rms::slurm_time::SlurmTimeLimit;
use crate::domain::settings::HilSettings;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ReservationWindow {
    pub fn format_start(&self, format: &str) -> String {
        self.start.format(format).to_string()
    }

    pub fn format_end(&self, format: &str) -> String {
        self.end.format(format).to_string()
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

/// Computes reservation windows from a job and its partition.
#[derive(Debug, Clone)]
pub struct ReservationWindowCalculator {
    pub grace_period: TimeDelta,
    pub default_duration: TimeDelta,
    pub release_duration: TimeDelta,
}

impl ReservationWindowCalculator {
    pub fn new(settings: &HilSettings) -> Self {
        ReservationWindowCalculator {
            grace_period: settings.grace_period,
            default_duration: settings.default_duration,
            release_duration: settings.release_duration,
        }
    }

    /// Window of the reserve reservation.
    ///
    /// The reservation starts with the job. It ends at the job's end plus the
    /// grace period when Slurm knows the end; otherwise the job's time limit,
    /// the partition `MaxTime` or the default duration bounds it, in that order.
    pub fn reserve_window(&self, job: &JobInfo, partition: &PartitionInfo) -> Result<ReservationWindow> {
        let start = job.start_time;

        let end = match job.end_time {
            Some(job_end) => {
                log::debug!("Using job end time for reservation");
                job_end + self.grace_period
            }
            None => start + self.duration_without_end_time(job, partition)?,
        };

        Ok(ReservationWindow { start, end })
    }

    fn duration_without_end_time(&self, job: &JobInfo, partition: &PartitionInfo) -> Result<TimeDelta> {
        match job.time_limit.parse::<SlurmTimeLimit>() {
            Ok(SlurmTimeLimit::Limited(limit)) => {
                log::debug!("Using job time limit `{}` to calculate reservation end time", job.time_limit);
                Ok(limit)
            }
            Ok(SlurmTimeLimit::Unlimited) => {
                log::debug!("Partition MaxTime is {}", partition.max_time);
                match partition.max_time.parse::<SlurmTimeLimit>() {
                    Ok(SlurmTimeLimit::Unlimited) => {
                        log::debug!("No job or partition time limit, using HIL default reservation duration");
                        Ok(self.default_duration)
                    }
                    Ok(SlurmTimeLimit::Limited(max_time)) => {
                        log::debug!("Using partition time limit to calculate reservation end time");
                        Ok(max_time)
                    }
                    Err(e) => {
                        log::error!("Cannot parse partition MaxTime (`{}`)", partition.max_time);
                        Err(e)
                    }
                }
            }
            Err(e) => {
                log::error!("Cannot parse job TimeLimit (`{}`)", job.time_limit);
                Err(e)
            }
        }
    }

    /// Window of the release reservation paired with `reserve`: it picks up
    /// where the reserve reservation ends.
    pub fn release_window(&self, reserve: &ReservationWindow) -> ReservationWindow {
        ReservationWindow { start: reserve.end, end: reserve.end + self.release_duration }
    }
}
