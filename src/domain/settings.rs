use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;

use crate::api::settings_dto::HilSettingsDto;
use crate::error::Error;

pub const DEFAULT_PARTITION_PREFIX: &str = "HIL_partition";
pub const DEFAULT_RESERVATION_PREFIX: &str = "flexalloc_MOC";
pub const DEFAULT_LOG_FILE: &str = "/var/log/slurm/hil_prolog.log";
pub const SHOW_OBJ_TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";
pub const RES_CREATE_TIME_FMT: &str = "%Y-%m-%dT%H:%M:%S";

/// Which partition attributes the validator enforces. The name prefix check
/// is not optional and therefore has no flag here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionChecks {
    pub state: bool,
    pub default: bool,
    pub shared: bool,
    pub exclusive: bool,
}

impl Default for PartitionChecks {
    fn default() -> Self {
        PartitionChecks { state: true, default: true, shared: true, exclusive: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserJournalSettings {
    pub enabled: bool,
    pub subdir: String,
    pub file_name: String,
}

impl Default for UserJournalSettings {
    fn default() -> Self {
        UserJournalSettings { enabled: false, subdir: ".hil".to_string(), file_name: "hil_reservations.log".to_string() }
    }
}

/// Every tunable of the hook, passed explicitly into each component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HilSettings {
    pub partition_prefix: String,
    pub reservation_prefix: String,
    pub checks: PartitionChecks,
    pub default_duration: TimeDelta,
    pub grace_period: TimeDelta,
    pub release_duration: TimeDelta,
    pub show_time_format: String,
    pub create_time_format: String,
    pub create_flags: Vec<String>,
    pub features: Vec<String>,
    pub scontrol_path: String,
    pub command_timeout: Duration,
    pub log_file: PathBuf,
    pub user_journal: UserJournalSettings,
}

impl Default for HilSettings {
    fn default() -> Self {
        HilSettings {
            partition_prefix: DEFAULT_PARTITION_PREFIX.to_string(),
            reservation_prefix: DEFAULT_RESERVATION_PREFIX.to_string(),
            checks: PartitionChecks::default(),
            default_duration: TimeDelta::hours(24),
            grace_period: TimeDelta::zero(),
            release_duration: TimeDelta::hours(24),
            show_time_format: SHOW_OBJ_TIME_FMT.to_string(),
            create_time_format: RES_CREATE_TIME_FMT.to_string(),
            create_flags: vec!["MAINT".to_string(), "IGNORE_JOBS".to_string()],
            features: vec!["HIL".to_string()],
            scontrol_path: "scontrol".to_string(),
            command_timeout: Duration::from_secs(30),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            user_journal: UserJournalSettings::default(),
        }
    }
}

impl HilSettings {
    /// Reservation names are split on `_`, so neither the creation timestamp
    /// nor its rendered output may contain one.
    pub fn validate(&self) -> Result<(), Error> {
        if self.partition_prefix.is_empty() {
            return Err(Error::InvalidSettings("partitionPrefix must not be empty".to_string()));
        }
        if self.reservation_prefix.is_empty() {
            return Err(Error::InvalidSettings("reservationPrefix must not be empty".to_string()));
        }
        if self.create_time_format.contains('_') {
            return Err(Error::InvalidSettings(format!(
                "createTimeFormat `{}` must not contain `_`, it is embedded in reservation names",
                self.create_time_format
            )));
        }
        for (field, value) in [
            ("defaultDurationS", self.default_duration),
            ("gracePeriodS", self.grace_period),
            ("releaseDurationS", self.release_duration),
        ] {
            if value < TimeDelta::zero() {
                return Err(Error::InvalidSettings(format!("{} must not be negative", field)));
            }
        }
        if self.command_timeout.is_zero() {
            return Err(Error::InvalidSettings("commandTimeoutS must be positive".to_string()));
        }
        Ok(())
    }
}

impl TryFrom<HilSettingsDto> for HilSettings {
    type Error = Error;

    fn try_from(dto: HilSettingsDto) -> Result<Self, Self::Error> {
        let defaults = HilSettings::default();

        let checks = match dto.checks {
            Some(checks) => PartitionChecks {
                state: checks.state.unwrap_or(defaults.checks.state),
                default: checks.default.unwrap_or(defaults.checks.default),
                shared: checks.shared.unwrap_or(defaults.checks.shared),
                exclusive: checks.exclusive.unwrap_or(defaults.checks.exclusive),
            },
            None => defaults.checks,
        };

        let user_journal = match dto.user_journal {
            Some(journal) => UserJournalSettings {
                enabled: journal.enabled.unwrap_or(defaults.user_journal.enabled),
                subdir: journal.subdir.unwrap_or(defaults.user_journal.subdir),
                file_name: journal.file_name.unwrap_or(defaults.user_journal.file_name),
            },
            None => defaults.user_journal,
        };

        let default_duration = dto.default_duration_s.map(TimeDelta::seconds).unwrap_or(defaults.default_duration);

        let settings = HilSettings {
            partition_prefix: dto.partition_prefix.unwrap_or(defaults.partition_prefix),
            reservation_prefix: dto.reservation_prefix.unwrap_or(defaults.reservation_prefix),
            checks,
            default_duration,
            grace_period: dto.grace_period_s.map(TimeDelta::seconds).unwrap_or(defaults.grace_period),
            // The release reservation follows the default duration unless told otherwise.
            release_duration: dto.release_duration_s.map(TimeDelta::seconds).unwrap_or(default_duration),
            show_time_format: dto.show_time_format.unwrap_or(defaults.show_time_format),
            create_time_format: dto.create_time_format.unwrap_or(defaults.create_time_format),
            create_flags: dto.create_flags.unwrap_or(defaults.create_flags),
            features: dto.features.unwrap_or(defaults.features),
            scontrol_path: dto.scontrol_path.unwrap_or(defaults.scontrol_path),
            command_timeout: dto.command_timeout_s.map(Duration::from_secs).unwrap_or(defaults.command_timeout),
            log_file: dto.log_file.map(PathBuf::from).unwrap_or(defaults.log_file),
            user_journal,
        };

        settings.validate()?;
        Ok(settings)
    }
}
