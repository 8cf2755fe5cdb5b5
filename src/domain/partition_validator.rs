use crate::domain::rms::response::{PartitionInfo, PartitionState};
use crate::domain::settings::{HilSettings, PartitionChecks};
use crate::domain::utils::id::UserName;

/// Outcome of validating a partition. `reasons` is empty exactly when the
/// partition may host HIL reservations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartitionValidation {
    pub reasons: Vec<String>,
}

impl PartitionValidation {
    pub fn is_valid(&self) -> bool {
        self.reasons.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct PartitionValidator {
    pub partition_prefix: String,
    pub checks: PartitionChecks,
}

impl PartitionValidator {
    pub fn new(settings: &HilSettings) -> Self {
        PartitionValidator { partition_prefix: settings.partition_prefix.clone(), checks: settings.checks }
    }

    /// Runs every enabled check, logging each failure.
    pub fn validate(&self, partition: &PartitionInfo, username: &UserName) -> PartitionValidation {
        let mut validation = PartitionValidation::default();
        let pname = &partition.name;

        if !pname.as_str().starts_with(&self.partition_prefix) {
            validation.reasons.push(format!("Partition name `{}` does not match `{}*`", pname, self.partition_prefix));
        }

        if self.checks.state && partition.state != PartitionState::Up {
            validation.reasons.push(format!("Partition `{}` state (`{:?}`) is not UP", pname, partition.state));
        }

        if self.checks.default && partition.is_default {
            validation.reasons.push(format!("Partition `{}` is the default partition, cannot be used for HIL", pname));
        }

        if self.checks.shared && partition.is_shared {
            validation.reasons.push(format!("Partition `{}` is shared, cannot be used for HIL", pname));
        }

        if self.checks.exclusive && !partition.is_exclusive_user {
            validation.reasons.push(format!("Partition `{}` not exclusive to `{}`, cannot be used for HIL", pname, username));
        }

        for reason in &validation.reasons {
            log::info!("{}", reason);
        }

        validation
    }
}
