use std::fmt;

use crate::domain::clock::SystemClock;
use crate::domain::hil_command::HilCommand;
use crate::domain::job_context::JobContext;
use crate::domain::partition_validator::PartitionValidator;
use crate::domain::reservation::journal::ReservationJournal;
use crate::domain::reservation::lifecycle::{ReleaseOutcome, ReservationLifecycleManager, ReserveOutcome};
use crate::domain::rms::resource_manager_trait::ResourceManager;
use crate::domain::settings::HilSettings;
use crate::error::Result;

/// Whether slurmctld runs us before or after the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Prolog,
    Epilog,
}

impl HookPhase {
    /// The only command each phase acts on.
    pub fn command(&self) -> HilCommand {
        match self {
            HookPhase::Prolog => HilCommand::Reserve,
            HookPhase::Epilog => HilCommand::Release,
        }
    }
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Prolog => write!(f, "HIL Slurmctld Prolog"),
            HookPhase::Epilog => write!(f, "HIL Slurmctld Epilog"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// The job is not ours to handle; nothing was touched.
    NotApplicable(String),
    Reserved(ReserveOutcome),
    Released(ReleaseOutcome),
}

/// Everything one hook invocation needs, injected so tests can swap out
/// the resource manager and the clock.
#[derive(Debug)]
pub struct HilHook<'a> {
    pub settings: &'a HilSettings,
    pub rms: &'a dyn ResourceManager,
    pub clock: &'a dyn SystemClock,
    pub journal: &'a ReservationJournal,
}

impl<'a> HilHook<'a> {
    pub fn new(settings: &'a HilSettings, rms: &'a dyn ResourceManager, clock: &'a dyn SystemClock, journal: &'a ReservationJournal) -> Self {
        HilHook { settings, rms, clock, journal }
    }

    pub fn run(&self, phase: HookPhase, context: std::result::Result<JobContext, Vec<&'static str>>) -> Result<HookOutcome> {
        log::info!("==================== {} ====================", phase);

        let context = match context {
            Ok(context) => context,
            Err(missing) => return Ok(not_applicable(format!("Job environment is incomplete, missing {}", missing.join(", ")))),
        };

        // Decided from the environment alone, before any controller query.
        let Some(command) = HilCommand::from_job_name(&context.job_name) else {
            return Ok(not_applicable(format!("Jobname `{}` is not a HIL reservation command, nothing to do.", context.job_name)));
        };

        if command != phase.command() {
            return Ok(not_applicable(format!("`{}` is not handled by the {}", command, phase)));
        }

        let partition = self.rms.show_partition(&context.partition)?;
        let job = self.rms.show_job(&context.job_id)?;

        let (partition, job) = match (partition, job) {
            (Some(partition), Some(job)) => (partition, job),
            (partition, job) => {
                log::debug!("Job data {:?}", job);
                log::debug!("P   data {:?}", partition);
                return Ok(not_applicable(format!(
                    "No partition or job data for partition `{}`, job `{}`",
                    context.partition, context.job_id
                )));
            }
        };

        let validation = PartitionValidator::new(self.settings).validate(&partition, &context.username);
        if !validation.is_valid() {
            return Ok(HookOutcome::NotApplicable(validation.reasons.join("; ")));
        }

        let lifecycle = ReservationLifecycleManager::new(self.rms, self.clock, self.journal, self.settings);
        match command {
            HilCommand::Reserve => {
                log::debug!("Processing reservation request");
                lifecycle.reserve(&context, &partition, &job).map(HookOutcome::Reserved)
            }
            HilCommand::Release => {
                log::debug!("Processing reservation release request");
                lifecycle.release(&context, &job).map(HookOutcome::Released)
            }
        }
    }
}

fn not_applicable(reason: String) -> HookOutcome {
    log::debug!("{}", reason);
    HookOutcome::NotApplicable(reason)
}
