use std::path::Path;

use crate::api::settings_dto::HilSettingsDto;
use crate::domain::clock::LocalClock;
use crate::domain::hook::{HilHook, HookOutcome, HookPhase};
use crate::domain::job_context::JobContext;
use crate::domain::reservation::journal::ReservationJournal;
use crate::domain::rms::scontrol::scontrol_rms::ScontrolRms;
use crate::domain::settings::HilSettings;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Built-in settings, overridden by the JSON file at `config_path` if given.
pub fn load_settings(config_path: Option<&Path>) -> Result<HilSettings> {
    match config_path {
        Some(path) => {
            let dto: HilSettingsDto = parse_json_file(path)?;
            HilSettings::try_from(dto)
        }
        None => Ok(HilSettings::default()),
    }
}

/// Runs one prolog or epilog invocation against the real `scontrol` and the
/// job environment of this process.
pub fn run_hook(phase: HookPhase, settings: &HilSettings) -> Result<HookOutcome> {
    let rms = ScontrolRms::new(settings);
    let clock = LocalClock;
    let journal = ReservationJournal::new(&settings.user_journal);

    HilHook::new(settings, &rms, &clock, &journal).run(phase, JobContext::from_env())
}
