use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use hil_slurm_prolog::domain::hook::{HookOutcome, HookPhase};
use hil_slurm_prolog::domain::settings::DEFAULT_LOG_FILE;
use hil_slurm_prolog::{load_settings, logger, run_hook};

#[derive(Parser, Debug)]
#[command(name = "hil_slurmctld_prolog")]
#[command(about = "Slurm controller prolog/epilog creating and releasing HIL reservations")]
#[command(version)]
#[command(group(clap::ArgGroup::new("phase").required(true).args(["hil_prolog", "hil_epilog"])))]
struct Args {
    /// Function as the HIL prolog
    #[arg(long = "hil_prolog")]
    hil_prolog: bool,

    /// Function as the HIL epilog
    #[arg(long = "hil_epilog")]
    hil_epilog: bool,

    /// JSON settings file overriding the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn phase(&self) -> HookPhase {
        if self.hil_prolog { HookPhase::Prolog } else { HookPhase::Epilog }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let settings = match load_settings(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            logger::init(Path::new(DEFAULT_LOG_FILE));
            log::error!("Cannot load HIL settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logger::init(&settings.log_file);

    match run_hook(args.phase(), &settings) {
        Ok(HookOutcome::NotApplicable(_)) => ExitCode::SUCCESS,
        Ok(HookOutcome::Reserved(outcome)) => {
            log::info!("HIL reservations `{}` and `{}` in place", outcome.reserve.name(), outcome.release.name());
            ExitCode::SUCCESS
        }
        Ok(HookOutcome::Released(outcome)) => {
            log::info!("HIL reservation `{}` released, `{}` starts {}", outcome.deleted, outcome.advanced, outcome.new_start);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
