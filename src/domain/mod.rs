pub mod clock;
pub mod hil_command;
pub mod hook;
pub mod job_context;
pub mod partition_validator;
pub mod reservation;
pub mod rms;
pub mod settings;
pub mod utils;
