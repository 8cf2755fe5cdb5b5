pub mod command;
pub mod scontrol_rms;
