use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse settings JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid HIL settings: {0}")]
    InvalidSettings(String),

    #[error("Command `{command}` exited with {status}: {stderr}")]
    CommandFailed { command: String, status: String, stderr: String },

    #[error("Command `{command}` did not finish within {timeout:?} and was killed")]
    CommandTimeout { command: String, timeout: Duration },

    #[error("Missing field `{field}` in scontrol output for {object}")]
    MissingField { object: String, field: String },

    #[error("Cannot parse timestamp `{value}` with format `{format}`")]
    InvalidTimestamp { value: String, format: String },

    #[error("Cannot parse duration `{0}`, expected [days-]H:M:S")]
    InvalidDuration(String),

    #[error("No reservation is attached to job `{0}`")]
    MissingReservation(String),

    #[error("Reservation `{reservation}` not owned by user `{username}`")]
    NotOwner { reservation: String, username: String },

    #[error("Reservation `{0}` is not a HIL reserve reservation")]
    NotReserveReservation(String),

    #[error("Release reservation `{0}` paired with the reserve reservation does not exist")]
    MissingReleaseReservation(String),

    #[error("hil_release: error: Invalid reservation name `{0}`")]
    InvalidReservationName(String),
}

pub type Result<T> = std::result::Result<T, Error>;
