use std::fmt;
use std::str::FromStr;

pub const HIL_RESERVE: &str = "hil_reserve";
pub const HIL_RELEASE: &str = "hil_release";

/// Job names the hook reacts to. Any other job name is none of our business.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HilCommand {
    Reserve,
    Release,
}

impl HilCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            HilCommand::Reserve => HIL_RESERVE,
            HilCommand::Release => HIL_RELEASE,
        }
    }

    /// `None` when the job name is not a HIL reservation command.
    pub fn from_job_name(job_name: &str) -> Option<HilCommand> {
        job_name.parse().ok()
    }
}

impl FromStr for HilCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<HilCommand, Self::Err> {
        match s {
            HIL_RESERVE => Ok(HilCommand::Reserve),
            HIL_RELEASE => Ok(HilCommand::Release),
            other => Err(format!("`{}` is not a HIL reservation command", other)),
        }
    }
}

impl fmt::Display for HilCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
