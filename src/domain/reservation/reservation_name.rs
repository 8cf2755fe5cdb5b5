use std::fmt;

use crate::domain::hil_command::HilCommand;
use crate::domain::utils::id::UserName;
use crate::error::Error;

/// Which half of a reservation pair a name refers to. The role token in the
/// name is the command that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservationRole {
    /// Held while the isolation job owns the nodes.
    Reserve,
    /// Held while the nodes are returned to the cluster.
    Release,
}

impl ReservationRole {
    pub fn token(&self) -> &'static str {
        match self {
            ReservationRole::Reserve => HilCommand::Reserve.as_str(),
            ReservationRole::Release => HilCommand::Release.as_str(),
        }
    }

    pub fn all() -> [ReservationRole; 2] {
        [ReservationRole::Reserve, ReservationRole::Release]
    }
}

impl fmt::Display for ReservationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Structured HIL reservation name:
/// `<prefix>_<role-token>_<username>_<job_uid>_<start-timestamp>`.
///
/// The prefix and role tokens may contain `_` themselves, so parsing needs the
/// configured prefix and strips known tokens from the left; `job_uid` and the
/// timestamp are taken from the right, leaving the username in between.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HilReservationName {
    pub prefix: String,
    pub role: ReservationRole,
    pub username: UserName,
    pub job_uid: String,
    pub timestamp: String,
}

impl HilReservationName {
    pub fn new(prefix: &str, role: ReservationRole, username: &UserName, job_uid: &str, timestamp: &str) -> Self {
        HilReservationName {
            prefix: prefix.to_string(),
            role,
            username: username.clone(),
            job_uid: job_uid.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    pub fn parse(name: &str, prefix: &str) -> Result<HilReservationName, Error> {
        let invalid = || Error::InvalidReservationName(name.to_string());

        let rest = name.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('_')).ok_or_else(invalid)?;

        let (role, rest) = ReservationRole::all()
            .into_iter()
            .find_map(|role| rest.strip_prefix(role.token()).and_then(|r| r.strip_prefix('_')).map(|r| (role, r)))
            .ok_or_else(invalid)?;

        let mut tail = rest.rsplitn(3, '_');
        let timestamp = tail.next().filter(|t| !t.is_empty()).ok_or_else(invalid)?;
        let job_uid = tail.next().filter(|u| !u.is_empty() && u.chars().all(|c| c.is_ascii_digit())).ok_or_else(invalid)?;
        let username = tail.next().filter(|u| !u.is_empty()).ok_or_else(invalid)?;

        Ok(HilReservationName::new(prefix, role, &UserName::new(username), job_uid, timestamp))
    }

    /// The same reservation pair seen from the other role.
    pub fn with_role(&self, role: ReservationRole) -> HilReservationName {
        HilReservationName { role, ..self.clone() }
    }

    pub fn is_owned_by(&self, username: &UserName) -> bool {
        &self.username == username
    }
}

impl fmt::Display for HilReservationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}_{}_{}", self.prefix, self.role.token(), self.username, self.job_uid, self.timestamp)
    }
}
