use std::collections::HashMap;

use crate::domain::utils::id::{JobId, PartitionName, UserName};

pub const SLURM_JOB_NAME: &str = "SLURM_JOB_NAME";
pub const SLURM_JOB_PARTITION: &str = "SLURM_JOB_PARTITION";
pub const SLURM_JOB_USER: &str = "SLURM_JOB_USER";
pub const SLURM_JOB_ID: &str = "SLURM_JOB_ID";
pub const SLURM_JOB_UID: &str = "SLURM_JOB_UID";
pub const SLURM_JOB_ACCOUNT: &str = "SLURM_JOB_ACCOUNT";
pub const SLURM_JOB_NODELIST: &str = "SLURM_JOB_NODELIST";

/// Job context handed to the prolog/epilog by `slurmctld` through the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobContext {
    pub job_name: String,
    pub partition: PartitionName,
    pub username: UserName,
    pub job_id: JobId,
    pub job_uid: String,
    pub job_account: Option<String>,
    pub node_list: Option<String>,
}

impl JobContext {
    pub fn from_env() -> Result<JobContext, Vec<&'static str>> {
        JobContext::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<JobContext, Vec<&'static str>> {
        JobContext::from_lookup(|key| vars.get(key).cloned())
    }

    /// Builds the context from any variable lookup. On failure returns the
    /// names of all required variables that were missing or empty.
    pub fn from_lookup<F>(lookup: F) -> Result<JobContext, Vec<&'static str>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |key: &'static str| match lookup(key).filter(|v| !v.is_empty()) {
            Some(value) => value,
            None => {
                missing.push(key);
                String::new()
            }
        };

        let job_name = required(SLURM_JOB_NAME);
        let partition = required(SLURM_JOB_PARTITION);
        let username = required(SLURM_JOB_USER);
        let job_id = required(SLURM_JOB_ID);
        let job_uid = required(SLURM_JOB_UID);

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(JobContext {
            job_name,
            partition: PartitionName::new(partition),
            username: UserName::new(username),
            job_id: JobId::new(job_id),
            job_uid,
            job_account: lookup(SLURM_JOB_ACCOUNT).filter(|v| !v.is_empty()),
            node_list: lookup(SLURM_JOB_NODELIST).filter(|v| !v.is_empty() && v != "(null)"),
        })
    }
}
