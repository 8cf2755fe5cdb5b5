use serde::Deserialize;

/// On-disk form of the hook settings. Every field is optional, missing
/// fields keep the built-in default.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HilSettingsDto {
    pub partition_prefix: Option<String>,
    pub reservation_prefix: Option<String>,
    pub checks: Option<PartitionChecksDto>,
    pub default_duration_s: Option<i64>,
    pub grace_period_s: Option<i64>,
    pub release_duration_s: Option<i64>,
    pub show_time_format: Option<String>,
    pub create_time_format: Option<String>,
    pub create_flags: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub scontrol_path: Option<String>,
    pub command_timeout_s: Option<u64>,
    pub log_file: Option<String>,
    pub user_journal: Option<UserJournalDto>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PartitionChecksDto {
    pub state: Option<bool>,
    pub default: Option<bool>,
    pub shared: Option<bool>,
    pub exclusive: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserJournalDto {
    pub enabled: Option<bool>,
    pub subdir: Option<String>,
    pub file_name: Option<String>,
}
