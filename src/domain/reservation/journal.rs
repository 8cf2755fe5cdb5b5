use std::fs::{self, DirBuilder, File, Metadata, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{self as unix_fs, DirBuilderExt, MetadataExt, OpenOptionsExt};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use nix::libc;
use nix::unistd::User;

use crate::domain::settings::UserJournalSettings;
use crate::domain::utils::id::{JobId, UserName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalAction {
    Created,
    Exists,
    Released,
}

impl JournalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalAction::Created => "Created",
            JournalAction::Exists => "Exists",
            JournalAction::Released => "Released",
        }
    }
}

/// A journal file together with the uid that must own it and its directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalTarget {
    pub path: PathBuf,
    pub owner: u32,
}

/// Where the journal of one user lives.
pub trait JournalLocator: std::fmt::Debug {
    fn locate(&self, username: &UserName) -> Option<JournalTarget>;
}

/// Resolves `~<user>/<subdir>/<file>` through the password database.
#[derive(Debug, Clone)]
pub struct HomeDirLocator {
    pub subdir: String,
    pub file_name: String,
}

impl JournalLocator for HomeDirLocator {
    fn locate(&self, username: &UserName) -> Option<JournalTarget> {
        match User::from_name(username.as_str()) {
            Ok(Some(user)) => Some(JournalTarget {
                path: user.dir.join(&self.subdir).join(&self.file_name),
                owner: user.uid.as_raw(),
            }),
            Ok(None) => {
                log::warn!("User `{}` not found in the password database, no HIL journal", username);
                None
            }
            Err(e) => {
                log::warn!("Cannot look up user `{}`: {}", username, e);
                None
            }
        }
    }
}

/// Per-user record of the reservations the hook created and released, kept
/// in the user's home so they can find their reservation names.
///
/// The hook runs as the controller account inside a directory the user
/// controls. Symlinks are never followed, existing entries must belong to the
/// user, and entries created here are handed over to the user.
#[derive(Debug)]
pub struct ReservationJournal {
    locator: Option<Box<dyn JournalLocator>>,
}

impl ReservationJournal {
    pub fn new(settings: &UserJournalSettings) -> Self {
        if !settings.enabled {
            return ReservationJournal::disabled();
        }
        ReservationJournal::with_locator(Box::new(HomeDirLocator {
            subdir: settings.subdir.clone(),
            file_name: settings.file_name.clone(),
        }))
    }

    pub fn with_locator(locator: Box<dyn JournalLocator>) -> Self {
        ReservationJournal { locator: Some(locator) }
    }

    pub fn disabled() -> Self {
        ReservationJournal { locator: None }
    }

    /// Appends one line; failures are logged and otherwise ignored.
    pub fn record(&self, time: NaiveDateTime, action: JournalAction, reservation: &str, username: &UserName, job_id: &JobId) {
        let Some(locator) = &self.locator else {
            return;
        };
        let Some(target) = locator.locate(username) else {
            return;
        };

        let line = format!("{} {} {} job={}\n", time.format("%Y-%m-%d %H:%M:%S"), action.as_str(), reservation, job_id);

        match append(&target, &line) {
            Ok(()) => log::debug!("Journaled `{}` {} in '{}'", reservation, action.as_str(), target.path.display()),
            Err(e) => log::warn!("Failed to write HIL journal '{}': {}", target.path.display(), e),
        }
    }
}

fn append(target: &JournalTarget, line: &str) -> io::Result<()> {
    let dir = target
        .path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "journal path has no parent directory"))?;

    prepare_dir(dir, target.owner)?;
    let mut file = open_journal(&target.path, target.owner)?;
    file.write_all(line.as_bytes())
}

fn prepare_dir(dir: &Path, owner: u32) -> io::Result<()> {
    match fs::symlink_metadata(dir) {
        Ok(meta) => check_owned(dir, &meta, owner, meta.file_type().is_dir()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            DirBuilder::new().mode(0o755).create(dir)?;
            unix_fs::chown(dir, Some(owner), None)
        }
        Err(e) => Err(e),
    }
}

fn open_journal(path: &Path, owner: u32) -> io::Result<File> {
    match OpenOptions::new().append(true).custom_flags(libc::O_NOFOLLOW).open(path) {
        Ok(file) => {
            let meta = file.metadata()?;
            check_owned(path, &meta, owner, meta.is_file())?;
            Ok(file)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let file = OpenOptions::new()
                .append(true)
                .create_new(true)
                .custom_flags(libc::O_NOFOLLOW)
                .mode(0o644)
                .open(path)?;
            unix_fs::fchown(&file, Some(owner), None)?;
            Ok(file)
        }
        Err(e) => Err(e),
    }
}

fn check_owned(path: &Path, meta: &Metadata, owner: u32, expected_kind: bool) -> io::Result<()> {
    if !expected_kind || meta.uid() != owner {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("'{}' is not a plain entry owned by uid {}", path.display(), owner),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::symlink;

    #[derive(Debug)]
    struct DirLocator {
        base: PathBuf,
        owner: u32,
    }

    impl JournalLocator for DirLocator {
        fn locate(&self, username: &UserName) -> Option<JournalTarget> {
            Some(JournalTarget { path: self.base.join(username.as_str()).join("hil_reservations.log"), owner: self.owner })
        }
    }

    fn scratch(name: &str) -> (PathBuf, u32) {
        let base = std::env::temp_dir().join(format!("hil_journal_{}_{}", name, std::process::id()));
        fs::remove_dir_all(&base).ok();
        fs::create_dir_all(&base).unwrap();
        let uid = fs::metadata(&base).unwrap().uid();
        (base, uid)
    }

    fn time() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2017-05-01T10:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn appends_lines() {
        let (base, owner) = scratch("append");
        let journal = ReservationJournal::with_locator(Box::new(DirLocator { base: base.clone(), owner }));
        let alice = UserName::new("alice");

        journal.record(time(), JournalAction::Created, "res_a", &alice, &JobId::new("1"));
        journal.record(time(), JournalAction::Released, "res_a", &alice, &JobId::new("2"));

        let content = fs::read_to_string(base.join("alice").join("hil_reservations.log")).unwrap();
        fs::remove_dir_all(&base).ok();

        assert_eq!(content, "2017-05-01 10:00:00 Created res_a job=1\n2017-05-01 10:00:00 Released res_a job=2\n");
    }

    #[test]
    fn symlinked_journal_file_is_not_followed() {
        let (base, owner) = scratch("file_link");
        let victim = base.join("victim");
        fs::write(&victim, "root:x:0:0\n").unwrap();
        fs::create_dir(base.join("alice")).unwrap();
        symlink(&victim, base.join("alice").join("hil_reservations.log")).unwrap();

        let journal = ReservationJournal::with_locator(Box::new(DirLocator { base: base.clone(), owner }));
        journal.record(time(), JournalAction::Created, "res", &UserName::new("alice"), &JobId::new("1"));

        let content = fs::read_to_string(&victim).unwrap();
        fs::remove_dir_all(&base).ok();

        assert_eq!(content, "root:x:0:0\n");
    }

    #[test]
    fn symlinked_journal_dir_is_refused() {
        let (base, owner) = scratch("dir_link");
        let elsewhere = base.join("elsewhere");
        fs::create_dir(&elsewhere).unwrap();
        symlink(&elsewhere, base.join("alice")).unwrap();

        let journal = ReservationJournal::with_locator(Box::new(DirLocator { base: base.clone(), owner }));
        journal.record(time(), JournalAction::Created, "res", &UserName::new("alice"), &JobId::new("1"));

        let written = elsewhere.join("hil_reservations.log").exists();
        fs::remove_dir_all(&base).ok();

        assert!(!written);
    }

    #[test]
    fn journal_of_another_owner_is_refused() {
        let (base, owner) = scratch("foreign");
        fs::create_dir(base.join("alice")).unwrap();
        let file = base.join("alice").join("hil_reservations.log");
        fs::write(&file, "").unwrap();

        let journal = ReservationJournal::with_locator(Box::new(DirLocator { base: base.clone(), owner: owner.wrapping_add(1) }));
        journal.record(time(), JournalAction::Created, "res", &UserName::new("alice"), &JobId::new("1"));

        let content = fs::read_to_string(&file).unwrap();
        fs::remove_dir_all(&base).ok();

        assert_eq!(content, "");
    }

    #[test]
    fn disabled_journal_writes_nothing() {
        let settings = UserJournalSettings { enabled: false, ..Default::default() };
        let journal = ReservationJournal::new(&settings);
        assert!(journal.locator.is_none());
    }

    #[test]
    fn journal_is_off_by_default() {
        assert!(ReservationJournal::new(&UserJournalSettings::default()).locator.is_none());
    }
}
