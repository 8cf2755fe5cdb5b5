use crate::domain::clock::SystemClock;
use crate::domain::job_context::JobContext;
use crate::domain::reservation::journal::{JournalAction, ReservationJournal};
use crate::domain::reservation::reservation_name::{HilReservationName, ReservationRole};
use crate::domain::reservation::reservation_window::{ReservationWindow, ReservationWindowCalculator};
use crate::domain::rms::resource_manager_trait::{ReservationRequest, ResourceManager};
use crate::domain::rms::response::{JobInfo, PartitionInfo};
use crate::domain::settings::HilSettings;
use crate::domain::utils::id::UserName;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(String),
    AlreadyExists(String),
}

impl CreateOutcome {
    pub fn name(&self) -> &str {
        match self {
            CreateOutcome::Created(name) | CreateOutcome::AlreadyExists(name) => name,
        }
    }
}

/// Result of a successful `hil_reserve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveOutcome {
    pub reserve: CreateOutcome,
    pub release: CreateOutcome,
    pub window: ReservationWindow,
}

/// Result of a successful `hil_release`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub deleted: String,
    pub advanced: String,
    pub new_start: String,
}

/// Drives the reserve/release reservation pair of one HIL job.
///
/// ```text
/// absent --hil_reserve--> reserved --hil_release--> released
/// ```
///
/// On `hil_reserve` both reservations are created, the release reservation
/// starting where the reserve reservation ends. On `hil_release` the reserve
/// reservation is deleted and the release reservation is pulled forward to now.
#[derive(Debug)]
pub struct ReservationLifecycleManager<'a> {
    rms: &'a dyn ResourceManager,
    clock: &'a dyn SystemClock,
    journal: &'a ReservationJournal,
    settings: &'a HilSettings,
    calculator: ReservationWindowCalculator,
}

impl<'a> ReservationLifecycleManager<'a> {
    pub fn new(
        rms: &'a dyn ResourceManager,
        clock: &'a dyn SystemClock,
        journal: &'a ReservationJournal,
        settings: &'a HilSettings,
    ) -> Self {
        ReservationLifecycleManager { rms, clock, journal, settings, calculator: ReservationWindowCalculator::new(settings) }
    }

    /// Creates the reserve and release reservations unless they already exist.
    pub fn reserve(&self, context: &JobContext, partition: &PartitionInfo, job: &JobInfo) -> Result<ReserveOutcome> {
        let reserve_window = self.calculator.reserve_window(job, partition)?;
        let release_window = self.calculator.release_window(&reserve_window);

        let timestamp = reserve_window.format_start(&self.settings.create_time_format);
        let reserve_name = self.reservation_name(ReservationRole::Reserve, context, &timestamp);
        let release_name = reserve_name.with_role(ReservationRole::Release);

        let reserve = self.create_reservation(&reserve_name, &reserve_window, context)?;
        let release = self.create_reservation(&release_name, &release_window, context)?;

        Ok(ReserveOutcome { reserve, release, window: reserve_window })
    }

    fn reservation_name(&self, role: ReservationRole, context: &JobContext, timestamp: &str) -> HilReservationName {
        HilReservationName::new(&self.settings.reservation_prefix, role, &context.username, &context.job_uid, timestamp)
    }

    fn create_reservation(&self, name: &HilReservationName, window: &ReservationWindow, context: &JobContext) -> Result<CreateOutcome> {
        let resname = name.to_string();

        if self.rms.show_reservation(&resname)?.is_some() {
            log::info!("HIL reservation `{}` already exists", resname);
            self.journal.record(self.clock.now(), JournalAction::Exists, &resname, &context.username, &context.job_id);
            return Ok(CreateOutcome::AlreadyExists(resname));
        }

        let format = &self.settings.create_time_format;
        let request = ReservationRequest {
            name: resname.clone(),
            owner: context.username.clone(),
            start_time: window.format_start(format),
            end_time: window.format_end(format),
            nodes: context.node_list.clone(),
            flags: self.settings.create_flags.clone(),
            features: self.settings.features.clone(),
        };

        log::info!("Creating HIL reservation `{}`, ending {}", resname, request.end_time);
        self.rms.create_reservation(&request)?;
        self.journal.record(self.clock.now(), JournalAction::Created, &resname, &context.username, &context.job_id);

        Ok(CreateOutcome::Created(resname))
    }

    /// Deletes the reserve reservation the release job ran in and advances the
    /// paired release reservation to start now. Nothing is deleted unless the
    /// reservation belongs to the invoking user, is a reserve reservation and
    /// its release reservation exists.
    pub fn release(&self, context: &JobContext, job: &JobInfo) -> Result<ReleaseOutcome> {
        let Some(reserve_resname) = job.reservation.as_deref() else {
            log::error!("No reservation name specified to `{}` command", job.job_name);
            return Err(Error::MissingReservation(job.job_name.clone()));
        };

        let reserve_name = match HilReservationName::parse(reserve_resname, &self.settings.reservation_prefix) {
            Ok(name) => name,
            Err(e) => {
                log::error!("Reservation `{}` is not a HIL reservation", reserve_resname);
                return Err(e);
            }
        };

        if !reserve_name.is_owned_by(&context.username) {
            log::error!("Reservation `{}` not owned by user `{}`", reserve_resname, context.username);
            return Err(Error::NotOwner { reservation: reserve_resname.to_string(), username: context.username.to_string() });
        }

        if reserve_name.role != ReservationRole::Reserve {
            log::error!("Reservation `{}` is not a HIL reserve reservation", reserve_resname);
            return Err(Error::NotReserveReservation(reserve_resname.to_string()));
        }

        let release_resname = reserve_name.with_role(ReservationRole::Release).to_string();
        if self.rms.show_reservation(&release_resname)?.is_none() {
            log::error!("Release reservation `{}` not found, keeping `{}`", release_resname, reserve_resname);
            return Err(Error::MissingReleaseReservation(release_resname));
        }

        self.delete_reservation(reserve_resname, &context.username)?;
        self.journal.record(self.clock.now(), JournalAction::Released, reserve_resname, &context.username, &context.job_id);

        let new_start = self.clock.now().format(&self.settings.create_time_format).to_string();

        log::info!("Advancing start of HIL reservation `{}` to {}", release_resname, new_start);
        self.rms.update_reservation_start(&release_resname, &new_start)?;

        Ok(ReleaseOutcome { deleted: reserve_resname.to_string(), advanced: release_resname, new_start })
    }

    /// Deletes a reservation after checking that its name carries the HIL
    /// prefix and `username` as owner. The check is purely name based.
    pub fn delete_reservation(&self, resname: &str, username: &UserName) -> Result<()> {
        log::info!("Deleting HIL reservation `{}`", resname);

        let owned = HilReservationName::parse(resname, &self.settings.reservation_prefix)
            .map(|name| name.is_owned_by(username))
            .unwrap_or(false);

        if !owned {
            log::info!("Error in HIL reservation name (`{}`)", resname);
            return Err(Error::InvalidReservationName(resname.to_string()));
        }

        self.rms.delete_reservation(resname)
    }
}
