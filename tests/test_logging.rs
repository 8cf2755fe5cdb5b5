
use hil_slurm_prolog::domain::clock::FixedClock;
use hil_slurm_prolog::domain::reservation::journal::ReservationJournal;
use hil_slurm_prolog::domain::reservation::lifecycle::ReservationLifecycleManager;
use resource_manager_mock::{MockRms, at, context, job, test_settings};

// logtest installs the global logger, so this binary holds a single test.
#[test]
fn test_refused_release_is_logged_as_error() {
    let mut logger = logtest::Logger::start();
    log::set_max_level(log::LevelFilter::Trace);

    let bob_reserve = "flexalloc_MOC_hil_reserve_bob_1001_2017-05-01T10:00:00";
    let rms = MockRms::new().with_reservation(bob_reserve, "bob");
    let settings = test_settings();
    let clock = FixedClock::new(at("2017-05-01T13:00:00"));
    let journal = ReservationJournal::disabled();
    let lifecycle = ReservationLifecycleManager::new(&rms, &clock, &journal, &settings);

    assert!(lifecycle.release(&context("8", "hil_release", "alice"), &job("8", "hil_release", Some(bob_reserve))).is_err());

    let mut errors = Vec::new();
    while let Some(record) = logger.pop() {
        if record.level() == log::Level::Error {
            errors.push(record.args().to_string());
        }
    }
    assert_eq!(errors, vec![format!("Reservation `{}` not owned by user `alice`", bob_reserve)]);
    assert!(rms.deletes().is_empty());
}
