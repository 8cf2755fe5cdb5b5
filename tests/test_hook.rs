
use std::collections::HashMap;

use hil_slurm_prolog::domain::clock::FixedClock;
use hil_slurm_prolog::domain::hook::{HilHook, HookOutcome, HookPhase};
use hil_slurm_prolog::domain::job_context::JobContext;
use hil_slurm_prolog::domain::reservation::journal::ReservationJournal;
use hil_slurm_prolog::domain::reservation::lifecycle::CreateOutcome;
use hil_slurm_prolog::domain::rms::response::PartitionInfo;
use hil_slurm_prolog::domain::utils::id::PartitionName;
use hil_slurm_prolog::error::Error;
use resource_manager_mock::{MockRms, RmsCall, at, context, hil_partition, job, test_settings};

fn run(rms: &MockRms, phase: HookPhase, job_name: &str, username: &str, job_id: &str) -> hil_slurm_prolog::error::Result<HookOutcome> {
    let settings = test_settings();
    let clock = FixedClock::new(at("2017-05-01T13:00:00"));
    let journal = ReservationJournal::disabled();
    HilHook::new(&settings, rms, &clock, &journal).run(phase, Ok(context(job_id, job_name, username)))
}

#[test]
fn test_prolog_reserve_end_to_end() {
    let rms = MockRms::new().with_partition(hil_partition()).with_job(job("7", "hil_reserve", None));

    let outcome = run(&rms, HookPhase::Prolog, "hil_reserve", "alice", "7").unwrap();

    let reserved = match outcome {
        HookOutcome::Reserved(reserved) => reserved,
        other => panic!("expected reservations, got {:?}", other),
    };
    assert_eq!(reserved.window.start, at("2017-05-01T10:00:00"));
    assert_eq!(reserved.window.end, at("2017-05-01T11:00:00"));

    let reserve = reserved.reserve.name().to_string();
    let release = reserved.release.name().to_string();
    assert!(matches!(reserved.reserve, CreateOutcome::Created(_)));
    assert!(reserve.contains("_hil_reserve_alice_1000_"));
    assert!(release.contains("_hil_release_alice_1000_"));
    assert!(reserve.ends_with("_2017-05-01T10:00:00"));
    assert!(release.ends_with("_2017-05-01T10:00:00"));

    assert_eq!(rms.reservation(&reserve).unwrap().end_time, at("2017-05-01T11:00:00"));
}

#[test]
fn test_reserve_then_release_end_to_end() {
    let rms = MockRms::new().with_partition(hil_partition()).with_job(job("7", "hil_reserve", None));
    let HookOutcome::Reserved(reserved) = run(&rms, HookPhase::Prolog, "hil_reserve", "alice", "7").unwrap() else {
        panic!("prolog did not reserve");
    };

    let rms = MockRms { reservations: rms.reservations, ..MockRms::new() }
        .with_partition(hil_partition())
        .with_job(job("8", "hil_release", Some(reserved.reserve.name())));

    let HookOutcome::Released(released) = run(&rms, HookPhase::Epilog, "hil_release", "alice", "8").unwrap() else {
        panic!("epilog did not release");
    };

    assert_eq!(released.deleted, reserved.reserve.name());
    assert_eq!(released.advanced, reserved.release.name());
    assert!(rms.reservation(reserved.reserve.name()).is_none());
    assert_eq!(rms.reservation(reserved.release.name()).unwrap().start_time, at("2017-05-01T13:00:00"));
}

#[test]
fn test_release_of_foreign_reservation_fails_without_deleting() {
    let bob_reserve = "flexalloc_MOC_hil_reserve_bob_1001_2017-05-01T10:00:00";
    let rms = MockRms::new()
        .with_partition(hil_partition())
        .with_job(job("8", "hil_release", Some(bob_reserve)))
        .with_reservation(bob_reserve, "bob");

    let result = run(&rms, HookPhase::Epilog, "hil_release", "alice", "8");

    assert!(matches!(result, Err(Error::NotOwner { .. })));
    assert!(rms.deletes().is_empty());
}

#[test]
fn test_non_hil_job_is_ignored() {
    let rms = MockRms::new().with_partition(hil_partition()).with_job(job("9", "bash", None));

    let outcome = run(&rms, HookPhase::Prolog, "bash", "alice", "9").unwrap();

    assert!(matches!(outcome, HookOutcome::NotApplicable(_)));
    assert!(rms.calls().is_empty());
}

#[test]
fn test_non_hil_job_survives_controller_failure() {
    let rms = MockRms { fail_job_queries: true, fail_reservation_queries: true, ..MockRms::new() };

    let outcome = run(&rms, HookPhase::Prolog, "bash", "alice", "9").unwrap();
    assert!(matches!(outcome, HookOutcome::NotApplicable(_)));

    let outcome = run(&rms, HookPhase::Epilog, "hil_reserve", "alice", "7").unwrap();
    assert!(matches!(outcome, HookOutcome::NotApplicable(_)));
}

#[test]
fn test_hil_job_reports_controller_failure() {
    let rms = MockRms { fail_job_queries: true, ..MockRms::new() };

    let result = run(&rms, HookPhase::Prolog, "hil_reserve", "alice", "7");

    assert!(matches!(result, Err(Error::CommandFailed { .. })));
    assert!(rms.calls().is_empty());
}

#[test]
fn test_command_in_wrong_phase_is_ignored() {
    let rms = MockRms::new().with_partition(hil_partition()).with_job(job("7", "hil_reserve", None));

    assert!(matches!(run(&rms, HookPhase::Epilog, "hil_reserve", "alice", "7").unwrap(), HookOutcome::NotApplicable(_)));

    let rms = MockRms::new().with_partition(hil_partition()).with_job(job("8", "hil_release", None));
    assert!(matches!(run(&rms, HookPhase::Prolog, "hil_release", "alice", "8").unwrap(), HookOutcome::NotApplicable(_)));
    assert!(rms.calls().is_empty());
}

#[test]
fn test_ineligible_partition_is_ignored() {
    let shared = PartitionInfo { is_shared: true, ..hil_partition() };
    let rms = MockRms::new().with_partition(shared).with_job(job("7", "hil_reserve", None));

    let outcome = run(&rms, HookPhase::Prolog, "hil_reserve", "alice", "7").unwrap();

    let reason = match outcome {
        HookOutcome::NotApplicable(reason) => reason,
        other => panic!("expected no action, got {:?}", other),
    };
    assert!(reason.contains("shared"));
    assert!(rms.calls().is_empty());
}

#[test]
fn test_missing_partition_or_job_is_ignored() {
    let rms = MockRms::new().with_job(job("7", "hil_reserve", None));
    assert!(matches!(run(&rms, HookPhase::Prolog, "hil_reserve", "alice", "7").unwrap(), HookOutcome::NotApplicable(_)));

    let rms = MockRms::new().with_partition(hil_partition());
    assert!(matches!(run(&rms, HookPhase::Prolog, "hil_reserve", "alice", "7").unwrap(), HookOutcome::NotApplicable(_)));
}

#[test]
fn test_incomplete_environment_is_ignored() {
    let rms = MockRms::new().with_partition(hil_partition());
    let settings = test_settings();
    let clock = FixedClock::new(at("2017-05-01T13:00:00"));
    let journal = ReservationJournal::disabled();
    let env: HashMap<String, String> = HashMap::from([("SLURM_JOB_NAME".to_string(), "hil_reserve".to_string())]);

    let outcome = HilHook::new(&settings, &rms, &clock, &journal).run(HookPhase::Prolog, JobContext::from_map(&env)).unwrap();

    let reason = match outcome {
        HookOutcome::NotApplicable(reason) => reason,
        other => panic!("expected no action, got {:?}", other),
    };
    assert!(reason.contains("SLURM_JOB_PARTITION"));
}

#[test]
fn test_partition_in_other_pool_is_ignored() {
    let batch = PartitionInfo { name: PartitionName::new("batch"), ..hil_partition() };
    let rms = MockRms::new().with_partition(batch).with_job(job("7", "hil_reserve", None));
    let mut ctx = context("7", "hil_reserve", "alice");
    ctx.partition = PartitionName::new("batch");

    let settings = test_settings();
    let clock = FixedClock::new(at("2017-05-01T13:00:00"));
    let journal = ReservationJournal::disabled();
    let outcome = HilHook::new(&settings, &rms, &clock, &journal).run(HookPhase::Prolog, Ok(ctx)).unwrap();

    assert!(matches!(outcome, HookOutcome::NotApplicable(_)));
    assert!(!rms.calls().iter().any(|call| matches!(call, RmsCall::Create(_))));
}
