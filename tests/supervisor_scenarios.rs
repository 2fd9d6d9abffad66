mod common;

use std::sync::Arc;
use std::time::Duration;

use servisor::{
    EventKind, RuntimeError, ServiceError, ServiceRef, ServiceState, ShutdownError, Supervisor,
    SupervisorConfig, TerminationSource, Trigger,
};
use tokio::time::Instant;

use common::{Recorder, Stop, TestService, four};

fn config(grace: Duration) -> SupervisorConfig {
    SupervisorConfig {
        grace,
        ..SupervisorConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn fault_in_grpc_is_reported_and_all_services_stop() {
    let (svcs, refs) = four(
        TestService::new("rest"),
        TestService::new("grpc").fault_after(Duration::from_millis(50), "bind lost"),
        TestService::new("cron"),
        TestService::new("kafka"),
    );

    let report = Supervisor::builder(config(Duration::from_secs(5)))
        .with_services(refs)
        .with_termination(TerminationSource::manual())
        .build()
        .run_report()
        .await;

    match report.cause.as_ref() {
        Some(RuntimeError::ServiceFaulted { service, error }) => {
            assert_eq!(&**service, "grpc");
            assert_eq!(error.to_string(), "bind lost");
        }
        other => panic!("unexpected cause: {other:?}"),
    }
    assert!(matches!(report.trigger, Some(Trigger::ServiceFault { .. })));
    assert_eq!(report.exit_code(), 1);

    assert_eq!(report.outcomes.len(), 4);
    for svc in &svcs {
        assert_eq!(svc.starts(), 1);
        assert_eq!(svc.shutdowns(), 1);
    }
    assert_eq!(report.outcomes[1].state, ServiceState::Failed);
    assert_eq!(report.outcomes[0].state, ServiceState::Stopped);
    assert_eq!(report.warnings().count(), 0);
}

#[tokio::test]
async fn termination_with_healthy_services_is_clean() {
    let (svcs, refs) = four(
        TestService::new("rest"),
        TestService::new("grpc"),
        TestService::new("cron"),
        TestService::new("kafka"),
    );
    let termination = TerminationSource::manual();
    let trigger = termination.trigger();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.fire();
    });

    let report = Supervisor::builder(config(Duration::from_secs(5)))
        .with_services(refs)
        .with_termination(termination)
        .build()
        .run_report()
        .await;

    assert!(report.is_clean());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.trigger, Some(Trigger::ExternalStop));
    for svc in &svcs {
        assert_eq!(svc.shutdowns(), 1);
    }
    assert!(report.outcomes.iter().all(|o| o.state == ServiceState::Stopped));
}

#[tokio::test(start_paused = true)]
async fn stuck_cron_only_produces_a_warning() {
    let (svcs, refs) = four(
        TestService::new("rest"),
        TestService::new("grpc"),
        TestService::new("cron").stop(Stop::Hang),
        TestService::new("kafka"),
    );
    let termination = TerminationSource::manual();
    termination.trigger().fire();

    let grace = Duration::from_secs(5);
    let started = Instant::now();
    let report = Supervisor::builder(config(grace))
        .with_services(refs)
        .with_termination(termination)
        .build()
        .run_report()
        .await;
    let elapsed = started.elapsed();

    assert!(report.is_clean(), "a shutdown timeout never becomes the cause");
    assert!(elapsed < grace + Duration::from_millis(100));

    let warnings: Vec<_> = report.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(&*warnings[0].service, "cron");
    assert_eq!(
        warnings[0].result,
        Err(ShutdownError::DeadlineExceeded { grace })
    );
    assert_eq!(warnings[0].state, ServiceState::Failed);
    for svc in &svcs {
        assert_eq!(svc.shutdowns(), 1);
    }
}

#[tokio::test]
async fn shutdown_error_after_termination_keeps_clean_cause() {
    let (_svcs, refs) = four(
        TestService::new("rest").stop(Stop::Fail(ServiceError::Undrained { pending: 2 })),
        TestService::new("grpc"),
        TestService::new("cron"),
        TestService::new("kafka"),
    );
    let termination = TerminationSource::manual();
    termination.trigger().fire();

    let result = Supervisor::builder(SupervisorConfig::default())
        .with_services(refs)
        .with_termination(termination)
        .build()
        .run()
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn start_failure_stops_started_services_and_skips_the_rest() {
    let (svcs, refs) = four(
        TestService::new("rest"),
        TestService::new("grpc"),
        TestService::new("cron").failing_start("invalid schedule"),
        TestService::new("kafka"),
    );

    let report = Supervisor::builder(SupervisorConfig::default())
        .with_services(refs)
        .with_termination(TerminationSource::manual())
        .build()
        .run_report()
        .await;

    match report.cause.as_ref() {
        Some(RuntimeError::StartFailed { service, error }) => {
            assert_eq!(&**service, "cron");
            assert_eq!(error, &ServiceError::setup("invalid schedule"));
        }
        other => panic!("unexpected cause: {other:?}"),
    }
    assert!(report.trigger.is_none());

    assert_eq!(svcs[0].shutdowns(), 1);
    assert_eq!(svcs[1].shutdowns(), 1);
    assert_eq!(svcs[2].shutdowns(), 0);
    assert_eq!(svcs[3].starts(), 0);
    assert_eq!(svcs[3].shutdowns(), 0);
    assert_eq!(report.outcomes.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn start_timeout_stops_started_and_timed_out_services() {
    let (svcs, refs) = four(
        TestService::new("rest"),
        TestService::new("grpc").hanging_start(),
        TestService::new("cron"),
        TestService::new("kafka"),
    );
    let cfg = SupervisorConfig {
        start_timeout: Duration::from_secs(1),
        ..SupervisorConfig::default()
    };

    let sup = Supervisor::builder(cfg)
        .with_services(refs)
        .with_termination(TerminationSource::manual())
        .build();
    assert_eq!(sup.config().start_timeout(), Some(Duration::from_secs(1)));
    let report = sup.run_report().await;

    let cause = report.cause.as_ref().expect("start timeout is the cause");
    assert!(matches!(
        cause,
        RuntimeError::StartTimedOut { timeout, .. } if *timeout == Duration::from_secs(1)
    ));
    assert_eq!(cause.service(), Some("grpc"));
    assert_eq!(cause.as_label(), "runtime_start_timed_out");
    assert!(report.trigger.is_none());
    assert_eq!(report.exit_code(), 1);

    assert_eq!(svcs[0].shutdowns(), 1);
    assert_eq!(svcs[1].shutdowns(), 1);
    assert_eq!(svcs[2].starts(), 0);
    assert_eq!(svcs[3].starts(), 0);
    assert_eq!(svcs[2].shutdowns() + svcs[3].shutdowns(), 0);

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].state, ServiceState::Stopped);
    assert_eq!(&*report.outcomes[1].service, "grpc");
    assert_eq!(report.outcomes[1].state, ServiceState::Failed);
}

#[tokio::test(start_paused = true)]
async fn unbounded_grace_still_stops_every_service() {
    let (svcs, refs) = four(
        TestService::new("rest"),
        TestService::new("grpc"),
        TestService::new("cron"),
        TestService::new("kafka"),
    );
    let termination = TerminationSource::manual();
    termination.trigger().fire();

    let report = Supervisor::builder(config(Duration::MAX))
        .with_services(refs)
        .with_termination(termination)
        .build()
        .run_report()
        .await;

    assert!(report.is_clean());
    assert_eq!(report.warnings().count(), 0);
    for svc in &svcs {
        assert_eq!(svc.shutdowns(), 1);
    }
}

#[tokio::test]
async fn duplicate_names_are_rejected_before_starting() {
    let a = TestService::new("rest").arc();
    let b = TestService::new("rest").arc();

    let err = Supervisor::builder(SupervisorConfig::default())
        .with_service(a.clone() as ServiceRef)
        .with_service(b.clone() as ServiceRef)
        .with_termination(TerminationSource::manual())
        .build()
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.as_label(), "runtime_duplicate_service");
    assert_eq!(a.starts() + b.starts(), 0);
}

#[tokio::test]
async fn simultaneous_triggers_still_stop_everything() {
    let (svcs, refs) = four(
        TestService::new("rest").fault_after(Duration::ZERO, "a"),
        TestService::new("grpc").fault_after(Duration::ZERO, "b"),
        TestService::new("cron"),
        TestService::new("kafka"),
    );
    let termination = TerminationSource::manual();
    termination.trigger().fire();

    let report = Supervisor::builder(SupervisorConfig::default())
        .with_services(refs)
        .with_termination(termination)
        .build()
        .run_report()
        .await;

    assert!(report.trigger.is_some());
    for svc in &svcs {
        assert_eq!(svc.shutdowns(), 1);
    }
}

#[tokio::test]
async fn subscribers_see_the_whole_run() {
    let (_svcs, refs) = four(
        TestService::new("rest"),
        TestService::new("grpc").fault_after(Duration::from_millis(10), "bind lost"),
        TestService::new("cron"),
        TestService::new("kafka"),
    );
    let recorder = Arc::new(Recorder::default());

    let sup = Supervisor::builder(SupervisorConfig::default())
        .with_services(refs)
        .with_subscriber(recorder.clone())
        .with_termination(TerminationSource::manual())
        .build();
    let mut raw = sup.subscribe();
    let result = sup.run().await;
    assert!(result.is_err());

    assert_eq!(recorder.count(EventKind::ServiceStarted), 4);
    assert_eq!(recorder.count(EventKind::ServiceFaulted), 1);
    assert_eq!(recorder.count(EventKind::ShutdownRequested), 1);
    assert_eq!(recorder.count(EventKind::ServiceStopping), 4);
    assert_eq!(recorder.count(EventKind::ServiceStopped), 4);
    assert_eq!(recorder.kinds().last(), Some(&EventKind::AllStoppedWithin));

    let mut raw_count = 0;
    while raw.recv().await.is_ok() {
        raw_count += 1;
    }
    assert_eq!(raw_count, recorder.kinds().len());
}
