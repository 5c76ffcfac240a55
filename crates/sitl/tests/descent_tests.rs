use heli_arot_core::mode::{AutorotationPhase, ModeError, ModeNumber};
use heli_arot_core::parameters::AutorotationParams;
use heli_arot_sitl::{HeliSimConfig, ScenarioRunner, SimulatorError};

fn rank(phase: AutorotationPhase) -> u8 {
    match phase {
        AutorotationPhase::Entry => 0,
        AutorotationPhase::SteadyGlide => 1,
        AutorotationPhase::Flare => 2,
        AutorotationPhase::TouchDown => 3,
        AutorotationPhase::BailOut => 4,
    }
}

fn flight(config: HeliSimConfig, previous: ModeNumber) -> ScenarioRunner {
    ScenarioRunner::new(config, AutorotationParams::enabled(), previous).unwrap()
}

#[test]
fn test_glide_flare_and_touchdown() {
    let mut runner = flight(HeliSimConfig::default(), ModeNumber::Loiter);
    let report = runner.run(120.0).unwrap();

    assert!(report.landed());
    assert_eq!(report.mode_change, None);
    assert_eq!(report.phases.first(), Some(&AutorotationPhase::Entry));
    assert!(report.visited(AutorotationPhase::SteadyGlide));
    assert!(report.visited(AutorotationPhase::Flare));
    assert_eq!(report.final_phase(), Some(AutorotationPhase::TouchDown));
    assert!(report
        .phases
        .windows(2)
        .all(|pair| rank(pair[0]) < rank(pair[1])));

    // Flare starts a couple of tens of meters up, never at the ground
    let flare_alt = report.flare_altitude_m.unwrap();
    assert!(flare_alt > 5.0 && flare_alt < 60.0, "flare at {flare_alt} m");

    assert!(report.touchdown_speed_ms.unwrap() < 5.0);
    assert!(report.min_collective >= 0.0);
    assert!(report.max_collective <= 1.0);
    assert!(report.max_pitch_target_cd <= 3000.0 + 1e-3);
}

#[test]
fn test_phase_announcements() {
    let mut runner = flight(HeliSimConfig::default(), ModeNumber::Stabilize);
    let report = runner.run(120.0).unwrap();

    let count = |text: &str| report.messages.iter().filter(|m| *m == text).count();
    assert_eq!(count("Autorotation initiated"), 1);
    assert_eq!(count("Entry Phase"), 1);
    assert_eq!(count("SS Glide Phase"), 1);
    assert_eq!(count("Flare Phase"), 1);
    assert_eq!(count("Touchdown Phase"), 1);
    assert_eq!(count("TD Reason Alt") + count("TD Reason Timer"), 1);
    assert_eq!(count("Warning: Poor RPM Sensor Health"), 0);
}

#[test]
fn test_same_seed_same_flight() {
    let config = HeliSimConfig {
        seed: Some(7),
        ..HeliSimConfig::default()
    };
    let a = flight(config.clone(), ModeNumber::Loiter).run(120.0).unwrap();
    let b = flight(config, ModeNumber::Loiter).run(120.0).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_tracking_record_every_tick() {
    let mut runner = flight(HeliSimConfig::default(), ModeNumber::Loiter);
    let report = runner.run_for(1.0);
    assert!(!runner.is_finished());
    assert_eq!(report.ticks, 400);
    assert_eq!(runner.vehicle().record_count("ARTR"), 400);
    // Glide and flare tuning logs are off by default
    assert_eq!(runner.vehicle().record_count("AR1G"), 0);
}

#[test]
fn test_rpm_failure_commands_minimum_collective() {
    let config = HeliSimConfig {
        rpm_failure_at_s: Some(3.0),
        ..HeliSimConfig::default()
    };
    let mut runner = flight(config, ModeNumber::Loiter);
    let report = runner.run_for(4.0);

    assert_eq!(report.min_collective, -1.0);
    assert_eq!(runner.vehicle().collective_cmd(), -1.0);
    assert_eq!(
        runner
            .vehicle()
            .message_count("Warning: Poor RPM Sensor Health"),
        1
    );
    assert_eq!(
        runner
            .vehicle()
            .message_count("Action: Minimum Collective Applied"),
        1
    );
}

#[test]
fn test_sparse_rpm_dropouts_are_ridden_through() {
    let config = HeliSimConfig {
        rpm_dropout_probability: 0.05,
        seed: Some(3),
        ..HeliSimConfig::default()
    };
    let report = flight(config, ModeNumber::Loiter).run(120.0).unwrap();
    assert!(report.landed());
    assert!(report.min_collective >= 0.0);
    assert!(!report
        .messages
        .iter()
        .any(|m| m == "Warning: Poor RPM Sensor Health"));
}

#[test]
fn test_bailout_returns_to_previous_mode() {
    let config = HeliSimConfig {
        initial_altitude_m: 300.0,
        interlock_at_s: Some(10.0),
        ..HeliSimConfig::default()
    };
    let mut runner = flight(config, ModeNumber::Loiter);
    let report = runner.run(60.0).unwrap();

    assert_eq!(report.mode_change, Some(ModeNumber::Loiter));
    assert_eq!(report.final_phase(), Some(AutorotationPhase::BailOut));
    assert!(!report.visited(AutorotationPhase::Flare));
    assert!(!report.landed());
    assert!(
        report.elapsed_s > 11.9 && report.elapsed_s < 12.2,
        "bailout finished at {} s",
        report.elapsed_s
    );
    assert!(report.messages.iter().any(|m| m == "Bailing Out of Autorotation"));
}

#[test]
fn test_bailout_from_mission_goes_to_alt_hold() {
    let config = HeliSimConfig {
        initial_altitude_m: 300.0,
        interlock_at_s: Some(5.0),
        ..HeliSimConfig::default()
    };
    let report = flight(config, ModeNumber::Auto).run(60.0).unwrap();
    assert_eq!(report.mode_change, Some(ModeNumber::AltHold));
}

#[test]
fn test_disabled_mode_refused() {
    let result = ScenarioRunner::new(
        HeliSimConfig::default(),
        AutorotationParams::default(),
        ModeNumber::Loiter,
    );
    assert!(matches!(
        result,
        Err(SimulatorError::ModeRefused(ModeError::NotEnabled))
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let config = HeliSimConfig {
        step_size_us: 0,
        ..HeliSimConfig::default()
    };
    let result = ScenarioRunner::new(config, AutorotationParams::enabled(), ModeNumber::Loiter);
    assert!(matches!(result, Err(SimulatorError::InvalidConfig(_))));
}

#[test]
fn test_timeout_reported() {
    let mut runner = flight(HeliSimConfig::default(), ModeNumber::Loiter);
    let result = runner.run(1.0);
    assert!(matches!(result, Err(SimulatorError::Timeout { .. })));
}
