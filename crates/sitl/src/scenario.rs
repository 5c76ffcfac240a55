//! Closed-loop scenario runner
//!
//! Drives [`ModeAutorotate`] against a [`SimHeli`] in lockstep: one mode
//! tick, then one model step, until the aircraft is on the ground, the mode
//! hands control back, or time runs out.

use heli_arot::copter::mode::{AutorotateOutput, ModeAutorotate};
use heli_arot_core::mode::{AutorotationPhase, ModeNumber};
use heli_arot_core::parameters::AutorotationParams;
use heli_arot_core::traits::{MotorOutput, TimeSource};

use crate::config::HeliSimConfig;
use crate::error::SimulatorError;
use crate::heli::SimHeli;

/// Summary of a simulated autorotation
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    /// Simulated time at the end of the run (s)
    pub elapsed_s: f32,
    /// Control ticks run
    pub ticks: u32,
    /// Phases in the order they were first flown
    pub phases: Vec<AutorotationPhase>,
    /// Altitude when the flare started (m)
    pub flare_altitude_m: Option<f32>,
    /// Vertical speed at ground contact (m/s, positive down)
    pub touchdown_speed_ms: Option<f32>,
    /// Mode requested by the autorotation on exit
    pub mode_change: Option<ModeNumber>,
    /// Lowest collective output, including the minimum sentinel
    pub min_collective: f32,
    /// Highest collective output
    pub max_collective: f32,
    /// Largest absolute pitch target (cdeg)
    pub max_pitch_target_cd: f32,
    /// Ground station messages, oldest first
    pub messages: Vec<String>,
}

impl ScenarioReport {
    fn new() -> Self {
        Self {
            elapsed_s: 0.0,
            ticks: 0,
            phases: Vec::new(),
            flare_altitude_m: None,
            touchdown_speed_ms: None,
            mode_change: None,
            min_collective: f32::MAX,
            max_collective: f32::MIN,
            max_pitch_target_cd: 0.0,
            messages: Vec::new(),
        }
    }

    /// Final phase flown
    pub fn final_phase(&self) -> Option<AutorotationPhase> {
        self.phases.last().copied()
    }

    pub fn visited(&self, phase: AutorotationPhase) -> bool {
        self.phases.contains(&phase)
    }

    pub fn landed(&self) -> bool {
        self.touchdown_speed_ms.is_some()
    }

    fn record(&mut self, output: &AutorotateOutput, heli: &SimHeli) {
        self.ticks += 1;
        if self.final_phase() != Some(output.phase) {
            if output.phase == AutorotationPhase::Flare {
                self.flare_altitude_m = Some(heli.altitude_m());
            }
            self.phases.push(output.phase);
        }
        self.min_collective = self.min_collective.min(output.collective);
        self.max_collective = self.max_collective.max(output.collective);
        self.max_pitch_target_cd = self.max_pitch_target_cd.max(output.pitch_target_cd.abs());
        if output.mode_change.is_some() {
            self.mode_change = output.mode_change;
        }
    }
}

/// Autorotation mode flying the simulated helicopter
pub struct ScenarioRunner {
    mode: ModeAutorotate<SimHeli>,
    report: ScenarioReport,
    finished: bool,
}

impl ScenarioRunner {
    /// Build the helicopter and enter the autorotation at t = 0.
    pub fn new(
        config: HeliSimConfig,
        params: AutorotationParams,
        previous: ModeNumber,
    ) -> Result<Self, SimulatorError> {
        let dt = config.dt();
        let heli = SimHeli::new(config)?;
        let mut mode = ModeAutorotate::new(heli, params, dt);
        let now_ms = mode.vehicle().millis();
        mode.enter(now_ms, previous)?;
        Ok(Self {
            mode,
            report: ScenarioReport::new(),
            finished: false,
        })
    }

    /// One mode tick followed by one model step.
    ///
    /// Returns false once the run is over: on the ground, or control handed
    /// back to another mode.
    pub fn step(&mut self) -> bool {
        if self.finished {
            return false;
        }

        let heli = self.mode.vehicle();
        let now_ms = heli.millis();
        let interlock = heli.interlock_engaged();
        let landed = heli.is_landed();

        let output = self.mode.tick(now_ms, interlock, landed);
        self.report.record(&output, self.mode.vehicle());

        if landed || output.mode_change.is_some() {
            self.finished = true;
            return false;
        }
        self.mode.vehicle_mut().step();
        true
    }

    /// Run for at most `duration_s` of simulated time.
    pub fn run_for(&mut self, duration_s: f32) -> ScenarioReport {
        while self.mode.vehicle().time_s() < duration_s && self.step() {}
        self.report()
    }

    /// Run until the aircraft lands or the mode exits.
    pub fn run(&mut self, timeout_s: f32) -> Result<ScenarioReport, SimulatorError> {
        let report = self.run_for(timeout_s);
        if self.finished {
            Ok(report)
        } else {
            Err(SimulatorError::Timeout {
                what: "touchdown or mode exit",
                elapsed_s: report.elapsed_s,
            })
        }
    }

    /// Report for the run so far
    pub fn report(&self) -> ScenarioReport {
        let heli = self.mode.vehicle();
        let mut report = self.report.clone();
        report.elapsed_s = heli.time_s();
        report.touchdown_speed_ms = heli.touchdown_speed_ms();
        report.messages = heli.messages().map(str::to_string).collect();
        report
    }

    pub fn mode(&self) -> &ModeAutorotate<SimHeli> {
        &self.mode
    }

    pub fn vehicle(&self) -> &SimHeli {
        self.mode.vehicle()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl std::fmt::Debug for ScenarioRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScenarioRunner")
            .field("vehicle", self.mode.vehicle())
            .field("phase", &self.mode.phase())
            .field("finished", &self.finished)
            .finish()
    }
}
