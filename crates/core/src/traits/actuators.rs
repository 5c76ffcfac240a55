//! Actuator collaborator traits
//!
//! The autorotation mode treats the motor library, the attitude controller
//! and the vertical position controller as black boxes. These traits pin
//! down the slice of their interfaces the mode drives.

/// Desired motor spool state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpoolState {
    /// Motors stopped
    #[default]
    ShutDown,
    /// Motors at ground idle
    GroundIdle,
    /// Full throttle authority
    ThrottleUnlimited,
}

/// Motor output library (collective / throttle channel)
pub trait MotorOutput {
    /// Cutoff frequency of the motor library's own throttle filter (Hz)
    fn set_throttle_filter_cutoff(&mut self, cutoff_hz: f32);

    /// Collective command, 0..1, or −1 for "minimum collective"
    fn set_throttle(&mut self, collective: f32);

    /// Request a spool state change
    fn set_desired_spool_state(&mut self, state: SpoolState);

    /// True when the rotor drivetrain interlock is engaged (power available)
    fn interlock_engaged(&self) -> bool;
}

/// Attitude controller
pub trait AttitudeControl {
    /// Configured maximum lean angle (cdeg)
    fn lean_angle_max_cd(&self) -> f32;

    /// Roll and pitch angle targets (cdeg) with a yaw rate target (cdeg/s)
    fn input_euler_angle_roll_pitch_euler_rate_yaw(
        &mut self,
        roll_cd: f32,
        pitch_cd: f32,
        yaw_rate_cds: f32,
    );
}

/// Vertical position controller
pub trait PositionControl {
    /// True if the vertical controller ran recently
    fn is_active_z(&self) -> bool;

    /// Reset the altitude-hold controllers, handing over the given throttle
    fn relax_alt_hold_controllers(&mut self, throttle_setting: f32);

    /// Vertical speed limits (cm/s); `speed_down` is negative or zero
    fn set_max_speed_z(&mut self, speed_down_cms: f32, speed_up_cms: f32);

    /// Vertical acceleration limit (cm/s/s)
    fn set_max_accel_z(&mut self, accel_cmss: f32);

    /// Move the altitude target at `climb_rate_cms` for one step of `dt`
    fn set_alt_target_from_climb_rate(&mut self, climb_rate_cms: f32, dt: f32, force_descend: bool);

    /// Run the vertical controller
    fn update_z_controller(&mut self);
}

// ============================================================================
// Mock Implementations (always available for testing)
// ============================================================================

/// Motor library recording the last commands
#[derive(Debug, Clone, Default)]
pub struct MockMotors {
    pub throttle: f32,
    pub throttle_filter_cutoff: f32,
    pub spool_state: SpoolState,
    pub interlock: bool,
    /// Number of `set_throttle` calls
    pub throttle_writes: u32,
}

impl MotorOutput for MockMotors {
    fn set_throttle_filter_cutoff(&mut self, cutoff_hz: f32) {
        self.throttle_filter_cutoff = cutoff_hz;
    }

    fn set_throttle(&mut self, collective: f32) {
        self.throttle = collective;
        self.throttle_writes += 1;
    }

    fn set_desired_spool_state(&mut self, state: SpoolState) {
        self.spool_state = state;
    }

    fn interlock_engaged(&self) -> bool {
        self.interlock
    }
}

/// Attitude controller recording the last angle targets
#[derive(Debug, Clone)]
pub struct MockAttitudeControl {
    pub lean_angle_max_cd: f32,
    pub roll_cd: f32,
    pub pitch_cd: f32,
    pub yaw_rate_cds: f32,
}

impl Default for MockAttitudeControl {
    fn default() -> Self {
        Self {
            lean_angle_max_cd: 3000.0,
            roll_cd: 0.0,
            pitch_cd: 0.0,
            yaw_rate_cds: 0.0,
        }
    }
}

impl AttitudeControl for MockAttitudeControl {
    fn lean_angle_max_cd(&self) -> f32 {
        self.lean_angle_max_cd
    }

    fn input_euler_angle_roll_pitch_euler_rate_yaw(
        &mut self,
        roll_cd: f32,
        pitch_cd: f32,
        yaw_rate_cds: f32,
    ) {
        self.roll_cd = roll_cd;
        self.pitch_cd = pitch_cd;
        self.yaw_rate_cds = yaw_rate_cds;
    }
}

/// Vertical position controller recording its configuration
#[derive(Debug, Clone, Default)]
pub struct MockPositionControl {
    pub active_z: bool,
    pub relaxed_throttle: Option<f32>,
    pub max_speed_down_cms: f32,
    pub max_speed_up_cms: f32,
    pub max_accel_z_cmss: f32,
    pub climb_rate_cms: f32,
    pub force_descend: bool,
    pub z_updates: u32,
}

impl PositionControl for MockPositionControl {
    fn is_active_z(&self) -> bool {
        self.active_z
    }

    fn relax_alt_hold_controllers(&mut self, throttle_setting: f32) {
        self.relaxed_throttle = Some(throttle_setting);
        self.active_z = true;
    }

    fn set_max_speed_z(&mut self, speed_down_cms: f32, speed_up_cms: f32) {
        self.max_speed_down_cms = speed_down_cms;
        self.max_speed_up_cms = speed_up_cms;
    }

    fn set_max_accel_z(&mut self, accel_cmss: f32) {
        self.max_accel_z_cmss = accel_cmss;
    }

    fn set_alt_target_from_climb_rate(&mut self, climb_rate_cms: f32, _dt: f32, force_descend: bool) {
        self.climb_rate_cms = climb_rate_cms;
        self.force_descend = force_descend;
    }

    fn update_z_controller(&mut self) {
        self.z_updates += 1;
    }
}
