//! Pilot stick input
//!
//! During autorotation the pilot keeps roll and yaw. The throttle stick is
//! only read when bailing out, to pick the climb rate to hand back with.

/// Pilot stick interpretation provided by the vehicle
pub trait PilotInput {
    /// Desired roll and pitch lean angles (cdeg), limited to `angle_max_cd`
    fn desired_lean_angles_cd(&self, angle_max_cd: f32) -> (f32, f32);

    /// Desired yaw rate (cdeg/s)
    fn desired_yaw_rate_cds(&self) -> f32;

    /// Climb rate requested by the throttle stick (cm/s, positive up)
    fn desired_climb_rate_cms(&self) -> f32;

    /// Maximum pilot climb rate (cm/s)
    fn pilot_speed_up_cms(&self) -> f32;

    /// Maximum pilot descent rate, as a positive magnitude (cm/s)
    fn pilot_speed_dn_cms(&self) -> f32;
}

/// Pilot with sticks held at programmable positions
#[derive(Debug, Clone)]
pub struct MockPilot {
    pub roll_cd: f32,
    pub pitch_cd: f32,
    pub yaw_rate_cds: f32,
    pub climb_rate_cms: f32,
    pub speed_up_cms: f32,
    pub speed_dn_cms: f32,
}

impl Default for MockPilot {
    fn default() -> Self {
        Self {
            roll_cd: 0.0,
            pitch_cd: 0.0,
            yaw_rate_cds: 0.0,
            climb_rate_cms: 0.0,
            speed_up_cms: 250.0,
            speed_dn_cms: 150.0,
        }
    }
}

impl PilotInput for MockPilot {
    fn desired_lean_angles_cd(&self, angle_max_cd: f32) -> (f32, f32) {
        (
            self.roll_cd.clamp(-angle_max_cd, angle_max_cd),
            self.pitch_cd.clamp(-angle_max_cd, angle_max_cd),
        )
    }

    fn desired_yaw_rate_cds(&self) -> f32 {
        self.yaw_rate_cds
    }

    fn desired_climb_rate_cms(&self) -> f32 {
        self.climb_rate_cms
    }

    fn pilot_speed_up_cms(&self) -> f32 {
        self.speed_up_cms
    }

    fn pilot_speed_dn_cms(&self) -> f32 {
        self.speed_dn_cms
    }
}
