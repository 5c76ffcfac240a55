//! Autorotation Parameter Definitions
//!
//! Defines the `AROT_*` parameter group following ArduPilot helicopter
//! standards.
//!
//! # Parameters
//!
//! - `AROT_ENABLE` - Allow entering autorotation mode (**visible in GCS**)
//! - `AROT_HS_*`, `AROT_COL_FILT_*` - Head speed controller
//! - `AROT_TARG_SP`, `AROT_FWD_ACC_MX`, `AROT_FW_V_*` - Forward speed controller
//! - `AROT_F_*`, `AROT_TD_*`, `AROT_PIT_F_*`, `AROT_POS_*`, `AROT_COL_F_P` - Flare and touchdown
//! - `AROT_BAIL_TIME` - Bailout duration
//! - `AROT_LOG` - Tuning log bitmask
//!
//! Out-of-range values are clamped when loaded. The controller applies its
//! own runtime guards on top (see `AutorotationController::new`).
//!
//! # ArduPilot Compatibility
//!
//! - https://ardupilot.org/heli/docs/traditional-helicopter-autorotation-mode.html

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore};

/// Parameter value kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Float,
}

/// Parameter definition: name, default and allowed range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDef {
    pub name: &'static str,
    pub kind: ParamKind,
    pub default: f32,
    pub min: f32,
    pub max: f32,
}

impl ParamDef {
    const fn int(name: &'static str, default: i32, min: i32, max: i32) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            default: default as f32,
            min: min as f32,
            max: max as f32,
        }
    }

    const fn float(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            default,
            min,
            max,
        }
    }

    fn default_value(&self) -> ParamValue {
        match self.kind {
            ParamKind::Int => ParamValue::Int(self.default as i32),
            ParamKind::Float => ParamValue::Float(self.default),
        }
    }

    fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Stored value clamped to range, or the default when missing/NaN
    fn load(&self, store: &ParameterStore) -> f32 {
        match store.get_f32(self.name) {
            Some(v) if v.is_finite() => v.clamp(self.min, self.max),
            _ => self.default,
        }
    }
}

pub const ENABLE: ParamDef = ParamDef::int("AROT_ENABLE", 0, 0, 1);
pub const HS_P: ParamDef = ParamDef::float("AROT_HS_P", 0.7, 0.3, 1.0);
pub const HS_SET_PT: ParamDef = ParamDef::int("AROT_HS_SET_PT", 1500, 500, 2800);
pub const TARG_SP: ParamDef = ParamDef::int("AROT_TARG_SP", 1100, 800, 2000);
pub const COL_FILT_E: ParamDef = ParamDef::float("AROT_COL_FILT_E", 0.7, 0.1, 2.0);
pub const COL_FILT_G: ParamDef = ParamDef::float("AROT_COL_FILT_G", 0.1, 0.03, 1.0);
pub const FWD_ACC_MX: ParamDef = ParamDef::int("AROT_FWD_ACC_MX", 60, 30, 60);
pub const BAIL_TIME: ParamDef = ParamDef::float("AROT_BAIL_TIME", 2.0, 0.0, 4.0);
pub const HS_SENSOR: ParamDef = ParamDef::int("AROT_HS_SENSOR", 0, 0, 1);
pub const FW_V_P: ParamDef = ParamDef::float("AROT_FW_V_P", 1.0, 0.1, 6.0);
pub const FW_V_FF: ParamDef = ParamDef::float("AROT_FW_V_FF", 0.15, 0.0, 1.0);
pub const TD_VEL_Z: ParamDef = ParamDef::int("AROT_TD_VEL_Z", 50, 30, 200);
pub const F_PERIOD: ParamDef = ParamDef::float("AROT_F_PERIOD", 4.5, 0.5, 8.0);
pub const F_ACCEL_MX: ParamDef = ParamDef::float("AROT_F_ACCEL_MX", 2.0, 1.2, 2.5);
pub const TD_ALT_TARG: ParamDef = ParamDef::int("AROT_TD_ALT_TARG", 50, 30, 150);
pub const LOG: ParamDef = ParamDef::int("AROT_LOG", 0, 0, 3);
pub const F_ZVEL_P: ParamDef = ParamDef::float("AROT_F_ZVEL_P", 0.2, 0.05, 0.5);
pub const COL_FILT_F: ParamDef = ParamDef::float("AROT_COL_FILT_F", 0.5, 0.2, 1.0);
pub const COL_F_P: ParamDef = ParamDef::float("AROT_COL_F_P", 0.2, 0.0, 2.0);
pub const ANGLE_MAX: ParamDef = ParamDef::int("AROT_ANGLE_MAX", 0, 0, 8000);
pub const PIT_F_P: ParamDef = ParamDef::float("AROT_PIT_F_P", 3.0, 0.1, 5.0);
pub const PIT_F_FILT: ParamDef = ParamDef::float("AROT_PIT_F_FILT", 500.0, 0.0, 1000.0);
pub const POS_FILT: ParamDef = ParamDef::float("AROT_POS_FILT", 0.001, 0.0, 10.0);
pub const POS_P: ParamDef = ParamDef::float("AROT_POS_P", 0.5, 0.0, 5.0);
pub const F_FVEL_P: ParamDef = ParamDef::float("AROT_F_FVEL_P", 0.2, 0.05, 0.5);

/// Every `AROT_*` parameter, in ArduPilot index order
pub const ALL: [ParamDef; 25] = [
    ENABLE, HS_P, HS_SET_PT, TARG_SP, COL_FILT_E, COL_FILT_G, FWD_ACC_MX, BAIL_TIME, HS_SENSOR,
    FW_V_P, FW_V_FF, TD_VEL_Z, F_PERIOD, F_ACCEL_MX, TD_ALT_TARG, LOG, F_ZVEL_P, COL_FILT_F,
    COL_F_P, ANGLE_MAX, PIT_F_P, PIT_F_FILT, POS_FILT, POS_P, F_FVEL_P,
];

/// Autorotation parameters loaded from parameter store
#[derive(Debug, Clone, PartialEq)]
pub struct AutorotationParams {
    /// Mode may be entered
    pub enable: bool,
    /// Head speed P gain
    pub hs_p: f32,
    /// Head speed set point (rpm)
    pub hs_set_point: f32,
    /// Glide ground speed target (cm/s)
    pub target_speed_cms: f32,
    /// Collective trim cutoff during entry (Hz)
    pub col_filt_entry_hz: f32,
    /// Collective trim cutoff during glide (Hz)
    pub col_filt_glide_hz: f32,
    /// Forward acceleration limit (cm/s/s)
    pub fwd_accel_max: f32,
    /// Bailout duration (s)
    pub bail_time_s: f32,
    /// RPM sensor instance
    pub rpm_instance: i32,
    /// Forward velocity P gain
    pub fw_v_p: f32,
    /// Forward velocity feed-forward gain
    pub fw_v_ff: f32,
    /// Touchdown descent rate (cm/s, positive)
    pub td_vel_z_cms: f32,
    /// Flare duration (s)
    pub flare_period_s: f32,
    /// Peak flare acceleration (multiple of g)
    pub flare_accel_max_g: f32,
    /// Altitude that ends the flare (cm)
    pub td_alt_target_cm: f32,
    /// Tuning log bitmask
    pub log_bitmask: u8,
    /// Flare vertical velocity P gain
    pub flare_z_vel_p: f32,
    /// Collective trim cutoff during the flare (Hz)
    pub col_filt_flare_hz: f32,
    /// Flare collective P gain
    pub flare_col_p: f32,
    /// Pitch limit (cdeg), 0 = use the attitude controller's lean limit
    pub angle_max_cd: f32,
    /// Flare pitch P gain
    pub flare_pitch_p: f32,
    /// Flare pitch trim cutoff (Hz)
    pub flare_pitch_filt_hz: f32,
    /// Position feed-forward cutoff (Hz)
    pub pos_filt_hz: f32,
    /// Flare altitude P gain
    pub pos_p: f32,
    /// Flare forward velocity P gain
    pub flare_fwd_vel_p: f32,
}

impl Default for AutorotationParams {
    fn default() -> Self {
        Self {
            enable: ENABLE.default != 0.0,
            hs_p: HS_P.default,
            hs_set_point: HS_SET_PT.default,
            target_speed_cms: TARG_SP.default,
            col_filt_entry_hz: COL_FILT_E.default,
            col_filt_glide_hz: COL_FILT_G.default,
            fwd_accel_max: FWD_ACC_MX.default,
            bail_time_s: BAIL_TIME.default,
            rpm_instance: HS_SENSOR.default as i32,
            fw_v_p: FW_V_P.default,
            fw_v_ff: FW_V_FF.default,
            td_vel_z_cms: TD_VEL_Z.default,
            flare_period_s: F_PERIOD.default,
            flare_accel_max_g: F_ACCEL_MX.default,
            td_alt_target_cm: TD_ALT_TARG.default,
            log_bitmask: LOG.default as u8,
            flare_z_vel_p: F_ZVEL_P.default,
            col_filt_flare_hz: COL_FILT_F.default,
            flare_col_p: COL_F_P.default,
            angle_max_cd: ANGLE_MAX.default,
            flare_pitch_p: PIT_F_P.default,
            flare_pitch_filt_hz: PIT_F_FILT.default,
            pos_filt_hz: POS_FILT.default,
            pos_p: POS_P.default,
            flare_fwd_vel_p: F_FVEL_P.default,
        }
    }
}

impl AutorotationParams {
    /// Register autorotation parameters with default values
    ///
    /// `AROT_ENABLE` carries the enable flag; the rest are plain.
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        for def in ALL.iter() {
            let flags = if def.name == ENABLE.name {
                ParamFlags::ENABLE
            } else {
                ParamFlags::empty()
            };
            store.register(def.name, def.default_value(), flags)?;
        }
        Ok(())
    }

    /// Load autorotation parameters from parameter store
    ///
    /// Missing values fall back to defaults, out-of-range values are clamped.
    pub fn from_store(store: &ParameterStore) -> Self {
        // The sensor instance is an index: anything unknown selects 0
        let rpm_instance = match store.get_f32(HS_SENSOR.name) {
            Some(v) if HS_SENSOR.contains(v) => v as i32,
            _ => 0,
        };

        Self {
            enable: ENABLE.load(store) >= 1.0,
            hs_p: HS_P.load(store),
            hs_set_point: HS_SET_PT.load(store),
            target_speed_cms: TARG_SP.load(store),
            col_filt_entry_hz: COL_FILT_E.load(store),
            col_filt_glide_hz: COL_FILT_G.load(store),
            fwd_accel_max: FWD_ACC_MX.load(store),
            bail_time_s: BAIL_TIME.load(store),
            rpm_instance,
            fw_v_p: FW_V_P.load(store),
            fw_v_ff: FW_V_FF.load(store),
            td_vel_z_cms: TD_VEL_Z.load(store),
            flare_period_s: F_PERIOD.load(store),
            flare_accel_max_g: F_ACCEL_MX.load(store),
            td_alt_target_cm: TD_ALT_TARG.load(store),
            log_bitmask: LOG.load(store) as u8,
            flare_z_vel_p: F_ZVEL_P.load(store),
            col_filt_flare_hz: COL_FILT_F.load(store),
            flare_col_p: COL_F_P.load(store),
            angle_max_cd: ANGLE_MAX.load(store),
            flare_pitch_p: PIT_F_P.load(store),
            flare_pitch_filt_hz: PIT_F_FILT.load(store),
            pos_filt_hz: POS_FILT.load(store),
            pos_p: POS_P.load(store),
            flare_fwd_vel_p: F_FVEL_P.load(store),
        }
    }

    /// Validate autorotation parameters
    ///
    /// # Returns
    ///
    /// true if every value is within its allowed range
    pub fn is_valid(&self) -> bool {
        let checks = [
            (ENABLE, if self.enable { 1.0 } else { 0.0 }),
            (HS_P, self.hs_p),
            (HS_SET_PT, self.hs_set_point),
            (TARG_SP, self.target_speed_cms),
            (COL_FILT_E, self.col_filt_entry_hz),
            (COL_FILT_G, self.col_filt_glide_hz),
            (FWD_ACC_MX, self.fwd_accel_max),
            (BAIL_TIME, self.bail_time_s),
            (HS_SENSOR, self.rpm_instance as f32),
            (FW_V_P, self.fw_v_p),
            (FW_V_FF, self.fw_v_ff),
            (TD_VEL_Z, self.td_vel_z_cms),
            (F_PERIOD, self.flare_period_s),
            (F_ACCEL_MX, self.flare_accel_max_g),
            (TD_ALT_TARG, self.td_alt_target_cm),
            (LOG, self.log_bitmask as f32),
            (F_ZVEL_P, self.flare_z_vel_p),
            (COL_FILT_F, self.col_filt_flare_hz),
            (COL_F_P, self.flare_col_p),
            (ANGLE_MAX, self.angle_max_cd),
            (PIT_F_P, self.flare_pitch_p),
            (PIT_F_FILT, self.flare_pitch_filt_hz),
            (POS_FILT, self.pos_filt_hz),
            (POS_P, self.pos_p),
            (F_FVEL_P, self.flare_fwd_vel_p),
        ];
        checks.iter().all(|(def, value)| def.contains(*value))
    }

    /// Enabled copy of the defaults
    pub fn enabled() -> Self {
        Self {
            enable: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let params = AutorotationParams::default();
        assert!(!params.enable);
        assert_eq!(params.hs_set_point, 1500.0);
        assert_eq!(params.target_speed_cms, 1100.0);
        assert_eq!(params.flare_period_s, 4.5);
        assert_eq!(params.angle_max_cd, 0.0);
        assert!(params.is_valid());
    }

    #[test]
    fn test_defaults_within_ranges() {
        for def in ALL.iter() {
            assert!(def.contains(def.default), "{} default out of range", def.name);
        }
    }

    #[test]
    fn test_names_fit_param_id() {
        for def in ALL.iter() {
            assert!(def.name.len() <= crate::parameters::PARAM_NAME_LEN, "{}", def.name);
        }
    }

    #[test]
    fn test_register_defaults() {
        let mut store = ParameterStore::new();
        AutorotationParams::register_defaults(&mut store).unwrap();
        assert_eq!(store.count(), ALL.len());
        assert_eq!(store.get("AROT_HS_SET_PT"), Some(&ParamValue::Int(1500)));
        assert_eq!(store.get("AROT_F_PERIOD"), Some(&ParamValue::Float(4.5)));
        let meta = store.get_metadata("AROT_ENABLE").unwrap();
        assert!(meta.flags.contains(ParamFlags::ENABLE));
    }

    #[test]
    fn test_from_store_defaults() {
        let mut store = ParameterStore::new();
        AutorotationParams::register_defaults(&mut store).unwrap();
        let params = AutorotationParams::from_store(&store);
        assert_eq!(params, AutorotationParams::default());
    }

    #[test]
    fn test_from_store_custom_values() {
        let mut store = ParameterStore::new();
        AutorotationParams::register_defaults(&mut store).unwrap();
        store.set("AROT_ENABLE", ParamValue::Int(1)).unwrap();
        store.set("AROT_BAIL_TIME", ParamValue::Float(0.3)).unwrap();
        store.set("AROT_LOG", ParamValue::Int(3)).unwrap();
        store.set("AROT_TARG_SP", ParamValue::Float(1250.0)).unwrap();

        let params = AutorotationParams::from_store(&store);
        assert!(params.enable);
        assert!((params.bail_time_s - 0.3).abs() < 1e-6);
        assert_eq!(params.log_bitmask, 3);
        assert_eq!(params.target_speed_cms, 1250.0);
    }

    #[test]
    fn test_from_store_clamps() {
        let mut store = ParameterStore::new();
        AutorotationParams::register_defaults(&mut store).unwrap();
        store.set("AROT_FWD_ACC_MX", ParamValue::Int(250)).unwrap();
        store.set("AROT_F_PERIOD", ParamValue::Float(0.1)).unwrap();
        store.set("AROT_HS_SET_PT", ParamValue::Int(100)).unwrap();

        let params = AutorotationParams::from_store(&store);
        assert_eq!(params.fwd_accel_max, 60.0);
        assert_eq!(params.flare_period_s, 0.5);
        assert_eq!(params.hs_set_point, 500.0);
        assert!(params.is_valid());
    }

    #[test]
    fn test_bad_sensor_instance_selects_zero() {
        let mut store = ParameterStore::new();
        AutorotationParams::register_defaults(&mut store).unwrap();
        store.set("AROT_HS_SENSOR", ParamValue::Int(7)).unwrap();
        assert_eq!(AutorotationParams::from_store(&store).rpm_instance, 0);

        store.set("AROT_HS_SENSOR", ParamValue::Int(-2)).unwrap();
        assert_eq!(AutorotationParams::from_store(&store).rpm_instance, 0);

        store.set("AROT_HS_SENSOR", ParamValue::Int(1)).unwrap();
        assert_eq!(AutorotationParams::from_store(&store).rpm_instance, 1);
    }

    #[test]
    fn test_missing_values_use_defaults() {
        let store = ParameterStore::new();
        let params = AutorotationParams::from_store(&store);
        assert_eq!(params, AutorotationParams::default());
    }

    #[test]
    fn test_nan_uses_default() {
        let mut store = ParameterStore::new();
        AutorotationParams::register_defaults(&mut store).unwrap();
        store.set("AROT_HS_P", ParamValue::Float(f32::NAN)).unwrap();
        assert_eq!(AutorotationParams::from_store(&store).hs_p, 0.7);
    }

    #[test]
    fn test_is_valid_detects_out_of_range() {
        let mut params = AutorotationParams::enabled();
        assert!(params.is_valid());
        params.flare_accel_max_g = 4.0;
        assert!(!params.is_valid());
    }
}
