//! Simulation settings
//!
//! Every literal of the warehouse scene lives here: zone layout, truck
//! staging coordinates and the durations of each animated stage. Durations
//! are stored in whole milliseconds so config files stay readable.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::inventory::ZONE_COUNT;

/// Top-level configuration for a warehouse simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Log filter
    pub logging: LoggingConfig,
    /// Scene geometry
    pub layout: LayoutConfig,
    /// Stage durations
    pub timing: TimingConfig,
    /// Truck request policy
    pub transport: TransportConfig,
}

impl SimulationConfig {
    /// Replace the logging section
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Replace the layout section
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the timing section
    pub fn with_timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    /// Replace the transport section
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Check every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.validate()?;
        self.layout.validate()?;
        self.timing.validate()?;
        Ok(())
    }
}

impl Config for SimulationConfig {}

/// Log filter settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl LoggingConfig {
    /// Use another default level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Level must be a known `log` filter
    pub fn validate(&self) -> Result<(), ConfigError> {
        log::LevelFilter::from_str(&self.level)
            .map(|_| ())
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.level)))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Scene geometry in world units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Base position of zone 1
    pub zone_origin: Vec3,
    /// Distance along X between neighbouring zones
    pub zone_spacing: f32,
    /// Label anchor height above a zone base
    pub label_height: f32,
    /// Where the truck parks
    pub truck_home: Vec3,
    /// Where new products appear before dropping
    pub spawn_point: Vec3,
    /// Height of the lowest stacked product
    pub shelf_base_height: f32,
    /// Height added per product already in a zone
    pub stack_step: f32,
    /// Height products are hauled at
    pub truck_bed_height: f32,
    /// Height products settle at inside the truck
    pub truck_floor_height: f32,
    /// Z of the staging lane the truck drives to
    pub staging_z: f32,
    /// X the truck drives off to
    pub departure_x: f32,
}

impl LayoutConfig {
    /// Base position of every zone
    pub fn zone_positions(&self) -> [Vec3; ZONE_COUNT] {
        std::array::from_fn(|i| self.zone_origin + Vec3::new(self.zone_spacing * i as f32, 0.0, 0.0))
    }

    /// Stacking height of the product at `slot` (0 = lowest)
    pub fn stack_height(&self, slot: usize) -> f32 {
        self.shelf_base_height + slot as f32 * self.stack_step
    }

    /// Move the truck's parking spot
    pub fn with_truck_home(mut self, home: Vec3) -> Self {
        self.truck_home = home;
        self
    }

    /// Move the zone row
    pub fn with_zones(mut self, origin: Vec3, spacing: f32) -> Self {
        self.zone_origin = origin;
        self.zone_spacing = spacing;
        self
    }

    /// Geometry must be finite and zones must not overlap
    pub fn validate(&self) -> Result<(), ConfigError> {
        let vectors = [self.zone_origin, self.truck_home, self.spawn_point];
        let scalars = [
            self.zone_spacing,
            self.label_height,
            self.shelf_base_height,
            self.stack_step,
            self.truck_bed_height,
            self.truck_floor_height,
            self.staging_z,
            self.departure_x,
        ];
        if vectors.iter().any(|v| !v.iter().all(|c| c.is_finite()))
            || scalars.iter().any(|s| !s.is_finite())
        {
            return Err(ConfigError::Invalid("layout values must be finite".to_string()));
        }
        if self.zone_spacing <= 0.0 {
            return Err(ConfigError::Invalid("zone spacing must be positive".to_string()));
        }
        if self.stack_step < 0.0 {
            return Err(ConfigError::Invalid("stack step cannot be negative".to_string()));
        }
        Ok(())
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            zone_origin: Vec3::new(-16.0, 0.0, -12.0),
            zone_spacing: 8.0,
            label_height: 8.0,
            truck_home: Vec3::new(10.0, 0.0, 8.0),
            spawn_point: Vec3::new(0.0, 15.0, 0.0),
            shelf_base_height: 2.0,
            stack_step: 0.5,
            truck_bed_height: 3.0,
            truck_floor_height: 2.0,
            staging_z: 15.0,
            departure_x: 30.0,
        }
    }
}

/// Stage durations in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// New product falling onto its shelf
    pub spawn_drop_ms: u64,
    /// Product flying between zones
    pub shuffle_ms: u64,
    /// Load: raise above the shelf
    pub lift_ms: u64,
    /// Load: carry over the truck
    pub haul_ms: u64,
    /// Load: settle into the bed
    pub drop_ms: u64,
    /// Load: wait before the product leaves the scene
    pub stow_grace_ms: u64,
    /// Dispatch: drive to the staging lane
    pub approach_ms: u64,
    /// Dispatch: drive off
    pub depart_ms: u64,
    /// Dispatch: wait before turning
    pub turn_delay_ms: u64,
    /// Dispatch: turn
    pub turn_ms: u64,
    /// Dispatch: wait before snapping home
    pub reset_delay_ms: u64,
    /// Load: how far a product is raised
    pub lift_height: f32,
    /// Dispatch: turn angle in degrees
    pub turn_angle_deg: f32,
}

impl TimingConfig {
    /// Convert a millisecond field
    pub fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Total time from load request until the product leaves the scene
    pub fn load_total(&self) -> Duration {
        Self::ms(self.lift_ms + self.haul_ms + self.drop_ms + self.stow_grace_ms)
    }

    /// Total time from dispatch until the truck is home
    pub fn dispatch_total(&self) -> Duration {
        let position = self.approach_ms + self.depart_ms + self.reset_delay_ms;
        let rotation = self.turn_delay_ms + self.turn_ms + self.reset_delay_ms;
        Self::ms(position.max(rotation))
    }

    /// Tweened stages need a non-zero duration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tweens = [
            ("spawn_drop_ms", self.spawn_drop_ms),
            ("shuffle_ms", self.shuffle_ms),
            ("lift_ms", self.lift_ms),
            ("haul_ms", self.haul_ms),
            ("drop_ms", self.drop_ms),
            ("approach_ms", self.approach_ms),
            ("depart_ms", self.depart_ms),
            ("turn_ms", self.turn_ms),
        ];
        if let Some((name, _)) = tweens.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{} must be greater than zero", name)));
        }
        if !self.lift_height.is_finite() || !self.turn_angle_deg.is_finite() {
            return Err(ConfigError::Invalid("timing amounts must be finite".to_string()));
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            spawn_drop_ms: 1500,
            shuffle_ms: 1000,
            lift_ms: 500,
            haul_ms: 1000,
            drop_ms: 300,
            stow_grace_ms: 200,
            approach_ms: 1000,
            depart_ms: 1500,
            turn_delay_ms: 1000,
            turn_ms: 1500,
            reset_delay_ms: 500,
            lift_height: 2.0,
            turn_angle_deg: 90.0,
        }
    }
}

/// Truck request policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Accept a dispatch while the truck is still out; the new chains
    /// replace the running ones
    pub allow_overlapping_dispatch: bool,
}

impl TransportConfig {
    /// Toggle overlapping dispatch
    pub fn with_overlapping_dispatch(mut self, allow: bool) -> Self {
        self.allow_overlapping_dispatch = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_zone_row() {
        let positions = LayoutConfig::default().zone_positions();
        assert_relative_eq!(positions[0], Vec3::new(-16.0, 0.0, -12.0));
        assert_relative_eq!(positions[4], Vec3::new(16.0, 0.0, -12.0));
    }

    #[test]
    fn test_stack_height() {
        let layout = LayoutConfig::default();
        assert_relative_eq!(layout.stack_height(0), 2.0);
        assert_relative_eq!(layout.stack_height(3), 3.5);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert_eq!(TimingConfig::default().load_total(), Duration::from_millis(2000));
        assert_eq!(TimingConfig::default().dispatch_total(), Duration::from_millis(3000));
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = SimulationConfig::default()
            .with_logging(LoggingConfig::default().with_level("chatty"));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let timing = TimingConfig {
            haul_ms: 0,
            ..TimingConfig::default()
        };
        let config = SimulationConfig::default().with_timing(timing);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let layout = LayoutConfig::default().with_zones(Vec3::zeros(), -1.0);
        let config = SimulationConfig::default().with_layout(layout);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_toml_round_trip_keeps_overrides() {
        let config = SimulationConfig::default()
            .with_transport(TransportConfig::default().with_overlapping_dispatch(true));
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: SimulationConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let parsed: SimulationConfig = ron::from_str("(timing: (lift_ms: 250))").unwrap();
        assert_eq!(parsed.timing.lift_ms, 250);
        assert_eq!(parsed.timing.haul_ms, 1000);
        assert_eq!(parsed.layout, LayoutConfig::default());
    }

    #[test]
    fn test_unsupported_extension() {
        let result = SimulationConfig::load_from_file("warehouse.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
        let result = SimulationConfig::default().save_to_file("warehouse.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
