//! Behavior configuration
//!
//! Every behavior can be built from a plain config struct. A
//! [`SteeringProfile`] bundles all of them and round-trips through RON or
//! JSON, so tuning lives in data files instead of code.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::ai::{
    DEFAULT_MOVING_TOLERANCE, DEFAULT_TRACKING_INTERVAL, VehicleState, WanderStrategy,
};

/// Kinematic tracker settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Sampling interval in seconds
    pub interval: f32,
    /// Speed below which a target counts as stationary
    pub moving_tolerance: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_TRACKING_INTERVAL,
            moving_tolerance: DEFAULT_MOVING_TOLERANCE,
        }
    }
}

/// Pursuit settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitConfig {
    /// Longest look-ahead for the intercept prediction, in seconds
    pub max_prediction_time: f32,
    /// Quarry sampling interval in seconds
    pub tracking_interval: f32,
    /// Speed below which the quarry counts as stationary
    pub moving_tolerance: f32,
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            max_prediction_time: 5.0,
            tracking_interval: DEFAULT_TRACKING_INTERVAL,
            moving_tolerance: DEFAULT_MOVING_TOLERANCE,
        }
    }
}

/// Evasion settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvasionConfig {
    /// Longest look-ahead for the menace prediction, in seconds
    pub prediction_time: f32,
    /// Ignore menaces further away than this
    pub safety_distance: Option<f32>,
    /// Menace sampling interval in seconds
    pub tracking_interval: f32,
    /// Speed below which the menace counts as stationary
    pub moving_tolerance: f32,
}

impl Default for EvasionConfig {
    fn default() -> Self {
        Self {
            prediction_time: 2.0,
            safety_distance: None,
            tracking_interval: DEFAULT_TRACKING_INTERVAL,
            moving_tolerance: DEFAULT_MOVING_TOLERANCE,
        }
    }
}

/// Navigable-surface whisker settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiskerConfig {
    /// Share of the vehicle's max force used for corrections
    pub avoidance_force_factor: f32,
    /// Look-ahead time for the probes, in seconds
    pub min_time_to_collision: f32,
    /// Whisker length relative to the center probe
    pub whisker_length_factor: f32,
    /// Narrowest whisker spread, degrees
    pub min_whisker_angle: f32,
    /// Widest whisker spread, degrees
    pub max_whisker_angle: f32,
    /// Degrees added per tick with a hit
    pub whisker_spread_speed: f32,
    /// Ticks without hits before the whiskers start collapsing
    pub whisker_cooldown: u32,
    /// Degrees removed per tick once cooled down
    pub whisker_collapse_speed: f32,
    /// Check whether the vehicle is still on the surface
    pub off_surface_checking: bool,
    /// Probe offset from the vehicle position for the surface check
    pub probe_position_offset: Vec3,
    /// Tolerance radius for the surface check
    pub probe_radius: f32,
}

impl Default for WhiskerConfig {
    fn default() -> Self {
        Self {
            avoidance_force_factor: 0.1,
            min_time_to_collision: 2.0,
            whisker_length_factor: 0.7,
            min_whisker_angle: 15.0,
            max_whisker_angle: 70.0,
            whisker_spread_speed: 2.0,
            whisker_cooldown: 10,
            whisker_collapse_speed: 2.0,
            off_surface_checking: true,
            probe_position_offset: Vec3::new(0.0, 0.2, 0.0),
            probe_radius: 0.1,
        }
    }
}

/// Tether settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainmentConfig {
    /// Tether center
    pub center: Vec3,
    /// Radius of the free zone
    pub inner_radius: f32,
    /// Radius where pushback reaches full strength
    pub outer_radius: f32,
}

impl Default for ContainmentConfig {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            inner_radius: 20.0,
            outer_radius: 30.0,
        }
    }
}

/// Wander settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    /// Jitter strategy and its parameters
    pub strategy: WanderStrategy,
    /// Fixed seed for the random source; `None` seeds from the OS
    pub seed: Option<u64>,
}

/// Collision-seek settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSeekConfig {
    /// Subtract the vehicle velocity while seeking
    pub consider_velocity: bool,
    /// Count hits on child colliders as hits on the target
    pub consider_sub_colliders: bool,
    /// How far the target must move after contact to be chased again
    pub min_move_distance: f32,
}

impl Default for CollisionSeekConfig {
    fn default() -> Self {
        Self {
            consider_velocity: true,
            consider_sub_colliders: true,
            min_move_distance: 0.5,
        }
    }
}

/// Point-seek settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointConfig {
    /// Point to reach
    pub target: Vec3,
    /// Subtract the vehicle velocity while seeking
    pub consider_velocity: bool,
    /// Stop inside the vehicle's arrival radius
    pub consider_arrival_radius: bool,
}

impl Default for PointConfig {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            consider_velocity: false,
            consider_arrival_radius: true,
        }
    }
}

/// All behavior settings for one kind of vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringProfile {
    /// Profile name
    pub name: String,
    /// Initial vehicle state
    pub vehicle: VehicleState,
    /// Standalone tracker settings
    pub tracker: TrackerConfig,
    /// Pursuit settings
    pub pursuit: PursuitConfig,
    /// Evasion settings
    pub evasion: EvasionConfig,
    /// Whisker settings
    pub whiskers: WhiskerConfig,
    /// Tether settings
    pub containment: ContainmentConfig,
    /// Wander settings
    pub wander: WanderConfig,
    /// Collision-seek settings
    pub collision: CollisionSeekConfig,
    /// Point-seek settings
    pub point: PointConfig,
}

impl Default for SteeringProfile {
    fn default() -> Self {
        Self {
            name: String::from("default"),
            vehicle: VehicleState::default(),
            tracker: TrackerConfig::default(),
            pursuit: PursuitConfig::default(),
            evasion: EvasionConfig::default(),
            whiskers: WhiskerConfig::default(),
            containment: ContainmentConfig::default(),
            wander: WanderConfig::default(),
            collision: CollisionSeekConfig::default(),
            point: PointConfig::default(),
        }
    }
}

impl SteeringProfile {
    /// Parse a profile from RON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid profile
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Render the profile as pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Save the profile to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = self.to_ron_string()?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a profile from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the profile to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a profile from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or deserialization fails
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Load a profile, picking the format from the file extension
    ///
    /// # Errors
    ///
    /// Returns an error for unknown extensions or if loading fails
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::load_ron(path),
            Some("json") => Self::load_json(path),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// File extension is neither `ron` nor `json`
    UnsupportedFormat(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialize error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialize error: {e}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported config format: '{ext}'"),
        }
    }
}

impl std::error::Error for ConfigError {}
