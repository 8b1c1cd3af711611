//! Configuration loading for Sarathi

use crate::error::{Result, SarathiError};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SarathiConfig {
    #[serde(default)]
    pub rrt: RrtConfig,
    #[serde(default)]
    pub pilot: PilotConfig,
    #[serde(default)]
    pub motion: MotionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// RRT planner settings
#[derive(Clone, Debug, Deserialize)]
pub struct RrtConfig {
    /// Iteration budget before giving up (default: 5000)
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Extension step length in mm (default: 10)
    #[serde(default = "default_step_size")]
    pub step_size: f32,

    /// Probability of sampling the other tree's root instead of a random point
    #[serde(default = "default_goal_bias")]
    pub goal_bias: f32,

    /// Padding around obstacles/start/goal for the sampling region (mm)
    #[serde(default = "default_sample_margin")]
    pub sample_margin: f32,

    /// Robot footprint length along its heading (mm)
    #[serde(default = "default_robot_length")]
    pub robot_length: f32,

    /// Robot footprint width (mm)
    #[serde(default = "default_robot_width")]
    pub robot_width: f32,

    /// Fixed RNG seed; random sampling when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Pilot behaviour settings
#[derive(Clone, Debug, Deserialize)]
pub struct PilotConfig {
    /// Maximum distance between achieved and requested position (mm)
    #[serde(default = "default_arrival_tolerance")]
    pub arrival_tolerance: f32,

    /// Log tree sizes and raw paths after each plan
    #[serde(default)]
    pub verbose: bool,

    /// RRT step size used by the push-to-pose pilot (mm)
    #[serde(default = "default_push_step_size")]
    pub push_step_size: f32,
}

/// Motion task settings
#[derive(Clone, Debug, Deserialize)]
pub struct MotionConfig {
    /// Telemetry poll interval of background motion tasks
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Distance the simulated robot covers per poll (mm)
    #[serde(default = "default_sim_speed")]
    pub sim_speed: f32,
}

/// Logging settings
#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing directive, overridden by RUST_LOG
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for RrtConfig {
    fn default() -> Self {
        Self {
            max_iter: default_max_iter(),
            step_size: default_step_size(),
            goal_bias: default_goal_bias(),
            sample_margin: default_sample_margin(),
            robot_length: default_robot_length(),
            robot_width: default_robot_width(),
            seed: None,
        }
    }
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            arrival_tolerance: default_arrival_tolerance(),
            verbose: false,
            push_step_size: default_push_step_size(),
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            sim_speed: default_sim_speed(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

// Default value functions
fn default_max_iter() -> usize {
    5000
}
fn default_step_size() -> f32 {
    10.0
}
fn default_goal_bias() -> f32 {
    0.1
}
fn default_sample_margin() -> f32 {
    300.0
}
fn default_robot_length() -> f32 {
    90.0
}
fn default_robot_width() -> f32 {
    60.0
}
fn default_arrival_tolerance() -> f32 {
    50.0
}
fn default_push_step_size() -> f32 {
    20.0
}
fn default_poll_interval_ms() -> u64 {
    50
}
fn default_sim_speed() -> f32 {
    40.0
}
fn default_log_filter() -> String {
    "sarathi=info".to_string()
}

impl RrtConfig {
    /// Reject settings that would stall or crash the planner.
    pub fn validate(&self) -> Result<()> {
        positive("rrt.step_size", self.step_size)?;
        positive("rrt.robot_length", self.robot_length)?;
        positive("rrt.robot_width", self.robot_width)?;
        if !(0.0..=1.0).contains(&self.goal_bias) {
            return Err(SarathiError::Config(format!(
                "rrt.goal_bias must be within [0, 1], got {}",
                self.goal_bias
            )));
        }
        if !(self.sample_margin.is_finite() && self.sample_margin >= 0.0) {
            return Err(SarathiError::Config(format!(
                "rrt.sample_margin must not be negative, got {}",
                self.sample_margin
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SarathiError::Config(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

impl SarathiConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SarathiError::Config(format!("Failed to read config file: {}", e)))?;
        let config: SarathiConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the planner or pilot cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.rrt.validate()?;
        if !(self.pilot.push_step_size.is_finite() && self.pilot.push_step_size > 0.0) {
            return Err(SarathiError::Config(format!(
                "pilot.push_step_size must be positive, got {}",
                self.pilot.push_step_size
            )));
        }
        if self.pilot.arrival_tolerance < 0.0 {
            return Err(SarathiError::Config(
                "pilot.arrival_tolerance must not be negative".to_string(),
            ));
        }
        if self.motion.poll_interval_ms == 0 {
            return Err(SarathiError::Config(
                "motion.poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
