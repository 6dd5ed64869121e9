//! Surface configuration.
//!
//! The recognized options are exactly the constructor-time surface
//! parameters: axis, direction, friction, and resistance. Engine tuning
//! values (tick rate, debounce interval, thresholds) are fixed constants in
//! the modules that own them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::geometry::{Axis, Direction};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Axes that participate in drag and inertia
    #[serde(default = "default_axis")]
    pub axis: Axis,
    /// Scroll direction (normal = measured from the near edge)
    #[serde(default = "default_direction")]
    pub direction: Direction,
    /// Deceleration coefficient applied while the surface settles (>= 0)
    #[serde(default = "default_friction")]
    pub friction: f64,
    /// Stiffness of the elastic pull-back past the scroll bounds (> 0)
    #[serde(default = "default_resistance")]
    pub resistance: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            axis: default_axis(),
            direction: default_direction(),
            friction: default_friction(),
            resistance: default_resistance(),
        }
    }
}

fn default_axis() -> Axis {
    Axis::Vertical
}

fn default_direction() -> Direction {
    Direction::Normal
}

fn default_friction() -> f64 {
    1.0
}

fn default_resistance() -> f64 {
    1.0
}

impl SurfaceConfig {
    /// Check that the physics parameters are usable.
    ///
    /// `resistance` must be strictly positive: the elastic term divides by
    /// it. `friction` may be zero (no inertial decay) but not negative.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.friction.is_finite() || self.friction < 0.0 {
            return Err(crate::Error::Config(format!(
                "friction must be finite and >= 0, got {}",
                self.friction
            )));
        }
        if !self.resistance.is_finite() || self.resistance <= 0.0 {
            return Err(crate::Error::Config(format!(
                "resistance must be finite and > 0, got {}",
                self.resistance
            )));
        }
        Ok(())
    }

    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Self =
                toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/flick/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("flick")
            .join("config.toml")
    }
}
