//! Simulation configuration with TOML persistence.

use std::error::Error;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::physics::math::Scalar;

/// Top-level configuration. Currently physics only; kept nested so future
/// sections (rendering, input) slot in without breaking saved files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
}

impl SimulationConfig {
    /// Loads configuration from a TOML file, falling back to defaults if the
    /// file is missing or malformed.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!(
                        "Failed to parse config file {}: {}. Using defaults.",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(_) => {
                log::info!(
                    "No config file found at {}. Using defaults.",
                    path.display()
                );
                Self::default()
            }
        }
    }

    /// Saves the configuration as pretty-printed TOML.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn Error>> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravitational constant in simulation units.
    pub gravitational_constant: Scalar,
    /// Hard speed limit for bodies.
    pub speed_of_light: Scalar,
    /// Scale applied to the first kick of a body starting from rest.
    pub speed_scale: Scalar,
    /// Softening length added to pairwise distances to avoid singular
    /// accelerations at close range.
    pub softening: Scalar,
    /// Barnes-Hut opening angle; lower is more accurate and slower.
    pub octree_theta: Scalar,
    /// Octree cells never subdivide below this width.
    pub octree_min_width: Scalar,
    /// Fractional padding applied to the cube enclosing all bodies.
    pub world_padding: Scalar,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: 67.0,
            speed_of_light: 1e4,
            speed_scale: 1.0,
            softening: 700.0,
            octree_theta: 0.5,
            octree_min_width: 1.0,
            world_padding: 0.1,
        }
    }
}
