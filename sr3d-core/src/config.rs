/// Renderer configuration loaded from TOML
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::{CameraPose, CameraSettings};
use crate::error::ConfigError;
use crate::math::{HomogeneousExt, Vec4};

/// Fallback surface size when the terminal size is unavailable
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl ViewportConfig {
    /// Size as terminal cells, saturating at `u16::MAX`
    pub fn cell_size(&self) -> (u16, u16) {
        let cells = |extent: u32| u16::try_from(extent).unwrap_or(u16::MAX);
        (cells(self.width), cells(self.height))
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub front: [f32; 3],
    pub up: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        let settings = CameraSettings::default();
        Self {
            fov: settings.fov,
            near: settings.near,
            far: settings.far,
            position: [0.0, 0.0, 3.0],
            front: [0.0, 0.0, -1.0],
            up: [0.0, 1.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Draw each visible face's normal
    pub normals: bool,
    pub normal_length: f32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            normals: false,
            normal_length: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// World units per second
    pub movement_speed: f32,
    /// Degrees per second for yaw/pitch and model roll
    pub turn_speed: f32,
    /// Idle model spin in degrees per second
    pub spin: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            movement_speed: 2.5,
            turn_speed: 90.0,
            spin: 20.0,
        }
    }
}

/// Top-level renderer configuration; every section is optional in the file
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub viewport: ViewportConfig,
    pub camera: CameraConfig,
    pub debug: DebugConfig,
    pub controls: ControlsConfig,
}

impl RendererConfig {
    /// Load configuration from a `.toml` file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !has_toml_extension(path) {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if !has_toml_extension(path) {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }

        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn camera_settings(&self, aspect_ratio: f32) -> CameraSettings {
        CameraSettings::new(self.camera.fov, aspect_ratio, self.camera.near, self.camera.far)
    }

    pub fn camera_pose(&self) -> CameraPose {
        let [x, y, z] = self.camera.position;
        let [fx, fy, fz] = self.camera.front;
        let [ux, uy, uz] = self.camera.up;
        CameraPose::new(
            Vec4::point(x, y, z),
            Vec4::direction(fx, fy, fz),
            Vec4::direction(ux, uy, uz),
        )
    }
}

fn has_toml_extension(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("toml")
}
