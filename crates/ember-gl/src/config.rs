// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Renderer configuration, loaded from RON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Capabilities;

/// Raw value of `GL_SCISSOR_TEST`.
const GL_SCISSOR_TEST: u32 = 0x0C11;

/// The OpenGL feature level a renderer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GlVersion {
    /// OpenGL 2.0: no vertex array objects, no sRGB textures.
    Gl20,
    /// OpenGL 2.1: no vertex array objects.
    Gl21,
    /// OpenGL 3.3 core.
    #[default]
    Gl33,
}

impl GlVersion {
    /// Whether vertex array objects are available.
    pub fn has_vertex_array_objects(self) -> bool {
        matches!(self, GlVersion::Gl33)
    }

    /// Whether sRGB texture formats are available.
    pub fn has_srgb_textures(self) -> bool {
        !matches!(self, GlVersion::Gl20)
    }

    /// The execution mode used when the configuration does not pick one.
    pub fn default_execution(self) -> ExecutionMode {
        match self {
            GlVersion::Gl20 | GlVersion::Gl21 => ExecutionMode::Immediate,
            GlVersion::Gl33 => ExecutionMode::Deferred,
        }
    }
}

/// When recorded commands reach the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Every recorded command is executed as soon as it is recorded.
    Immediate,
    /// Commands are executed when the frame is presented.
    Deferred,
}

/// Behaviours kept for compatibility with content authored against older
/// builds of the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatQuirks {
    /// When set, `RcSetGlobalState` decides whether to disable the scissor
    /// test by testing its disable mask against the raw `GL_SCISSOR_TEST`
    /// enum value (`0x0C11`) instead of the scissor capability bit.
    pub scissor_disable_tests_gl_enum: bool,
}

impl CompatQuirks {
    /// The quirks a given version ships with.
    pub fn for_version(version: GlVersion) -> Self {
        Self {
            scissor_disable_tests_gl_enum: matches!(version, GlVersion::Gl33),
        }
    }

    /// Whether disabling `mask` turns the scissor test off.
    pub fn disables_scissor(&self, mask: Capabilities) -> bool {
        if self.scissor_disable_tests_gl_enum {
            mask.bits() & GL_SCISSOR_TEST != 0
        } else {
            mask.contains(Capabilities::SCISSOR_TEST)
        }
    }
}

/// Configuration of a [`crate::Renderer`] and its [`crate::GlServer`].
///
/// Every field is optional in the RON text; missing fields take their
/// defaults and the version-dependent ones resolve against `gl_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// The targeted OpenGL version.
    pub gl_version: GlVersion,
    /// Overrides the version's default execution mode.
    pub execution: Option<ExecutionMode>,
    /// Caps the number of texture units handed out to shaders. The driver's
    /// own limit still applies.
    pub max_texture_units: Option<u32>,
    /// Upper bound for anisotropic filtering requests.
    pub anisotropy_limit: f32,
    /// Overrides the version's default compatibility quirks.
    pub quirks: Option<CompatQuirks>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            gl_version: GlVersion::default(),
            execution: None,
            max_texture_units: None,
            anisotropy_limit: 16.0,
            quirks: None,
        }
    }
}

impl RendererConfig {
    /// A default configuration for `version`.
    pub fn for_version(version: GlVersion) -> Self {
        Self {
            gl_version: version,
            ..Self::default()
        }
    }

    /// The effective execution mode.
    pub fn execution_mode(&self) -> ExecutionMode {
        self.execution
            .unwrap_or_else(|| self.gl_version.default_execution())
    }

    /// The effective compatibility quirks.
    pub fn quirks(&self) -> CompatQuirks {
        self.quirks
            .unwrap_or_else(|| CompatQuirks::for_version(self.gl_version))
    }

    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Loads a configuration from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        log::debug!("Loaded renderer configuration from {}", path.display());
        Ok(config)
    }

    /// Serializes the configuration to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }
}
