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

//! Error types of the OpenGL backend.

use crate::types::{FramebufferId, FramebufferStatus, ShaderId, ShaderStage};

/// An error raised by the OpenGL backend.
///
/// Resource failures detected while commands execute are not returned to the
/// caller that recorded the command: they are logged and posted to the
/// server's error channel instead (see [`crate::GlServer::errors`]).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GlError {
    /// The driver context could not be created.
    #[error("failed to create the OpenGL device: {0}")]
    DeviceCreation(String),
    /// A shader stage failed to compile.
    #[error("{stage:?} shader of {shader:?} failed to compile: {log}")]
    ShaderCompilation {
        /// The shader program the stage belongs to.
        shader: ShaderId,
        /// The stage that failed.
        stage: ShaderStage,
        /// The driver's info log.
        log: String,
    },
    /// The program failed to link.
    #[error("shader {shader:?} failed to link: {log}")]
    ProgramLink {
        /// The shader program.
        shader: ShaderId,
        /// The driver's info log.
        log: String,
    },
    /// A framebuffer was found incomplete after its attachments changed.
    #[error("framebuffer {framebuffer:?} is incomplete: {status:?}")]
    FramebufferIncomplete {
        /// The checked framebuffer.
        framebuffer: FramebufferId,
        /// The status reported by the driver.
        status: FramebufferStatus,
    },
    /// The render thread is gone.
    #[error("the render thread has disconnected")]
    RenderThreadDisconnected,
}

/// An error raised while loading a [`crate::RendererConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read renderer configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration text is not valid RON for a renderer configuration.
    #[error("failed to parse renderer configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The configuration could not be serialized.
    #[error("failed to serialize renderer configuration: {0}")]
    Serialize(#[from] ron::Error),
}
