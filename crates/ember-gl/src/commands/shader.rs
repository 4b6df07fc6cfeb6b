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

//! Shader program commands.

use ember_core::{Poolable, RenderCommand};

use crate::device::GlDevice;
use crate::error::GlError;
use crate::server::GlServer;
use crate::state::ShaderState;
use crate::types::{ShaderId, ShaderStage, TextureId, UniformValue};

/// Compiles and links a program from vertex and fragment sources.
///
/// A program that fails to build keeps an entry with a `0` native name; the
/// failure is logged and posted to the server's error channel.
#[derive(Debug, Clone, Default)]
pub struct RcCreateShader {
    pub shader: Option<ShaderId>,
    pub vertex_source: String,
    pub fragment_source: String,
}

impl Poolable for RcCreateShader {
    fn reset(&mut self) {
        self.shader = None;
        self.vertex_source.clear();
        self.fragment_source.clear();
    }
}

fn compile_stage(
    device: &mut dyn GlDevice,
    stage: ShaderStage,
    source: &str,
) -> Result<u32, String> {
    let shader = device.create_shader(stage);
    device.shader_source(shader, source);
    device.compile_shader(shader);
    if device.shader_compile_status(shader) {
        Ok(shader)
    } else {
        let log = device.shader_info_log(shader);
        device.delete_shader(shader);
        Err(log)
    }
}

fn build_program(
    device: &mut dyn GlDevice,
    id: ShaderId,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<u32, GlError> {
    let vertex = compile_stage(device, ShaderStage::Vertex, vertex_source).map_err(|log| {
        GlError::ShaderCompilation {
            shader: id,
            stage: ShaderStage::Vertex,
            log,
        }
    })?;
    let fragment = match compile_stage(device, ShaderStage::Fragment, fragment_source) {
        Ok(fragment) => fragment,
        Err(log) => {
            device.delete_shader(vertex);
            return Err(GlError::ShaderCompilation {
                shader: id,
                stage: ShaderStage::Fragment,
                log,
            });
        }
    };

    let program = device.create_program();
    device.attach_shader(program, vertex);
    device.attach_shader(program, fragment);
    device.link_program(program);
    let linked = device.program_link_status(program);
    let log = device.program_info_log(program);

    // The program keeps what it needs once linked.
    device.detach_shader(program, vertex);
    device.detach_shader(program, fragment);
    device.delete_shader(vertex);
    device.delete_shader(fragment);

    if linked {
        Ok(program)
    } else {
        device.delete_program(program);
        Err(GlError::ProgramLink { shader: id, log })
    }
}

impl RenderCommand<GlServer> for RcCreateShader {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.shader else {
            return;
        };
        let native = match build_program(
            &mut *server.device,
            id,
            &self.vertex_source,
            &self.fragment_source,
        ) {
            Ok(program) => program,
            Err(error) => {
                server.post_error(error);
                0
            }
        };
        self.vertex_source.clear();
        self.fragment_source.clear();
        server.state.shaders.insert(id, ShaderState::new(native));
    }
}

/// A batch of uniform and sampler changes for one shader.
///
/// Uniform names are resolved on the consumer thread. Writes are applied in
/// the order they were requested; sampler bindings follow the value writes.
#[derive(Debug, Clone, Default)]
pub struct RcSetShaderState {
    shader: Option<ShaderId>,
    uniforms: Vec<(String, UniformValue)>,
    textures: Vec<(String, TextureId)>,
}

impl RcSetShaderState {
    /// Targets `shader`, dropping whatever was requested before.
    pub fn reset_for(&mut self, shader: ShaderId) -> &mut Self {
        self.reset();
        self.shader = Some(shader);
        self
    }

    /// The shader this command changes.
    pub fn shader(&self) -> Option<ShaderId> {
        self.shader
    }

    /// Requests a uniform write. A later write to the same name replaces it.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) -> &mut Self {
        match self.uniforms.iter_mut().find(|(pending, _)| pending == name) {
            Some((_, pending)) => *pending = value,
            None => self.uniforms.push((name.to_owned(), value)),
        }
        self
    }

    /// Requests `texture` to be sampled through the sampler uniform `name`.
    pub fn set_texture(&mut self, name: &str, texture: TextureId) -> &mut Self {
        match self.textures.iter_mut().find(|(pending, _)| pending == name) {
            Some((_, pending)) => *pending = texture,
            None => self.textures.push((name.to_owned(), texture)),
        }
        self
    }
}

impl Poolable for RcSetShaderState {
    fn reset(&mut self) {
        self.shader = None;
        self.uniforms.clear();
        self.textures.clear();
    }
}

impl RenderCommand<GlServer> for RcSetShaderState {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.shader else {
            return;
        };
        if !server.state.shaders.is_live(id) {
            log::debug!("Skipping state change of {id:?}: not live");
            return;
        }
        for (name, value) in &self.uniforms {
            if let Some(location) = server.uniform_location(id, name) {
                server.set_uniform(id, location, *value);
            }
        }
        for (name, texture) in &self.textures {
            if let Some(location) = server.uniform_location(id, name) {
                server.set_texture_uniform(id, location, *texture);
            }
        }
    }
}

/// Makes a shader the program in use.
#[derive(Debug, Clone, Default)]
pub struct RcSetCurrentShader {
    pub shader: Option<ShaderId>,
}

impl Poolable for RcSetCurrentShader {}

impl RenderCommand<GlServer> for RcSetCurrentShader {
    fn execute(&mut self, server: &mut GlServer) {
        server.set_current_shader(self.shader);
    }
}

/// Releases a shader program; the entry is freed one buffer-swap cycle later.
#[derive(Debug, Clone, Default)]
pub struct RcDeleteShader {
    pub shader: Option<ShaderId>,
}

impl Poolable for RcDeleteShader {}

impl RenderCommand<GlServer> for RcDeleteShader {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.shader else {
            return;
        };
        let Some(state) = server.state.shaders.get_mut(id) else {
            log::debug!("Ignoring deletion of {id:?}: not live");
            return;
        };
        let native = std::mem::take(&mut state.native);
        let samplers = std::mem::take(&mut state.samplers);
        state.pending_uniforms.clear();

        for binding in samplers.values() {
            if let Some(texture) = server.state.textures.get_mut(binding.texture) {
                texture.shaders.remove(&id);
            }
        }
        if native != 0 {
            server.shadow.forget_program(native);
            server.device.delete_program(native);
        }
        server.state.mark_shader_as_deleted(id);
    }
}
