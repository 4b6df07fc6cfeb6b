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

//! Texture commands.

use ember_core::{Poolable, RenderCommand};

use crate::server::GlServer;
use crate::types::{TextureFilter, TextureFormat, TextureId, TextureWrapMode};

/// Creates the driver object of a 2D texture.
#[derive(Debug, Clone, Default)]
pub struct RcCreateTexture2D {
    pub texture: Option<TextureId>,
}

impl Poolable for RcCreateTexture2D {}

impl RenderCommand<GlServer> for RcCreateTexture2D {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.texture else {
            return;
        };
        let native = server.device.create_texture();
        server
            .state
            .textures
            .insert(id, crate::state::TextureState::new(native));
    }
}

/// Pixels waiting to be uploaded to level 0 of a texture.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureUpload {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// `None` allocates storage without initialising it.
    pub pixels: Option<Vec<u8>>,
}

/// A batch of changes to one 2D texture.
///
/// Requested changes are applied in a fixed order: data upload, filters,
/// wrap mode, anisotropy, then mipmap generation. The upload buffer is
/// released once it reached the driver.
#[derive(Debug, Clone, Default)]
pub struct RcSetTexture2DState {
    texture: Option<TextureId>,
    data: Option<TextureUpload>,
    filters: Option<(TextureFilter, TextureFilter)>,
    wrap: Option<TextureWrapMode>,
    anisotropy: Option<f32>,
    generate_mipmaps: bool,
}

impl RcSetTexture2DState {
    /// Targets `texture`, dropping whatever was requested before.
    pub fn reset_for(&mut self, texture: TextureId) -> &mut Self {
        self.reset();
        self.texture = Some(texture);
        self
    }

    /// The texture this command changes.
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }

    /// Uploads `upload` to level 0.
    pub fn set_data(&mut self, upload: TextureUpload) -> &mut Self {
        self.data = Some(upload);
        self
    }

    /// Requests new sampling filters.
    pub fn set_filters(&mut self, min: TextureFilter, mag: TextureFilter) -> &mut Self {
        self.filters = Some((min, mag));
        self
    }

    /// Requests a new wrap mode.
    pub fn set_wrap_mode(&mut self, wrap: TextureWrapMode) -> &mut Self {
        self.wrap = Some(wrap);
        self
    }

    /// Requests a new anisotropy level.
    pub fn set_anisotropy(&mut self, level: f32) -> &mut Self {
        self.anisotropy = Some(level);
        self
    }

    /// Requests the mipmap chain to be regenerated.
    pub fn generate_mipmaps(&mut self) -> &mut Self {
        self.generate_mipmaps = true;
        self
    }

    /// Whether an upload is still waiting for the driver.
    pub fn has_pending_upload(&self) -> bool {
        self.data.is_some()
    }

    /// Whether mipmap generation was requested.
    pub fn mipmaps_requested(&self) -> bool {
        self.generate_mipmaps
    }
}

impl Poolable for RcSetTexture2DState {}

impl RenderCommand<GlServer> for RcSetTexture2DState {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.texture else {
            return;
        };
        let upload = self.data.take();
        let Some(native) = server.state.textures.get(id).map(|state| state.native) else {
            log::debug!("Skipping state change of {id:?}: not live");
            return;
        };
        let format = upload
            .as_ref()
            .map(|upload| server.supported_texture_format(upload.format));
        let anisotropy = self
            .anisotropy
            .map(|level| level.clamp(1.0, server.anisotropy_limit()));
        let filters = self.filters;
        let wrap = self.wrap;
        let generate_mipmaps = self.generate_mipmaps;

        let device = &mut *server.device;
        server.shadow.with_texture_bound(device, native, |device| {
            if let (Some(upload), Some(format)) = (&upload, format) {
                device.tex_image_2d(
                    0,
                    format,
                    upload.width,
                    upload.height,
                    upload.pixels.as_deref(),
                );
            }
            if let Some((min, mag)) = filters {
                device.tex_filters(min, mag);
            }
            if let Some(wrap) = wrap {
                device.tex_wrap(wrap, wrap);
            }
            if let Some(level) = anisotropy {
                device.tex_anisotropy(level);
            }
            if generate_mipmaps {
                device.generate_mipmap_2d();
            }
        });

        let Some(state) = server.state.textures.get_mut(id) else {
            return;
        };
        if let (Some(upload), Some(format)) = (upload, format) {
            state.width = upload.width;
            state.height = upload.height;
            state.format = Some(format);
            state.has_mipmaps = false;
        }
        if let Some((min, mag)) = filters {
            state.min_filter = min;
            state.mag_filter = mag;
        }
        if let Some(wrap) = wrap {
            state.wrap = wrap;
        }
        if let Some(level) = anisotropy {
            state.anisotropy = level;
        }
        if generate_mipmaps {
            state.has_mipmaps = true;
        }
    }
}

/// Releases a texture. Shaders sampling it lose their binding; the entry is
/// freed one buffer-swap cycle later.
#[derive(Debug, Clone, Default)]
pub struct RcDeleteTexture {
    pub texture: Option<TextureId>,
}

impl Poolable for RcDeleteTexture {}

impl RenderCommand<GlServer> for RcDeleteTexture {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.texture else {
            return;
        };
        let Some(state) = server.state.textures.get_mut(id) else {
            log::debug!("Ignoring deletion of {id:?}: not live");
            return;
        };
        let native = std::mem::take(&mut state.native);
        let shaders = std::mem::take(&mut state.shaders);

        for shader in shaders {
            if let Some(shader_state) = server.state.shaders.get_mut(shader) {
                shader_state
                    .samplers
                    .retain(|_, binding| binding.texture != id);
            }
        }
        server.shadow.forget_texture(native);
        server.device.delete_texture(native);
        server.state.mark_texture_as_deleted(id);
    }
}
