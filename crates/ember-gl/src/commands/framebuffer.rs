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

//! Framebuffer commands.

use ember_core::{Poolable, RenderCommand};

use crate::error::GlError;
use crate::server::GlServer;
use crate::state::FramebufferState;
use crate::types::{Attachment, FramebufferId, FramebufferStatus, TextureId};

/// Creates the driver object of a framebuffer.
#[derive(Debug, Clone, Default)]
pub struct RcCreateFramebuffer {
    pub framebuffer: Option<FramebufferId>,
}

impl Poolable for RcCreateFramebuffer {}

impl RenderCommand<GlServer> for RcCreateFramebuffer {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.framebuffer else {
            return;
        };
        let native = server.device.create_framebuffer();
        server.state.framebuffers.insert(
            id,
            FramebufferState {
                native,
                ..FramebufferState::default()
            },
        );
    }
}

/// A batch of attachment changes for one framebuffer.
///
/// `None` in an attachment slot detaches. When color attachments change, the
/// draw buffers are reset to every attached color slot in ascending order.
#[derive(Debug, Clone, Default)]
pub struct RcSetFramebufferState {
    framebuffer: Option<FramebufferId>,
    color: Vec<(u32, Option<TextureId>)>,
    depth: Option<Option<TextureId>>,
}

impl RcSetFramebufferState {
    /// Targets `framebuffer`, dropping whatever was requested before.
    pub fn reset_for(&mut self, framebuffer: FramebufferId) -> &mut Self {
        self.reset();
        self.framebuffer = Some(framebuffer);
        self
    }

    /// The framebuffer this command changes.
    pub fn framebuffer(&self) -> Option<FramebufferId> {
        self.framebuffer
    }

    /// Changes color attachment `index`.
    pub fn set_color_attachment(&mut self, index: u32, texture: Option<TextureId>) -> &mut Self {
        match self.color.iter_mut().find(|(slot, _)| *slot == index) {
            Some((_, pending)) => *pending = texture,
            None => self.color.push((index, texture)),
        }
        self
    }

    /// Changes the depth attachment.
    pub fn set_depth_attachment(&mut self, texture: Option<TextureId>) -> &mut Self {
        self.depth = Some(texture);
        self
    }
}

impl Poolable for RcSetFramebufferState {
    fn reset(&mut self) {
        self.framebuffer = None;
        self.color.clear();
        self.depth = None;
    }
}

impl RenderCommand<GlServer> for RcSetFramebufferState {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.framebuffer else {
            return;
        };
        let Some(native) = server.state.framebuffers.get(id).map(|state| state.native) else {
            log::debug!("Skipping state change of {id:?}: not live");
            return;
        };

        let textures = &server.state.textures;
        let resolve = |texture: Option<TextureId>| {
            texture
                .and_then(|texture| textures.get(texture))
                .map(|state| (state.native, state.format))
        };
        let color: Vec<(u32, Option<TextureId>, u32)> = self
            .color
            .iter()
            .map(|(index, texture)| {
                let native = resolve(*texture).map_or(0, |(native, _)| native);
                (*index, texture.filter(|_| native != 0), native)
            })
            .collect();
        let depth = self.depth.map(|texture| {
            let resolved = resolve(texture);
            let attachment = match resolved {
                Some((_, Some(format))) if format.has_stencil() => Attachment::DepthStencil,
                _ => Attachment::Depth,
            };
            let native = resolved.map_or(0, |(native, _)| native);
            (attachment, texture.filter(|_| native != 0), native)
        });

        let Some(state) = server.state.framebuffers.get_mut(id) else {
            return;
        };
        for (index, texture, _) in &color {
            match texture {
                Some(texture) => {
                    state.color_attachments.insert(*index, *texture);
                }
                None => {
                    state.color_attachments.remove(index);
                }
            }
        }
        if let Some((_, texture, _)) = depth {
            state.depth_attachment = texture;
        }
        let draw_buffers: Vec<u32> = state.color_attachments.keys().copied().collect();

        let device = &mut *server.device;
        server.shadow.with_framebuffer_bound(device, native, |device| {
            for (index, _, texture) in &color {
                device.framebuffer_texture_2d(Attachment::Color(*index), *texture);
            }
            if let Some((attachment, _, texture)) = depth {
                // Only one of the two depth points may hold a texture.
                let other = match attachment {
                    Attachment::DepthStencil => Attachment::Depth,
                    _ => Attachment::DepthStencil,
                };
                device.framebuffer_texture_2d(other, 0);
                device.framebuffer_texture_2d(attachment, texture);
            }
            if !color.is_empty() {
                device.draw_buffers(&draw_buffers);
            }
        });
    }
}

/// Checks a framebuffer for completeness and posts
/// [`GlError::FramebufferIncomplete`] if it is not.
#[derive(Debug, Clone, Default)]
pub struct RcCheckFramebuffer {
    pub framebuffer: Option<FramebufferId>,
}

impl Poolable for RcCheckFramebuffer {}

impl RenderCommand<GlServer> for RcCheckFramebuffer {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.framebuffer else {
            return;
        };
        let Some(native) = server.state.framebuffers.get(id).map(|state| state.native) else {
            log::debug!("Skipping completeness check of {id:?}: not live");
            return;
        };
        let device = &mut *server.device;
        let status = server
            .shadow
            .with_framebuffer_bound(device, native, |device| device.check_framebuffer_status());
        if status != FramebufferStatus::Complete {
            server.post_error(GlError::FramebufferIncomplete {
                framebuffer: id,
                status,
            });
        }
    }
}

/// Selects the render target of subsequent clears and draws.
#[derive(Debug, Clone, Default)]
pub struct RcSetCurrentFramebuffer {
    pub framebuffer: Option<FramebufferId>,
}

impl Poolable for RcSetCurrentFramebuffer {}

impl RenderCommand<GlServer> for RcSetCurrentFramebuffer {
    fn execute(&mut self, server: &mut GlServer) {
        server.set_current_framebuffer(self.framebuffer);
    }
}

/// Releases a framebuffer; the entry is freed one buffer-swap cycle later.
#[derive(Debug, Clone, Default)]
pub struct RcDeleteFramebuffer {
    pub framebuffer: Option<FramebufferId>,
}

impl Poolable for RcDeleteFramebuffer {}

impl RenderCommand<GlServer> for RcDeleteFramebuffer {
    fn execute(&mut self, server: &mut GlServer) {
        let Some(id) = self.framebuffer else {
            return;
        };
        let Some(state) = server.state.framebuffers.get_mut(id) else {
            log::debug!("Ignoring deletion of {id:?}: not live");
            return;
        };
        let native = std::mem::take(&mut state.native);
        server.shadow.forget_framebuffer(native);
        server.device.delete_framebuffer(native);
        server.state.mark_framebuffer_as_deleted(id);
    }
}
