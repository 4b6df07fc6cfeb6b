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

//! Global pipeline state and clears.

use ember_core::{Poolable, RenderCommand};

use crate::server::GlServer;
use crate::types::{BlendFunc, Capabilities, Capability, ClearFlags, CompareFunction, Rect};

/// A batch of global state changes.
///
/// Values are applied in a fixed order: viewport, scissor box, clear color,
/// blend function, depth function, depth writes, enabled capabilities and
/// finally disabled capabilities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RcSetGlobalState {
    viewport: Option<Rect>,
    scissor: Option<Rect>,
    clear_color: Option<[f32; 4]>,
    blend_func: Option<BlendFunc>,
    depth_func: Option<CompareFunction>,
    depth_write: Option<bool>,
    enable: Capabilities,
    disable: Capabilities,
}

impl RcSetGlobalState {
    /// Requests a new viewport rectangle.
    pub fn set_viewport(&mut self, rect: Rect) -> &mut Self {
        self.viewport = Some(rect);
        self
    }

    /// Requests a new scissor box.
    pub fn set_scissor(&mut self, rect: Rect) -> &mut Self {
        self.scissor = Some(rect);
        self
    }

    /// Requests a new clear color.
    pub fn set_clear_color(&mut self, color: [f32; 4]) -> &mut Self {
        self.clear_color = Some(color);
        self
    }

    /// Requests new blend factors.
    pub fn set_blend_func(&mut self, func: BlendFunc) -> &mut Self {
        self.blend_func = Some(func);
        self
    }

    /// Requests a new depth comparison.
    pub fn set_depth_func(&mut self, func: CompareFunction) -> &mut Self {
        self.depth_func = Some(func);
        self
    }

    /// Requests depth writes on or off.
    pub fn set_depth_write(&mut self, write: bool) -> &mut Self {
        self.depth_write = Some(write);
        self
    }

    /// Requests `capabilities` to be enabled. A later request wins over an
    /// earlier disable of the same capability.
    pub fn enable(&mut self, capabilities: Capabilities) -> &mut Self {
        self.enable |= capabilities;
        self.disable -= capabilities;
        self
    }

    /// Requests `capabilities` to be disabled.
    pub fn disable(&mut self, capabilities: Capabilities) -> &mut Self {
        self.disable |= capabilities;
        self.enable -= capabilities;
        self
    }

    /// The capabilities this command disables.
    pub fn disabled(&self) -> Capabilities {
        self.disable
    }

    /// Whether the command changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Poolable for RcSetGlobalState {}

impl RenderCommand<GlServer> for RcSetGlobalState {
    fn execute(&mut self, server: &mut GlServer) {
        let quirks = server.quirks();
        let device = &mut *server.device;
        let shadow = &mut server.shadow;

        if let Some(rect) = self.viewport {
            shadow.set_viewport(device, rect);
        }
        if let Some(rect) = self.scissor {
            shadow.set_scissor(device, rect);
        }
        if let Some(color) = self.clear_color {
            shadow.set_clear_color(device, color);
        }
        if let Some(func) = self.blend_func {
            shadow.set_blend_func(device, func);
        }
        if let Some(func) = self.depth_func {
            shadow.set_depth_func(device, func);
        }
        if let Some(write) = self.depth_write {
            shadow.set_depth_write(device, write);
        }
        for capability in Capability::iter_set(self.enable) {
            shadow.enable(device, capability);
        }
        for capability in Capability::iter_set(self.disable) {
            if capability != Capability::ScissorTest {
                shadow.disable(device, capability);
            }
        }
        if quirks.disables_scissor(self.disable) {
            shadow.disable(device, Capability::ScissorTest);
        }
    }
}

/// Clears the current framebuffer.
///
/// The clear values given here only apply to this clear: the previously set
/// values are restored afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RcClear {
    pub flags: ClearFlags,
    pub color: Option<[f32; 4]>,
    pub depth: Option<f32>,
    pub stencil: Option<i32>,
}

impl Poolable for RcClear {}

impl RenderCommand<GlServer> for RcClear {
    fn execute(&mut self, server: &mut GlServer) {
        let device = &mut *server.device;
        let shadow = &mut server.shadow;
        let (color, depth, stencil) = shadow.clear_values();

        if let Some(value) = self.color {
            shadow.set_clear_color(device, value);
        }
        if let Some(value) = self.depth {
            shadow.set_clear_depth(device, value);
        }
        if let Some(value) = self.stencil {
            shadow.set_clear_stencil(device, value);
        }
        device.clear(self.flags);
        shadow.set_clear_color(device, color);
        shadow.set_clear_depth(device, depth);
        shadow.set_clear_stencil(device, stencil);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GlVersion, RendererConfig};
    use crate::headless::{GlCall, HeadlessDevice};

    fn server(version: GlVersion) -> GlServer {
        GlServer::new(
            Box::new(HeadlessDevice::for_version(version)),
            &RendererConfig::for_version(version),
        )
    }

    fn headless(server: &GlServer) -> &HeadlessDevice {
        server.device_as::<HeadlessDevice>().unwrap()
    }

    #[test]
    fn test_global_state_applies_only_changes() {
        let mut server = server(GlVersion::Gl21);
        let mut command = RcSetGlobalState::default();
        command
            .set_viewport(Rect::new(0, 0, 640, 480))
            .enable(Capabilities::DEPTH_TEST | Capabilities::BLEND);
        command.execute(&mut server);
        command.execute(&mut server);

        let device = headless(&server);
        assert_eq!(device.viewport_rect(), Rect::new(0, 0, 640, 480));
        assert!(device.is_enabled(Capability::DepthTest));
        assert_eq!(device.count_calls(|c| matches!(c, GlCall::Viewport(_))), 1);
        assert_eq!(device.count_calls(|c| matches!(c, GlCall::Enable(_))), 2);
    }

    #[test]
    fn test_scissor_disable_follows_capability_bit_without_quirk() {
        let mut server = server(GlVersion::Gl21);
        let mut enable = RcSetGlobalState::default();
        enable.enable(Capabilities::SCISSOR_TEST | Capabilities::BLEND);
        enable.execute(&mut server);

        let mut disable = RcSetGlobalState::default();
        disable.disable(Capabilities::BLEND);
        disable.execute(&mut server);
        assert!(headless(&server).is_enabled(Capability::ScissorTest));

        let mut disable = RcSetGlobalState::default();
        disable.disable(Capabilities::SCISSOR_TEST);
        disable.execute(&mut server);
        assert!(!headless(&server).is_enabled(Capability::ScissorTest));
    }

    #[test]
    fn test_scissor_disable_tests_raw_enum_with_quirk() {
        let mut server = server(GlVersion::Gl33);
        assert!(server.quirks().scissor_disable_tests_gl_enum);
        let mut enable = RcSetGlobalState::default();
        enable.enable(Capabilities::SCISSOR_TEST | Capabilities::BLEND);
        enable.execute(&mut server);

        // The scissor bit does not overlap 0x0C11, so the scissor stays on.
        let mut disable = RcSetGlobalState::default();
        disable.disable(Capabilities::SCISSOR_TEST);
        disable.execute(&mut server);
        assert!(headless(&server).is_enabled(Capability::ScissorTest));

        // The blend bit does, so disabling blending also disables the scissor.
        let mut disable = RcSetGlobalState::default();
        disable.disable(Capabilities::BLEND);
        disable.execute(&mut server);
        assert!(!headless(&server).is_enabled(Capability::ScissorTest));
        assert!(!headless(&server).is_enabled(Capability::Blend));
    }

    #[test]
    fn test_clear_restores_clear_values() {
        let mut server = server(GlVersion::Gl33);
        let mut global = RcSetGlobalState::default();
        global.set_clear_color([0.1, 0.2, 0.3, 1.0]);
        global.execute(&mut server);

        let mut clear = RcClear {
            flags: ClearFlags::COLOR | ClearFlags::DEPTH,
            color: Some([1.0, 0.0, 0.0, 1.0]),
            ..RcClear::default()
        };
        clear.execute(&mut server);

        let device = headless(&server);
        assert_eq!(device.clear_color_value(), [0.1, 0.2, 0.3, 1.0]);
        let calls = device.calls();
        let clear_at = calls
            .iter()
            .position(|c| matches!(c, GlCall::Clear(_)))
            .unwrap();
        assert_eq!(calls[clear_at - 1], GlCall::ClearColor([1.0, 0.0, 0.0, 1.0]));
    }
}
