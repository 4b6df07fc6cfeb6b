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

use ember_gl::{
    GlCall, GlVersion, HeadlessDevice, InlineExecutor, Lifecycle, Renderer, RendererConfig,
    TextureFilter,
};

const VERTEX: &str = "void main() { gl_Position = vec4(0.0); }";
const FRAGMENT: &str = "uniform sampler2D u_albedo; void main() {}";

fn renderer() -> Renderer<InlineExecutor> {
    Renderer::inline(
        Box::new(HeadlessDevice::for_version(GlVersion::Gl33)),
        &RendererConfig::for_version(GlVersion::Gl33),
    )
}

#[test]
fn test_deleted_resources_are_freed_one_cycle_later() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer();
    let texture = renderer.create_texture_2d();
    let shader = renderer.create_shader(VERTEX, FRAGMENT);
    renderer.set_current_shader(Some(shader));
    renderer.present().unwrap();
    let program = renderer.server().state().shaders.get(shader).unwrap().native;

    // --- 2. ACT ---
    renderer.delete_texture(texture);
    renderer.delete_shader(shader);
    renderer.present().unwrap();

    // --- 3. ASSERT ---
    let state = renderer.server().state();
    assert!(matches!(
        state.textures.lifecycle(texture),
        Some(Lifecycle::PendingDeletion { .. })
    ));
    assert!(matches!(
        state.shaders.lifecycle(shader),
        Some(Lifecycle::PendingDeletion { .. })
    ));
    assert!(state.textures.get(texture).is_none());
    // The entry is dead but still the current shader until it is freed.
    assert_eq!(state.current_shader, Some(shader));

    let device = renderer.server().device_as::<HeadlessDevice>().unwrap();
    assert!(!device.program_exists(program));
    assert_eq!(renderer.last_frame_stats().objects_freed, 0);

    renderer.present().unwrap();

    let state = renderer.server().state();
    assert_eq!(state.textures.lifecycle(texture), None);
    assert_eq!(state.shaders.lifecycle(shader), None);
    assert_eq!(state.current_shader, None);
    assert_eq!(renderer.last_frame_stats().objects_freed, 2);
}

#[test]
fn test_commands_naming_a_deleted_texture_are_skipped() {
    let mut renderer = renderer();
    let texture = renderer.create_texture_2d();
    renderer.delete_texture(texture);
    renderer.set_texture_filters(texture, TextureFilter::Nearest, TextureFilter::Nearest);
    renderer.present().unwrap();

    let device = renderer.server().device_as::<HeadlessDevice>().unwrap();
    assert_eq!(
        device.count_calls(|call| matches!(call, GlCall::TexFilters(..))),
        0
    );
    assert_eq!(device.live_object_count(), 0);
}

#[test]
fn test_deleting_a_sampled_texture_scrubs_the_shader() {
    let mut renderer = renderer();
    let texture = renderer.create_texture_2d();
    let shader = renderer.create_shader(VERTEX, FRAGMENT);
    renderer.set_shader_texture(shader, "u_albedo", texture);
    renderer.present().unwrap();

    renderer.delete_texture(texture);
    renderer.present().unwrap();

    let state = renderer.server().state();
    assert!(state.shaders.get(shader).unwrap().samplers.is_empty());
}

#[test]
fn test_deleted_framebuffer_stops_being_the_render_target() {
    let mut renderer = renderer();
    let framebuffer = renderer.create_framebuffer();
    renderer.set_current_framebuffer(Some(framebuffer));
    renderer.present().unwrap();
    assert_eq!(
        renderer.server().state().current_framebuffer,
        Some(framebuffer)
    );

    renderer.delete_framebuffer(framebuffer);
    renderer.present().unwrap();
    renderer.present().unwrap();

    let server = renderer.server();
    assert_eq!(server.state().current_framebuffer, None);
    assert_eq!(server.shadow().framebuffer(), 0);
    let device = server.device_as::<HeadlessDevice>().unwrap();
    assert_eq!(device.current_framebuffer(), 0);
}
