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
    GlCall, GlError, GlVersion, HeadlessDevice, InlineExecutor, PrimitiveType, Renderer,
    RendererConfig, ShaderId, ShaderStage, TextureId, UniformValue, VertexFormat,
};

const VERTEX: &str = "void main() { gl_Position = vec4(0.0); }";
const FRAGMENT: &str = "uniform sampler2D u_albedo; uniform sampler2D u_normal; void main() {}";

fn renderer() -> Renderer<InlineExecutor> {
    Renderer::inline(
        Box::new(HeadlessDevice::for_version(GlVersion::Gl33)),
        &RendererConfig::for_version(GlVersion::Gl33),
    )
}

fn device(renderer: &Renderer<InlineExecutor>) -> &HeadlessDevice {
    renderer.server().device_as::<HeadlessDevice>().unwrap()
}

fn texture_native(renderer: &Renderer<InlineExecutor>, texture: TextureId) -> u32 {
    renderer.server().state().textures.get(texture).unwrap().native
}

fn program_native(renderer: &Renderer<InlineExecutor>, shader: ShaderId) -> u32 {
    renderer.server().state().shaders.get(shader).unwrap().native
}

/// A shader sampling `albedo` and `normal`, presented but not made current.
fn sampling_shader(
    renderer: &mut Renderer<InlineExecutor>,
) -> (ShaderId, TextureId, TextureId) {
    let albedo = renderer.create_texture_2d();
    let normal = renderer.create_texture_2d();
    let shader = renderer.create_shader(VERTEX, FRAGMENT);
    renderer.set_shader_texture(shader, "u_albedo", albedo);
    renderer.set_shader_texture(shader, "u_normal", normal);
    renderer.present().unwrap();
    (shader, albedo, normal)
}

#[test]
fn test_samplers_get_units_but_bind_only_once_current() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer();

    // --- 2. ACT ---
    let (shader, albedo, normal) = sampling_shader(&mut renderer);

    // --- 3. ASSERT ---
    let state = renderer.server().state().shaders.get(shader).unwrap();
    let units: Vec<(u32, TextureId)> = state
        .samplers
        .values()
        .map(|binding| (binding.unit, binding.texture))
        .collect();
    assert_eq!(units, [(0, albedo), (1, normal)]);
    assert_eq!(state.pending_uniforms.len(), 2);
    assert_eq!(
        device(&renderer).count_calls(|call| matches!(call, GlCall::BindTexture(_))),
        0
    );
    assert!(renderer
        .server()
        .state()
        .textures
        .get(albedo)
        .unwrap()
        .shaders
        .contains(&shader));
}

#[test]
fn test_making_the_shader_current_binds_its_samplers() {
    let mut renderer = renderer();
    let (shader, albedo, normal) = sampling_shader(&mut renderer);

    renderer.set_current_shader(Some(shader));
    renderer.present().unwrap();

    let program = program_native(&renderer, shader);
    let device = device(&renderer);
    assert_eq!(device.current_program(), program);
    assert_eq!(device.bound_texture(0), texture_native(&renderer, albedo));
    assert_eq!(device.bound_texture(1), texture_native(&renderer, normal));
    assert_eq!(
        device.uniform_value(program, "u_albedo"),
        Some(UniformValue::Int(0))
    );
    assert_eq!(
        device.uniform_value(program, "u_normal"),
        Some(UniformValue::Int(1))
    );
    let state = renderer.server().state().shaders.get(shader).unwrap();
    assert!(state.pending_uniforms.is_empty());
}

#[test]
fn test_replacing_a_sampler_texture_reuses_its_unit() {
    let mut renderer = renderer();
    let (shader, albedo, _) = sampling_shader(&mut renderer);
    renderer.set_current_shader(Some(shader));
    let replacement = renderer.create_texture_2d();
    renderer.present().unwrap();

    renderer.set_shader_texture(shader, "u_albedo", replacement);
    renderer.present().unwrap();

    let replacement_native = texture_native(&renderer, replacement);
    assert_eq!(device(&renderer).bound_texture(0), replacement_native);

    let state = renderer.server().state();
    let units: Vec<u32> = state
        .shaders
        .get(shader)
        .unwrap()
        .samplers
        .values()
        .map(|binding| binding.unit)
        .collect();
    assert_eq!(units, [0, 1]);
    assert!(!state.textures.get(albedo).unwrap().shaders.contains(&shader));
    assert!(state
        .textures
        .get(replacement)
        .unwrap()
        .shaders
        .contains(&shader));
}

#[test]
fn test_rebinding_the_same_texture_issues_no_calls() {
    let mut renderer = renderer();
    let (shader, albedo, _) = sampling_shader(&mut renderer);
    renderer.set_current_shader(Some(shader));
    renderer.present().unwrap();
    let before = device(&renderer).calls().len();

    renderer.set_shader_texture(shader, "u_albedo", albedo);
    renderer.present().unwrap();

    assert_eq!(device(&renderer).calls().len(), before);
}

#[test]
fn test_uniforms_of_a_background_shader_wait_until_it_is_current() {
    let mut renderer = renderer();
    let shader = renderer.create_shader(VERTEX, "uniform float u_time; void main() {}");
    renderer.set_shader_uniform(shader, "u_time", 2.5_f32);
    renderer.present().unwrap();

    let program = program_native(&renderer, shader);
    assert_eq!(device(&renderer).uniform_value(program, "u_time"), None);

    renderer.set_current_shader(Some(shader));
    renderer.present().unwrap();
    assert_eq!(
        device(&renderer).uniform_value(program, "u_time"),
        Some(UniformValue::Float(2.5))
    );

    // Once current, writes go straight to the driver.
    renderer.set_shader_uniform(shader, "u_time", 3.0_f32);
    renderer.present().unwrap();
    assert_eq!(
        device(&renderer).uniform_value(program, "u_time"),
        Some(UniformValue::Float(3.0))
    );
}

#[test]
fn test_compile_failure_is_reported_and_draws_are_skipped() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer();
    let errors = renderer.errors();
    let format = VertexFormat::new().with(0, 3);
    let vertex_array = renderer.create_vertex_array(&format);
    renderer.set_vertex_array_vertices(
        vertex_array,
        &[[0.0_f32; 3]; 3],
        ember_gl::BufferUsage::Static,
    );

    // --- 2. ACT ---
    let shader = renderer.create_shader(VERTEX, "#error broken\nvoid main() {}");
    renderer.set_current_shader(Some(shader));
    renderer.draw(vertex_array, PrimitiveType::Triangles);
    renderer.present().unwrap();

    // --- 3. ASSERT ---
    match errors.try_recv() {
        Ok(GlError::ShaderCompilation {
            shader: failed,
            stage,
            log,
        }) => {
            assert_eq!(failed, shader);
            assert_eq!(stage, ShaderStage::Fragment);
            assert!(log.contains("#error"));
        }
        other => panic!("expected a compilation error, got {other:?}"),
    }
    assert_eq!(program_native(&renderer, shader), 0);
    assert_eq!(renderer.server().state().current_shader, None);
    assert!(device(&renderer).draws().is_empty());
    assert_eq!(renderer.last_frame_stats().draw_calls, 0);
}
