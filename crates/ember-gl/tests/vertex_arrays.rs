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
    BufferUsage, GlCall, GlVersion, HeadlessDevice, InlineExecutor, PrimitiveType, Renderer,
    RendererConfig, VertexArrayId, VertexFormat,
};

const VERTEX: &str =
    "attribute vec3 a_position; void main() { gl_Position = vec4(a_position, 1.0); }";
const FRAGMENT: &str = "void main() {}";

fn renderer(version: GlVersion) -> Renderer<InlineExecutor> {
    let mut renderer = Renderer::inline(
        Box::new(HeadlessDevice::for_version(version)),
        &RendererConfig::for_version(version),
    );
    let shader = renderer.create_shader(VERTEX, FRAGMENT);
    renderer.set_current_shader(Some(shader));
    renderer
}

fn device(renderer: &Renderer<InlineExecutor>) -> &HeadlessDevice {
    renderer.server().device_as::<HeadlessDevice>().unwrap()
}

/// A triangle with positions and texture coordinates.
fn textured_triangle(renderer: &mut Renderer<InlineExecutor>) -> VertexArrayId {
    let vertex_array = renderer.create_vertex_array(&VertexFormat::new().with(0, 3).with(1, 2));
    renderer.set_vertex_array_vertices(vertex_array, &[[0.0_f32; 5]; 3], BufferUsage::Static);
    vertex_array
}

/// Four vertices with positions only.
fn plain_quad(renderer: &mut Renderer<InlineExecutor>) -> VertexArrayId {
    let vertex_array = renderer.create_vertex_array(&VertexFormat::new().with(0, 3));
    renderer.set_vertex_array_vertices(vertex_array, &[[0.0_f32; 3]; 4], BufferUsage::Static);
    vertex_array
}

#[test]
fn test_attribute_arrays_of_a_previous_layout_are_disabled() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(GlVersion::Gl21);
    let textured = textured_triangle(&mut renderer);
    let plain = plain_quad(&mut renderer);

    // --- 2. ACT ---
    renderer.draw(textured, PrimitiveType::Triangles);
    renderer.present().unwrap();
    let after_textured = device(&renderer).enabled_attribute_arrays();

    renderer.draw(plain, PrimitiveType::TriangleStrip);
    renderer.present().unwrap();

    // --- 3. ASSERT ---
    let device = device(&renderer);
    assert_eq!(after_textured, vec![0, 1]);
    assert_eq!(device.enabled_attribute_arrays(), vec![0]);
    assert_eq!(
        device.count_calls(|call| matches!(call, GlCall::DisableVertexAttribArray(1))),
        1
    );
    assert_eq!(device.draws().len(), 2);
}

#[test]
fn test_repeating_a_layout_does_not_enable_its_arrays_again() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(GlVersion::Gl21);
    let plain = plain_quad(&mut renderer);
    renderer.draw(plain, PrimitiveType::TriangleStrip);
    renderer.present().unwrap();
    let enables = |device: &HeadlessDevice| {
        device.count_calls(|call| matches!(call, GlCall::EnableVertexAttribArray(_)))
    };
    let before = enables(device(&renderer));

    // --- 2. ACT ---
    renderer.draw(plain, PrimitiveType::TriangleStrip);
    renderer.draw(plain, PrimitiveType::TriangleStrip);
    renderer.present().unwrap();

    // --- 3. ASSERT ---
    let device = device(&renderer);
    assert_eq!(before, 1);
    assert_eq!(enables(device), 1);
    assert_eq!(device.enabled_attribute_arrays(), vec![0]);
}

#[test]
fn test_vertex_array_objects_keep_their_own_attribute_arrays() {
    let mut renderer = renderer(GlVersion::Gl33);
    let textured = textured_triangle(&mut renderer);
    let plain = plain_quad(&mut renderer);

    renderer.draw(textured, PrimitiveType::Triangles);
    renderer.draw(plain, PrimitiveType::TriangleStrip);
    renderer.present().unwrap();

    let device = device(&renderer);
    assert_eq!(device.enabled_attribute_arrays(), vec![0]);
    assert_eq!(
        device.count_calls(|call| matches!(call, GlCall::DisableVertexAttribArray(_))),
        0
    );
}

#[test]
fn test_range_past_the_end_is_clamped() {
    // --- 1. ARRANGE ---
    let mut renderer = renderer(GlVersion::Gl33);
    let plain = plain_quad(&mut renderer);

    // --- 2. ACT ---
    renderer.draw_range(plain, PrimitiveType::Points, 2, 10);
    renderer.present().unwrap();

    // --- 3. ASSERT ---
    let draws = device(&renderer).draws();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].first, 2);
    assert_eq!(draws[0].count, 2);
    assert!(!draws[0].indexed);
}

#[test]
fn test_range_starting_past_the_end_draws_nothing() {
    let mut renderer = renderer(GlVersion::Gl33);
    let plain = plain_quad(&mut renderer);

    renderer.draw_range(plain, PrimitiveType::Points, 4, 1);
    renderer.draw_range(plain, PrimitiveType::Points, 9, 3);
    renderer.present().unwrap();

    assert!(device(&renderer).draws().is_empty());
    assert_eq!(renderer.last_frame_stats().draw_calls, 0);
}

#[test]
fn test_indexed_range_is_clamped_to_the_index_count() {
    let mut renderer = renderer(GlVersion::Gl33);
    let plain = plain_quad(&mut renderer);
    renderer.set_vertex_array_indices(plain, &[0, 1, 2, 2, 1, 3], BufferUsage::Static);

    renderer.draw_range(plain, PrimitiveType::Triangles, 3, 100);
    renderer.present().unwrap();

    let draws = device(&renderer).draws();
    assert_eq!(draws.len(), 1);
    assert!(draws[0].indexed);
    assert_eq!(draws[0].first, 3);
    assert_eq!(draws[0].count, 3);
}
