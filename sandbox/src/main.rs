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

// Ember Sandbox
// Drives the threaded renderer against the headless device, then runs a
// small GUI through its input and paint paths.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use ember_gl::{
    BufferUsage, Capabilities, ClearFlags, GlDevice, GlServer, HeadlessDevice, PrimitiveType,
    Renderer, RendererConfig, TextureFilter, TextureFormat, TextureWrapMode,
    VertexFormat,
};
use ember_gui::{
    GuiColor, GuiContext, GuiElementHandle, GuiEventHandler, GuiRect, GuiRenderer,
    GuiSurfaceHandle, GuiTextureId, MouseButton,
};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    uv: [f32; 2],
}

const VERTICES: &[Vertex] = &[
    Vertex {
        position: [-0.5, -0.5, 0.0],
        uv: [0.0, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        uv: [1.0, 0.0],
    },
    Vertex {
        position: [0.5, 0.5, 0.0],
        uv: [1.0, 1.0],
    },
    Vertex {
        position: [-0.5, 0.5, 0.0],
        uv: [0.0, 1.0],
    },
];

const INDICES: &[u16] = &[0, 1, 2, 0, 2, 3];

const VERTEX_SHADER: &str = "\
attribute vec3 a_position;
attribute vec2 a_uv;
varying vec2 v_uv;
void main() { v_uv = a_uv; gl_Position = vec4(a_position, 1.0); }
";

const FRAGMENT_SHADER: &str = "\
uniform sampler2D u_albedo;
uniform float u_fade;
varying vec2 v_uv;
void main() { gl_FragColor = texture2D(u_albedo, v_uv) * u_fade; }
";

/// A checkerboard of `size` x `size` RGBA texels.
fn checkerboard(size: u32) -> Vec<u8> {
    (0..size * size)
        .flat_map(|index| {
            let (x, y) = (index % size, index / size);
            if (x / 8 + y / 8) % 2 == 0 {
                [255, 255, 255, 255]
            } else {
                [40, 40, 40, 255]
            }
        })
        .collect()
}

fn run_renderer(config: RendererConfig) -> Result<()> {
    let version = config.gl_version;
    let mut renderer = Renderer::threaded(config, move || {
        Ok(Box::new(HeadlessDevice::for_version(version)) as Box<dyn GlDevice>)
    })?;
    let errors = renderer.errors();

    // Resources created off the frame go through the loader queue.
    renderer
        .loader_queue()
        .append(Box::new(|server: &mut GlServer| {
            log::info!("Loader queue ran; {} texture units", server.max_texture_units());
        }));

    let texture = renderer.create_texture_2d();
    renderer.set_texture_2d_data(texture, 64, 64, TextureFormat::Rgba8, checkerboard(64));
    renderer.set_texture_filters(
        texture,
        TextureFilter::LinearMipmapLinear,
        TextureFilter::Linear,
    );
    renderer.set_texture_wrap_mode(texture, TextureWrapMode::Repeat);
    renderer.set_texture_anisotropy(texture, 8.0);
    renderer.generate_texture_mipmaps(texture);

    let shader = renderer.create_shader(VERTEX_SHADER, FRAGMENT_SHADER);
    renderer.set_shader_texture(shader, "u_albedo", texture);

    let quad = renderer.create_vertex_array(&VertexFormat::new().with(0, 3).with(1, 2));
    renderer.set_vertex_array_vertices(quad, VERTICES, BufferUsage::Static);
    renderer.set_vertex_array_indices_u16(quad, INDICES, BufferUsage::Static);

    for frame in 0..4u8 {
        renderer.enable(Capabilities::DEPTH_TEST | Capabilities::BLEND);
        renderer.clear_with_color(ClearFlags::COLOR | ClearFlags::DEPTH, [0.1, 0.1, 0.2, 1.0]);
        renderer.set_shader_uniform(shader, "u_fade", f32::from(frame) / 3.0);
        renderer.set_current_shader(Some(shader));
        renderer.draw(quad, PrimitiveType::Triangles);
        renderer.present()?;

        let stats = renderer.last_frame_stats();
        log::info!(
            "Frame {}: {} commands, {} draws, {} redundant calls skipped",
            stats.frame,
            stats.commands,
            stats.draw_calls,
            stats.redundant_skipped
        );
    }

    renderer.delete_vertex_array(quad);
    renderer.delete_shader(shader);
    renderer.delete_texture(texture);
    // Deletions are freed one frame after they are executed.
    renderer.present()?;
    renderer.present()?;
    renderer.wait_idle()?;
    log::info!(
        "Freed {} objects",
        renderer.last_frame_stats().objects_freed
    );

    for error in errors.try_iter() {
        log::error!("Render error: {error}");
    }
    Ok(())
}

/// Logs every paint call instead of drawing.
struct LoggingGuiRenderer;

impl GuiRenderer for LoggingGuiRenderer {
    fn begin_paint_surface(&mut self, surface: GuiSurfaceHandle, width: i32, height: i32) {
        log::info!("Paint {surface:?} ({width}x{height})");
    }

    fn set_clipping_rect(&mut self, rect: GuiRect) {
        log::debug!("  clip {rect:?}");
    }

    fn draw_rectangle(&mut self, rect: GuiRect, color: GuiColor) {
        log::debug!("  rect {rect:?} {color:?}");
    }

    fn draw_text(&mut self, rect: GuiRect, text: &str, _color: GuiColor) {
        log::info!("  text {text:?} at ({}, {})", rect.x, rect.y);
    }

    fn draw_textured_rectangle(&mut self, rect: GuiRect, texture: GuiTextureId, _tint: GuiColor) {
        log::debug!("  image {texture:?} {rect:?}");
    }

    fn end_paint_surface(&mut self) {}
}

/// Counts clicks and writes the count into the button's text.
#[derive(Default)]
struct ClickCounter {
    clicks: Cell<u32>,
}

impl GuiEventHandler for ClickCounter {
    fn on_mouse_button_up(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        button: MouseButton,
        _x: i32,
        _y: i32,
    ) -> bool {
        if button == MouseButton::Left {
            self.clicks.set(self.clicks.get() + 1);
            let text = format!("Clicked {} times", self.clicks.get());
            context.set_element_text(element, &text);
        }
        true
    }

    fn on_mouse_enter(&self, context: &mut GuiContext, element: GuiElementHandle) -> bool {
        context.set_element_background_color(element, GuiColor::rgb(0.3, 0.5, 0.9));
        true
    }

    fn on_mouse_leave(&self, context: &mut GuiContext, element: GuiElementHandle) -> bool {
        context.set_element_background_color(element, GuiColor::rgb(0.2, 0.3, 0.6));
        true
    }
}

/// Closes the panel it is attached to on a right click, from inside its own
/// dispatch.
struct CloseOnRightClick;

impl GuiEventHandler for CloseOnRightClick {
    fn on_mouse_button_down(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        button: MouseButton,
        _x: i32,
        _y: i32,
    ) -> bool {
        if button != MouseButton::Right {
            return true;
        }
        log::info!("Closing {element:?}");
        context.delete_element(element);
        false
    }
}

fn run_gui() {
    let mut context = GuiContext::new();
    let surface = context.create_surface(320, 200);
    let root = context.create_element();
    context.set_surface_root_element(surface, root);
    context.set_element_rect(root, GuiRect::new(0, 0, 320, 200));
    context.set_element_background_color(root, GuiColor::rgb(0.1, 0.1, 0.1));

    let panel = context.create_child_element(root);
    context.set_element_id(panel, "panel");
    context.set_element_rect(panel, GuiRect::new(20, 20, 200, 120));
    context.set_element_border(panel, 2, GuiColor::WHITE);
    context.attach_local_event_handler(panel, Rc::new(CloseOnRightClick));

    let button = context.create_child_element(panel);
    context.set_element_rect(button, GuiRect::new(10, 10, 120, 30));
    context.set_element_focusable(button, true);
    context.set_element_text(button, "Click me");
    context.set_element_text_color(button, GuiColor::WHITE);
    context.attach_local_event_handler(button, Rc::new(ClickCounter::default()));

    let mut painter = LoggingGuiRenderer;
    context.paint_surface(surface, &mut painter);

    for _ in 0..3 {
        context.on_mouse_move(surface, 50, 45);
        context.on_mouse_button_down(surface, MouseButton::Left, 50, 45);
        context.on_mouse_button_up(surface, MouseButton::Left, 50, 45);
    }
    log::info!("Button says {:?}", context.get_element_text(button));
    if context.surface_needs_paint(surface) {
        context.paint_surface(surface, &mut painter);
    }

    context.on_mouse_button_down(surface, MouseButton::Right, 200, 100);
    log::info!(
        "Panel alive: {}, button alive: {}, {} elements left",
        context.is_element_valid(panel),
        context.is_element_valid(button),
        context.element_count()
    );
    context.paint_surface(surface, &mut painter);
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    // An optional RON configuration file as the only argument.
    let config = match std::env::args().nth(1) {
        Some(path) => RendererConfig::load(path)?,
        None => RendererConfig::default(),
    };
    log::info!("Starting with {config:?}");

    run_renderer(config)?;
    run_gui();
    Ok(())
}
