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

use std::time::Duration;

use ember_gl::{
    GlDevice, GlError, GlServer, GlVersion, HeadlessDevice, RenderThread, Renderer,
    RendererConfig, TextureFilter,
};

fn threaded() -> Renderer<RenderThread> {
    Renderer::threaded(RendererConfig::for_version(GlVersion::Gl33), || {
        Ok(Box::new(HeadlessDevice::for_version(GlVersion::Gl33)) as Box<dyn GlDevice>)
    })
    .unwrap()
}

#[test]
fn test_frames_execute_on_the_render_thread() {
    // --- 1. ARRANGE ---
    let mut renderer = threaded();
    let texture = renderer.create_texture_2d();
    let (tx, rx) = flume::unbounded();

    // --- 2. ACT ---
    renderer.push_boxed(Box::new(move |server: &mut GlServer| {
        let live = server.state().textures.is_live(texture);
        let thread = std::thread::current().name().map(str::to_owned);
        let _ = tx.send((live, thread));
    }));
    renderer.present().unwrap();
    renderer.wait_idle().unwrap();

    // --- 3. ASSERT ---
    let (live, thread) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(live);
    assert_eq!(thread.as_deref(), Some("ember-render"));
    assert_eq!(renderer.frame_count(), 1);
}

#[test]
fn test_loader_queue_runs_before_the_next_frame() {
    let mut renderer = threaded();
    let queue = renderer.loader_queue();
    let (tx, rx) = flume::unbounded();

    let loader_tx = tx.clone();
    std::thread::spawn(move || {
        queue.append(Box::new(move |_: &mut GlServer| {
            let _ = loader_tx.send("loader");
        }));
    })
    .join()
    .unwrap();
    renderer.push_boxed(Box::new(move |_: &mut GlServer| {
        let _ = tx.send("frame");
    }));
    renderer.present().unwrap();
    renderer.wait_idle().unwrap();

    let order: Vec<&str> = rx.try_iter().collect();
    assert_eq!(order, ["loader", "frame"]);
}

#[test]
fn test_stats_arrive_with_the_returned_frame() {
    let mut renderer = threaded();
    let texture = renderer.create_texture_2d();
    renderer.set_texture_filters(texture, TextureFilter::Nearest, TextureFilter::Nearest);
    renderer.set_texture_filters(texture, TextureFilter::Linear, TextureFilter::Linear);
    renderer.present().unwrap();
    renderer.wait_idle().unwrap();

    let stats = renderer.last_frame_stats();
    assert_eq!(stats.frame, 0);
    assert_eq!(stats.commands, 2);

    // The returned frame is recycled for recording.
    renderer.present().unwrap();
    renderer.present().unwrap();
    renderer.wait_idle().unwrap();
    assert_eq!(renderer.last_frame_stats().frame, 2);
    assert_eq!(renderer.last_frame_stats().commands, 0);
}

#[test]
fn test_device_errors_surface_from_spawn() {
    let result = RenderThread::spawn(RendererConfig::default(), || {
        Err(GlError::DeviceCreation("no display".to_owned()))
    });

    match result {
        Err(GlError::DeviceCreation(message)) => assert_eq!(message, "no display"),
        other => panic!("expected a device error, got {other:?}"),
    }
}

#[test]
fn test_errors_reach_the_producer() {
    let mut renderer = threaded();
    let errors = renderer.errors();
    let framebuffer = renderer.create_framebuffer();
    renderer.check_framebuffer(framebuffer);
    renderer.present().unwrap();
    renderer.wait_idle().unwrap();

    assert!(matches!(
        errors.recv_timeout(Duration::from_secs(5)),
        Ok(GlError::FramebufferIncomplete { .. })
    ));
}
