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

//! A dedicated thread owning the GL context.

use std::sync::Arc;
use std::thread::JoinHandle;

use ember_core::{CommandFrame, RcBufferPair, SynchronizedRcQueue};

use crate::config::{CompatQuirks, ExecutionMode, RendererConfig};
use crate::device::GlDevice;
use crate::error::GlError;
use crate::renderer::{FrameExecutor, Renderer};
use crate::server::{FrameStats, GlServer};

enum RenderMessage {
    Execute(CommandFrame<GlServer>),
    Shutdown,
}

type Ready = Result<(flume::Receiver<GlError>, Arc<SynchronizedRcQueue<GlServer>>), GlError>;

/// Executes presented frames on a dedicated thread.
///
/// The thread builds its [`GlServer`] itself from the device factory, since
/// GL contexts are bound to the thread that created them. At most one frame
/// is in flight: presenting waits for the previous frame to come back, which
/// is what makes swapping the buffer pair safe.
pub struct RenderThread {
    frames_tx: flume::Sender<RenderMessage>,
    done_rx: flume::Receiver<(CommandFrame<GlServer>, FrameStats)>,
    errors: flume::Receiver<GlError>,
    loader_queue: Arc<SynchronizedRcQueue<GlServer>>,
    quirks: CompatQuirks,
    in_flight: bool,
    last_stats: FrameStats,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Spawns the render thread and waits until its server is ready.
    pub fn spawn<F>(config: RendererConfig, make_device: F) -> Result<Self, GlError>
    where
        F: FnOnce() -> Result<Box<dyn GlDevice>, GlError> + Send + 'static,
    {
        if config.execution_mode() == ExecutionMode::Immediate {
            log::warn!("The render thread always defers execution; ignoring immediate mode");
        }
        let quirks = config.quirks();
        let (frames_tx, frames_rx) = flume::unbounded::<RenderMessage>();
        let (done_tx, done_rx) = flume::bounded(1);
        let (ready_tx, ready_rx) = flume::bounded::<Ready>(1);

        let handle = std::thread::Builder::new()
            .name("ember-render".to_owned())
            .spawn(move || {
                let device = match make_device() {
                    Ok(device) => device,
                    Err(error) => {
                        let _ = ready_tx.send(Err(error));
                        return;
                    }
                };
                let mut server = GlServer::new(device, &config);
                if ready_tx
                    .send(Ok((server.errors(), server.loader_queue())))
                    .is_err()
                {
                    return;
                }
                log::info!("Render thread started");

                while let Ok(RenderMessage::Execute(mut frame)) = frames_rx.recv() {
                    let stats = server.execute_frame(&mut frame);
                    frame.clear();
                    if done_tx.send((frame, stats)).is_err() {
                        break;
                    }
                }
                log::info!("Render thread stopped");
            })
            .map_err(|error| GlError::DeviceCreation(error.to_string()))?;

        let (errors, loader_queue) = match ready_rx.recv() {
            Ok(Ok(ready)) => ready,
            Ok(Err(error)) => {
                let _ = handle.join();
                return Err(error);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(GlError::RenderThreadDisconnected);
            }
        };

        Ok(Self {
            frames_tx,
            done_rx,
            errors,
            loader_queue,
            quirks,
            in_flight: false,
            last_stats: FrameStats::default(),
            handle: Some(handle),
        })
    }

    fn receive_in_flight(&mut self, frames: &mut RcBufferPair<GlServer>) -> Result<(), GlError> {
        if !self.in_flight {
            return Ok(());
        }
        let (frame, stats) = self
            .done_rx
            .recv()
            .map_err(|_| GlError::RenderThreadDisconnected)?;
        *frames.front_mut() = frame;
        self.in_flight = false;
        self.last_stats = stats;
        Ok(())
    }
}

impl FrameExecutor for RenderThread {
    fn present(&mut self, frames: &mut RcBufferPair<GlServer>) -> Result<(), GlError> {
        self.receive_in_flight(frames)?;
        frames.swap();
        let recorded = std::mem::take(frames.front_mut());
        self.frames_tx
            .send(RenderMessage::Execute(recorded))
            .map_err(|_| GlError::RenderThreadDisconnected)?;
        self.in_flight = true;
        Ok(())
    }

    fn wait_idle(&mut self, frames: &mut RcBufferPair<GlServer>) -> Result<(), GlError> {
        self.receive_in_flight(frames)
    }

    fn last_frame_stats(&self) -> FrameStats {
        self.last_stats
    }

    fn errors(&self) -> flume::Receiver<GlError> {
        self.errors.clone()
    }

    fn loader_queue(&self) -> Arc<SynchronizedRcQueue<GlServer>> {
        Arc::clone(&self.loader_queue)
    }

    fn quirks(&self) -> CompatQuirks {
        self.quirks
    }
}

impl Drop for RenderThread {
    fn drop(&mut self) {
        let _ = self.frames_tx.send(RenderMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("The render thread panicked");
            }
        }
    }
}

impl std::fmt::Debug for RenderThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderThread")
            .field("in_flight", &self.in_flight)
            .field("last_stats", &self.last_stats)
            .finish_non_exhaustive()
    }
}

impl Renderer<RenderThread> {
    /// A renderer executing on a dedicated render thread.
    pub fn threaded<F>(config: RendererConfig, make_device: F) -> Result<Self, GlError>
    where
        F: FnOnce() -> Result<Box<dyn GlDevice>, GlError> + Send + 'static,
    {
        Ok(Self::new(RenderThread::spawn(config, make_device)?))
    }
}
