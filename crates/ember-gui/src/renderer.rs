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

//! The seam between the GUI and whatever produces pixels.

use crate::types::{GuiColor, GuiRect, GuiSurfaceHandle, GuiTextureId};

/// Draws what [`crate::GuiContext::paint_surface`] asks for.
///
/// Calls arrive bracketed by [`Self::begin_paint_surface`] and
/// [`Self::end_paint_surface`]. Every rectangle is in surface pixels, and
/// drawing is limited to the last rectangle passed to
/// [`Self::set_clipping_rect`].
pub trait GuiRenderer {
    /// Starts painting `surface`, whose current size is `width` by `height`.
    fn begin_paint_surface(&mut self, surface: GuiSurfaceHandle, width: i32, height: i32);

    /// Restricts subsequent drawing to `rect`.
    fn set_clipping_rect(&mut self, rect: GuiRect);

    /// Fills `rect` with `color`.
    fn draw_rectangle(&mut self, rect: GuiRect, color: GuiColor);

    /// Draws `text` inside `rect`.
    fn draw_text(&mut self, rect: GuiRect, text: &str, color: GuiColor);

    /// Stretches `texture` over `rect`, modulated by `tint`.
    fn draw_textured_rectangle(&mut self, rect: GuiRect, texture: GuiTextureId, tint: GuiColor);

    /// Finishes painting the surface started last.
    fn end_paint_surface(&mut self);
}
