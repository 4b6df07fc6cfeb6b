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

//! Painting through a [`GuiRenderer`].

use crate::context::GuiContext;
use crate::renderer::GuiRenderer;
use crate::types::{GuiColor, GuiElementHandle, GuiRect, GuiSurfaceHandle};

impl GuiContext {
    /// Returns `true` if part of `surface` changed since it was last painted.
    pub fn surface_needs_paint(&self, surface: GuiSurfaceHandle) -> bool {
        !self.get_surface_dirty_rect(surface).is_empty()
    }

    /// Paints the whole element tree of `surface` and clears its dirty area.
    ///
    /// Elements are painted parent first, children in order. Each element
    /// draws its background color, background image, border and text,
    /// clipped to its own area intersected with its ancestors'. Hidden
    /// elements and their descendants are skipped.
    pub fn paint_surface(&mut self, surface: GuiSurfaceHandle, renderer: &mut dyn GuiRenderer) {
        let Some(target) = self.surface(surface) else {
            return;
        };
        let (bounds, root) = (target.bounds(), target.root);

        renderer.begin_paint_surface(surface, bounds.width, bounds.height);
        self.paint_element(root, 0, 0, bounds, renderer);
        renderer.end_paint_surface();

        if let Some(target) = self.surface_mut(surface) {
            target.dirty = GuiRect::default();
        }
    }

    fn paint_element(
        &self,
        element: GuiElementHandle,
        origin_x: i32,
        origin_y: i32,
        clip: GuiRect,
        renderer: &mut dyn GuiRenderer,
    ) {
        let Some(node) = self.element(element) else {
            return;
        };
        if !node.visible {
            return;
        }
        let rect = GuiRect::new(origin_x + node.x, origin_y + node.y, node.width, node.height);
        let clip = clip.intersect(&rect);
        if clip.is_empty() {
            return;
        }

        renderer.set_clipping_rect(clip);
        if !node.background_color.is_transparent() {
            renderer.draw_rectangle(rect, node.background_color);
        }
        if let Some(texture) = node.background_image {
            renderer.draw_textured_rectangle(rect, texture, GuiColor::WHITE);
        }
        if node.border_width > 0 && !node.border_color.is_transparent() {
            for edge in border_edges(rect, node.border_width) {
                renderer.draw_rectangle(edge, node.border_color);
            }
        }
        if !node.text.is_empty() {
            renderer.draw_text(rect, &node.text, node.text_color);
        }

        for child in &node.children {
            self.paint_element(*child, rect.x, rect.y, clip, renderer);
        }
    }
}

/// The four strips of a border drawn inside `rect`.
fn border_edges(rect: GuiRect, width: i32) -> [GuiRect; 4] {
    let width = width.min(rect.width / 2).min(rect.height / 2).max(1);
    let inner_height = (rect.height - 2 * width).max(0);
    [
        GuiRect::new(rect.x, rect.y, rect.width, width),
        GuiRect::new(rect.x, rect.bottom() - width, rect.width, width),
        GuiRect::new(rect.x, rect.y + width, width, inner_height),
        GuiRect::new(rect.right() - width, rect.y + width, width, inner_height),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_border_edges_stay_inside() {
        let edges = border_edges(GuiRect::new(10, 10, 20, 10), 2);
        assert_eq!(edges[0], GuiRect::new(10, 10, 20, 2));
        assert_eq!(edges[1], GuiRect::new(10, 18, 20, 2));
        assert_eq!(edges[2], GuiRect::new(10, 12, 2, 6));
        assert_eq!(edges[3], GuiRect::new(28, 12, 2, 6));
    }
}
