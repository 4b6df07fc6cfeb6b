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

//! Positions, sizes and repaint tracking.

use crate::context::GuiContext;
use crate::event::GuiEvent;
use crate::types::{GuiElementHandle, GuiRect, GuiSurfaceHandle};

impl GuiContext {
    /// Moves `element` relative to its parent and sends it a
    /// [`GuiEvent::Move`] if the position changed.
    pub fn set_element_position(&mut self, element: GuiElementHandle, x: i32, y: i32) {
        if self.get_element_position(element) == (x, y) || !self.is_element_valid(element) {
            return;
        }
        self.invalidate_element(element);
        if let Some(node) = self.element_mut(element) {
            node.x = x;
            node.y = y;
        }
        self.invalidate_element(element);
        self.dispatch_event(element, GuiEvent::Move { x, y });
    }

    /// Position of `element` relative to its parent.
    pub fn get_element_position(&self, element: GuiElementHandle) -> (i32, i32) {
        self.element(element).map_or((0, 0), |node| (node.x, node.y))
    }

    /// Resizes `element` and sends it a [`GuiEvent::Size`] if the size
    /// changed. Negative sizes are clamped to zero.
    pub fn set_element_size(&mut self, element: GuiElementHandle, width: i32, height: i32) {
        let (width, height) = (width.max(0), height.max(0));
        if self.get_element_size(element) == (width, height) || !self.is_element_valid(element) {
            return;
        }
        self.invalidate_element(element);
        if let Some(node) = self.element_mut(element) {
            node.width = width;
            node.height = height;
        }
        self.invalidate_element(element);
        self.dispatch_event(element, GuiEvent::Size { width, height });
    }

    pub fn get_element_size(&self, element: GuiElementHandle) -> (i32, i32) {
        self.element(element)
            .map_or((0, 0), |node| (node.width, node.height))
    }

    /// Moves then resizes `element`.
    pub fn set_element_rect(&mut self, element: GuiElementHandle, rect: GuiRect) {
        self.set_element_position(element, rect.x, rect.y);
        self.set_element_size(element, rect.width, rect.height);
    }

    /// The area of `element` in surface pixels.
    pub fn get_element_absolute_rect(&self, element: GuiElementHandle) -> GuiRect {
        let Some(node) = self.element(element) else {
            return GuiRect::default();
        };
        let mut rect = GuiRect::new(node.x, node.y, node.width, node.height);
        let mut parent = node.parent;
        while let Some(ancestor) = self.element(parent) {
            rect.x += ancestor.x;
            rect.y += ancestor.y;
            parent = ancestor.parent;
        }
        rect
    }

    /// Marks the area of `element` as needing a repaint.
    pub fn invalidate_element(&mut self, element: GuiElementHandle) {
        let surface = self.get_element_surface(element);
        let rect = self.get_element_absolute_rect(element);
        self.invalidate_surface_rect(surface, rect);
    }

    // --- Surfaces ---

    /// Resizes `surface`. Its root element is resized to cover it.
    pub fn set_surface_size(&mut self, surface: GuiSurfaceHandle, width: i32, height: i32) {
        let Some(target) = self.surface_mut(surface) else {
            return;
        };
        target.width = width.max(0);
        target.height = height.max(0);
        let bounds = target.bounds();
        target.dirty = bounds;
        let root = target.root;
        self.set_element_size(root, bounds.width, bounds.height);
    }

    /// Adds `rect` to the area of `surface` needing a repaint.
    pub fn invalidate_surface_rect(&mut self, surface: GuiSurfaceHandle, rect: GuiRect) {
        if let Some(surface) = self.surface_mut(surface) {
            surface.invalidate(rect);
        }
    }

    /// The area of `surface` changed since it was last painted.
    pub fn get_surface_dirty_rect(&self, surface: GuiSurfaceHandle) -> GuiRect {
        self.surface(surface)
            .map_or(GuiRect::default(), |surface| surface.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::GuiEventHandler;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Geometry(RefCell<Vec<GuiEvent>>);

    impl GuiEventHandler for Geometry {
        fn on_size(
            &self,
            _: &mut GuiContext,
            _: GuiElementHandle,
            width: i32,
            height: i32,
        ) -> bool {
            self.0.borrow_mut().push(GuiEvent::Size { width, height });
            true
        }

        fn on_move(&self, _: &mut GuiContext, _: GuiElementHandle, x: i32, y: i32) -> bool {
            self.0.borrow_mut().push(GuiEvent::Move { x, y });
            true
        }
    }

    #[test]
    fn test_absolute_rect_accumulates_parent_offsets() {
        let mut context = GuiContext::new();
        let root = context.create_element();
        let panel = context.create_child_element(root);
        let button = context.create_child_element(panel);
        context.set_element_rect(root, GuiRect::new(10, 10, 200, 200));
        context.set_element_rect(panel, GuiRect::new(5, 20, 100, 100));
        context.set_element_rect(button, GuiRect::new(1, 2, 30, 10));

        assert_eq!(
            context.get_element_absolute_rect(button),
            GuiRect::new(16, 32, 30, 10)
        );
    }

    #[test]
    fn test_geometry_changes_send_events_once() {
        let mut context = GuiContext::new();
        let element = context.create_element();
        let geometry = Rc::new(Geometry::default());
        context.attach_local_event_handler(element, geometry.clone());

        context.set_element_position(element, 3, 4);
        context.set_element_position(element, 3, 4);
        context.set_element_size(element, -5, 8);

        assert_eq!(
            *geometry.0.borrow(),
            [
                GuiEvent::Move { x: 3, y: 4 },
                GuiEvent::Size {
                    width: 0,
                    height: 8
                }
            ]
        );
    }

    #[test]
    fn test_surface_resize_covers_it_with_the_root() {
        let mut context = GuiContext::new();
        let surface = context.create_surface(320, 240);
        let root = context.create_element();
        context.set_surface_root_element(surface, root);

        context.set_surface_size(surface, 640, 480);

        assert_eq!(context.get_surface_size(surface), (640, 480));
        assert_eq!(context.get_element_size(root), (640, 480));
        assert_eq!(
            context.get_surface_dirty_rect(surface),
            GuiRect::new(0, 0, 640, 480)
        );
    }

    #[test]
    fn test_invalidation_is_clipped_to_the_surface() {
        let mut context = GuiContext::new();
        let surface = context.create_surface(100, 100);
        context.surface_mut(surface).unwrap().dirty = GuiRect::default();

        context.invalidate_surface_rect(surface, GuiRect::new(90, 90, 50, 50));
        context.invalidate_surface_rect(surface, GuiRect::new(0, 0, 10, 10));

        assert_eq!(
            context.get_surface_dirty_rect(surface),
            GuiRect::new(0, 0, 100, 100)
        );
    }
}
