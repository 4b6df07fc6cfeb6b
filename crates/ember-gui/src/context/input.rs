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

//! Pointer and keyboard input routing.
//!
//! Pointer input is given in surface pixels and delivered to the topmost
//! visible element under the pointer, with coordinates made relative to that
//! element. While a button is held, pointer input goes to the element the
//! button went down on. Keyboard input goes to the focused element.

use crate::context::GuiContext;
use crate::event::GuiEvent;
use crate::types::{GuiElementHandle, GuiSurfaceHandle, KeyModifiers, MouseButton};

impl GuiContext {
    /// The topmost visible element of `surface` containing the point, null if
    /// none. Later children are above earlier ones.
    pub fn hit_test(&self, surface: GuiSurfaceHandle, x: i32, y: i32) -> GuiElementHandle {
        let root = self.get_surface_root_element(surface);
        self.hit_test_element(root, x, y, 0, 0)
            .unwrap_or(GuiElementHandle::NULL)
    }

    fn hit_test_element(
        &self,
        element: GuiElementHandle,
        x: i32,
        y: i32,
        origin_x: i32,
        origin_y: i32,
    ) -> Option<GuiElementHandle> {
        let node = self.element(element)?;
        if !node.visible {
            return None;
        }
        let (left, top) = (origin_x + node.x, origin_y + node.y);
        let inside = x >= left && y >= top && x < left + node.width && y < top + node.height;
        if !inside {
            return None;
        }
        node.children
            .iter()
            .rev()
            .find_map(|child| self.hit_test_element(*child, x, y, left, top))
            .or(Some(element))
    }

    /// Converts a surface point to coordinates relative to `element`.
    pub fn to_element_coordinates(&self, element: GuiElementHandle, x: i32, y: i32) -> (i32, i32) {
        let rect = self.get_element_absolute_rect(element);
        (x - rect.x, y - rect.y)
    }

    /// The element under the pointer.
    pub fn hovered_element(&self) -> GuiElementHandle {
        self.hovered
    }

    /// The element receiving keyboard input.
    pub fn focused_element(&self) -> GuiElementHandle {
        self.focused
    }

    /// The element holding the pointer while a button is down.
    pub fn captured_element(&self) -> GuiElementHandle {
        self.captured
    }

    /// Moves keyboard focus, sending [`GuiEvent::LoseFocus`] and
    /// [`GuiEvent::ReceiveFocus`]. An invalid element clears the focus.
    pub fn set_focus(&mut self, element: GuiElementHandle) {
        let element = if self.is_element_valid(element) {
            element
        } else {
            GuiElementHandle::NULL
        };
        if self.focused == element {
            return;
        }
        let previous = std::mem::replace(&mut self.focused, element);
        self.dispatch_event(previous, GuiEvent::LoseFocus);
        // The previous element's handlers may have moved the focus already.
        if self.focused == element {
            self.dispatch_event(element, GuiEvent::ReceiveFocus);
        }
    }

    fn set_hover(&mut self, element: GuiElementHandle) {
        if self.hovered == element {
            return;
        }
        let previous = std::mem::replace(&mut self.hovered, element);
        self.dispatch_event(previous, GuiEvent::MouseLeave);
        if self.hovered == element {
            self.dispatch_event(element, GuiEvent::MouseEnter);
        }
    }

    /// The element pointer input goes to: the captured one, if any.
    fn pointer_target(&self, surface: GuiSurfaceHandle, x: i32, y: i32) -> GuiElementHandle {
        if self.is_element_valid(self.captured) {
            self.captured
        } else {
            self.hit_test(surface, x, y)
        }
    }

    /// Handles the pointer moving to `(x, y)` on `surface`.
    pub fn on_mouse_move(&mut self, surface: GuiSurfaceHandle, x: i32, y: i32) {
        if !self.is_surface_valid(surface) {
            return;
        }
        let under = self.hit_test(surface, x, y);
        self.set_hover(under);

        let target = self.pointer_target(surface, x, y);
        let (x, y) = self.to_element_coordinates(target, x, y);
        self.dispatch_event(target, GuiEvent::MouseMove { x, y });
    }

    /// Handles a button press. Focus moves to the closest focusable element
    /// at or above the one pressed, or is cleared if there is none, and the
    /// pressed element captures the pointer until the button is released.
    pub fn on_mouse_button_down(
        &mut self,
        surface: GuiSurfaceHandle,
        button: MouseButton,
        x: i32,
        y: i32,
    ) {
        if !self.is_surface_valid(surface) {
            return;
        }
        let target = self.hit_test(surface, x, y);
        let mut focus = target;
        while !focus.is_null() && !self.get_element_focusable(focus) {
            focus = self.get_element_parent(focus);
        }
        self.set_focus(focus);

        if !self.is_element_valid(target) {
            return;
        }
        self.captured = target;
        let (x, y) = self.to_element_coordinates(target, x, y);
        self.dispatch_event(target, GuiEvent::MouseButtonDown { button, x, y });
    }

    /// Handles a button release and ends the pointer capture.
    pub fn on_mouse_button_up(
        &mut self,
        surface: GuiSurfaceHandle,
        button: MouseButton,
        x: i32,
        y: i32,
    ) {
        if !self.is_surface_valid(surface) {
            return;
        }
        let target = self.pointer_target(surface, x, y);
        self.captured = GuiElementHandle::NULL;
        let (x, y) = self.to_element_coordinates(target, x, y);
        self.dispatch_event(target, GuiEvent::MouseButtonUp { button, x, y });
    }

    /// Handles a double click, which the platform reports in place of the
    /// second button press.
    pub fn on_mouse_button_double_click(
        &mut self,
        surface: GuiSurfaceHandle,
        button: MouseButton,
        x: i32,
        y: i32,
    ) {
        if !self.is_surface_valid(surface) {
            return;
        }
        let target = self.hit_test(surface, x, y);
        let (x, y) = self.to_element_coordinates(target, x, y);
        self.dispatch_event(target, GuiEvent::MouseButtonDoubleClick { button, x, y });
    }

    /// Handles the wheel turning by `delta` notches with the pointer at
    /// `(x, y)`.
    pub fn on_mouse_wheel(&mut self, surface: GuiSurfaceHandle, delta: f32, x: i32, y: i32) {
        if !self.is_surface_valid(surface) {
            return;
        }
        let target = self.pointer_target(surface, x, y);
        let (x, y) = self.to_element_coordinates(target, x, y);
        self.dispatch_event(target, GuiEvent::MouseWheel { delta, x, y });
    }

    pub fn on_key_down(&mut self, key: u32, modifiers: KeyModifiers) {
        self.dispatch_event(self.focused, GuiEvent::KeyDown { key, modifiers });
    }

    pub fn on_key_up(&mut self, key: u32, modifiers: KeyModifiers) {
        self.dispatch_event(self.focused, GuiEvent::KeyUp { key, modifiers });
    }

    pub fn on_key_pressed(&mut self, key: u32, modifiers: KeyModifiers) {
        self.dispatch_event(self.focused, GuiEvent::KeyPressed { key, modifiers });
    }

    /// Delivers a typed character. Control characters are dropped.
    pub fn on_printable_key(&mut self, character: char) {
        if character.is_control() {
            return;
        }
        self.dispatch_event(self.focused, GuiEvent::PrintableKey { character });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GuiRect;

    fn layout() -> (
        GuiContext,
        GuiSurfaceHandle,
        GuiElementHandle,
        GuiElementHandle,
        GuiElementHandle,
    ) {
        let mut context = GuiContext::new();
        let surface = context.create_surface(200, 100);
        let root = context.create_element();
        context.set_surface_root_element(surface, root);
        context.set_element_rect(root, GuiRect::new(0, 0, 200, 100));
        let left = context.create_child_element(root);
        context.set_element_rect(left, GuiRect::new(0, 0, 100, 100));
        let overlay = context.create_child_element(root);
        context.set_element_rect(overlay, GuiRect::new(50, 0, 100, 50));
        (context, surface, root, left, overlay)
    }

    #[test]
    fn test_hit_test_prefers_later_children() {
        let (mut context, surface, root, left, overlay) = layout();

        assert_eq!(context.hit_test(surface, 10, 10), left);
        assert_eq!(context.hit_test(surface, 60, 10), overlay);
        assert_eq!(context.hit_test(surface, 60, 70), left);
        assert_eq!(context.hit_test(surface, 190, 90), root);
        assert_eq!(context.hit_test(surface, 250, 10), GuiElementHandle::NULL);

        context.set_element_visible(overlay, false);
        assert_eq!(context.hit_test(surface, 60, 10), left);
    }

    #[test]
    fn test_press_focuses_the_closest_focusable_element() {
        let (mut context, surface, root, _, overlay) = layout();
        context.set_element_focusable(root, true);
        context.set_element_focusable(overlay, true);

        context.on_mouse_button_down(surface, MouseButton::Left, 60, 10);
        assert_eq!(context.focused_element(), overlay);
        assert_eq!(context.captured_element(), overlay);

        context.on_mouse_button_up(surface, MouseButton::Left, 10, 10);
        assert_eq!(context.captured_element(), GuiElementHandle::NULL);

        context.on_mouse_button_down(surface, MouseButton::Left, 10, 10);
        assert_eq!(context.focused_element(), root);

        context.set_element_focusable(root, false);
        context.on_mouse_button_down(surface, MouseButton::Left, 10, 60);
        assert_eq!(context.focused_element(), GuiElementHandle::NULL);
    }

    #[test]
    fn test_hover_follows_the_pointer() {
        let (mut context, surface, _, left, overlay) = layout();

        context.on_mouse_move(surface, 10, 10);
        assert_eq!(context.hovered_element(), left);
        context.on_mouse_move(surface, 60, 10);
        assert_eq!(context.hovered_element(), overlay);

        context.delete_element(overlay);
        assert_eq!(context.hovered_element(), GuiElementHandle::NULL);
    }

    #[test]
    fn test_element_coordinates() {
        let (context, _, _, _, overlay) = layout();
        assert_eq!(context.to_element_coordinates(overlay, 60, 10), (10, 10));
    }
}
