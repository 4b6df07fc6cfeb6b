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

//! The GUI context.
//!
//! Every public method takes handles and validates them first: a null,
//! stale or foreign handle makes setters do nothing and getters return a
//! default (`0`, `false`, an empty string, a null handle).
//!
//! The context is split over several files: this one holds the handle
//! tables, the hierarchy and the plain element properties; [`dispatch`]
//! delivers events to handlers; [`input`] routes pointer and keyboard input;
//! [`layout`] moves and resizes; [`paint`] draws through a
//! [`crate::GuiRenderer`].

pub mod dispatch;
pub mod input;
pub mod layout;
pub mod paint;

use std::rc::Rc;

use ember_core::HandleTable;

use crate::element::GuiElement;
use crate::event::GuiEventHandler;
use crate::surface::GuiSurface;
use crate::types::{GuiColor, GuiElementHandle, GuiSurfaceHandle, GuiTextureId};

/// Owns every element and surface, and the handlers listening to them.
///
/// Single-threaded: handlers are `Rc`s and the context is `!Send`.
#[derive(Debug, Default)]
pub struct GuiContext {
    pub(crate) elements: HandleTable<GuiElement>,
    pub(crate) surfaces: HandleTable<GuiSurface>,
    pub(crate) global_handlers: Vec<Rc<dyn GuiEventHandler>>,
    pub(crate) hovered: GuiElementHandle,
    pub(crate) focused: GuiElementHandle,
    pub(crate) captured: GuiElementHandle,
}

impl GuiContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn element(&self, element: GuiElementHandle) -> Option<&GuiElement> {
        self.elements.get(element.raw())
    }

    pub(crate) fn element_mut(&mut self, element: GuiElementHandle) -> Option<&mut GuiElement> {
        self.elements.get_mut(element.raw())
    }

    pub(crate) fn surface(&self, surface: GuiSurfaceHandle) -> Option<&GuiSurface> {
        self.surfaces.get(surface.raw())
    }

    pub(crate) fn surface_mut(&mut self, surface: GuiSurfaceHandle) -> Option<&mut GuiSurface> {
        self.surfaces.get_mut(surface.raw())
    }

    // --- Surfaces ---

    /// Creates a surface of the given size. Returns the null handle if the
    /// surface table is full.
    pub fn create_surface(&mut self, width: i32, height: i32) -> GuiSurfaceHandle {
        let Some(raw) = self.surfaces.insert(GuiSurface::new(width, height)) else {
            return GuiSurfaceHandle::NULL;
        };
        let handle = GuiSurfaceHandle::from_raw(raw);
        if let Some(surface) = self.surface_mut(handle) {
            surface.handle = handle;
        }
        log::debug!("Created {handle:?} ({width}x{height})");
        handle
    }

    /// Deletes a surface together with its element tree.
    pub fn delete_surface(&mut self, surface: GuiSurfaceHandle) {
        let Some(removed) = self.surfaces.remove(surface.raw()) else {
            return;
        };
        if let Some(root) = self.element_mut(removed.root) {
            root.surface = GuiSurfaceHandle::NULL;
        }
        self.delete_element(removed.root);
        log::debug!("Deleted {surface:?}");
    }

    /// Returns `true` if `surface` resolves.
    pub fn is_surface_valid(&self, surface: GuiSurfaceHandle) -> bool {
        self.surface(surface).is_some()
    }

    /// Every live surface.
    pub fn surfaces(&self) -> Vec<GuiSurfaceHandle> {
        self.surfaces
            .handles()
            .into_iter()
            .map(GuiSurfaceHandle::from_raw)
            .collect()
    }

    /// The size of `surface`, `(0, 0)` if it does not resolve.
    pub fn get_surface_size(&self, surface: GuiSurfaceHandle) -> (i32, i32) {
        self.surface(surface)
            .map_or((0, 0), |surface| (surface.width, surface.height))
    }

    /// The element tree shown on `surface`.
    pub fn get_surface_root_element(&self, surface: GuiSurfaceHandle) -> GuiElementHandle {
        self.surface(surface)
            .map_or(GuiElementHandle::NULL, |surface| surface.root)
    }

    /// Shows `element` on `surface`, detaching it from its parent and from
    /// any surface it was shown on. The previous root stays alive, detached.
    pub fn set_surface_root_element(
        &mut self,
        surface: GuiSurfaceHandle,
        element: GuiElementHandle,
    ) {
        if !self.is_surface_valid(surface) || !self.is_element_valid(element) {
            return;
        }
        self.detach_element_from_parent(element);
        let previous_surface = self.element(element).map(|element| element.surface);
        if let Some(previous) = previous_surface.and_then(|previous| self.surface_mut(previous)) {
            previous.root = GuiElementHandle::NULL;
        }
        let previous_root = self.get_surface_root_element(surface);
        if let Some(root) = self.element_mut(previous_root) {
            root.surface = GuiSurfaceHandle::NULL;
        }
        if let Some(root) = self.element_mut(element) {
            root.surface = surface;
        }
        if let Some(target) = self.surface_mut(surface) {
            target.root = element;
            let bounds = target.bounds();
            target.invalidate(bounds);
        }
    }

    // --- Elements ---

    /// Creates a detached element. Returns the null handle if the element
    /// table is full.
    pub fn create_element(&mut self) -> GuiElementHandle {
        let Some(raw) = self.elements.insert(GuiElement::new()) else {
            return GuiElementHandle::NULL;
        };
        let handle = GuiElementHandle::from_raw(raw);
        if let Some(element) = self.element_mut(handle) {
            element.handle = handle;
        }
        handle
    }

    /// Creates an element as the last child of `parent`. With an invalid
    /// parent the element is created detached.
    pub fn create_child_element(&mut self, parent: GuiElementHandle) -> GuiElementHandle {
        let element = self.create_element();
        self.set_element_parent(element, parent);
        element
    }

    /// Deletes `element` and all of its descendants.
    ///
    /// Safe to call from an event handler, including for the element the
    /// event is being delivered to; that dispatch then stops.
    pub fn delete_element(&mut self, element: GuiElementHandle) {
        if !self.is_element_valid(element) {
            return;
        }
        self.invalidate_element(element);
        self.detach_element_from_parent(element);
        if let Some(surface) = self.element(element).map(|element| element.surface) {
            if let Some(surface) = self.surface_mut(surface) {
                surface.root = GuiElementHandle::NULL;
            }
        }

        let mut pending = vec![element];
        while let Some(next) = pending.pop() {
            let Some(removed) = self.elements.remove(next.raw()) else {
                continue;
            };
            pending.extend(removed.children);
            for tracked in [&mut self.hovered, &mut self.focused, &mut self.captured] {
                if *tracked == next {
                    *tracked = GuiElementHandle::NULL;
                }
            }
        }
    }

    /// Returns `true` if `element` resolves.
    pub fn is_element_valid(&self, element: GuiElementHandle) -> bool {
        self.element(element).is_some()
    }

    /// Number of live elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    // --- Hierarchy ---

    /// Makes `element` the last child of `parent`. A null `parent` detaches.
    ///
    /// Returns `false`, changing nothing, if either handle is invalid or if
    /// `parent` is `element` or one of its descendants.
    pub fn set_element_parent(
        &mut self,
        element: GuiElementHandle,
        parent: GuiElementHandle,
    ) -> bool {
        if !self.is_element_valid(element) {
            return false;
        }
        if parent.is_null() {
            self.detach_element_from_parent(element);
            return true;
        }
        if !self.is_element_valid(parent)
            || parent == element
            || self.is_element_ancestor(element, parent)
        {
            return false;
        }

        self.detach_element_from_parent(element);
        // A surface root moved under another element stops being a root.
        if let Some(surface) = self.element(element).map(|element| element.surface) {
            if let Some(surface) = self.surface_mut(surface) {
                surface.root = GuiElementHandle::NULL;
            }
        }
        if let Some(child) = self.element_mut(element) {
            child.parent = parent;
            child.surface = GuiSurfaceHandle::NULL;
        }
        if let Some(parent) = self.element_mut(parent) {
            parent.children.push(element);
        }
        self.invalidate_element(element);
        true
    }

    /// Removes `element` from its parent's children.
    pub fn detach_element_from_parent(&mut self, element: GuiElementHandle) {
        let parent = self.get_element_parent(element);
        if parent.is_null() {
            return;
        }
        self.invalidate_element(element);
        if let Some(parent) = self.element_mut(parent) {
            parent.children.retain(|child| *child != element);
        }
        if let Some(child) = self.element_mut(element) {
            child.parent = GuiElementHandle::NULL;
        }
    }

    /// The parent of `element`, null for roots and detached elements.
    pub fn get_element_parent(&self, element: GuiElementHandle) -> GuiElementHandle {
        self.element(element)
            .map_or(GuiElementHandle::NULL, |element| element.parent)
    }

    /// The children of `element`, in paint order.
    pub fn get_element_children(&self, element: GuiElementHandle) -> Vec<GuiElementHandle> {
        self.element(element)
            .map(|element| element.children.clone())
            .unwrap_or_default()
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `element`.
    pub fn is_element_ancestor(
        &self,
        ancestor: GuiElementHandle,
        element: GuiElementHandle,
    ) -> bool {
        if ancestor.is_null() {
            return false;
        }
        let mut current = self.get_element_parent(element);
        while !current.is_null() {
            if current == ancestor {
                return true;
            }
            current = self.get_element_parent(current);
        }
        false
    }

    /// The topmost ancestor of `element`, or `element` itself.
    pub fn get_element_root(&self, element: GuiElementHandle) -> GuiElementHandle {
        if !self.is_element_valid(element) {
            return GuiElementHandle::NULL;
        }
        let mut current = element;
        loop {
            let parent = self.get_element_parent(current);
            if parent.is_null() {
                return current;
            }
            current = parent;
        }
    }

    /// The surface `element`'s tree is shown on, null if none.
    pub fn get_element_surface(&self, element: GuiElementHandle) -> GuiSurfaceHandle {
        let root = self.get_element_root(element);
        self.element(root)
            .map_or(GuiSurfaceHandle::NULL, |root| root.surface)
    }

    // --- Identification ---

    /// Names `element`. Ids need not be unique.
    pub fn set_element_id(&mut self, element: GuiElementHandle, id: &str) {
        if let Some(element) = self.element_mut(element) {
            element.id.clear();
            element.id.push_str(id);
        }
    }

    /// The id of `element`, empty if unnamed or invalid.
    pub fn get_element_id(&self, element: GuiElementHandle) -> &str {
        self.element(element).map_or("", |element| element.id.as_str())
    }

    /// The first element, in table order, whose id is `id`.
    pub fn find_element_by_id(&self, id: &str) -> GuiElementHandle {
        self.elements
            .iter()
            .find(|(_, element)| element.id == id)
            .map_or(GuiElementHandle::NULL, |(_, element)| element.handle)
    }

    /// Attaches an application value to `element`.
    pub fn set_element_user_data(&mut self, element: GuiElementHandle, data: u64) {
        if let Some(element) = self.element_mut(element) {
            element.user_data = data;
        }
    }

    /// The application value attached to `element`, `0` by default.
    pub fn get_element_user_data(&self, element: GuiElementHandle) -> u64 {
        self.element(element).map_or(0, |element| element.user_data)
    }

    // --- Appearance ---

    /// Shows or hides `element` and its descendants.
    pub fn set_element_visible(&mut self, element: GuiElementHandle, visible: bool) {
        let changed = self
            .element_mut(element)
            .is_some_and(|element| std::mem::replace(&mut element.visible, visible) != visible);
        if changed {
            self.invalidate_element(element);
        }
    }

    /// The visibility flag of `element` itself.
    pub fn get_element_visible(&self, element: GuiElementHandle) -> bool {
        self.element(element).is_some_and(|element| element.visible)
    }

    /// Returns `true` if `element` and all of its ancestors are visible.
    pub fn is_element_visible(&self, element: GuiElementHandle) -> bool {
        let mut current = element;
        while let Some(node) = self.element(current) {
            if !node.visible {
                return false;
            }
            if node.parent.is_null() {
                return true;
            }
            current = node.parent;
        }
        false
    }

    pub fn set_element_background_color(&mut self, element: GuiElementHandle, color: GuiColor) {
        if let Some(node) = self.element_mut(element) {
            node.background_color = color;
            self.invalidate_element(element);
        }
    }

    pub fn get_element_background_color(&self, element: GuiElementHandle) -> GuiColor {
        self.element(element)
            .map_or(GuiColor::TRANSPARENT, |element| element.background_color)
    }

    /// Stretches `texture` over the element's area, `None` removes it.
    pub fn set_element_background_image(
        &mut self,
        element: GuiElementHandle,
        texture: Option<GuiTextureId>,
    ) {
        if let Some(node) = self.element_mut(element) {
            node.background_image = texture;
            self.invalidate_element(element);
        }
    }

    pub fn get_element_background_image(&self, element: GuiElementHandle) -> Option<GuiTextureId> {
        self.element(element)
            .and_then(|element| element.background_image)
    }

    /// Draws a border `width` pixels wide inside the element's edges. A
    /// width of `0` removes it.
    pub fn set_element_border(&mut self, element: GuiElementHandle, width: i32, color: GuiColor) {
        if let Some(node) = self.element_mut(element) {
            node.border_width = width.max(0);
            node.border_color = color;
            self.invalidate_element(element);
        }
    }

    /// Border width and color of `element`.
    pub fn get_element_border(&self, element: GuiElementHandle) -> (i32, GuiColor) {
        self.element(element).map_or((0, GuiColor::TRANSPARENT), |element| {
            (element.border_width, element.border_color)
        })
    }

    pub fn set_element_text(&mut self, element: GuiElementHandle, text: &str) {
        if let Some(node) = self.element_mut(element) {
            node.text.clear();
            node.text.push_str(text);
            self.invalidate_element(element);
        }
    }

    pub fn get_element_text(&self, element: GuiElementHandle) -> &str {
        self.element(element)
            .map_or("", |element| element.text.as_str())
    }

    pub fn set_element_text_color(&mut self, element: GuiElementHandle, color: GuiColor) {
        if let Some(node) = self.element_mut(element) {
            node.text_color = color;
            self.invalidate_element(element);
        }
    }

    pub fn get_element_text_color(&self, element: GuiElementHandle) -> GuiColor {
        self.element(element)
            .map_or(GuiColor::TRANSPARENT, |element| element.text_color)
    }

    /// Whether a button press on `element` gives it keyboard focus.
    pub fn set_element_focusable(&mut self, element: GuiElementHandle, focusable: bool) {
        if let Some(node) = self.element_mut(element) {
            node.focusable = focusable;
        }
    }

    pub fn get_element_focusable(&self, element: GuiElementHandle) -> bool {
        self.element(element).is_some_and(|element| element.focusable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_handles_are_ignored() {
        let mut context = GuiContext::new();
        let stale = context.create_element();
        context.delete_element(stale);
        let fresh = context.create_element();
        context.set_element_position(fresh, 7, 9);

        context.set_element_position(stale, 1, 1);
        context.set_element_text(stale, "ghost");

        assert_eq!(fresh.raw().slot(), stale.raw().slot());
        assert_eq!(context.get_element_position(fresh), (7, 9));
        assert_eq!(context.get_element_position(stale), (0, 0));
        assert_eq!(context.get_element_text(fresh), "");
        assert_eq!(context.get_element_text(stale), "");
        assert!(!context.is_element_valid(stale));
    }

    #[test]
    fn test_reparenting_rejects_cycles() {
        let mut context = GuiContext::new();
        let root = context.create_element();
        let child = context.create_child_element(root);
        let grandchild = context.create_child_element(child);

        assert!(!context.set_element_parent(root, grandchild));
        assert!(!context.set_element_parent(child, child));
        assert!(context.is_element_ancestor(root, grandchild));

        assert!(context.set_element_parent(grandchild, root));
        assert_eq!(context.get_element_children(root), [child, grandchild]);
        assert!(context.get_element_children(child).is_empty());
    }

    #[test]
    fn test_delete_removes_the_whole_subtree() {
        let mut context = GuiContext::new();
        let surface = context.create_surface(100, 100);
        let root = context.create_element();
        context.set_surface_root_element(surface, root);
        let panel = context.create_child_element(root);
        let button = context.create_child_element(panel);

        context.delete_element(panel);

        assert!(!context.is_element_valid(button));
        assert!(context.get_element_children(root).is_empty());
        assert_eq!(context.element_count(), 1);

        context.delete_surface(surface);
        assert_eq!(context.element_count(), 0);
        assert!(!context.is_surface_valid(surface));
    }

    #[test]
    fn test_roots_know_their_surface() {
        let mut context = GuiContext::new();
        let first = context.create_surface(10, 10);
        let second = context.create_surface(10, 10);
        let root = context.create_element();
        let child = context.create_child_element(root);

        context.set_surface_root_element(first, root);
        assert_eq!(context.get_element_surface(child), first);

        context.set_surface_root_element(second, root);
        assert_eq!(context.get_surface_root_element(first), GuiElementHandle::NULL);
        assert_eq!(context.get_element_surface(child), second);

        // Moving a root under another element unroots it.
        let other = context.create_element();
        context.set_element_parent(root, other);
        assert_eq!(context.get_surface_root_element(second), GuiElementHandle::NULL);
        assert_eq!(context.get_element_surface(child), GuiSurfaceHandle::NULL);
    }

    #[test]
    fn test_ids_and_inherited_visibility() {
        let mut context = GuiContext::new();
        let root = context.create_element();
        let child = context.create_child_element(root);
        context.set_element_id(child, "ok_button");

        assert_eq!(context.find_element_by_id("ok_button"), child);
        assert_eq!(context.find_element_by_id("missing"), GuiElementHandle::NULL);

        context.set_element_visible(root, false);
        assert!(context.get_element_visible(child));
        assert!(!context.is_element_visible(child));
    }
}
