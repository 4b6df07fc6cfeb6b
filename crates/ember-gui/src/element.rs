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

//! Elements: the nodes of a surface's tree.

use std::rc::Rc;

use crate::event::GuiEventHandler;
use crate::types::{GuiColor, GuiElementHandle, GuiSurfaceHandle, GuiTextureId};

/// One node of the GUI tree. Only reachable through the [`crate::GuiContext`].
pub struct GuiElement {
    pub(crate) handle: GuiElementHandle,
    pub(crate) id: String,
    /// Set on the root element of a surface only.
    pub(crate) surface: GuiSurfaceHandle,
    pub(crate) parent: GuiElementHandle,
    pub(crate) children: Vec<GuiElementHandle>,
    /// Relative to the parent, or to the surface for roots.
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) visible: bool,
    pub(crate) focusable: bool,
    pub(crate) background_color: GuiColor,
    pub(crate) background_image: Option<GuiTextureId>,
    pub(crate) border_color: GuiColor,
    pub(crate) border_width: i32,
    pub(crate) text: String,
    pub(crate) text_color: GuiColor,
    pub(crate) user_data: u64,
    pub(crate) handlers: Vec<Rc<dyn GuiEventHandler>>,
}

impl GuiElement {
    pub(crate) fn new() -> Self {
        Self {
            handle: GuiElementHandle::NULL,
            id: String::new(),
            surface: GuiSurfaceHandle::NULL,
            parent: GuiElementHandle::NULL,
            children: Vec::new(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            visible: true,
            focusable: false,
            background_color: GuiColor::TRANSPARENT,
            background_image: None,
            border_color: GuiColor::BLACK,
            border_width: 0,
            text: String::new(),
            text_color: GuiColor::BLACK,
            user_data: 0,
            handlers: Vec::new(),
        }
    }
}

impl std::fmt::Debug for GuiElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuiElement")
            .field("handle", &self.handle)
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("rect", &(self.x, self.y, self.width, self.height))
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

/// Identity of a shared handler, independent of its vtable.
pub(crate) fn same_handler(a: &Rc<dyn GuiEventHandler>, b: &Rc<dyn GuiEventHandler>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}
