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

//! GUI events and the handler trait receiving them.

use crate::context::GuiContext;
use crate::types::{GuiElementHandle, KeyModifiers, MouseButton};

/// An event delivered to an element's handlers.
///
/// Mouse coordinates are relative to the top-left corner of the element the
/// event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuiEvent {
    /// The element was resized.
    Size {
        /// New width.
        width: i32,
        /// New height.
        height: i32,
    },
    /// The element moved within its parent.
    Move {
        /// New left edge, relative to the parent.
        x: i32,
        /// New top edge, relative to the parent.
        y: i32,
    },
    /// The pointer entered the element.
    MouseEnter,
    /// The pointer left the element.
    MouseLeave,
    /// The pointer moved over the element.
    MouseMove {
        /// Pointer x.
        x: i32,
        /// Pointer y.
        y: i32,
    },
    /// A mouse button was pressed over the element.
    MouseButtonDown {
        /// The button.
        button: MouseButton,
        /// Pointer x.
        x: i32,
        /// Pointer y.
        y: i32,
    },
    /// A mouse button was released.
    MouseButtonUp {
        /// The button.
        button: MouseButton,
        /// Pointer x.
        x: i32,
        /// Pointer y.
        y: i32,
    },
    /// A mouse button was double-clicked over the element.
    MouseButtonDoubleClick {
        /// The button.
        button: MouseButton,
        /// Pointer x.
        x: i32,
        /// Pointer y.
        y: i32,
    },
    /// The mouse wheel turned over the element.
    MouseWheel {
        /// Wheel delta, positive away from the user.
        delta: f32,
        /// Pointer x.
        x: i32,
        /// Pointer y.
        y: i32,
    },
    /// A key was pressed and released, or auto-repeated.
    KeyPressed {
        /// Platform key code.
        key: u32,
        /// Held modifiers.
        modifiers: KeyModifiers,
    },
    /// A key went down.
    KeyDown {
        /// Platform key code.
        key: u32,
        /// Held modifiers.
        modifiers: KeyModifiers,
    },
    /// A key went up.
    KeyUp {
        /// Platform key code.
        key: u32,
        /// Held modifiers.
        modifiers: KeyModifiers,
    },
    /// A printable character was typed.
    PrintableKey {
        /// The typed character.
        character: char,
    },
    /// The element received keyboard focus.
    ReceiveFocus,
    /// The element lost keyboard focus.
    LoseFocus,
}

impl GuiEvent {
    /// Calls the method of `handler` matching this event.
    ///
    /// Returns `false` if the handler asked to stop the dispatch.
    pub fn deliver(
        &self,
        handler: &dyn GuiEventHandler,
        context: &mut GuiContext,
        element: GuiElementHandle,
    ) -> bool {
        match *self {
            GuiEvent::Size { width, height } => handler.on_size(context, element, width, height),
            GuiEvent::Move { x, y } => handler.on_move(context, element, x, y),
            GuiEvent::MouseEnter => handler.on_mouse_enter(context, element),
            GuiEvent::MouseLeave => handler.on_mouse_leave(context, element),
            GuiEvent::MouseMove { x, y } => handler.on_mouse_move(context, element, x, y),
            GuiEvent::MouseButtonDown { button, x, y } => {
                handler.on_mouse_button_down(context, element, button, x, y)
            }
            GuiEvent::MouseButtonUp { button, x, y } => {
                handler.on_mouse_button_up(context, element, button, x, y)
            }
            GuiEvent::MouseButtonDoubleClick { button, x, y } => {
                handler.on_mouse_button_double_click(context, element, button, x, y)
            }
            GuiEvent::MouseWheel { delta, x, y } => {
                handler.on_mouse_wheel(context, element, delta, x, y)
            }
            GuiEvent::KeyPressed { key, modifiers } => {
                handler.on_key_pressed(context, element, key, modifiers)
            }
            GuiEvent::KeyDown { key, modifiers } => {
                handler.on_key_down(context, element, key, modifiers)
            }
            GuiEvent::KeyUp { key, modifiers } => {
                handler.on_key_up(context, element, key, modifiers)
            }
            GuiEvent::PrintableKey { character } => {
                handler.on_printable_key(context, element, character)
            }
            GuiEvent::ReceiveFocus => handler.on_receive_focus(context, element),
            GuiEvent::LoseFocus => handler.on_lose_focus(context, element),
        }
    }
}

/// Receives events of the elements it is attached to, or of every element
/// when attached globally.
///
/// Every method defaults to doing nothing and returning `true`. Returning
/// `false` stops the dispatch: no further handler sees the event.
///
/// Handlers take `&self` and are shared as `Rc<dyn GuiEventHandler>`; keep
/// mutable state in a `Cell` or `RefCell`. The context passed in is fully
/// usable, including deleting `element` itself.
#[allow(unused_variables)]
pub trait GuiEventHandler {
    /// See [`GuiEvent::Size`].
    fn on_size(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        width: i32,
        height: i32,
    ) -> bool {
        true
    }

    /// See [`GuiEvent::Move`].
    fn on_move(&self, context: &mut GuiContext, element: GuiElementHandle, x: i32, y: i32) -> bool {
        true
    }

    /// See [`GuiEvent::MouseEnter`].
    fn on_mouse_enter(&self, context: &mut GuiContext, element: GuiElementHandle) -> bool {
        true
    }

    /// See [`GuiEvent::MouseLeave`].
    fn on_mouse_leave(&self, context: &mut GuiContext, element: GuiElementHandle) -> bool {
        true
    }

    /// See [`GuiEvent::MouseMove`].
    fn on_mouse_move(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        x: i32,
        y: i32,
    ) -> bool {
        true
    }

    /// See [`GuiEvent::MouseButtonDown`].
    fn on_mouse_button_down(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        button: MouseButton,
        x: i32,
        y: i32,
    ) -> bool {
        true
    }

    /// See [`GuiEvent::MouseButtonUp`].
    fn on_mouse_button_up(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        button: MouseButton,
        x: i32,
        y: i32,
    ) -> bool {
        true
    }

    /// See [`GuiEvent::MouseButtonDoubleClick`].
    fn on_mouse_button_double_click(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        button: MouseButton,
        x: i32,
        y: i32,
    ) -> bool {
        true
    }

    /// See [`GuiEvent::MouseWheel`].
    fn on_mouse_wheel(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        delta: f32,
        x: i32,
        y: i32,
    ) -> bool {
        true
    }

    /// See [`GuiEvent::KeyPressed`].
    fn on_key_pressed(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        key: u32,
        modifiers: KeyModifiers,
    ) -> bool {
        true
    }

    /// See [`GuiEvent::KeyDown`].
    fn on_key_down(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        key: u32,
        modifiers: KeyModifiers,
    ) -> bool {
        true
    }

    /// See [`GuiEvent::KeyUp`].
    fn on_key_up(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        key: u32,
        modifiers: KeyModifiers,
    ) -> bool {
        true
    }

    /// See [`GuiEvent::PrintableKey`].
    fn on_printable_key(
        &self,
        context: &mut GuiContext,
        element: GuiElementHandle,
        character: char,
    ) -> bool {
        true
    }

    /// See [`GuiEvent::ReceiveFocus`].
    fn on_receive_focus(&self, context: &mut GuiContext, element: GuiElementHandle) -> bool {
        true
    }

    /// See [`GuiEvent::LoseFocus`].
    fn on_lose_focus(&self, context: &mut GuiContext, element: GuiElementHandle) -> bool {
        true
    }
}

impl std::fmt::Debug for dyn GuiEventHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GuiEventHandler")
    }
}
