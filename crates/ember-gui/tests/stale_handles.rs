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

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ember_gui::{GuiContext, GuiElementHandle, GuiEvent, GuiEventHandler, GuiRect};

/// Counts the `Move` events it receives.
#[derive(Default)]
struct MoveCounter {
    moves: Cell<u32>,
}

impl GuiEventHandler for MoveCounter {
    fn on_move(&self, _: &mut GuiContext, _: GuiElementHandle, _: i32, _: i32) -> bool {
        self.moves.set(self.moves.get() + 1);
        true
    }
}

#[test]
fn test_stale_handle_does_not_touch_the_element_reusing_its_slot() {
    // --- 1. ARRANGE ---
    let mut context = GuiContext::new();
    let stale = context.create_element();
    context.delete_element(stale);

    let fresh = context.create_element();
    context.set_element_rect(fresh, GuiRect::new(10, 20, 30, 40));
    let counter = Rc::new(MoveCounter::default());
    context.attach_local_event_handler(fresh, counter.clone());

    // --- 2. ACT ---
    context.set_element_position(stale, 1, 1);
    context.set_element_size(stale, 1, 1);
    context.set_element_visible(stale, false);
    context.delete_element(stale);
    let dispatched = context.dispatch_event(stale, GuiEvent::Move { x: 1, y: 1 });

    // --- 3. ASSERT ---
    assert_eq!(stale.raw().slot(), fresh.raw().slot());
    assert_ne!(stale, fresh);
    assert!(!dispatched);
    assert_eq!(counter.moves.get(), 0);
    assert!(context.is_element_valid(fresh));
    assert!(context.get_element_visible(fresh));
    assert_eq!(context.get_element_position(fresh), (10, 20));
    assert_eq!(context.get_element_size(fresh), (30, 40));
}

#[test]
fn test_stale_parent_is_rejected() {
    let mut context = GuiContext::new();
    let stale = context.create_element();
    context.delete_element(stale);
    let fresh = context.create_element();
    let orphan = context.create_element();

    assert!(!context.set_element_parent(orphan, stale));
    let detached = context.create_child_element(stale);
    assert!(context.is_element_valid(detached));
    assert_eq!(context.get_element_parent(detached), GuiElementHandle::NULL);
    assert!(context.get_element_children(fresh).is_empty());
    assert_eq!(context.get_element_parent(orphan), GuiElementHandle::NULL);
}

#[test]
fn test_stale_surface_handle_is_ignored() {
    let mut context = GuiContext::new();
    let stale = context.create_surface(10, 10);
    context.delete_surface(stale);
    let fresh = context.create_surface(64, 32);

    context.set_surface_size(stale, 1, 1);
    context.on_mouse_move(stale, 5, 5);

    assert_eq!(stale.raw().slot(), fresh.raw().slot());
    assert!(!context.is_surface_valid(stale));
    assert_eq!(context.get_surface_size(fresh), (64, 32));
    assert_eq!(context.surfaces(), [fresh]);
}

#[test]
fn test_recreating_the_element_mid_dispatch_still_stops_it() {
    /// Replaces its element with a new one, which lands in the same slot.
    struct Recreate {
        replacement: Cell<GuiElementHandle>,
    }

    impl GuiEventHandler for Recreate {
        fn on_mouse_enter(&self, context: &mut GuiContext, element: GuiElementHandle) -> bool {
            context.delete_element(element);
            self.replacement.set(context.create_element());
            true
        }
    }

    let mut context = GuiContext::new();
    let element = context.create_element();
    let recreate = Rc::new(Recreate {
        replacement: Cell::new(GuiElementHandle::NULL),
    });
    let calls = Rc::new(RefCell::new(0));
    struct Later(Rc<RefCell<u32>>);
    impl GuiEventHandler for Later {
        fn on_mouse_enter(&self, _: &mut GuiContext, _: GuiElementHandle) -> bool {
            *self.0.borrow_mut() += 1;
            true
        }
    }
    context.attach_local_event_handler(element, recreate.clone());
    context.attach_local_event_handler(element, Rc::new(Later(Rc::clone(&calls))));
    context.attach_global_event_handler(Rc::new(Later(Rc::clone(&calls))));

    assert!(!context.dispatch_event(element, GuiEvent::MouseEnter));

    let replacement = recreate.replacement.get();
    assert_eq!(replacement.raw().slot(), element.raw().slot());
    assert!(context.is_element_valid(replacement));
    assert_eq!(*calls.borrow(), 0);
}
