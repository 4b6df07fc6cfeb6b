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

use ember_gui::{GuiContext, GuiElementHandle, GuiEvent, GuiEventHandler};

type Log = Rc<RefCell<Vec<&'static str>>>;

/// What a handler does to the context after logging its call.
enum Action {
    Nothing,
    DetachSelf,
    DetachOther(RefCell<Option<Rc<dyn GuiEventHandler>>>),
    DeleteElement,
    Attach(RefCell<Option<Rc<dyn GuiEventHandler>>>),
    AttachGlobal(RefCell<Option<Rc<dyn GuiEventHandler>>>),
}

struct Scripted {
    name: &'static str,
    log: Log,
    action: Action,
    this: RefCell<Option<Rc<dyn GuiEventHandler>>>,
}

impl GuiEventHandler for Scripted {
    fn on_mouse_enter(&self, context: &mut GuiContext, element: GuiElementHandle) -> bool {
        self.log.borrow_mut().push(self.name);
        match &self.action {
            Action::Nothing => {}
            Action::DetachSelf => {
                if let Some(this) = self.this.borrow().as_ref() {
                    context.detach_local_event_handler(element, this);
                }
            }
            Action::DetachOther(other) => {
                if let Some(other) = other.borrow().as_ref() {
                    context.detach_local_event_handler(element, other);
                }
            }
            Action::DeleteElement => context.delete_element(element),
            Action::Attach(other) => {
                if let Some(other) = other.borrow_mut().take() {
                    context.attach_local_event_handler(element, other);
                }
            }
            Action::AttachGlobal(other) => {
                if let Some(other) = other.borrow_mut().take() {
                    context.attach_global_event_handler(other);
                }
            }
        }
        true
    }
}

fn handler(name: &'static str, log: &Log, action: Action) -> Rc<dyn GuiEventHandler> {
    let handler: Rc<dyn GuiEventHandler> = Rc::new(Scripted {
        name,
        log: Rc::clone(log),
        action,
        this: RefCell::new(None),
    });
    handler
}

/// A handler that can refer to itself, for self-detachment.
fn self_aware(name: &'static str, log: &Log, action: Action) -> Rc<dyn GuiEventHandler> {
    let scripted = Rc::new(Scripted {
        name,
        log: Rc::clone(log),
        action,
        this: RefCell::new(None),
    });
    let erased: Rc<dyn GuiEventHandler> = scripted.clone();
    *scripted.this.borrow_mut() = Some(Rc::clone(&erased));
    erased
}

#[test]
fn test_handler_detaching_itself_skips_nobody() {
    // --- 1. ARRANGE ---
    let mut context = GuiContext::new();
    let element = context.create_element();
    let log = Log::default();
    context.attach_local_event_handler(element, handler("A", &log, Action::Nothing));
    let b = self_aware("B", &log, Action::DetachSelf);
    context.attach_local_event_handler(element, Rc::clone(&b));
    context.attach_local_event_handler(element, handler("C", &log, Action::Nothing));

    // --- 2. ACT ---
    let completed = context.dispatch_event(element, GuiEvent::MouseEnter);

    // --- 3. ASSERT ---
    assert!(completed);
    assert_eq!(*log.borrow(), ["A", "B", "C"]);
    assert_eq!(context.local_event_handler_count(element), 2);

    // B is gone for the next dispatch.
    log.borrow_mut().clear();
    context.dispatch_event(element, GuiEvent::MouseEnter);
    assert_eq!(*log.borrow(), ["A", "C"]);
}

#[test]
fn test_deleting_the_element_stops_the_dispatch() {
    let mut context = GuiContext::new();
    let element = context.create_element();
    let log = Log::default();
    context.attach_local_event_handler(element, handler("A", &log, Action::DeleteElement));
    context.attach_local_event_handler(element, handler("B", &log, Action::Nothing));
    context.attach_global_event_handler(handler("global", &log, Action::Nothing));

    let completed = context.dispatch_event(element, GuiEvent::MouseEnter);

    assert!(!completed);
    assert_eq!(*log.borrow(), ["A"]);
    assert!(!context.is_element_valid(element));
}

#[test]
fn test_global_handler_deleting_the_element_stops_the_dispatch() {
    let mut context = GuiContext::new();
    let element = context.create_element();
    let log = Log::default();
    context.attach_global_event_handler(handler("first", &log, Action::DeleteElement));
    context.attach_global_event_handler(handler("second", &log, Action::Nothing));

    assert!(!context.dispatch_event(element, GuiEvent::MouseEnter));
    assert_eq!(*log.borrow(), ["first"]);
}

#[test]
fn test_detaching_an_earlier_handler_does_not_repeat_the_current_one() {
    let mut context = GuiContext::new();
    let element = context.create_element();
    let log = Log::default();
    let a = handler("A", &log, Action::Nothing);
    let b = handler("B", &log, Action::DetachOther(RefCell::new(Some(Rc::clone(&a)))));
    context.attach_local_event_handler(element, a);
    context.attach_local_event_handler(element, b);
    context.attach_local_event_handler(element, handler("C", &log, Action::Nothing));

    context.dispatch_event(element, GuiEvent::MouseEnter);

    assert_eq!(*log.borrow(), ["A", "B", "C"]);
}

#[test]
fn test_detaching_a_later_handler_prevents_its_call() {
    let mut context = GuiContext::new();
    let element = context.create_element();
    let log = Log::default();
    let c = handler("C", &log, Action::Nothing);
    context.attach_local_event_handler(
        element,
        handler("A", &log, Action::DetachOther(RefCell::new(Some(Rc::clone(&c))))),
    );
    context.attach_local_event_handler(element, handler("B", &log, Action::Nothing));
    context.attach_local_event_handler(element, c);

    context.dispatch_event(element, GuiEvent::MouseEnter);

    assert_eq!(*log.borrow(), ["A", "B"]);
}

#[test]
fn test_handlers_attached_mid_dispatch_run_in_the_same_dispatch() {
    let mut context = GuiContext::new();
    let element = context.create_element();
    let log = Log::default();
    let late = handler("late", &log, Action::Nothing);
    context.attach_local_event_handler(
        element,
        handler("A", &log, Action::Attach(RefCell::new(Some(late)))),
    );
    context.attach_local_event_handler(element, handler("B", &log, Action::Nothing));

    context.dispatch_event(element, GuiEvent::MouseEnter);

    assert_eq!(*log.borrow(), ["A", "B", "late"]);
}

#[test]
fn test_global_handler_attached_by_a_local_one_sees_the_event() {
    let mut context = GuiContext::new();
    let element = context.create_element();
    let log = Log::default();
    let global = handler("global", &log, Action::Nothing);
    context.attach_local_event_handler(
        element,
        handler("local", &log, Action::AttachGlobal(RefCell::new(Some(global)))),
    );

    context.dispatch_event(element, GuiEvent::MouseEnter);

    assert_eq!(*log.borrow(), ["local", "global"]);
}

#[test]
fn test_handler_reattached_at_the_end_runs_once() {
    struct Reattach {
        calls: Cell<u32>,
        this: RefCell<Option<Rc<dyn GuiEventHandler>>>,
    }

    impl GuiEventHandler for Reattach {
        fn on_mouse_enter(&self, context: &mut GuiContext, element: GuiElementHandle) -> bool {
            self.calls.set(self.calls.get() + 1);
            if let Some(this) = self.this.borrow().clone() {
                context.detach_local_event_handler(element, &this);
                context.attach_local_event_handler(element, this);
            }
            true
        }
    }

    let mut context = GuiContext::new();
    let element = context.create_element();
    let log = Log::default();
    let reattach = Rc::new(Reattach {
        calls: Cell::new(0),
        this: RefCell::new(None),
    });
    let erased: Rc<dyn GuiEventHandler> = reattach.clone();
    *reattach.this.borrow_mut() = Some(Rc::clone(&erased));
    context.attach_local_event_handler(element, erased);
    context.attach_local_event_handler(element, handler("B", &log, Action::Nothing));

    context.dispatch_event(element, GuiEvent::MouseEnter);

    assert_eq!(reattach.calls.get(), 1);
    assert_eq!(*log.borrow(), ["B"]);
}
