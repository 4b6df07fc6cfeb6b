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

//! Event delivery.
//!
//! Handlers may attach or detach handlers, or delete elements, while they are
//! being called. Lists are therefore walked by index, never by iterator, and
//! every dispatch keeps the handlers it already called in a side list:
//!
//! 1. The handler at the current index is called, unless it was already
//!    called during this dispatch.
//! 2. If it returns `false`, the dispatch stops.
//! 3. If the target element no longer resolves, the dispatch stops.
//! 4. If the list still holds the same handler at that index, the index
//!    advances. Otherwise the list shifted under us: the index walks back to
//!    the last handler already called and resumes right after it.
//!
//! The side list holds `Rc` clones, so a handler detached mid-dispatch stays
//! allocated until the dispatch ends and its address cannot be reused by a
//! newly attached handler.

use std::rc::Rc;

use crate::context::GuiContext;
use crate::element::same_handler;
use crate::event::{GuiEvent, GuiEventHandler};
use crate::types::GuiElementHandle;

/// Handlers already called by one dispatch.
#[derive(Default)]
struct Processed(Vec<Rc<dyn GuiEventHandler>>);

impl Processed {
    fn contains(&self, handler: &Rc<dyn GuiEventHandler>) -> bool {
        self.0.iter().any(|seen| same_handler(seen, handler))
    }

    fn push(&mut self, handler: Rc<dyn GuiEventHandler>) {
        self.0.push(handler);
    }

    /// Where to continue after the list changed around `index`: just past
    /// the last already-called handler at or before `index`.
    fn resume_index(&self, handlers: &[Rc<dyn GuiEventHandler>], index: usize) -> usize {
        let mut next = (index + 1).min(handlers.len());
        while next > 0 {
            if self.contains(&handlers[next - 1]) {
                return next;
            }
            next -= 1;
        }
        0
    }
}

/// Which handler list a dispatch walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandlerList {
    Local,
    Global,
}

impl GuiContext {
    fn handler_at(
        &self,
        list: HandlerList,
        element: GuiElementHandle,
        index: usize,
    ) -> Option<Rc<dyn GuiEventHandler>> {
        match list {
            HandlerList::Local => self.element(element)?.handlers.get(index).cloned(),
            HandlerList::Global => self.global_handlers.get(index).cloned(),
        }
    }

    fn handler_list(
        &self,
        list: HandlerList,
        element: GuiElementHandle,
    ) -> &[Rc<dyn GuiEventHandler>] {
        match list {
            HandlerList::Local => match self.element(element) {
                Some(element) => &element.handlers,
                None => &[],
            },
            HandlerList::Global => &self.global_handlers,
        }
    }

    /// Walks one handler list. Returns `false` if the dispatch must stop.
    fn iterate_handlers(
        &mut self,
        list: HandlerList,
        element: GuiElementHandle,
        event: &GuiEvent,
    ) -> bool {
        let mut processed = Processed::default();
        let mut index = 0;
        while let Some(handler) = self.handler_at(list, element, index) {
            if processed.contains(&handler) {
                index += 1;
                continue;
            }
            processed.push(Rc::clone(&handler));

            if !event.deliver(&*handler, self, element) {
                log::trace!("{event:?} on {element:?} stopped by a handler");
                return false;
            }
            if !self.is_element_valid(element) {
                log::trace!("{element:?} was deleted while handling {event:?}");
                return false;
            }

            let handlers = self.handler_list(list, element);
            index = match handlers.get(index) {
                Some(current) if same_handler(current, &handler) => index + 1,
                _ => processed.resume_index(handlers, index),
            };
        }
        true
    }

    /// Delivers `event` to the handlers of `element`, then to the global
    /// handlers.
    ///
    /// Returns `false` if a handler stopped the dispatch or the element was
    /// deleted during it, `true` otherwise. Does nothing and returns `false`
    /// for an invalid element.
    pub fn dispatch_event(&mut self, element: GuiElementHandle, event: GuiEvent) -> bool {
        if !self.is_element_valid(element) {
            return false;
        }
        self.iterate_handlers(HandlerList::Local, element, &event)
            && self.iterate_handlers(HandlerList::Global, element, &event)
    }

    // --- Handler lists ---

    /// Attaches `handler` to `element`. Attaching a handler the element
    /// already has does nothing.
    pub fn attach_local_event_handler(
        &mut self,
        element: GuiElementHandle,
        handler: Rc<dyn GuiEventHandler>,
    ) {
        if let Some(element) = self.element_mut(element) {
            if !element.handlers.iter().any(|known| same_handler(known, &handler)) {
                element.handlers.push(handler);
            }
        }
    }

    /// Detaches `handler` from `element`.
    pub fn detach_local_event_handler(
        &mut self,
        element: GuiElementHandle,
        handler: &Rc<dyn GuiEventHandler>,
    ) {
        if let Some(element) = self.element_mut(element) {
            element.handlers.retain(|known| !same_handler(known, handler));
        }
    }

    /// Number of handlers attached to `element`.
    pub fn local_event_handler_count(&self, element: GuiElementHandle) -> usize {
        self.element(element)
            .map_or(0, |element| element.handlers.len())
    }

    /// Attaches `handler` to every element. Attaching it twice does nothing.
    pub fn attach_global_event_handler(&mut self, handler: Rc<dyn GuiEventHandler>) {
        if !self
            .global_handlers
            .iter()
            .any(|known| same_handler(known, &handler))
        {
            self.global_handlers.push(handler);
        }
    }

    pub fn detach_global_event_handler(&mut self, handler: &Rc<dyn GuiEventHandler>) {
        self.global_handlers
            .retain(|known| !same_handler(known, handler));
    }
}
