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

//! Surfaces: the top-level canvases elements are painted onto.

use crate::types::{GuiElementHandle, GuiRect, GuiSurfaceHandle};

/// A paintable canvas holding one tree of elements.
#[derive(Debug, Clone)]
pub struct GuiSurface {
    pub(crate) handle: GuiSurfaceHandle,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) root: GuiElementHandle,
    pub(crate) dirty: GuiRect,
}

impl GuiSurface {
    pub(crate) fn new(width: i32, height: i32) -> Self {
        Self {
            handle: GuiSurfaceHandle::NULL,
            width: width.max(0),
            height: height.max(0),
            root: GuiElementHandle::NULL,
            dirty: GuiRect::new(0, 0, width.max(0), height.max(0)),
        }
    }

    /// The surface's full area.
    pub(crate) fn bounds(&self) -> GuiRect {
        GuiRect::new(0, 0, self.width, self.height)
    }

    /// Adds `rect`, clipped to the surface, to the area needing a repaint.
    pub(crate) fn invalidate(&mut self, rect: GuiRect) {
        let clipped = rect.intersect(&self.bounds());
        self.dirty = self.dirty.union(&clipped);
    }
}
