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

//! Handles and small value types of the GUI.

use ember_core::RawHandle;

macro_rules! gui_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(RawHandle);

        impl $name {
            /// The null handle, which never resolves.
            pub const NULL: Self = Self(RawHandle::NULL);

            /// Wraps a raw table handle.
            pub const fn from_raw(raw: RawHandle) -> Self {
                Self(raw)
            }

            /// The underlying table handle.
            pub const fn raw(self) -> RawHandle {
                self.0
            }

            /// Returns `true` for the null handle.
            pub const fn is_null(self) -> bool {
                self.0.is_null()
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    concat!(stringify!($name), "({}v{})"),
                    self.0.slot(),
                    self.0.generation()
                )
            }
        }
    };
}

gui_handle!(
    /// Opaque handle to a GUI element.
    GuiElementHandle
);
gui_handle!(
    /// Opaque handle to a GUI surface.
    GuiSurfaceHandle
);

/// An integer rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GuiRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width, never negative for rectangles produced by the context.
    pub width: i32,
    /// Height, never negative for rectangles produced by the context.
    pub height: i32,
}

impl GuiRect {
    /// Creates a rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The exclusive right edge.
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// The exclusive bottom edge.
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns `true` if the rectangle covers no pixel.
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns `true` if the point lies inside the rectangle.
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// The overlap of two rectangles; empty when they do not overlap.
    pub fn intersect(&self, other: &GuiRect) -> GuiRect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        GuiRect::new(x, y, (right - x).max(0), (bottom - y).max(0))
    }

    /// The smallest rectangle covering both. Empty rectangles are ignored.
    pub fn union(&self, other: &GuiRect) -> GuiRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        GuiRect::new(x, y, right - x, bottom - y)
    }
}

/// A linear RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GuiColor {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha; 0 is fully transparent.
    pub a: f32,
}

impl GuiColor {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// An opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// A color with alpha.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Returns `true` if painting with this color has no effect.
    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }
}

/// An opaque texture reference handed through to the [`crate::GuiRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GuiTextureId(pub u32);

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button.
    Left,
    /// The right mouse button.
    Right,
    /// The middle mouse button.
    Middle,
    /// Another button, identified by a numeric code.
    Other(u16),
}

bitflags::bitflags! {
    /// Modifier keys held while a key event was generated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        /// Either shift key.
        const SHIFT = 1 << 0;
        /// Either control key.
        const CONTROL = 1 << 1;
        /// Either alt key.
        const ALT = 1 << 2;
        /// The platform key (command, windows).
        const SUPER = 1 << 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_intersection_and_union() {
        let a = GuiRect::new(0, 0, 10, 10);
        let b = GuiRect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), GuiRect::new(5, 5, 5, 5));
        assert_eq!(a.union(&b), GuiRect::new(0, 0, 15, 15));

        let apart = GuiRect::new(20, 20, 1, 1);
        assert!(a.intersect(&apart).is_empty());
        assert_eq!(GuiRect::default().union(&apart), apart);
    }

    #[test]
    fn test_rect_contains_is_half_open() {
        let rect = GuiRect::new(2, 2, 3, 3);
        assert!(rect.contains(2, 2));
        assert!(rect.contains(4, 4));
        assert!(!rect.contains(5, 4));
        assert!(!rect.contains(1, 3));
    }

    #[test]
    fn test_null_handles() {
        assert!(GuiElementHandle::NULL.is_null());
        assert_eq!(GuiSurfaceHandle::default(), GuiSurfaceHandle::NULL);
    }
}
