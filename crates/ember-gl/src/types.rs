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

//! Engine-side vocabulary of the OpenGL backend: resource ids and the enums
//! the commands and the driver seam speak in.

use std::fmt;

use bitflags::bitflags;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw id.
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// The raw id.
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

resource_id!(
    /// Identifies a texture. Allocated by the producer, resolved by the server.
    TextureId
);
resource_id!(
    /// Identifies a linked shader program.
    ShaderId
);
resource_id!(
    /// Identifies a framebuffer object.
    FramebufferId
);
resource_id!(
    /// Identifies a vertex array (vertex buffer, index buffer and layout).
    VertexArrayId
);

/// Hands out resource ids on the producer side.
///
/// Ids are never reused, so a command recorded against a deleted resource
/// can never alias a newer one.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Creates an allocator whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    fn next_raw(&mut self) -> u32 {
        self.next += 1;
        self.next
    }

    /// Allocates a texture id.
    pub fn texture(&mut self) -> TextureId {
        TextureId(self.next_raw())
    }

    /// Allocates a shader id.
    pub fn shader(&mut self) -> ShaderId {
        ShaderId(self.next_raw())
    }

    /// Allocates a framebuffer id.
    pub fn framebuffer(&mut self) -> FramebufferId {
        FramebufferId(self.next_raw())
    }

    /// Allocates a vertex array id.
    pub fn vertex_array(&mut self) -> VertexArrayId {
        VertexArrayId(self.next_raw())
    }
}

/// Texel formats of 2D textures and render targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8,
    Rg8,
    Rgb8,
    Rgba8,
    Srgb8Alpha8,
    Rgba16Float,
    Rgba32Float,
    Depth24,
    Depth24Stencil8,
    Depth32Float,
}

impl TextureFormat {
    /// Size in bytes of one texel as uploaded.
    pub fn bytes_per_texel(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rg8 => 2,
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 | TextureFormat::Srgb8Alpha8 => 4,
            TextureFormat::Rgba16Float => 8,
            TextureFormat::Rgba32Float => 16,
            TextureFormat::Depth24 | TextureFormat::Depth24Stencil8 => 4,
            TextureFormat::Depth32Float => 4,
        }
    }

    /// Whether this is a depth (or depth-stencil) format.
    pub fn is_depth(self) -> bool {
        matches!(
            self,
            TextureFormat::Depth24 | TextureFormat::Depth24Stencil8 | TextureFormat::Depth32Float
        )
    }

    /// Whether the format carries a stencil component.
    pub fn has_stencil(self) -> bool {
        matches!(self, TextureFormat::Depth24Stencil8)
    }

    /// Whether the format is sRGB encoded.
    pub fn is_srgb(self) -> bool {
        matches!(self, TextureFormat::Srgb8Alpha8)
    }
}

/// Texture sampling filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl TextureFilter {
    /// Whether the filter samples from the mip chain.
    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, TextureFilter::Nearest | TextureFilter::Linear)
    }
}

/// Texture coordinate wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureWrapMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Value of a non-sampler uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        UniformValue::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        UniformValue::Float(value)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(value: [f32; 2]) -> Self {
        UniformValue::Vec2(value)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(value: [f32; 3]) -> Self {
        UniformValue::Vec3(value)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(value: [f32; 4]) -> Self {
        UniformValue::Vec4(value)
    }
}

impl From<[f32; 16]> for UniformValue {
    fn from(value: [f32; 16]) -> Self {
        UniformValue::Mat4(value)
    }
}

/// A framebuffer attachment point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attachment {
    /// Color attachment `n`.
    Color(u32),
    Depth,
    DepthStencil,
}

/// Completeness of a framebuffer as reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    Complete,
    IncompleteAttachment,
    MissingAttachment,
    IncompleteDimensions,
    IncompleteDrawBuffer,
    Unsupported,
    Unknown(u32),
}

/// Buffer binding points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

/// Expected update frequency of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    #[default]
    Static,
    Dynamic,
    Stream,
}

/// Width of the indices in an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    U16,
    #[default]
    U32,
}

impl IndexFormat {
    /// Size of one index in bytes.
    pub fn size(self) -> usize {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// Primitive assembly mode of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// One float vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader attribute location.
    pub location: u32,
    /// Number of components, 1 to 4.
    pub components: i32,
    /// Byte offset inside the vertex.
    pub offset: i32,
    /// Whether the data is normalized.
    pub normalized: bool,
}

/// Interleaved layout of a vertex buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexFormat {
    /// Size of one vertex in bytes.
    pub stride: i32,
    /// The attributes, in declaration order.
    pub attributes: Vec<VertexAttribute>,
}

impl VertexFormat {
    /// An empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an `f32` attribute with `components` components right after
    /// the previous one.
    pub fn with(mut self, location: u32, components: i32) -> Self {
        self.attributes.push(VertexAttribute {
            location,
            components,
            offset: self.stride,
            normalized: false,
        });
        self.stride += components * std::mem::size_of::<f32>() as i32;
        self
    }
}

/// Source or destination factor of the blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstColor,
    OneMinusDstColor,
    DstAlpha,
    OneMinusDstAlpha,
}

/// A blend function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendFunc {
    pub src: BlendFactor,
    pub dst: BlendFactor,
}

impl Default for BlendFunc {
    fn default() -> Self {
        Self {
            src: BlendFactor::One,
            dst: BlendFactor::Zero,
        }
    }
}

/// Comparison used by the depth test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    Never,
    #[default]
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// An integer rectangle in window coordinates (viewport, scissor box).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

bitflags! {
    /// Server-side capabilities toggled by `RcSetGlobalState`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        const BLEND = 1 << 0;
        const DEPTH_TEST = 1 << 1;
        const STENCIL_TEST = 1 << 2;
        const SCISSOR_TEST = 1 << 3;
        const CULL_FACE = 1 << 4;
        const POLYGON_OFFSET_FILL = 1 << 5;
        const MULTISAMPLE = 1 << 6;
        const FRAMEBUFFER_SRGB = 1 << 7;
    }
}

bitflags! {
    /// Buffers affected by a clear.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ClearFlags: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// A single capability, as passed to the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Blend,
    DepthTest,
    StencilTest,
    ScissorTest,
    CullFace,
    PolygonOffsetFill,
    Multisample,
    FramebufferSrgb,
}

impl Capability {
    /// Every capability, in the order they are applied.
    pub const ALL: [Capability; 8] = [
        Capability::Blend,
        Capability::DepthTest,
        Capability::StencilTest,
        Capability::ScissorTest,
        Capability::CullFace,
        Capability::PolygonOffsetFill,
        Capability::Multisample,
        Capability::FramebufferSrgb,
    ];

    /// The flag of this capability.
    pub fn flag(self) -> Capabilities {
        match self {
            Capability::Blend => Capabilities::BLEND,
            Capability::DepthTest => Capabilities::DEPTH_TEST,
            Capability::StencilTest => Capabilities::STENCIL_TEST,
            Capability::ScissorTest => Capabilities::SCISSOR_TEST,
            Capability::CullFace => Capabilities::CULL_FACE,
            Capability::PolygonOffsetFill => Capabilities::POLYGON_OFFSET_FILL,
            Capability::Multisample => Capabilities::MULTISAMPLE,
            Capability::FramebufferSrgb => Capabilities::FRAMEBUFFER_SRGB,
        }
    }

    /// The capabilities set in `flags`, in application order.
    pub fn iter_set(flags: Capabilities) -> impl Iterator<Item = Capability> {
        Self::ALL
            .into_iter()
            .filter(move |capability| flags.contains(capability.flag()))
    }
}
