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

//! Consumer-side resource tables.
//!
//! Every texture, shader, framebuffer and vertex array the producer created
//! has an entry here, keyed by its producer-allocated id. Deleting a resource
//! releases its driver object right away but keeps the entry around for one
//! more buffer-swap cycle, so commands still in flight that name the
//! resource find a (dead) entry instead of a recycled one.

use std::collections::BTreeMap;
use std::hash::Hash;

use ahash::{AHashMap, AHashSet};

use crate::types::{
    FramebufferId, IndexFormat, ShaderId, TextureFilter, TextureFormat, TextureId,
    TextureWrapMode, UniformValue, VertexArrayId, VertexFormat,
};

/// Lifecycle of a resource entry.
///
/// `Freed` is not stored: a freed entry is removed from its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// The resource is usable.
    Live,
    /// The resource was deleted while `cycle` was the back index and will be
    /// freed by the flush of that cycle.
    PendingDeletion {
        /// The deletion list holding the entry.
        cycle: usize,
    },
}

#[derive(Debug)]
struct Entry<S> {
    state: S,
    lifecycle: Lifecycle,
}

/// A table of resources with two-phase deletion.
#[derive(Debug)]
pub struct ResourceTable<K, S> {
    entries: AHashMap<K, Entry<S>>,
    deleted: [Vec<K>; 2],
}

impl<K, S> Default for ResourceTable<K, S> {
    fn default() -> Self {
        Self {
            entries: AHashMap::new(),
            deleted: [Vec::new(), Vec::new()],
        }
    }
}

impl<K: Copy + Eq + Hash, S> ResourceTable<K, S> {
    /// Registers a live resource.
    pub fn insert(&mut self, key: K, state: S) {
        self.entries.insert(
            key,
            Entry {
                state,
                lifecycle: Lifecycle::Live,
            },
        );
    }

    /// The lifecycle of `key`, `None` once freed (or never created).
    pub fn lifecycle(&self, key: K) -> Option<Lifecycle> {
        self.entries.get(&key).map(|entry| entry.lifecycle)
    }

    /// Whether `key` is live.
    pub fn is_live(&self, key: K) -> bool {
        self.lifecycle(key) == Some(Lifecycle::Live)
    }

    /// The state of a live resource.
    pub fn get(&self, key: K) -> Option<&S> {
        self.entries
            .get(&key)
            .filter(|entry| entry.lifecycle == Lifecycle::Live)
            .map(|entry| &entry.state)
    }

    /// The mutable state of a live resource.
    pub fn get_mut(&mut self, key: K) -> Option<&mut S> {
        self.entries
            .get_mut(&key)
            .filter(|entry| entry.lifecycle == Lifecycle::Live)
            .map(|entry| &mut entry.state)
    }

    /// Moves a live resource to the deletion list of `cycle`.
    ///
    /// Returns `false` if the resource is not live.
    pub fn mark_deleted(&mut self, key: K, cycle: usize) -> bool {
        match self.entries.get_mut(&key) {
            Some(entry) if entry.lifecycle == Lifecycle::Live => {
                entry.lifecycle = Lifecycle::PendingDeletion { cycle };
                self.deleted[cycle & 1].push(key);
                true
            }
            _ => false,
        }
    }

    /// Frees every resource on the deletion list of `cycle`.
    pub fn flush(&mut self, cycle: usize) -> Vec<K> {
        let freed = std::mem::take(&mut self.deleted[cycle & 1]);
        for key in &freed {
            self.entries.remove(key);
        }
        freed
    }

    /// Number of live resources.
    pub fn live_len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.lifecycle == Lifecycle::Live)
            .count()
    }

    /// Number of resources waiting on the deletion list of `cycle`.
    pub fn pending_len(&self, cycle: usize) -> usize {
        self.deleted[cycle & 1].len()
    }

    /// Iterates live resources.
    pub fn iter(&self) -> impl Iterator<Item = (K, &S)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.lifecycle == Lifecycle::Live)
            .map(|(key, entry)| (*key, &entry.state))
    }
}

/// Consumer-side state of a 2D texture.
#[derive(Debug, Default)]
pub struct TextureState {
    /// Driver name, `0` once released.
    pub native: u32,
    pub width: u32,
    pub height: u32,
    pub format: Option<TextureFormat>,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub wrap: TextureWrapMode,
    pub anisotropy: f32,
    pub has_mipmaps: bool,
    /// Shaders sampling this texture.
    pub shaders: AHashSet<ShaderId>,
}

impl TextureState {
    pub(crate) fn new(native: u32) -> Self {
        Self {
            native,
            anisotropy: 1.0,
            ..Self::default()
        }
    }
}

/// A texture bound to a sampler uniform of a shader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerBinding {
    pub texture: TextureId,
    pub unit: u32,
}

/// Consumer-side state of a shader program.
#[derive(Debug, Default)]
pub struct ShaderState {
    /// Program name, `0` if compilation or linking failed.
    pub native: u32,
    /// Resolved uniform locations, `None` for inactive uniforms.
    pub locations: AHashMap<String, Option<i32>>,
    /// Sampler uniforms keyed by location.
    pub samplers: BTreeMap<i32, SamplerBinding>,
    /// Uniform writes waiting for the program to be made current.
    pub pending_uniforms: Vec<(i32, UniformValue)>,
}

impl ShaderState {
    pub(crate) fn new(native: u32) -> Self {
        Self {
            native,
            ..Self::default()
        }
    }

    pub(crate) fn queue_uniform(&mut self, location: i32, value: UniformValue) {
        match self
            .pending_uniforms
            .iter_mut()
            .find(|(pending, _)| *pending == location)
        {
            Some((_, pending)) => *pending = value,
            None => self.pending_uniforms.push((location, value)),
        }
    }

    /// The first texture unit not used by any sampler of this shader.
    pub fn find_available_texture_unit(&self, max_units: u32) -> Option<u32> {
        (0..max_units).find(|unit| self.samplers.values().all(|binding| binding.unit != *unit))
    }
}

/// Consumer-side state of a framebuffer.
#[derive(Debug, Default)]
pub struct FramebufferState {
    pub native: u32,
    pub color_attachments: BTreeMap<u32, TextureId>,
    pub depth_attachment: Option<TextureId>,
}

/// Consumer-side state of a vertex array.
#[derive(Debug, Default)]
pub struct VertexArrayState {
    /// Vertex array object, `0` on drivers without them.
    pub native: u32,
    pub vertex_buffer: u32,
    pub index_buffer: u32,
    pub format: VertexFormat,
    pub vertex_count: u32,
    pub index_count: u32,
    pub index_format: IndexFormat,
}

/// All resource tables plus the current shader and framebuffer.
#[derive(Debug, Default)]
pub struct GlState {
    pub textures: ResourceTable<TextureId, TextureState>,
    pub shaders: ResourceTable<ShaderId, ShaderState>,
    pub framebuffers: ResourceTable<FramebufferId, FramebufferState>,
    pub vertex_arrays: ResourceTable<VertexArrayId, VertexArrayState>,
    pub current_shader: Option<ShaderId>,
    pub current_framebuffer: Option<FramebufferId>,
    back_index: usize,
}

impl GlState {
    /// Creates empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// The deletion list receiving newly deleted resources.
    pub fn back_index(&self) -> usize {
        self.back_index
    }

    pub fn mark_texture_as_deleted(&mut self, texture: TextureId) -> bool {
        self.textures.mark_deleted(texture, self.back_index)
    }

    pub fn mark_shader_as_deleted(&mut self, shader: ShaderId) -> bool {
        self.shaders.mark_deleted(shader, self.back_index)
    }

    pub fn mark_framebuffer_as_deleted(&mut self, framebuffer: FramebufferId) -> bool {
        self.framebuffers.mark_deleted(framebuffer, self.back_index)
    }

    pub fn mark_vertex_array_as_deleted(&mut self, vertex_array: VertexArrayId) -> bool {
        self.vertex_arrays.mark_deleted(vertex_array, self.back_index)
    }

    /// Frees every resource on the deletion list of `cycle` and clears the
    /// current shader or framebuffer if it is among them.
    ///
    /// Returns the number of freed entries.
    pub fn flush_deleted(&mut self, cycle: usize) -> usize {
        let textures = self.textures.flush(cycle).len();
        let shaders = self.shaders.flush(cycle);
        let framebuffers = self.framebuffers.flush(cycle);
        let vertex_arrays = self.vertex_arrays.flush(cycle).len();

        if self
            .current_shader
            .is_some_and(|current| shaders.contains(&current))
        {
            self.current_shader = None;
        }
        if self
            .current_framebuffer
            .is_some_and(|current| framebuffers.contains(&current))
        {
            self.current_framebuffer = None;
        }
        textures + shaders.len() + framebuffers.len() + vertex_arrays
    }

    /// Flushes the deletion list opposite to the back index, then flips the
    /// back index. Called once per executed frame.
    pub fn clear_deleted_objects(&mut self) -> usize {
        let freed = self.flush_deleted(1 - self.back_index);
        self.back_index = 1 - self.back_index;
        freed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_resource_survives_one_flush() {
        let mut state = GlState::new();
        let shader = ShaderId::from_raw(1);
        state.shaders.insert(shader, ShaderState::new(10));
        state.current_shader = Some(shader);

        assert!(state.mark_shader_as_deleted(shader));
        assert_eq!(
            state.shaders.lifecycle(shader),
            Some(Lifecycle::PendingDeletion { cycle: 0 })
        );
        assert!(state.shaders.get(shader).is_none());

        // Flushes slot 1: the shader sits in slot 0 and must survive.
        assert_eq!(state.clear_deleted_objects(), 0);
        assert!(state.shaders.lifecycle(shader).is_some());
        assert_eq!(state.current_shader, Some(shader));

        // Back index flipped to 1, so this flushes slot 0.
        assert_eq!(state.clear_deleted_objects(), 1);
        assert_eq!(state.shaders.lifecycle(shader), None);
        assert_eq!(state.current_shader, None);
    }

    #[test]
    fn test_explicit_cycle_flush() {
        let mut table: ResourceTable<TextureId, TextureState> = ResourceTable::default();
        let a = TextureId::from_raw(1);
        let b = TextureId::from_raw(2);
        table.insert(a, TextureState::new(1));
        table.insert(b, TextureState::new(2));
        table.mark_deleted(a, 0);
        table.mark_deleted(b, 1);

        assert_eq!(table.flush(1), vec![b]);
        assert!(table.lifecycle(a).is_some());
        assert_eq!(table.live_len(), 0);
        assert_eq!(table.pending_len(0), 1);
    }

    #[test]
    fn test_double_delete_is_ignored() {
        let mut table: ResourceTable<TextureId, TextureState> = ResourceTable::default();
        let a = TextureId::from_raw(1);
        table.insert(a, TextureState::new(1));
        assert!(table.mark_deleted(a, 0));
        assert!(!table.mark_deleted(a, 1));
        assert_eq!(table.pending_len(1), 0);
    }

    #[test]
    fn test_available_unit_skips_used_units() {
        let mut shader = ShaderState::new(1);
        shader.samplers.insert(
            0,
            SamplerBinding {
                texture: TextureId::from_raw(1),
                unit: 0,
            },
        );
        shader.samplers.insert(
            3,
            SamplerBinding {
                texture: TextureId::from_raw(2),
                unit: 2,
            },
        );
        assert_eq!(shader.find_available_texture_unit(4), Some(1));
        assert_eq!(shader.find_available_texture_unit(1), None);
    }
}
