//! Resource arena
//!
//! Owns every mesh, picture and texture and resolves the relations between them:
//! instancing (a mesh drawing with another mesh's buffers), LOD levels and
//! material textures. Relations are stored as handles, so removing a resource
//! never leaves a dangling reference: lookups through a stale handle simply fail
//! and the affected draw is skipped with a warning.

use slotmap::{SecondaryMap, SlotMap};

use crate::errors::{EngineError, Result};
use crate::renderer::DrawContext;
use crate::renderer::device::{GpuBuffers, GpuDevice, VertexLayout};
use crate::resources::animated::AnimatedMesh;
use crate::resources::lod::LodMesh;
use crate::resources::mesh::{StaticMesh, submit_draw};
use crate::resources::picture::Picture2d;
use crate::resources::texture::Texture;
use crate::resources::{
    AnimatedMeshHandle, GpuObject, LodMeshHandle, MeshHandle, PictureHandle, TextureHandle,
};

/// Any drawable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawableHandle {
    Mesh(MeshHandle),
    Animated(AnimatedMeshHandle),
    Lod(LodMeshHandle),
    Picture(PictureHandle),
}

impl From<MeshHandle> for DrawableHandle {
    fn from(h: MeshHandle) -> Self {
        Self::Mesh(h)
    }
}

impl From<AnimatedMeshHandle> for DrawableHandle {
    fn from(h: AnimatedMeshHandle) -> Self {
        Self::Animated(h)
    }
}

impl From<LodMeshHandle> for DrawableHandle {
    fn from(h: LodMeshHandle) -> Self {
        Self::Lod(h)
    }
}

impl From<PictureHandle> for DrawableHandle {
    fn from(h: PictureHandle) -> Self {
        Self::Picture(h)
    }
}

#[derive(Default)]
pub struct Resources {
    pub meshes: SlotMap<MeshHandle, StaticMesh>,
    pub animated: SlotMap<AnimatedMeshHandle, AnimatedMesh>,
    pub lods: SlotMap<LodMeshHandle, LodMesh>,
    pub pictures: SlotMap<PictureHandle, Picture2d>,
    pub textures: SlotMap<TextureHandle, Texture>,
    /// Number of LOD objects needing each level mesh uploaded.
    lod_claims: SecondaryMap<MeshHandle, u32>,
}

impl Resources {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Insertion & Removal
    // ========================================================================

    pub fn add_mesh(&mut self, mesh: StaticMesh) -> MeshHandle {
        self.meshes.insert(mesh)
    }

    pub fn add_animated(&mut self, mesh: AnimatedMesh) -> AnimatedMeshHandle {
        self.animated.insert(mesh)
    }

    pub fn add_lod(&mut self, lod: LodMesh) -> LodMeshHandle {
        self.lods.insert(lod)
    }

    pub fn add_picture(&mut self, picture: Picture2d) -> PictureHandle {
        self.pictures.insert(picture)
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureHandle {
        self.textures.insert(texture)
    }

    /// Removes a mesh and releases its buffers. Instances of it stop drawing.
    pub fn remove_mesh(&mut self, handle: MeshHandle, device: &mut dyn GpuDevice) -> Option<StaticMesh> {
        let mut mesh = self.meshes.remove(handle)?;
        mesh.unload(device);
        Some(mesh)
    }

    pub fn remove_animated(
        &mut self,
        handle: AnimatedMeshHandle,
        device: &mut dyn GpuDevice,
    ) -> Option<AnimatedMesh> {
        let mut mesh = self.animated.remove(handle)?;
        mesh.unload(device);
        Some(mesh)
    }

    /// Removes a LOD object. Its detail meshes stay in the arena; levels no
    /// other LOD object needs are unloaded.
    pub fn remove_lod(&mut self, handle: LodMeshHandle, device: &mut dyn GpuDevice) -> Option<LodMesh> {
        self.release_all_levels(handle, device);
        self.lods.remove(handle)
    }

    pub fn remove_picture(&mut self, handle: PictureHandle, device: &mut dyn GpuDevice) -> Option<Picture2d> {
        let mut picture = self.pictures.remove(handle)?;
        picture.unload(device);
        Some(picture)
    }

    pub fn remove_texture(&mut self, handle: TextureHandle, device: &mut dyn GpuDevice) -> Option<Texture> {
        let mut texture = self.textures.remove(handle)?;
        texture.unload(device);
        Some(texture)
    }

    // ========================================================================
    // Instancing
    // ========================================================================

    /// Walks the instance chain to the mesh owning the buffers.
    fn mesh_owner_handle(&self, handle: MeshHandle) -> Option<MeshHandle> {
        let mut current = handle;
        for _ in 0..=self.meshes.len() {
            match self.meshes.get(current)?.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
        log::error!("Instance cycle detected while resolving mesh {handle:?}");
        None
    }

    fn animated_owner_handle(&self, handle: AnimatedMeshHandle) -> Option<AnimatedMeshHandle> {
        let mut current = handle;
        for _ in 0..=self.animated.len() {
            match self.animated.get(current)?.parent {
                Some(parent) => current = parent,
                None => return Some(current),
            }
        }
        log::error!("Instance cycle detected while resolving animated mesh {handle:?}");
        None
    }

    /// The mesh whose geometry `handle` shows: itself, or its root instance parent.
    #[must_use]
    pub fn resolve_mesh(&self, handle: MeshHandle) -> Option<&StaticMesh> {
        self.meshes.get(self.mesh_owner_handle(handle)?)
    }

    /// Makes `child` draw with `parent`'s buffers.
    ///
    /// The child's own buffers are released. Its transform and material are kept.
    pub fn make_instance_of(
        &mut self,
        child: MeshHandle,
        parent: MeshHandle,
        device: &mut dyn GpuDevice,
    ) -> Result<()> {
        if !self.meshes.contains_key(child) || !self.meshes.contains_key(parent) {
            return Err(EngineError::InvalidHandle("mesh"));
        }
        if self.mesh_owner_handle(parent) == Some(child) || child == parent {
            return Err(EngineError::InvalidInstance(
                "a mesh cannot be an instance of itself".into(),
            ));
        }
        if let Some(mesh) = self.meshes.get_mut(child) {
            mesh.become_instance(parent, device);
        }
        Ok(())
    }

    /// Animated counterpart of [`make_instance_of`](Self::make_instance_of).
    ///
    /// The instance keeps its own playback state and advances over the parent's frames.
    pub fn make_animated_instance_of(
        &mut self,
        child: AnimatedMeshHandle,
        parent: AnimatedMeshHandle,
        device: &mut dyn GpuDevice,
    ) -> Result<()> {
        if !self.animated.contains_key(child) || !self.animated.contains_key(parent) {
            return Err(EngineError::InvalidHandle("animated mesh"));
        }
        if self.animated_owner_handle(parent) == Some(child) || child == parent {
            return Err(EngineError::InvalidInstance(
                "an animated mesh cannot be an instance of itself".into(),
            ));
        }
        if let Some(mesh) = self.animated.get_mut(child) {
            mesh.become_instance(parent, device);
        }
        Ok(())
    }

    /// Vertex count, following instancing to the live parent.
    #[must_use]
    pub fn mesh_vertex_count(&self, handle: MeshHandle) -> Option<usize> {
        self.resolve_mesh(handle).map(StaticMesh::vertex_count)
    }

    /// Triangle count, following instancing to the live parent.
    #[must_use]
    pub fn mesh_triangle_count(&self, handle: MeshHandle) -> Option<usize> {
        self.resolve_mesh(handle).map(StaticMesh::triangle_count)
    }

    /// Buffers a mesh draws with, following instancing.
    #[must_use]
    pub fn mesh_buffers(&self, handle: MeshHandle) -> Option<GpuBuffers> {
        self.resolve_mesh(handle)?.buffers
    }

    #[must_use]
    pub fn animated_frame_count(&self, handle: AnimatedMeshHandle) -> Option<usize> {
        let owner = self.animated_owner_handle(handle)?;
        self.animated.get(owner).map(AnimatedMesh::frame_count)
    }

    // ========================================================================
    // Editing across meshes
    // ========================================================================

    /// Appends `source`'s geometry to `target` and re-uploads `target` if it was uploaded.
    ///
    /// Merging a mesh with itself doubles its geometry.
    pub fn merge_meshes(
        &mut self,
        target: MeshHandle,
        source: MeshHandle,
        device: &mut dyn GpuDevice,
    ) -> Result<()> {
        let source_mesh = self
            .meshes
            .get(source)
            .ok_or(EngineError::InvalidHandle("mesh"))?
            .clone();
        let target_mesh = self
            .meshes
            .get_mut(target)
            .ok_or(EngineError::InvalidHandle("mesh"))?;
        target_mesh.merge(&source_mesh);
        if target_mesh.buffers.is_some() {
            target_mesh.update(device);
        }
        Ok(())
    }

    // ========================================================================
    // GPU lifecycle
    // ========================================================================

    pub fn update_texture(&mut self, handle: TextureHandle, device: &mut dyn GpuDevice) {
        match self.textures.get_mut(handle) {
            Some(texture) => texture.update(device),
            None => log::warn!("update_texture: unknown texture {handle:?}"),
        }
    }

    /// Uploads a drawable. For a LOD object this uploads its detail meshes
    /// (only the active one unless all levels are kept resident).
    pub fn update(&mut self, handle: impl Into<DrawableHandle>, device: &mut dyn GpuDevice) {
        match handle.into() {
            DrawableHandle::Mesh(h) => {
                if let Some(mesh) = self.meshes.get_mut(h) {
                    mesh.update(device);
                }
            }
            DrawableHandle::Animated(h) => {
                if let Some(mesh) = self.animated.get_mut(h) {
                    mesh.update(device);
                }
            }
            DrawableHandle::Lod(h) => {
                let Some(lod) = self.lods.get(h) else {
                    return;
                };
                let targets: Vec<MeshHandle> = if lod.keeps_all_resident() {
                    lod.levels.iter().map(|l| l.mesh).collect()
                } else {
                    lod.active_mesh().into_iter().collect()
                };
                for mesh in targets {
                    self.claim_level(h, mesh);
                    if let Some(mesh) = self.meshes.get_mut(mesh) {
                        mesh.update(device);
                    }
                }
            }
            DrawableHandle::Picture(h) => {
                if let Some(picture) = self.pictures.get_mut(h) {
                    picture.update(device);
                }
            }
        }
    }

    /// Releases a drawable's buffers. For a LOD object this unloads the detail
    /// meshes it uploaded, unless another LOD object still needs them.
    pub fn unload(&mut self, handle: impl Into<DrawableHandle>, device: &mut dyn GpuDevice) {
        match handle.into() {
            DrawableHandle::Mesh(h) => {
                if let Some(mesh) = self.meshes.get_mut(h) {
                    mesh.unload(device);
                }
            }
            DrawableHandle::Animated(h) => {
                if let Some(mesh) = self.animated.get_mut(h) {
                    mesh.unload(device);
                }
            }
            DrawableHandle::Lod(h) => {
                self.release_all_levels(h, device);
                if let Some(lod) = self.lods.get_mut(h) {
                    lod.selected = false;
                }
            }
            DrawableHandle::Picture(h) => {
                if let Some(picture) = self.pictures.get_mut(h) {
                    picture.unload(device);
                }
            }
        }
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Draws a drawable with the frame state in `ctx`.
    pub fn draw(&mut self, handle: impl Into<DrawableHandle>, ctx: &mut DrawContext<'_>) {
        match handle.into() {
            DrawableHandle::Mesh(h) => self.draw_mesh(h, ctx),
            DrawableHandle::Animated(h) => self.draw_animated(h, ctx),
            DrawableHandle::Lod(h) => self.draw_lod(h, ctx),
            DrawableHandle::Picture(h) => self.draw_picture(h, ctx),
        }
    }

    pub fn draw_mesh(&self, handle: MeshHandle, ctx: &mut DrawContext<'_>) {
        let Some(mesh) = self.meshes.get(handle) else {
            log::warn!("draw: unknown mesh {handle:?}");
            return;
        };
        if !mesh.visible {
            return;
        }
        let Some(owner) = self.resolve_mesh(handle) else {
            log::warn!("draw: instance parent of mesh {handle:?} no longer exists");
            return;
        };
        let Some(buffers) = owner.buffers else {
            log::warn!("draw: mesh {handle:?} has no uploaded geometry");
            return;
        };
        mesh.draw_with(&buffers, &self.textures, ctx);
    }

    /// Advances playback by the frame's elapsed time, then draws.
    pub fn draw_animated(&mut self, handle: AnimatedMeshHandle, ctx: &mut DrawContext<'_>) {
        match self.animated.get(handle) {
            Some(mesh) if mesh.visible => {}
            Some(_) => return,
            None => {
                log::warn!("draw: unknown animated mesh {handle:?}");
                return;
            }
        }
        let Some(owner) = self.animated_owner_handle(handle) else {
            log::warn!("draw: instance parent of animated mesh {handle:?} no longer exists");
            return;
        };
        let lengths = self.animated[owner].frame_lengths();
        self.animated[handle]
            .playback
            .advance(ctx.elapsed_ms, &lengths);

        let mesh = &self.animated[handle];
        mesh.draw_frame(&self.animated[owner].frames, &self.textures, ctx);
    }

    /// Re-selects the active level on LOD frames, then draws it.
    pub fn draw_lod(&mut self, handle: LodMeshHandle, ctx: &mut DrawContext<'_>) {
        let Some(lod) = self.lods.get(handle) else {
            log::warn!("draw: unknown LOD mesh {handle:?}");
            return;
        };
        if !lod.visible {
            return;
        }

        if ctx.lod_frame || !lod.selected {
            let next = lod.select_level_for(ctx.frame.camera_position);
            self.switch_level(handle, next, ctx.device);
        }

        let Some(lod) = self.lods.get(handle) else {
            return;
        };
        let Some(level) = lod.active.map(|i| lod.levels[i]) else {
            return;
        };
        let world = lod.transform.matrix();

        let (Some(detail), Some(owner)) = (self.meshes.get(level.mesh), self.resolve_mesh(level.mesh))
        else {
            log::warn!("draw: LOD level mesh {:?} no longer exists", level.mesh);
            return;
        };
        let Some(buffers) = owner.buffers else {
            log::warn!("draw: LOD level mesh {:?} has no uploaded geometry", level.mesh);
            return;
        };
        submit_draw(
            ctx,
            &detail.material,
            world,
            &buffers,
            VertexLayout::Single,
            &self.textures,
            |_| {},
        );
    }

    // ========================================================================
    // LOD residency
    // ========================================================================

    /// Makes `next` the active level and moves residency claims with it.
    ///
    /// The new level is uploaded if it has no buffers. Without
    /// `keep_all_resident` the other levels this LOD claimed are released.
    fn switch_level(&mut self, handle: LodMeshHandle, next: Option<usize>, device: &mut dyn GpuDevice) {
        let Some(lod) = self.lods.get_mut(handle) else {
            return;
        };
        lod.active = next;
        lod.selected = true;
        let next_mesh = lod.active_mesh();
        let stale: Vec<MeshHandle> = if lod.keeps_all_resident() {
            Vec::new()
        } else {
            lod.claimed.iter().copied().filter(|&m| Some(m) != next_mesh).collect()
        };

        if let Some(mesh) = next_mesh {
            self.claim_level(handle, mesh);
            if let Some(level) = self.meshes.get_mut(mesh).filter(|m| m.buffers.is_none()) {
                level.update(device);
            }
        }
        for mesh in stale {
            self.release_level(handle, mesh, device);
        }
    }

    /// Records that LOD `handle` needs `mesh` uploaded. Idempotent per LOD.
    fn claim_level(&mut self, handle: LodMeshHandle, mesh: MeshHandle) {
        let Some(lod) = self.lods.get_mut(handle) else {
            return;
        };
        if lod.claimed.contains(&mesh) {
            return;
        }
        lod.claimed.push(mesh);
        if let Some(entry) = self.lod_claims.entry(mesh) {
            *entry.or_insert(0) += 1;
        }
    }

    /// Drops LOD `handle`'s claim on `mesh`, unloading it once no LOD needs it.
    fn release_level(&mut self, handle: LodMeshHandle, mesh: MeshHandle, device: &mut dyn GpuDevice) {
        let Some(lod) = self.lods.get_mut(handle) else {
            return;
        };
        let Some(at) = lod.claimed.iter().position(|&m| m == mesh) else {
            return;
        };
        lod.claimed.swap_remove(at);

        let remaining = self.lod_claims.get(mesh).map_or(0, |n| n.saturating_sub(1));
        if remaining > 0 {
            self.lod_claims.insert(mesh, remaining);
            return;
        }
        self.lod_claims.remove(mesh);
        if let Some(level) = self.meshes.get_mut(mesh) {
            level.unload(device);
        }
    }

    fn release_all_levels(&mut self, handle: LodMeshHandle, device: &mut dyn GpuDevice) {
        let claimed = self.lods.get(handle).map(|lod| lod.claimed.clone()).unwrap_or_default();
        for mesh in claimed {
            self.release_level(handle, mesh, device);
        }
    }

    /// Number of LOD objects that currently need `mesh` uploaded.
    #[must_use]
    pub fn lod_claims(&self, mesh: MeshHandle) -> u32 {
        self.lod_claims.get(mesh).copied().unwrap_or(0)
    }

    pub fn draw_picture(&self, handle: PictureHandle, ctx: &mut DrawContext<'_>) {
        match self.pictures.get(handle) {
            Some(picture) => picture.draw(&self.textures, ctx),
            None => log::warn!("draw: unknown picture {handle:?}"),
        }
    }
}
