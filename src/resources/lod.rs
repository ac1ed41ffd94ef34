//! Distance-based level of detail.

use glam::Vec3;

use crate::resources::MeshHandle;
use crate::scene::transform::Transform;

/// One representation of the object and the farthest distance it is used at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetailLevel {
    pub mesh: MeshHandle,
    pub distance: f32,
}

/// Picks between static meshes by distance to the camera.
///
/// Detail meshes are referenced by handle, so one set of meshes can back many
/// LOD objects (a forest of identical trees). Each LOD object draws the active
/// level with its own transform and the level mesh's material.
///
/// Residency is tracked per level mesh across all LOD objects in a
/// [`Resources`](crate::resources::Resources) arena: a shared level is only
/// unloaded once no LOD object needs it.
///
/// The active level is only recomputed on LOD frames (see
/// [`RenderContext::is_lod_frame`](crate::renderer::RenderContext::is_lod_frame))
/// and on the first draw, so it may lag the camera by one interval.
#[derive(Debug, Clone)]
pub struct LodMesh {
    pub(crate) levels: Vec<DetailLevel>,
    pub(crate) active: Option<usize>,
    pub(crate) selected: bool,
    /// Level meshes this object currently needs uploaded.
    pub(crate) claimed: Vec<MeshHandle>,
    keep_all_resident: bool,
    pub transform: Transform,
    pub visible: bool,
}

impl LodMesh {
    /// With `keep_all_resident == false` only the active level stays uploaded.
    #[must_use]
    pub fn new(keep_all_resident: bool) -> Self {
        Self {
            levels: Vec::new(),
            active: None,
            selected: false,
            claimed: Vec::new(),
            keep_all_resident,
            transform: Transform::new(),
            visible: true,
        }
    }

    /// Adds a level used up to `distance`. Levels stay sorted by distance.
    pub fn add_detail_mesh(&mut self, mesh: MeshHandle, distance: f32) {
        let at = self.levels.partition_point(|l| l.distance <= distance);
        self.levels.insert(at, DetailLevel { mesh, distance });
        if let Some(active) = self.active.as_mut().filter(|active| **active >= at) {
            *active += 1;
        }
        self.selected = false;
    }

    #[must_use]
    pub fn levels(&self) -> &[DetailLevel] {
        &self.levels
    }

    /// Index of the level drawn, `None` when empty or beyond every threshold.
    #[must_use]
    pub fn active_level(&self) -> Option<usize> {
        self.active
    }

    /// Mesh of the active level.
    #[must_use]
    pub fn active_mesh(&self) -> Option<MeshHandle> {
        self.active.and_then(|i| self.levels.get(i)).map(|l| l.mesh)
    }

    #[must_use]
    pub fn keeps_all_resident(&self) -> bool {
        self.keep_all_resident
    }

    /// Level for a viewer at `distance`.
    ///
    /// Walks from the farthest level towards the nearest while the distance is
    /// within the threshold.
    #[must_use]
    pub fn select_level(&self, distance: f32) -> Option<usize> {
        let mut selected = None;
        for (i, level) in self.levels.iter().enumerate().rev() {
            if distance <= level.distance {
                selected = Some(i);
            } else {
                break;
            }
        }
        selected
    }

    /// Level for a viewer at `viewpoint`, measured from this object's position.
    #[must_use]
    pub fn select_level_for(&self, viewpoint: Vec3) -> Option<usize> {
        self.select_level(self.transform.position().distance(viewpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn lod_with(distances: &[f32]) -> LodMesh {
        let mut keys: SlotMap<MeshHandle, ()> = SlotMap::with_key();
        let mut lod = LodMesh::new(true);
        for &d in distances {
            lod.add_detail_mesh(keys.insert(()), d);
        }
        lod
    }

    #[test]
    fn insertion_keeps_active_level_on_the_same_mesh() {
        let mut lod = lod_with(&[10.0, 50.0]);
        lod.active = Some(1);
        let before = lod.active_mesh();

        let mut keys: SlotMap<MeshHandle, ()> = SlotMap::with_key();
        lod.add_detail_mesh(keys.insert(()), 5.0);
        assert_eq!(lod.active, Some(2));
        assert_eq!(lod.active_mesh(), before);

        // insertion after the active level leaves it alone
        lod.add_detail_mesh(keys.insert(()), 500.0);
        assert_eq!(lod.active, Some(2));
    }

    #[test]
    fn levels_stay_sorted() {
        let lod = lod_with(&[100.0, 10.0, 50.0]);
        let d: Vec<f32> = lod.levels().iter().map(|l| l.distance).collect();
        assert_eq!(d, vec![10.0, 50.0, 100.0]);
    }

    #[test]
    fn selection_by_distance() {
        let lod = lod_with(&[10.0, 50.0, 100.0]);
        assert_eq!(lod.select_level(5.0), Some(0));
        assert_eq!(lod.select_level(30.0), Some(1));
        assert_eq!(lod.select_level(70.0), Some(2));
        assert_eq!(lod.select_level(150.0), None);
        assert_eq!(lod.select_level(50.0), Some(1));
    }

    #[test]
    fn empty_lod_selects_nothing() {
        assert_eq!(LodMesh::new(false).select_level(0.0), None);
    }
}
