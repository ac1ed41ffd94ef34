//! Level-of-Detail Tests
//!
//! Tests for:
//! - Level selection by distance thresholds
//! - Re-selection only on LOD frames
//! - Resident vs on-demand uploads when the active level changes
//! - Levels added after selection and level meshes shared between LOD objects
//! - LOD transform with the detail mesh's material

use glam::Vec3;
use lumen::renderer::FrameUniforms;
use lumen::{
    DrawContext, LodMesh, LodMeshHandle, MeshHandle, RecordingDevice, Resources, SphereOptions,
    create_cuboid, create_sphere,
};

// ============================================================================
// Helper
// ============================================================================

struct Scene {
    resources: Resources,
    device: RecordingDevice,
    lod: LodMeshHandle,
    levels: [MeshHandle; 3],
}

fn scene(keep_all_resident: bool) -> Scene {
    let mut resources = Resources::new();
    let levels = [
        resources.add_mesh(create_sphere(SphereOptions {
            sides: 32,
            height_segments: 16,
            ..Default::default()
        })),
        resources.add_mesh(create_sphere(SphereOptions::default())),
        resources.add_mesh(create_cuboid(1.0, 1.0, 1.0)),
    ];
    let mut lod = LodMesh::new(keep_all_resident);
    // inserted out of order on purpose
    lod.add_detail_mesh(levels[2], 100.0);
    lod.add_detail_mesh(levels[0], 10.0);
    lod.add_detail_mesh(levels[1], 50.0);
    let lod = resources.add_lod(lod);
    Scene {
        resources,
        device: RecordingDevice::new(),
        lod,
        levels,
    }
}

impl Scene {
    fn draw_from(&mut self, camera: Vec3, lod_frame: bool) {
        self.device.draws.clear();
        let frame = FrameUniforms {
            camera_position: camera,
            ..FrameUniforms::default()
        };
        let mut ctx = DrawContext {
            device: &mut self.device,
            frame: &frame,
            elapsed_ms: 16.0,
            lod_frame,
        };
        self.resources.draw(self.lod, &mut ctx);
    }

    fn active(&self) -> Option<usize> {
        self.resources.lods[self.lod].active_level()
    }

    fn uploaded(&self, level: usize) -> bool {
        self.resources.mesh_buffers(self.levels[level]).is_some()
    }
}

fn draw_lod_from(
    resources: &mut Resources,
    device: &mut RecordingDevice,
    lod: LodMeshHandle,
    camera: Vec3,
) {
    device.draws.clear();
    let frame = FrameUniforms {
        camera_position: camera,
        ..FrameUniforms::default()
    };
    let mut ctx = DrawContext {
        device,
        frame: &frame,
        elapsed_ms: 16.0,
        lod_frame: true,
    };
    resources.draw(lod, &mut ctx);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn picks_first_level_within_distance() {
    let mut s = scene(true);
    s.resources.update(s.lod, &mut s.device);

    for (distance, expected) in [(5.0, Some(0)), (30.0, Some(1)), (70.0, Some(2)), (150.0, None)] {
        s.draw_from(Vec3::new(0.0, 0.0, distance), true);
        assert_eq!(s.active(), expected, "distance {distance}");
        assert_eq!(s.device.draws.len(), usize::from(expected.is_some()));
    }
}

#[test]
fn distance_is_measured_from_lod_position() {
    let mut s = scene(true);
    s.resources.lods[s.lod].transform.set_position(Vec3::new(100.0, 0.0, 0.0));
    s.resources.update(s.lod, &mut s.device);

    s.draw_from(Vec3::new(95.0, 0.0, 0.0), true);
    assert_eq!(s.active(), Some(0));
}

#[test]
fn level_only_changes_on_lod_frames() {
    let mut s = scene(true);
    s.resources.update(s.lod, &mut s.device);

    // the first draw always selects
    s.draw_from(Vec3::new(0.0, 0.0, 5.0), false);
    assert_eq!(s.active(), Some(0));

    s.draw_from(Vec3::new(0.0, 0.0, 30.0), false);
    assert_eq!(s.active(), Some(0));

    s.draw_from(Vec3::new(0.0, 0.0, 30.0), true);
    assert_eq!(s.active(), Some(1));
}

// ============================================================================
// Residency
// ============================================================================

#[test]
fn resident_levels_are_all_uploaded_and_kept() {
    let mut s = scene(true);
    s.resources.update(s.lod, &mut s.device);
    assert!((0..3).all(|i| s.uploaded(i)));

    s.draw_from(Vec3::new(0.0, 0.0, 70.0), true);
    s.draw_from(Vec3::new(0.0, 0.0, 500.0), true);
    assert!((0..3).all(|i| s.uploaded(i)));
    assert_eq!(s.device.live_buffers(), 6);
}

#[test]
fn on_demand_levels_swap_buffers() {
    let mut s = scene(false);
    s.resources.update(s.lod, &mut s.device);
    // nothing is active yet, so nothing was uploaded
    assert_eq!(s.device.live_buffers(), 0);

    s.draw_from(Vec3::new(0.0, 0.0, 5.0), true);
    assert!(s.uploaded(0) && !s.uploaded(1));
    assert_eq!(s.device.draws.len(), 1);

    s.draw_from(Vec3::new(0.0, 0.0, 30.0), true);
    assert!(!s.uploaded(0) && s.uploaded(1));
    assert_eq!(s.device.live_buffers(), 2);
    assert_eq!(
        s.device.draws[0].vertex_buffer,
        s.resources.mesh_buffers(s.levels[1]).unwrap().vertex
    );

    s.draw_from(Vec3::new(0.0, 0.0, 1000.0), true);
    assert_eq!(s.device.live_buffers(), 0);
    assert!(s.device.draws.is_empty());
}

#[test]
fn level_added_after_selection_is_uploaded_on_demand() {
    let mut resources = Resources::new();
    let mut device = RecordingDevice::new();
    let coarse = resources.add_mesh(create_cuboid(1.0, 1.0, 1.0));
    let fine = resources.add_mesh(create_sphere(SphereOptions::default()));
    let mut lod = LodMesh::new(false);
    lod.add_detail_mesh(coarse, 10.0);
    let lod = resources.add_lod(lod);

    draw_lod_from(&mut resources, &mut device, lod, Vec3::new(0.0, 0.0, 3.0));
    assert_eq!(device.draws.len(), 1);

    // the new level lands in front of the active one
    resources.lods[lod].add_detail_mesh(fine, 5.0);
    assert_eq!(resources.lods[lod].active_mesh(), Some(coarse));

    draw_lod_from(&mut resources, &mut device, lod, Vec3::new(0.0, 0.0, 3.0));
    assert_eq!(resources.lods[lod].active_mesh(), Some(fine));
    assert!(resources.mesh_buffers(fine).is_some());
    assert!(resources.mesh_buffers(coarse).is_none());
    assert_eq!(device.draws.len(), 1);
    assert_eq!(device.draws[0].vertex_buffer, resources.mesh_buffers(fine).unwrap().vertex);
}

#[test]
fn shared_level_stays_uploaded_while_another_lod_uses_it() {
    let mut resources = Resources::new();
    let mut device = RecordingDevice::new();
    let near = resources.add_mesh(create_sphere(SphereOptions::default()));
    let far = resources.add_mesh(create_cuboid(1.0, 1.0, 1.0));
    let tree = |resources: &mut Resources| {
        let mut lod = LodMesh::new(false);
        lod.add_detail_mesh(near, 10.0);
        lod.add_detail_mesh(far, 200.0);
        resources.add_lod(lod)
    };
    let first = tree(&mut resources);
    let second = tree(&mut resources);
    let camera = Vec3::new(0.0, 0.0, 5.0);

    draw_lod_from(&mut resources, &mut device, first, camera);
    draw_lod_from(&mut resources, &mut device, second, camera);
    assert_eq!(resources.lod_claims(near), 2);

    // the first tree moves out of the near range
    resources.lods[first].transform.set_position(Vec3::new(0.0, 0.0, 100.0));
    draw_lod_from(&mut resources, &mut device, first, camera);
    assert_eq!(resources.lods[first].active_mesh(), Some(far));
    assert_eq!(resources.lod_claims(near), 1);
    assert!(resources.mesh_buffers(near).is_some());

    draw_lod_from(&mut resources, &mut device, second, camera);
    assert_eq!(device.draws.len(), 1);
    assert_eq!(device.draws[0].vertex_buffer, resources.mesh_buffers(near).unwrap().vertex);

    // once nobody needs it the shared level is released
    resources.lods[second].transform.set_position(Vec3::new(0.0, 0.0, 100.0));
    draw_lod_from(&mut resources, &mut device, second, camera);
    assert_eq!(resources.lod_claims(near), 0);
    assert!(resources.mesh_buffers(near).is_none());
    assert_eq!(resources.lod_claims(far), 2);

    resources.remove_lod(first, &mut device);
    assert!(resources.mesh_buffers(far).is_some());
    resources.remove_lod(second, &mut device);
    assert!(resources.mesh_buffers(far).is_none());
    assert_eq!(device.live_buffers(), 0);
}

#[test]
fn unload_releases_every_level() {
    let mut s = scene(true);
    s.resources.update(s.lod, &mut s.device);
    s.resources.unload(s.lod, &mut s.device);
    assert_eq!(s.device.live_buffers(), 0);
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn draws_with_lod_transform_and_level_material() {
    let mut s = scene(true);
    s.resources.meshes[s.levels[0]].set_color(255, 0, 0);
    // the detail mesh's own position is ignored
    s.resources.meshes[s.levels[0]].set_position(-50.0, 0.0, 0.0);
    s.resources.lods[s.lod].transform.set_position(Vec3::new(0.0, 3.0, 0.0));
    s.resources.update(s.lod, &mut s.device);

    s.draw_from(Vec3::new(0.0, 3.0, 2.0), true);
    let call = &s.device.draws[0];
    assert_eq!(call.uniforms.mesh_color[..3], [1.0, 0.0, 0.0]);
    let origin = call.uniforms.world_matrix().w_axis.truncate();
    assert!((origin - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-6);
}

#[test]
fn hidden_lod_draws_nothing() {
    let mut s = scene(true);
    s.resources.update(s.lod, &mut s.device);
    s.resources.lods[s.lod].visible = false;
    s.draw_from(Vec3::ZERO, true);
    assert!(s.device.draws.is_empty());
}
