//! Animation Tests
//!
//! Tests for:
//! - Frame-based playback (looping, stopping, reverse speed)
//! - Degenerate frame lengths and very long frame gaps
//! - Interleaved frame uploads and the blend factor pushed per draw
//! - Animated instances with independent playback
//! - Keyframe interpolation (constant, linear, sine)

use glam::Vec3;
use lumen::renderer::FrameUniforms;
use lumen::renderer::device::VertexLayout;
use lumen::resources::animated::MIN_FRAME_LENGTH_MS;
use lumen::{
    AnimatedMesh, AnimatedMeshHandle, DrawContext, Interpolation, KeyframeInterpolator,
    RecordingDevice, Resources, create_cuboid,
};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

// ============================================================================
// Helper
// ============================================================================

/// Two frames of one second each: a unit cube growing to a double cube.
fn growing_cube() -> AnimatedMesh {
    let mut anim = AnimatedMesh::new();
    anim.add_frame(&create_cuboid(1.0, 1.0, 1.0), 1000.0);
    anim.add_frame(&create_cuboid(2.0, 2.0, 2.0), 1000.0);
    anim.set_playing(true);
    anim
}

fn draw(
    resources: &mut Resources,
    device: &mut RecordingDevice,
    handle: AnimatedMeshHandle,
    elapsed_ms: f32,
) {
    device.draws.clear();
    let frame = FrameUniforms::default();
    let mut ctx = DrawContext {
        device,
        frame: &frame,
        elapsed_ms,
        lod_frame: false,
    };
    resources.draw(handle, &mut ctx);
}

// ============================================================================
// Playback through draws
// ============================================================================

#[test]
fn draw_advances_and_blends() {
    let mut device = RecordingDevice::new();
    let mut resources = Resources::new();
    let anim = resources.add_animated(growing_cube());
    resources.update(anim, &mut device);

    draw(&mut resources, &mut device, anim, 1500.0);

    let playback = resources.animated[anim].playback;
    assert_eq!(playback.current_frame, 1);
    assert!(approx(playback.frame_percentage, 0.5));

    let call = &device.draws[0];
    assert_eq!(call.layout, VertexLayout::Interleaved);
    assert!(approx(call.uniforms.animation_blend(), 0.5));
    assert_eq!(call.index_count, 36);
}

#[test]
fn frames_upload_interleaved_with_next_frame() {
    let mut device = RecordingDevice::new();
    let mut resources = Resources::new();
    let anim = resources.add_animated(growing_cube());
    resources.update(anim, &mut device);

    // one vertex/index pair per frame
    assert_eq!(device.live_buffers(), 4);
    let frames = resources.animated[anim].frames();
    for frame in frames {
        let data = &device.buffer(frame.gpu_buffers().unwrap().vertex).unwrap().data;
        assert_eq!(data.len(), 8 * 2 * 36);
    }

    resources.unload(anim, &mut device);
    assert_eq!(device.live_buffers(), 0);
}

#[test]
fn non_looping_animation_stops_on_last_frame() {
    let mut device = RecordingDevice::new();
    let mut resources = Resources::new();
    let mut mesh = growing_cube();
    mesh.set_looping(false);
    let anim = resources.add_animated(mesh);
    resources.update(anim, &mut device);

    draw(&mut resources, &mut device, anim, 2500.0);
    let playback = resources.animated[anim].playback;
    assert!(!playback.playing);
    assert_eq!(playback.current_frame, 1);
    assert_eq!(playback.frame_percentage, 0.0);

    // stays put afterwards
    draw(&mut resources, &mut device, anim, 800.0);
    assert_eq!(resources.animated[anim].playback, playback);
}

#[test]
fn negative_speed_plays_backwards() {
    let mut device = RecordingDevice::new();
    let mut resources = Resources::new();
    let mut mesh = growing_cube();
    mesh.set_speed(-1.0);
    let anim = resources.add_animated(mesh);
    resources.update(anim, &mut device);

    draw(&mut resources, &mut device, anim, 250.0);
    let playback = resources.animated[anim].playback;
    assert_eq!(playback.current_frame, 1);
    assert!(approx(playback.frame_percentage, 0.75));
}

#[test]
fn discrete_playback_pushes_zero_blend() {
    let mut device = RecordingDevice::new();
    let mut resources = Resources::new();
    let mut mesh = growing_cube();
    mesh.set_interpolate(false);
    let anim = resources.add_animated(mesh);
    resources.update(anim, &mut device);

    draw(&mut resources, &mut device, anim, 400.0);
    assert_eq!(device.draws[0].uniforms.animation_blend(), 0.0);
}

#[test]
fn non_positive_frame_lengths_are_clamped() {
    let mut anim = AnimatedMesh::new();
    anim.add_frame(&create_cuboid(1.0, 1.0, 1.0), 0.0);
    anim.add_frame(&create_cuboid(2.0, 2.0, 2.0), -50.0);
    anim.add_frame(&create_cuboid(3.0, 3.0, 3.0), f32::NAN);
    for frame in anim.frames() {
        assert_eq!(frame.length_ms, MIN_FRAME_LENGTH_MS);
    }
}

#[test]
fn zero_length_frame_does_not_stall_playback() {
    let mut device = RecordingDevice::new();
    let mut resources = Resources::new();
    let mut mesh = AnimatedMesh::new();
    mesh.add_frame(&create_cuboid(1.0, 1.0, 1.0), 0.0);
    mesh.add_frame(&create_cuboid(2.0, 2.0, 2.0), 1000.0);
    mesh.set_playing(true);
    let anim = resources.add_animated(mesh);
    resources.update(anim, &mut device);

    // 16 ms over a 1 ms frame crosses 16 frames and returns to frame 0
    draw(&mut resources, &mut device, anim, 16.0);
    let playback = resources.animated[anim].playback;
    assert_eq!(playback.current_frame, 0);
    assert_eq!(device.draws.len(), 1);
}

#[test]
fn long_frame_gap_wraps_in_one_step() {
    let mut device = RecordingDevice::new();
    let mut resources = Resources::new();
    let anim = resources.add_animated(growing_cube());
    resources.update(anim, &mut device);

    // far beyond f32's exact integer range in frame units
    draw(&mut resources, &mut device, anim, 1.0e12);
    let playback = resources.animated[anim].playback;
    assert!(playback.playing);
    assert!(playback.current_frame < 2);
    assert!((0.0..1.0).contains(&playback.frame_percentage));
    assert_eq!(device.draws.len(), 1);
}

#[test]
fn set_frame_resets_progress() {
    let mut mesh = growing_cube();
    mesh.playback.frame_percentage = 0.7;
    mesh.set_frame(1);
    assert_eq!(mesh.playback.current_frame, 1);
    assert_eq!(mesh.playback.frame_percentage, 0.0);
}

#[test]
fn instance_keeps_its_own_playback() {
    let mut device = RecordingDevice::new();
    let mut resources = Resources::new();
    let mut parent_mesh = growing_cube();
    parent_mesh.set_playing(false);
    let parent = resources.add_animated(parent_mesh);
    let mut child_mesh = AnimatedMesh::new();
    child_mesh.set_playing(true);
    let child = resources.add_animated(child_mesh);
    resources.make_animated_instance_of(child, parent, &mut device).unwrap();
    resources.update(parent, &mut device);

    draw(&mut resources, &mut device, child, 1250.0);
    assert_eq!(device.draws.len(), 1);
    let parent_frame1 = resources.animated[parent].frames()[1].gpu_buffers().unwrap();
    assert_eq!(device.draws[0].vertex_buffer, parent_frame1.vertex);

    draw(&mut resources, &mut device, parent, 1250.0);
    assert_eq!(resources.animated[child].playback.current_frame, 1);
    assert_eq!(resources.animated[parent].playback.current_frame, 0);
}

// ============================================================================
// Keyframe interpolation
// ============================================================================

#[test]
fn interpolator_blends_per_segment_mode() {
    let mut track = KeyframeInterpolator::new();
    track.add_keyframe(0.0, Vec3::ZERO, Interpolation::Linear);
    track.add_keyframe(1000.0, Vec3::new(10.0, 0.0, 0.0), Interpolation::Constant);
    track.add_keyframe(2000.0, Vec3::new(20.0, 0.0, 0.0), Interpolation::Sine);
    track.add_keyframe(3000.0, Vec3::new(30.0, 0.0, 0.0), Interpolation::Linear);

    assert!(approx(track.sample(500.0).unwrap().x, 5.0));
    // constant holds until the next key
    assert!(approx(track.sample(1900.0).unwrap().x, 10.0));
    // sine eases: halfway in time is halfway in value, a quarter is less
    assert!(approx(track.sample(2500.0).unwrap().x, 25.0));
    assert!(track.sample(2250.0).unwrap().x < 22.5);
    assert!(approx(track.duration(), 3000.0));
}

#[test]
fn interpolator_clamps_and_handles_empty() {
    let mut track = KeyframeInterpolator::<f32>::new();
    assert!(track.sample(10.0).is_none());
    track.add_keyframe(2000.0, 4.0, Interpolation::Linear);
    track.add_keyframe(1000.0, 2.0, Interpolation::Linear);
    assert_eq!(track.keyframes()[0].time_ms, 1000.0);
    assert_eq!(track.sample(0.0), Some(2.0));
    assert_eq!(track.sample(9000.0), Some(4.0));
}
