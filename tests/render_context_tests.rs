//! Render Context Tests
//!
//! Tests for:
//! - Frame loop start/stop and frame timing
//! - LOD frame scheduling
//! - Global light, fog and background pushed with every draw
//! - Shadow blob limits from the settings
//! - 2D pictures and texture binding
//! - Keyboard events and FPS camera handling through the context
//! - Settings loading

use std::time::{Duration, Instant};

use glam::Vec3;
use lumen::renderer::recording::DeviceEvent;
use lumen::resources::GpuObject;
use lumen::{
    ButtonState, InputEvent, Key, Picture2d, RecordingDevice, RenderContext, RenderMode,
    RenderSettings, Resources, Texture, create_cuboid,
};

const EPSILON: f32 = 1e-4;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn context_at(settings: RenderSettings, start: Instant) -> RenderContext<RecordingDevice> {
    RenderContext::starting_at(settings, RecordingDevice::new(), start)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ============================================================================
// Frame loop
// ============================================================================

#[test]
fn stop_rendering_ends_the_loop() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    let mut frames = 0;
    while ctx.render_frame(|ctx| {
        frames += 1;
        if frames == 3 {
            ctx.stop_rendering();
        }
    }) {}

    assert_eq!(frames, 3);
    assert!(ctx.is_stopping());
    assert_eq!(ctx.device().frames_finished, 3);
    assert!(!ctx.render_frame(|_| panic!("must not draw after stop")));
}

#[test]
fn frame_time_and_total_time() {
    let start = Instant::now();
    let mut ctx = context_at(RenderSettings::default(), start);

    ctx.render_frame_at(start + ms(16), |_| {});
    assert!(approx_eq(ctx.frame_time_difference(), 16.0));
    assert!(approx_eq(ctx.time(), 16.0));

    ctx.render_frame_at(start + ms(50), |_| {});
    assert!(approx_eq(ctx.frame_time_difference(), 34.0));
    assert!(approx_eq(ctx.time(), 50.0));
    assert_eq!(ctx.frame_count(), 2);
}

#[test]
fn fps_is_averaged_per_second() {
    let start = Instant::now();
    let mut ctx = context_at(RenderSettings::default(), start);
    for frame in 1..=40 {
        ctx.render_frame_at(start + ms(frame * 25), |_| {});
    }
    assert!((ctx.fps() - 40.0).abs() < 1e-2);
}

#[test]
fn lod_frames_follow_the_interval() {
    let start = Instant::now();
    let settings = RenderSettings {
        lod_interval: 4,
        ..Default::default()
    };
    let mut ctx = context_at(settings, start);

    let mut lod_frames = Vec::new();
    for frame in 1..=9 {
        ctx.render_frame_at(start + ms(frame * 10), |ctx| {
            if ctx.is_lod_frame() {
                lod_frames.push(ctx.frame_count());
            }
        });
    }
    assert_eq!(lod_frames, vec![1, 5, 9]);
}

#[test]
fn begin_frame_clears_with_background() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    ctx.set_background_color(Vec3::new(0.2, 0.3, 0.4));
    ctx.render_frame(|_| {});
    assert!(
        ctx.device()
            .events
            .contains(&DeviceEvent::BeginFrame(Vec3::new(0.2, 0.3, 0.4)))
    );
    assert_eq!(ctx.device().events.last(), Some(&DeviceEvent::EndFrame));
}

// ============================================================================
// Frame uniforms
// ============================================================================

#[test]
fn global_state_reaches_every_draw() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    let mut resources = Resources::new();
    let cube = resources.add_mesh(create_cuboid(1.0, 1.0, 1.0));
    ctx.upload(&mut resources, cube);

    ctx.set_fog(40.0);
    ctx.set_global_light(Vec3::new(0.0, -2.0, 0.0), Vec3::new(1.0, 0.9, 0.8));
    ctx.set_background_color(Vec3::new(0.5, 0.5, 0.6));
    ctx.camera.set_position(0.0, 2.0, -5.0);

    ctx.render_frame(|ctx| ctx.draw(&mut resources, cube));
    let u = &ctx.device().draws[0].uniforms;

    assert_eq!(u.params[0], 40.0);
    assert_eq!(u.flags[3], 1);
    assert!(vec3_approx(Vec3::from_slice(&u.light_direction[..3]), Vec3::NEG_Y));
    assert_eq!(u.light_color[..3], [1.0, 0.9, 0.8]);
    assert_eq!(u.background_color[..3], [0.5, 0.5, 0.6]);
    assert_eq!(u.camera_position[..3], [0.0, 2.0, -5.0]);
    assert_eq!(u.flags[0], RenderMode::ShadedGouraud.shader_value());
}

#[test]
fn zero_light_direction_falls_back() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    ctx.set_global_light(Vec3::ZERO, Vec3::ONE);
    assert_eq!(ctx.frame_uniforms().light_direction, Vec3::X);
}

#[test]
fn fog_off_and_per_mesh_opt_out() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    let mut resources = Resources::new();
    let mut cube_mesh = create_cuboid(1.0, 1.0, 1.0);
    cube_mesh.material.use_fog = false;
    let cube = resources.add_mesh(cube_mesh);
    let other = resources.add_mesh(create_cuboid(1.0, 1.0, 1.0));
    ctx.upload(&mut resources, cube);
    ctx.upload(&mut resources, other);

    ctx.set_fog(-3.0);
    assert_eq!(ctx.frame_uniforms().fog_distance, 0.0);

    ctx.set_fog(25.0);
    ctx.render_frame(|ctx| {
        ctx.draw(&mut resources, cube);
        ctx.draw(&mut resources, other);
    });
    let draws = &ctx.device().draws;
    assert_eq!(draws[0].uniforms.flags[3], 0);
    assert_eq!(draws[1].uniforms.flags[3], 1);
}

#[test]
fn shadow_count_respects_settings() {
    let settings = RenderSettings {
        max_shadows: 2,
        ..Default::default()
    };
    let mut ctx = RenderContext::new(settings, RecordingDevice::new());
    let mut resources = Resources::new();
    let mut ground = create_cuboid(10.0, 0.1, 10.0);
    for i in 0..5 {
        assert!(ground.material.add_shadow(0.1 * i as f32, 0.5, 0.05, 0.8));
    }
    let ground = resources.add_mesh(ground);
    ctx.upload(&mut resources, ground);

    ctx.render_frame(|ctx| ctx.draw(&mut resources, ground));
    let u = &ctx.device().draws[0].uniforms;
    assert_eq!(u.shadow_count(), 2);
    assert_eq!(u.shadows[1], [0.1, 0.5, 0.05, 0.8]);
    assert_eq!(u.shadows[2], [0.0; 4]);
}

#[test]
fn wireframe_draws_lines() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    let mut resources = Resources::new();
    let mut cube = create_cuboid(1.0, 1.0, 1.0);
    cube.material.render_mode = RenderMode::Wireframe;
    let cube = resources.add_mesh(cube);
    ctx.upload(&mut resources, cube);

    ctx.render_frame(|ctx| ctx.draw(&mut resources, cube));
    assert_eq!(
        ctx.device().draws[0].polygon_mode,
        lumen::renderer::PolygonMode::Line
    );
}

// ============================================================================
// Textures & pictures
// ============================================================================

#[test]
fn picture_draws_in_screen_space_with_texture() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    let mut resources = Resources::new();

    let mut texture = Texture::new(4, 4).unwrap();
    texture.set_transparent_color(255, 0, 255);
    texture.set_transparency(true);
    let texture = resources.add_texture(texture);
    resources.update_texture(texture, ctx.device_mut());

    let mut picture = Picture2d::new();
    picture.set_position(0.25, 0.5);
    picture.set_size(0.5, 0.25);
    picture.set_texture(Some(texture));
    let expected_world = picture.screen_matrix();
    let picture = resources.add_picture(picture);
    ctx.upload(&mut resources, picture);

    ctx.render_frame(|ctx| ctx.draw(&mut resources, picture));
    let call = &ctx.device().draws[0];
    assert!(call.uniforms.is_2d());
    assert_eq!(call.uniforms.world_matrix(), expected_world);
    assert_eq!(call.uniforms.texture_layers(), 1);
    assert_eq!(call.uniforms.flags[2], 1);
    assert_eq!(call.uniforms.transparent_color[..3], [1.0, 0.0, 1.0]);
    assert_eq!(call.textures[0], resources.textures[texture].gpu_handle());
}

#[test]
fn unuploaded_texture_is_not_bound() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    let mut resources = Resources::new();
    let texture = resources.add_texture(Texture::new(2, 2).unwrap());
    let mut cube = create_cuboid(1.0, 1.0, 1.0);
    cube.set_texture(Some(texture));
    let cube = resources.add_mesh(cube);
    ctx.upload(&mut resources, cube);

    ctx.render_frame(|ctx| ctx.draw(&mut resources, cube));
    let call = &ctx.device().draws[0];
    assert_eq!(call.textures, [None, None]);
    assert_eq!(call.uniforms.texture_layers(), 0);

    // and it binds once uploaded
    resources.textures[texture].update(ctx.device_mut());
    ctx.render_frame(|ctx| ctx.draw(&mut resources, cube));
    assert_eq!(ctx.device().draws[0].uniforms.texture_layers(), 1);
}

// ============================================================================
// Input
// ============================================================================

#[test]
fn key_events_are_drained_in_order() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    ctx.inject_key(Key::Space, ButtonState::Pressed);
    ctx.inject_key(Key::Space, ButtonState::Released);

    let events: Vec<InputEvent> = ctx.drain_events().collect();
    assert_eq!(
        events,
        vec![
            InputEvent::KeyDown(Key::Space),
            InputEvent::KeyPressed(Key::Space),
            InputEvent::KeyUp(Key::Space),
        ]
    );
    assert_eq!(ctx.drain_events().count(), 0);
}

#[test]
fn handle_fps_uses_frame_time() {
    let start = Instant::now();
    let mut ctx = context_at(RenderSettings::default(), start);
    ctx.inject_key(Key::ArrowUp, ButtonState::Pressed);

    ctx.render_frame_at(start + ms(100), RenderContext::handle_fps);
    assert!(vec3_approx(ctx.camera.position(), Vec3::new(0.0, 0.0, 1.0)));

    // the uniforms see the move on the next frame
    ctx.render_frame_at(start + ms(100), |_| {});
    assert_eq!(ctx.frame_uniforms().camera_position, ctx.camera.position());
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn resize_updates_aspect_and_ignores_zero() {
    let mut ctx = RenderContext::new(RenderSettings::default(), RecordingDevice::new());
    ctx.resize(1024, 512);
    assert_eq!((ctx.settings().width, ctx.settings().height), (1024, 512));
    assert!(approx_eq(ctx.settings().aspect_ratio(), 2.0));

    ctx.resize(0, 300);
    assert_eq!(ctx.settings().width, 1024);
}

#[test]
fn settings_round_trip_through_a_file() {
    let path = std::env::temp_dir().join(format!("lumen-{}-settings.json", std::process::id()));
    let settings = RenderSettings {
        fog_distance: 30.0,
        lod_interval: 8,
        background_color: Vec3::new(0.1, 0.2, 0.3),
        ..Default::default()
    };
    std::fs::write(&path, settings.to_json().unwrap()).unwrap();
    let loaded = RenderSettings::load(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(loaded, settings);

    let ctx = RenderContext::new(loaded, RecordingDevice::new());
    assert_eq!(ctx.frame_uniforms().fog_distance, 30.0);
    assert_eq!(ctx.frame_uniforms().background_color, Vec3::new(0.1, 0.2, 0.3));
}
