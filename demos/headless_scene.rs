//! Headless Scene Example
//!
//! Builds a small scene (heightmapped terrain with two texture layers, an
//! instanced forest of cones, an LOD sphere, a looping animated cube, a
//! skybox and a 2D overlay), flies the camera along a keyframed path and
//! renders a few frames offscreen.
//!
//! Uses the wgpu backend when an adapter is available and writes the last
//! frame to `headless_scene.ppm`. Without a GPU it falls back to the
//! recording device and only logs the draw calls.
//!
//! Run with `RUST_LOG=debug cargo run --example headless_scene`.

use std::time::{Duration, Instant};

use glam::Vec3;
use lumen::renderer::GpuDevice;
use lumen::resources::DrawableHandle;
use lumen::{
    AnimatedMesh, ButtonState, Interpolation, Key, KeyframeInterpolator, LodMesh, Picture2d,
    RecordingDevice, RenderContext, RenderMode, RenderSettings, Resources, SphereOptions,
    StaticMesh, TerrainOptions, Texture, create_cone, create_cuboid, create_sphere, create_terrain,
};

const FRAMES: u64 = 48;
const FRAME_TIME: Duration = Duration::from_millis(16);

/// Procedural two-color checker, enough to see texture layers without asset files.
fn checker(size: u32, a: [u8; 3], b: [u8; 3]) -> anyhow::Result<Texture> {
    let mut texture = Texture::new(size, size)?;
    for y in 0..size {
        for x in 0..size {
            let c = if (x / 4 + y / 4) % 2 == 0 { a } else { b };
            texture.set_pixel(x, y, c);
        }
    }
    Ok(texture)
}

/// A smooth hill in the red channel, used both as heightmap and layer mask.
fn hill(size: u32) -> anyhow::Result<Texture> {
    let mut texture = Texture::new(size, size)?;
    let center = size as f32 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let d = ((x as f32 - center).powi(2) + (y as f32 - center).powi(2)).sqrt() / center;
            let h = ((1.0 - d).max(0.0) * 255.0) as u8;
            texture.set_pixel(x, y, [h, h, h]);
        }
    }
    Ok(texture)
}

struct Scene {
    resources: Resources,
    drawables: Vec<DrawableHandle>,
    flight: KeyframeInterpolator<Vec3>,
}

fn build_scene<D: GpuDevice>(ctx: &mut RenderContext<D>) -> anyhow::Result<Scene> {
    let mut resources = Resources::new();
    let mut drawables: Vec<DrawableHandle> = Vec::new();

    // Textures
    let grass = resources.add_texture(checker(64, [40, 140, 40], [30, 110, 30])?);
    let rock = resources.add_texture(checker(64, [120, 110, 100], [90, 85, 80])?);
    let heightmap = hill(32)?;
    let mut overlay_texture = checker(16, [255, 255, 255], [255, 0, 255])?;
    overlay_texture.set_transparent_color(255, 0, 255);
    overlay_texture.set_transparency(true);
    let overlay_texture = resources.add_texture(overlay_texture);
    for handle in [grass, rock, overlay_texture] {
        resources.update_texture(handle, ctx.device_mut());
    }

    // Terrain with a shadow blob under the animated cube
    let mut terrain = create_terrain(&TerrainOptions {
        size_x: 40.0,
        size_z: 40.0,
        height: 4.0,
        resolution_x: 32,
        resolution_z: 32,
        heightmap: Some(&heightmap),
        ..Default::default()
    });
    terrain.texture_map_layer_mask(&heightmap);
    terrain.set_texture(Some(rock));
    terrain.set_texture2(Some(grass));
    terrain.material.add_shadow(0.5, 0.5, 0.05, 0.6);
    let terrain = resources.add_mesh(terrain);
    drawables.push(terrain.into());

    // Instanced forest
    let mut tree = create_cone(0.6, 2.5, 8);
    tree.set_color(20, 90, 30);
    tree.set_position(-12.0, 0.0, -12.0);
    let tree = resources.add_mesh(tree);
    drawables.push(tree.into());
    for i in 1..8 {
        let mut copy = StaticMesh::new();
        copy.set_position(-12.0 + i as f32 * 3.0, 0.0, -12.0 + (i % 3) as f32 * 2.0);
        copy.set_rotation(0.0, i as f32 * 40.0, 0.0);
        copy.set_color(20, 90, 30);
        let copy = resources.add_mesh(copy);
        resources.make_instance_of(copy, tree, ctx.device_mut())?;
        drawables.push(copy.into());
    }

    // LOD sphere
    let mut lod = LodMesh::new(false);
    for (sides, distance) in [(32, 10.0), (16, 25.0), (6, 60.0)] {
        let mut level = create_sphere(SphereOptions {
            radius: 1.5,
            sides,
            height_segments: sides / 2,
        });
        level.material.render_mode = RenderMode::ShadedPhong;
        level.set_color(200, 60, 60);
        lod.add_detail_mesh(resources.add_mesh(level), distance);
    }
    lod.transform.set_position(Vec3::new(6.0, 3.0, 6.0));
    drawables.push(resources.add_lod(lod).into());

    // Animated cube, breathing between two sizes
    let mut breathing = AnimatedMesh::new();
    breathing.add_frame(&create_cuboid(1.0, 1.0, 1.0), 400.0);
    breathing.add_frame(&create_cuboid(1.6, 0.8, 1.6), 400.0);
    breathing.set_playing(true);
    breathing.transform.set_position(Vec3::new(0.0, 5.0, 0.0));
    drawables.push(resources.add_animated(breathing).into());

    // 2D overlay in the top-left corner
    let mut overlay = Picture2d::new();
    overlay.set_position(0.02, 0.78);
    overlay.set_size(0.2, 0.2);
    overlay.set_texture(Some(overlay_texture));
    drawables.push(resources.add_picture(overlay).into());

    for &handle in &drawables {
        ctx.upload(&mut resources, handle);
    }

    // Skybox: an inward-facing unlit cube around the camera
    let mut sky = create_cuboid(80.0, 80.0, 80.0);
    sky.flip_triangles();
    sky.material.render_mode = RenderMode::NoLight;
    sky.material.use_fog = false;
    sky.set_color(120, 160, 220);
    ctx.camera.set_skybox(Some(sky));
    ctx.upload_skybox();

    let mut flight = KeyframeInterpolator::new();
    flight.add_keyframe(0.0, Vec3::new(0.0, 8.0, -25.0), Interpolation::Sine);
    flight.add_keyframe(400.0, Vec3::new(10.0, 6.0, -10.0), Interpolation::Linear);
    flight.add_keyframe(768.0, Vec3::new(4.0, 4.0, 0.0), Interpolation::Linear);

    Ok(Scene {
        resources,
        drawables,
        flight,
    })
}

fn run<D: GpuDevice>(ctx: &mut RenderContext<D>) -> anyhow::Result<()> {
    let mut scene = build_scene(ctx)?;

    ctx.set_fog(60.0);
    ctx.set_background_color(Vec3::new(0.47, 0.63, 0.86));
    ctx.set_global_light(Vec3::new(0.5, -1.0, 0.3), Vec3::new(1.0, 0.95, 0.9));

    // hold a key so the FPS controls have something to do
    ctx.inject_key(Key::D, ButtonState::Pressed);

    let start = Instant::now();
    let mut frame: u32 = 0;
    while ctx.render_frame_at(start + FRAME_TIME * (frame + 1), |ctx| {
        for event in ctx.drain_events() {
            log::debug!("input: {event:?}");
        }
        if let Some(position) = scene.flight.sample(ctx.time()) {
            ctx.camera.set_position(position.x, position.y, position.z);
        }
        ctx.handle_fps();
        ctx.refresh_camera_uniforms();

        ctx.draw_skybox(&scene.resources);
        for &handle in &scene.drawables {
            ctx.draw(&mut scene.resources, handle);
        }

        if ctx.frame_count() >= FRAMES {
            ctx.stop_rendering();
        }
    }) {
        frame += 1;
    }

    log::info!(
        "Rendered {} frames, camera at {:?}",
        ctx.frame_count(),
        ctx.camera.position()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = RenderSettings {
        width: 640,
        height: 360,
        lod_interval: 8,
        ..Default::default()
    };

    match RenderContext::with_wgpu(settings.clone()) {
        Ok(mut ctx) => {
            run(&mut ctx)?;
            let (width, height) = ctx.device().size();
            let rgba = ctx.device().read_pixels()?;
            let rgb: Vec<u8> = rgba
                .chunks_exact(4)
                .flat_map(|p| [p[0], p[1], p[2]])
                .collect();
            Texture::from_rgb(width, height, rgb)?.save_ppm("headless_scene.ppm")?;
            log::info!("Wrote headless_scene.ppm ({width}x{height})");
        }
        Err(err) => {
            log::warn!("No GPU available ({err}), using the recording device");
            let mut ctx = RenderContext::new(settings, RecordingDevice::new());
            run(&mut ctx)?;
            let device: &RecordingDevice = ctx.device();
            log::info!(
                "Last frame: {} draws, {} live buffers, {} live textures",
                device.draws.len(),
                device.live_buffers(),
                device.live_textures()
            );
        }
    }

    Ok(())
}
