use std::path::Path;

use glow::HasContext;

use glshape::abs::{App, Dimension, ShapeId, ShapeRegistry};
use glshape::{ShapeConfig, check_gl_error, logging};

const CONFIG_PATH: &str = "glshape.json";

fn checkerboard(size: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let c = if (x + y) % 2 == 0 { 255 } else { 40 };
            pixels.extend_from_slice(&[c, c, c, 255]);
        }
    }
    pixels
}

fn load_config() -> ShapeConfig {
    if !Path::new(CONFIG_PATH).exists() {
        return ShapeConfig::default();
    }
    match ShapeConfig::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring {CONFIG_PATH}: {e}");
            ShapeConfig::default()
        }
    }
}

fn build_scene(
    app: &App,
    registry: &mut ShapeRegistry<glow::Context>,
    config: &ShapeConfig,
) -> glshape::Result<Vec<ShapeId>> {
    let triangle = registry.create(&app.gl, 3, Dimension::Two, config)?;
    if let Some(shape) = registry.get_mut(triangle) {
        shape.set_vertices(&[-0.9, -0.8, -0.1, -0.8, -0.5, 0.0])?;
        shape.set_colors(&[
            1.0, 0.0, 0.0, 1.0, //
            0.0, 1.0, 0.0, 1.0, //
            0.0, 0.0, 1.0, 1.0,
        ])?;
        shape.set_elements(&[0, 1, 2])?;
    }

    let quad = registry.create(&app.gl, 4, Dimension::Three, config)?;
    if let Some(shape) = registry.get_mut(quad) {
        shape.set_vertices(&[
            0.1, -0.4, 0.0, //
            0.9, -0.4, 0.0, //
            0.9, 0.4, 0.0, //
            0.1, 0.4, 0.0,
        ])?;
        shape.set_elements(&[0, 1, 2, 2, 3, 0])?;
        shape.apply_texture(
            &[0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
            &checkerboard(8),
            8,
            8,
        )?;
    }

    Ok(vec![triangle, quad])
}

fn main() {
    let level = std::env::var("GLSHAPE_LOG")
        .map(|s| logging::level_from_str(&s))
        .unwrap_or(log::LevelFilter::Info);
    if let Err(e) = logging::init(level) {
        eprintln!("Failed to set up logging: {e}");
    }

    let mut app = match App::new("glshape", 800, 600) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Could not open a window: {e}");
            std::process::exit(1);
        }
    };

    unsafe {
        app.gl.enable(glow::BLEND);
        app.gl
            .blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
    }

    let config = load_config();
    let mut registry = ShapeRegistry::new();
    let ids = match build_scene(&app, &mut registry, &config) {
        Ok(ids) => ids,
        Err(e) => {
            log::error!("Could not build scene: {e}");
            registry.clear();
            std::process::exit(1);
        }
    };
    check_gl_error!(app.gl);

    'running: loop {
        for event in app.event_pump.poll_iter() {
            match event {
                sdl2::event::Event::Quit { .. } => break 'running,
                sdl2::event::Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(width, height),
                    ..
                } => unsafe {
                    app.gl.viewport(0, 0, width, height);
                },
                _ => {}
            }
        }

        unsafe {
            app.gl.clear_color(0.1, 0.1, 0.12, 1.0);
            app.gl.clear(glow::COLOR_BUFFER_BIT);
        }

        for (id, shape) in registry.iter() {
            if let Err(e) = shape.render() {
                log::warn!("Skipping shape {id}: {e}");
            }
        }
        check_gl_error!(app.gl);

        app.window.gl_swap_window();
    }

    for id in ids {
        if let Err(e) = registry.destroy(id) {
            log::error!("FATAL: {e}");
        }
    }
    check_gl_error!(app.gl);
}
