/// Headless demo: renders a rotating, lit cube and reports frame times.
///
/// Usage:
///   tornado-headless [--width 800] [--height 600] [--threads 0] [--frames 120]
///                    [--config tornado.json] [--ascii]
///
/// `RUST_LOG=debug` shows per-stage timings.
use std::env;
use std::io::{BufWriter, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use glam::{DMat4, DVec3};
use mimalloc::MiMalloc;
use tracing::info;

use tornado::*;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const CUBE_CENTER: DVec3 = DVec3::new(0.0, 0.0, -10.0);

struct Args {
    width: Option<u32>,
    height: Option<u32>,
    threads: Option<usize>,
    frames: usize,
    config: Option<String>,
    ascii: bool,
}

fn parse_args() -> Args {
    let mut parsed = Args {
        width: None,
        height: None,
        threads: None,
        frames: 120,
        config: None,
        ascii: false,
    };
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--width" if i + 1 < args.len() => {
                parsed.width = args[i + 1].parse().ok();
                i += 2;
            }
            "--height" if i + 1 < args.len() => {
                parsed.height = args[i + 1].parse().ok();
                i += 2;
            }
            "--threads" if i + 1 < args.len() => {
                parsed.threads = args[i + 1].parse().ok();
                i += 2;
            }
            "--frames" if i + 1 < args.len() => {
                parsed.frames = args[i + 1].parse().unwrap_or(120);
                i += 2;
            }
            "--config" if i + 1 < args.len() => {
                parsed.config = Some(args[i + 1].clone());
                i += 2;
            }
            "--ascii" => {
                parsed.ascii = true;
                i += 1;
            }
            _ => i += 1,
        }
    }
    parsed
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = parse_args();
    let mut config = match &args.config {
        Some(path) => TornadoConfig::from_json_file(path).with_context(|| format!("load config {path}"))?,
        None => TornadoConfig::default(),
    };
    if let Some(width) = args.width {
        config.resolution[0] = width;
    }
    if let Some(height) = args.height {
        config.resolution[1] = height;
    }
    if let Some(threads) = args.threads {
        config.num_threads = threads;
    }

    let mut tornado = Tornado::from_config(&config).context("create renderer")?;
    let props = config.projection_properties();
    let mut camera = Camera::new(DVec3::new(0.0, 2.0, 0.0));
    camera.look_at(CUBE_CENTER);
    info!(
        width = config.resolution[0],
        height = config.resolution[1],
        workers = tornado.num_workers(),
        frames = args.frames,
        "Starting headless render"
    );

    let mut light = RenderPointLight::new(DVec3::new(4.0, 4.0, -4.0), Color::WHITE, 40.0);
    light.set_softness(0.2);
    let light: Arc<dyn RenderLightSource> = Arc::new(light);

    let material = Arc::new(Material::vertex_colored());
    let cube = mesh::cube(DVec3::ZERO, 4.0, Some(material));

    let start = Instant::now();
    for frame in 0..args.frames {
        let angle = frame as f64 * 0.02;
        let transform = DMat4::from_translation(CUBE_CENTER)
            * DMat4::from_rotation_y(angle)
            * DMat4::from_rotation_x(angle * 0.5);
        let mut triangles = cube.clone();
        mesh::transform_triangles(&mut triangles, &transform);

        // Slow side-to-side pan around the cube
        camera.rotate(0.004 * (angle * 2.0).cos(), 0.0);
        let world_matrix = camera.world_matrix().context("camera matrix")?;

        tornado.begin_frame();
        tornado.register_renders(triangles);
        tornado.register_light(Arc::clone(&light));
        tornado.render(&props, &world_matrix);

        if frame % 30 == 0 {
            let stats = tornado.last_frame_stats();
            info!(
                frame,
                fps = stats.fps(),
                fragments = stats.fragments_drawn,
                tasks = stats.draw_tasks,
                "frame"
            );
        }
    }

    let elapsed = start.elapsed();
    if args.frames > 0 {
        info!(
            frames = args.frames,
            avg_ms = elapsed.as_secs_f64() * 1e3 / args.frames as f64,
            fps = args.frames as f64 / elapsed.as_secs_f64(),
            "Done"
        );
        tornado.last_frame_stats().print_summary();
    }
    if cfg!(feature = "profiling") {
        FUNCTION_COUNTERS.snapshot().print_report();
    }

    if args.ascii {
        print_ansi(tornado.pixel_buffer()).context("write frame to stdout")?;
    }
    Ok(())
}

/// One space per pixel with a true-colour background; bottom row first
/// so +y points up on the terminal.
fn print_ansi(pixels: &PixelBuffer<3>) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for y in (0..pixels.height()).rev() {
        for x in 0..pixels.width() {
            if let Some(&[r, g, b]) = pixels.pixel(x, y) {
                write!(out, "\x1b[48;2;{r};{g};{b}m ")?;
            }
        }
        writeln!(out, "\x1b[0m")?;
    }
    out.flush()
}

