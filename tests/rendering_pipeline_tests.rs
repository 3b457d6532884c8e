/// Integration tests that exercise the full rendering pipeline.
/// These act as correctness tests and lightweight, programmatic
/// benchmarks of the end-to-end path: cull -> project -> clip -> draw.
use std::sync::Arc;
use std::time::Instant;

use glam::{DMat4, DVec2, DVec3, UVec2};
use tornado::*;

const MAGENTA: [u8; 3] = [255, 0, 255];
const BLACK: [u8; 3] = [0, 0, 0];

fn centre_triangle(z: f64, half: f64) -> RenderTriangle3D {
    RenderTriangle3D::from_positions(
        DVec3::new(-half, -half, z),
        DVec3::new(half, -half, z),
        DVec3::new(0.0, half, z),
    )
}

/// Triangle facing the camera with a uniform vertex color and the given material
fn colored_triangle(z: f64, half: f64, color: Color, material: Arc<Material>) -> RenderTriangle3D {
    let v = |x: f64, y: f64| Vertex::new(DVec3::new(x, y, z), DVec2::ZERO, DVec3::Z).with_color(color);
    RenderTriangle3D::new(v(-half, -half), v(half, -half), v(0.0, half)).with_material(material)
}

fn pixel(tornado: &Tornado, x: usize, y: usize) -> [u8; 3] {
    let px = tornado.pixel_buffer().pixel(x, y).unwrap();
    [px[0], px[1], px[2]]
}

#[test]
fn single_triangle_without_material_is_magenta() {
    let props = ProjectionProperties::new(UVec2::new(800, 600), 90.0, 2.0, 100.0);
    let mut tornado = Tornado::new(UVec2::new(800, 600), 4).unwrap();
    let triangle = centre_triangle(-10.0, 2.0);

    let start = Instant::now();
    tornado.begin_frame();
    tornado.register_render(triangle.clone());
    tornado.render(&props, &DMat4::IDENTITY);
    let elapsed = start.elapsed();

    // The same fragment the pipeline drew, for an exact coverage reference
    let fragments = ProjectionEngine::project_triangle(&triangle, &props, &DMat4::IDENTITY);
    assert_eq!(fragments.len(), 1);
    let fragment = &fragments[0];

    let sentinel = tornado.depth_sentinel();
    let mut drawn = 0;
    for y in 0..600 {
        for x in 0..800 {
            let inside = fragment.does_screenspace_contain_point(DVec2::new(x as f64, y as f64));
            let depth = tornado.depth_at(x, y).unwrap();
            if inside {
                assert_eq!(pixel(&tornado, x, y), MAGENTA, "covered pixel ({x}, {y})");
                assert!(depth < sentinel, "z-test must have fired at ({x}, {y})");
                drawn += 1;
            } else {
                assert_eq!(pixel(&tornado, x, y), BLACK, "background pixel ({x}, {y})");
                assert_eq!(depth, sentinel);
            }
        }
    }

    println!(
        "[PIPELINE] single_triangle_without_material_is_magenta: {:?}, drawn_pixels={}",
        elapsed, drawn
    );
    assert!(drawn > 1000, "expected a visible triangle, drew {drawn} pixels");

    let expected_depth = fragment.a.pos_cs.z;
    let centre_depth = tornado.depth_at(400, 300).unwrap();
    assert!((centre_depth - expected_depth).abs() < 1e-9, "depth {centre_depth}");
}

#[test]
fn image_rows_run_bottom_up() {
    let props = ProjectionProperties::default();
    let mut tornado = Tornado::new(UVec2::new(800, 600), 2).unwrap();

    // Entirely above the horizon in world space
    tornado.register_render(centre_triangle(-10.0, 1.0).translated(DVec3::new(0.0, 3.0, 0.0)));
    tornado.render(&props, &DMat4::IDENTITY);

    let rows_with_pixels: Vec<usize> = (0..600)
        .filter(|&y| (0..800).any(|x| pixel(&tornado, x, y) != BLACK))
        .collect();
    assert!(!rows_with_pixels.is_empty());
    assert!(rows_with_pixels.iter().all(|&y| y > 300), "rows {:?}", rows_with_pixels.first());
}

#[test]
fn nearer_triangle_wins_regardless_of_order() {
    let props = ProjectionProperties::default();
    let material = Arc::new(Material::vertex_colored());
    let near = colored_triangle(-8.0, 2.0, Color::rgb(200.5, 0.5, 0.5), Arc::clone(&material));
    let far = colored_triangle(-12.0, 4.0, Color::rgb(0.5, 200.5, 0.5), Arc::clone(&material));

    for order in [[near.clone(), far.clone()], [far.clone(), near.clone()]] {
        let mut tornado = Tornado::new(UVec2::new(800, 600), 4).unwrap();
        tornado.begin_frame();
        tornado.register_renders(order);
        tornado.render(&props, &DMat4::IDENTITY);

        assert_eq!(pixel(&tornado, 400, 300), [200, 0, 0]);
        // Below the near triangle but inside the far one
        assert_eq!(pixel(&tornado, 400, 220), [0, 200, 0]);
    }
}

/// Floor below the camera running from in front of the near plane out to z = -60
fn floor_through_near_plane(color: Color, material: Arc<Material>) -> RenderTriangle3D {
    let v = |x: f64, z: f64| Vertex::new(DVec3::new(x, -3.0, z), DVec2::ZERO, DVec3::Y).with_color(color);
    RenderTriangle3D::new(v(-20.0, -1.0), v(20.0, -1.0), v(0.0, -60.0)).with_material(material)
}

#[test]
fn near_clipped_floor_keeps_true_depth() {
    let props = ProjectionProperties::default();
    let material = Arc::new(Material::vertex_colored());
    let floor = floor_through_near_plane(Color::rgb(0.5, 200.5, 0.5), Arc::clone(&material));
    // Upright triangle standing on the floor's line of sight at z = -5
    let wall = colored_triangle(-5.0, 1.0, Color::rgb(200.5, 0.5, 0.5), material).translated(DVec3::new(0.0, -1.8, 0.0));

    let fragments = ProjectionEngine::project_triangle(&floor, &props, &DMat4::IDENTITY);
    assert!(fragments.len() > 1, "floor must be split by clipping, got {}", fragments.len());

    for order in [[floor.clone(), wall.clone()], [wall.clone(), floor.clone()]] {
        let mut tornado = Tornado::new(UVec2::new(800, 600), 4).unwrap();
        tornado.begin_frame();
        tornado.register_renders(order);
        tornado.render(&props, &DMat4::IDENTITY);

        // Row 140 sees the floor at z = -4.625, row 120 at z = -4
        for (y, expected) in [(140, 0.7321428571428577), (120, 0.08163265306122458)] {
            let depth = tornado.depth_at(400, y).unwrap();
            println!("[PIPELINE] near_clipped_floor_keeps_true_depth: row {y} depth {depth}");
            assert!((depth - expected).abs() < 1e-6, "floor depth at row {y}: {depth}, expected {expected}");
            assert_eq!(pixel(&tornado, 400, y), [0, 200, 0]);
        }

        // The wall (cs.z 1.12) hides the floor behind it (cs.z 2.43)
        let depth = tornado.depth_at(400, 176).unwrap();
        assert!((depth - 1.1224489795918364).abs() < 1e-6, "wall depth {depth}");
        assert_eq!(pixel(&tornado, 400, 176), [200, 0, 0]);
    }
}

#[test]
fn textured_material_samples_texture() {
    let props = ProjectionProperties::default();
    let texture = Arc::new(Texture::from_color(Color::rgb(10.0, 200.0, 30.0)));
    let material = Arc::new(Material::textured(texture));

    let mut tornado = Tornado::new(UVec2::new(800, 600), 2).unwrap();
    tornado.register_render(colored_triangle(-10.0, 2.0, Color::WHITE, material));
    tornado.render(&props, &DMat4::IDENTITY);

    assert_eq!(pixel(&tornado, 400, 300), [10, 200, 30]);
}

#[test]
fn point_light_brightens_shaded_surfaces() {
    let props = ProjectionProperties::default();
    let gray = Color::rgb(100.5, 100.5, 100.5);
    let light: Arc<dyn RenderLightSource> =
        Arc::new(RenderPointLight::new(DVec3::new(0.0, 0.0, -5.0), Color::WHITE, 10.0));

    let render = |material: Material, with_light: bool| {
        let mut tornado = Tornado::new(UVec2::new(800, 600), 2).unwrap();
        tornado.begin_frame();
        tornado.register_render(colored_triangle(-10.0, 2.0, gray, Arc::new(material)));
        if with_light {
            tornado.register_light(Arc::clone(&light));
        }
        tornado.render(&props, &DMat4::IDENTITY);
        pixel(&tornado, 400, 300)
    };

    let unlit = render(Material::vertex_colored(), false);
    let lit = render(Material::vertex_colored(), true);
    let unshaded = render(Material::vertex_colored().unshaded(), true);

    println!("[PIPELINE] point light: unlit={:?} lit={:?} unshaded={:?}", unlit, lit, unshaded);
    assert_eq!(unlit, [100, 100, 100]);
    // 10 / 5^2 head-on adds 40% on top of full global illumination
    assert!((138..=142).contains(&lit[0]), "lit = {:?}", lit);
    assert_eq!(unshaded, [100, 100, 100]);
}

#[test]
fn begin_frame_clears_previous_scene() {
    let props = ProjectionProperties::new(UVec2::new(320, 240), 90.0, 2.0, 100.0);
    let mut tornado = Tornado::new(UVec2::new(320, 240), 2).unwrap();

    tornado.register_render(centre_triangle(-10.0, 2.0));
    tornado.render(&props, &DMat4::IDENTITY);
    assert_eq!(tornado.num_registered(), 1);

    tornado.begin_frame();
    assert_eq!(tornado.num_registered(), 0);
    tornado.render(&props, &DMat4::IDENTITY);

    assert!(tornado.pixel_buffer().as_bytes().iter().all(|&b| b == 0));
    assert_eq!(tornado.depth_at(160, 120), Some(tornado.depth_sentinel()));
}

#[test]
fn frame_stats_describe_last_frame() {
    let props = ProjectionProperties::default();
    let mut tornado = Tornado::new(UVec2::new(800, 600), 4).unwrap();

    tornado.register_render(centre_triangle(-10.0, 2.0));
    tornado.register_render(centre_triangle(10.0, 2.0));
    tornado.render(&props, &DMat4::IDENTITY);

    let stats = tornado.last_frame_stats();
    stats.print_summary();
    assert_eq!(stats.triangles_registered, 2);
    assert_eq!(stats.fragments_projected, 1);
    assert_eq!(stats.fragments_drawn, 1);
    assert!(stats.draw_tasks >= 1);
    assert!(stats.total >= stats.drawing);
}

#[test]
fn render_is_independent_of_thread_count() {
    let props = ProjectionProperties::new(UVec2::new(400, 300), 90.0, 2.0, 100.0);
    let material = Arc::new(Material::vertex_colored());
    let scene = vec![
        colored_triangle(-8.0, 3.0, Color::rgb(200.5, 20.5, 20.5), Arc::clone(&material))
            .translated(DVec3::new(-1.0, 0.0, 0.0)),
        colored_triangle(-10.0, 4.0, Color::rgb(20.5, 200.5, 20.5), Arc::clone(&material))
            .translated(DVec3::new(1.5, 0.5, 0.0)),
        colored_triangle(-30.0, 25.0, Color::rgb(20.5, 20.5, 200.5), Arc::clone(&material)),
    ];

    let render = |threads: usize| {
        let mut tornado = Tornado::new(UVec2::new(400, 300), threads).unwrap();
        tornado.register_renders(scene.clone());
        tornado.render(&props, &DMat4::IDENTITY);
        tornado.pixel_buffer().clone()
    };

    let single = render(1);
    let many = render(8);
    assert!(single == many, "1-thread and 8-thread images differ");
}

#[test]
fn rotating_cube_renders() {
    let props = ProjectionProperties::new(UVec2::new(320, 240), 90.0, 2.0, 100.0);
    let mut tornado = Tornado::new(UVec2::new(320, 240), 0).unwrap();
    let material = Arc::new(Material::vertex_colored());
    let cube = mesh::cube(DVec3::ZERO, 4.0, Some(material));
    let light: Arc<dyn RenderLightSource> =
        Arc::new(RenderPointLight::new(DVec3::new(4.0, 4.0, -4.0), Color::WHITE, 40.0));

    let start = Instant::now();
    let mut drawn = 0;
    for frame in 0..10 {
        let angle = frame as f64 * 0.3;
        let mut triangles = cube.clone();
        mesh::transform_triangles(
            &mut triangles,
            &(DMat4::from_translation(DVec3::new(0.0, 0.0, -10.0)) * DMat4::from_rotation_y(angle)),
        );

        tornado.begin_frame();
        tornado.register_renders(triangles);
        tornado.register_light(Arc::clone(&light));
        tornado.render(&props, &DMat4::IDENTITY);

        drawn = tornado
            .pixel_buffer()
            .as_bytes()
            .chunks_exact(3)
            .filter(|px| *px != BLACK)
            .count();
        assert!(drawn > 0, "frame {frame} drew nothing");
    }

    println!(
        "[PIPELINE] rotating_cube_renders: 10 frames {:?}, last frame drawn_pixels={}",
        start.elapsed(),
        drawn
    );
    assert_eq!(tornado.last_frame_stats().triangles_registered, 12);
}

#[test]
fn config_drives_renderer() {
    let config = TornadoConfig::from_json_str(
        r#"{ "resolution": [160, 120], "num_threads": 2, "shading": { "clear_color": [10, 20, 30] } }"#,
    )
    .unwrap();
    let mut tornado = Tornado::from_config(&config).unwrap();
    assert_eq!(tornado.num_workers(), 2);

    tornado.register_render(centre_triangle(-10.0, 2.0));
    tornado.render(&config.projection_properties(), &DMat4::IDENTITY);

    assert_eq!(tornado.pixel_buffer().dimensions(), UVec2::new(160, 120));
    assert_eq!(pixel(&tornado, 0, 0), [10, 20, 30]);
    assert_eq!(pixel(&tornado, 80, 60), MAGENTA);
}

#[test]
fn zero_resolution_is_an_error() {
    assert!(matches!(
        Tornado::new(UVec2::new(0, 600), 1),
        Err(TornadoError::InvalidResolution { width: 0, height: 600 })
    ));
}

#[test]
fn slice_count_follows_screen_coverage() {
    assert_eq!(DrawingEngine::threads_for_area(0.0, 480_000.0, 8, 16), 1);
    assert_eq!(DrawingEngine::threads_for_area(-480_000.0, 480_000.0, 8, 16), 8);
    assert_eq!(DrawingEngine::threads_for_area(480_000.0, 480_000.0, 64, 16), 16);
    assert_eq!(DrawingEngine::threads_for_area(f64::NAN, 480_000.0, 8, 16), 1);
}

#[test]
fn column_slices_cover_bounds_with_padding() {
    let bounds = ScreenRect {
        pos: DVec2::new(10.0, 10.0),
        size: DVec2::new(100.0, 50.0),
    };
    let slices = DrawingEngine::column_slices(bounds, 4, DVec2::new(800.0, 600.0));
    assert_eq!(slices.len(), 4);
    for (i, s) in slices.iter().enumerate() {
        assert_eq!(s.pos, DVec2::new(10.0 + 25.0 * i as f64, 10.0));
        assert_eq!(s.size, DVec2::new(27.0, 52.0));
    }

    // No padding past the target edge
    let edge = ScreenRect {
        pos: DVec2::new(700.0, 0.0),
        size: DVec2::new(100.0, 600.0),
    };
    let slices = DrawingEngine::column_slices(edge, 1, DVec2::new(800.0, 600.0));
    assert_eq!(slices[0].size, DVec2::new(100.0, 600.0));
}
