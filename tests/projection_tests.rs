/// Projection properties and the world -> screen projection stage.
use glam::{DMat4, DVec2, DVec3, UVec2};
use tornado::rendering::clipping::{homo_dot, outcode_with_tolerance};
use tornado::*;

fn similar(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-5
}

fn front_triangle(z: f64) -> RenderTriangle3D {
    RenderTriangle3D::from_positions(
        DVec3::new(-1.0, -1.0, z),
        DVec3::new(1.0, -1.0, z),
        DVec3::new(0.0, 1.0, z),
    )
}

#[test]
fn constructor_values_match() {
    let props = ProjectionProperties::new(UVec2::new(1920, 1080), 90.0, 2.0, 100.0);

    assert_eq!(props.resolution(), UVec2::new(1920, 1080));
    assert!(similar(props.aspect_ratio(), 1920.0 / 1080.0));
    assert!(similar(props.fov(), 90.0));
    assert!(similar(props.near_clip(), 2.0));
    assert!(similar(props.far_clip(), 100.0));
    assert_eq!(props.sqr_far_clip(), 10000.0);
    assert_eq!(props.half_resolution(), DVec2::new(960.0, 540.0));
}

#[test]
fn projection_matrix_matches_reference() {
    let props = ProjectionProperties::new(UVec2::new(1920, 1080), 90.0, 2.0, 100.0);
    let expected = [
        [0.5625, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, -1.040816327, -4.081632653],
        [0.0, 0.0, -1.0, 1.0],
    ];

    let m = props.projection_matrix();
    for (row, expected_row) in expected.iter().enumerate() {
        let actual = m.row(row);
        for col in 0..4 {
            assert!(
                similar(actual[col], expected_row[col]),
                "cell ({row}, {col}): expected {}, got {}",
                expected_row[col],
                actual[col]
            );
        }
    }
}

#[test]
fn setters_update_derived_values() {
    let mut props = ProjectionProperties::new(UVec2::new(1920, 1080), 90.0, 2.0, 100.0);

    props.set_resolution(UVec2::new(3840, 1440));
    assert!(similar(props.aspect_ratio(), 3840.0 / 1440.0));
    assert_eq!(props.half_resolution(), DVec2::new(1920.0, 720.0));

    props.set_far_clip(200.0);
    assert_eq!(props.sqr_far_clip(), 40000.0);

    props.set_fov(65.0);
    assert!(similar(props.fov(), 65.0));

    props.set_near_clip(6.0);
    assert!(similar(props.near_clip(), 6.0));
}

#[test]
fn setting_anything_updates_matrix() {
    let mut props = ProjectionProperties::new(UVec2::new(1920, 1080), 90.0, 2.0, 100.0);

    let before = *props.projection_matrix();
    props.set_resolution(UVec2::new(800, 600));
    assert_ne!(before, *props.projection_matrix());

    let before = *props.projection_matrix();
    props.set_fov(60.0);
    assert_ne!(before, *props.projection_matrix());

    let before = *props.projection_matrix();
    props.set_near_clip(99.0);
    assert_ne!(before, *props.projection_matrix());

    let before = *props.projection_matrix();
    props.set_far_clip(8888.0);
    assert_ne!(before, *props.projection_matrix());
}

#[test]
fn visible_triangle_becomes_one_fragment() {
    let props = ProjectionProperties::default();
    let fragments = ProjectionEngine::project_triangle(&front_triangle(-10.0), &props, &DMat4::IDENTITY);

    assert_eq!(fragments.len(), 1);
    let f = &fragments[0];
    assert!(f.ss_area < 0.0, "counter-clockwise input keeps a negative screen area");
    for v in f.vertices() {
        assert!(v.pos_ss.x > 0.0 && v.pos_ss.x < 800.0);
        assert!(v.pos_ss.y > 0.0 && v.pos_ss.y < 600.0);
        assert_eq!(v.pos_ss.z, v.pos_cs.z);
        assert!((v.berp_iw - 1.0 / v.pos_cs.w).abs() < 1e-12);
    }
    // Bottom vertices land below the centre row
    assert!(f.a.pos_ss.y < 300.0);
    assert!(f.c.pos_ss.y > 300.0);
}

#[test]
fn world_matrix_is_applied() {
    let props = ProjectionProperties::default();
    let moved = DMat4::from_translation(DVec3::new(0.0, 0.0, -10.0));

    let direct = ProjectionEngine::project_triangle(&front_triangle(-10.0), &props, &DMat4::IDENTITY);
    let through_matrix = ProjectionEngine::project_triangle(&front_triangle(0.0), &props, &moved);

    assert_eq!(direct.len(), 1);
    assert_eq!(through_matrix.len(), 1);
    assert!(direct[0].a.pos_ss.abs_diff_eq(through_matrix[0].a.pos_ss, 1e-9));
    assert_eq!(through_matrix[0].a.pos_ws, DVec3::new(-1.0, -1.0, 0.0));
    assert_eq!(through_matrix[0].a.pos_wsmx, DVec3::new(-1.0, -1.0, -10.0));
}

#[test]
fn triangle_behind_camera_is_clipped_away() {
    let props = ProjectionProperties::default();
    let fragments = ProjectionEngine::project_triangle(&front_triangle(10.0), &props, &DMat4::IDENTITY);
    assert!(fragments.is_empty());
}

#[test]
fn triangle_far_from_origin_is_rejected_early() {
    let props = ProjectionProperties::default();
    let far = front_triangle(-10.0).translated(DVec3::new(200.0, 0.0, 0.0));
    assert!(ProjectionEngine::project_triangle(&far, &props, &DMat4::IDENTITY).is_empty());
}

#[test]
fn triangle_crossing_near_plane_is_split() {
    let props = ProjectionProperties::default();
    let crossing = RenderTriangle3D::from_positions(
        DVec3::new(-1.0, -1.0, -10.0),
        DVec3::new(1.0, -1.0, -10.0),
        DVec3::new(0.0, 0.0, 0.0),
    );
    let fragments = ProjectionEngine::project_triangle(&crossing, &props, &DMat4::IDENTITY);

    assert_eq!(fragments.len(), 2);
    for f in &fragments {
        for v in f.vertices() {
            assert_eq!(outcode_with_tolerance(v.pos_cs, 1e-9), 0);
            assert!(homo_dot(v.pos_cs, ClipPlane::Near) > -1e-9);
        }
    }
}

#[test]
fn engine_projects_batch_on_pool() {
    let props = ProjectionProperties::default();
    let mut pool = WorkerPool::new(4).unwrap();
    let mut engine = ProjectionEngine::new();

    engine.begin_batch(4);
    for x in [-3.0, 0.0, 3.0] {
        engine.register_render_triangle(front_triangle(-10.0).translated(DVec3::new(x, 0.0, 0.0)));
    }
    engine.register_render_triangle(front_triangle(10.0));
    assert_eq!(engine.num_registered(), 4);

    engine.project(&mut pool, &props, &DMat4::IDENTITY);
    let fragments = engine.finish();
    println!("[PIPELINE] engine_projects_batch_on_pool: fragments={}", fragments.len());
    assert_eq!(fragments.len(), 3);

    engine.begin_batch(0);
    engine.project(&mut pool, &props, &DMat4::IDENTITY);
    assert!(engine.finish().is_empty(), "begin_batch must drop previous results");
}
