/// Homogeneous-space triangle clipping against the six view-frustum planes.
///
/// Works on raw clip-space positions before the perspective divide. A
/// triangle that straddles planes is cut plane by plane; each cut keeps the
/// original vertex order so winding survives.
use glam::DVec4;

use super::inter_render::{InterRenderTriangle, InterRenderVertex, InterpolationMask};
use crate::count_call;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ClipPlane {
    Left = 0,
    Right = 1,
    Top = 2,
    Bottom = 3,
    Near = 4,
    Far = 5,
}

impl ClipPlane {
    /// Processing order of the slow path
    pub const ALL: [ClipPlane; 6] = [
        ClipPlane::Left,
        ClipPlane::Right,
        ClipPlane::Top,
        ClipPlane::Bottom,
        ClipPlane::Near,
        ClipPlane::Far,
    ];

    #[inline]
    pub const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Signed distance-like value of `v` against `plane`; inside when positive
#[inline(always)]
pub fn homo_dot(v: DVec4, plane: ClipPlane) -> f64 {
    match plane {
        ClipPlane::Left => -v.x + v.w,
        ClipPlane::Right => v.x + v.w,
        ClipPlane::Top => -v.y + v.w,
        ClipPlane::Bottom => v.y + v.w,
        ClipPlane::Near => v.z,
        ClipPlane::Far => -v.z + v.w,
    }
}

/// Bit i is set when `v` is outside (or on) plane i
#[inline]
pub fn outcode(v: DVec4) -> u8 {
    ClipPlane::ALL
        .iter()
        .filter(|&&plane| homo_dot(v, plane) <= 0.0)
        .fold(0, |code, &plane| code | plane.bit())
}

/// Like `outcode` but only flags vertices further out than `tolerance`.
/// Used to check clipper output, whose cut vertices sit on a plane.
#[inline]
pub fn outcode_with_tolerance(v: DVec4, tolerance: f64) -> u8 {
    ClipPlane::ALL
        .iter()
        .filter(|&&plane| homo_dot(v, plane) < -tolerance)
        .fold(0, |code, &plane| code | plane.bit())
}

pub struct ClippingEngine;

impl ClippingEngine {
    /// Clips one triangle. Returns it untouched when fully inside, nothing
    /// when every vertex violates a shared plane, and the cut pieces otherwise.
    pub fn clip(triangle: InterRenderTriangle) -> Vec<InterRenderTriangle> {
        let code_a = outcode(triangle.a.pos_cs);
        let code_b = outcode(triangle.b.pos_cs);
        let code_c = outcode(triangle.c.pos_cs);

        if code_a | code_b | code_c == 0 {
            return vec![triangle];
        }
        if code_a & code_b & code_c != 0 {
            return Vec::new();
        }
        count_call!(triangles_clipped);

        let mut triangles = Vec::with_capacity(8);
        triangles.push(triangle);

        for plane in ClipPlane::ALL {
            // Back to front so removals never skip an unvisited entry;
            // pieces appended here are already inside this plane.
            let mut t = triangles.len();
            while t > 0 {
                t -= 1;
                let tri = &mut triangles[t];
                let d = [
                    homo_dot(tri.a.pos_cs, plane),
                    homo_dot(tri.b.pos_cs, plane),
                    homo_dot(tri.c.pos_cs, plane),
                ];
                let inside = [d[0] > 0.0, d[1] > 0.0, d[2] > 0.0];

                match inside.iter().filter(|&&i| i).count() {
                    0 => {
                        triangles.remove(t);
                    }
                    1 => clip_one_inside(tri, d, inside),
                    2 => {
                        let split = clip_two_inside(tri, d, inside);
                        triangles.push(split);
                    }
                    _ => {}
                }
            }
        }

        triangles
    }
}

/// Point where the edge `from -> to` crosses the plane
#[inline]
fn intersect(from: &InterRenderVertex, to: &InterRenderVertex, d_from: f64, d_to: f64) -> InterRenderVertex {
    from.interpolated(to, d_from / (d_from - d_to), InterpolationMask::CLIP_EDGE)
}

/// Pulls both outside vertices onto the plane along their edges to the inside one
fn clip_one_inside(tri: &mut InterRenderTriangle, d: [f64; 3], inside: [bool; 3]) {
    let [da, db, dc] = d;
    if inside[0] {
        tri.b = intersect(&tri.b, &tri.a, db, da);
        tri.c = intersect(&tri.c, &tri.a, dc, da);
    } else if inside[1] {
        tri.a = intersect(&tri.a, &tri.b, da, db);
        tri.c = intersect(&tri.c, &tri.b, dc, db);
    } else {
        tri.a = intersect(&tri.a, &tri.c, da, dc);
        tri.b = intersect(&tri.b, &tri.c, db, dc);
    }
}

/// Cuts off the single outside vertex, leaving a quad. `tri` keeps one half
/// and the other half is returned, both in the original winding.
fn clip_two_inside(tri: &mut InterRenderTriangle, d: [f64; 3], inside: [bool; 3]) -> InterRenderTriangle {
    let [da, db, dc] = d;
    let mut split = tri.clone();

    if !inside[2] {
        let ca = intersect(&tri.a, &tri.c, da, dc);
        let cb = intersect(&tri.b, &tri.c, db, dc);
        tri.c = ca;
        split.a = ca;
        split.b = tri.b;
        split.c = cb;
    } else if !inside[0] {
        let ac = intersect(&tri.c, &tri.a, dc, da);
        let ab = intersect(&tri.b, &tri.a, db, da);
        tri.a = ab;
        split.a = ac;
        split.b = ab;
        split.c = tri.c;
    } else {
        let bc = intersect(&tri.c, &tri.b, dc, db);
        let ba = intersect(&tri.a, &tri.b, da, db);
        tri.b = ba;
        split.a = ba;
        split.b = bc;
        split.c = tri.c;
    }

    split
}
