/// Pipeline-internal vertex and triangle state.
///
/// An `InterRenderVertex` carries every coordinate space a vertex passes
/// through (world, transformed world, clip, NDC, screen) so later stages can
/// interpolate whichever representation they need. Triangles are created per
/// frame by the projection stage and dropped after drawing.
use std::ops::BitOr;
use std::sync::Arc;

use glam::{DVec2, DVec3, DVec4};

use super::color::Color;
use super::material::Material;
use crate::geometry::Vertex;
use crate::math::{edge_function, lerp};

/// Selects the fields touched by `InterRenderVertex::interpolate`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InterpolationMask(u8);

impl InterpolationMask {
    pub const WS: Self = Self(1 << 0);
    pub const WSMX: Self = Self(1 << 1);
    pub const CS: Self = Self(1 << 2);
    pub const NDC: Self = Self(1 << 3);
    pub const SS: Self = Self(1 << 4);
    pub const UV: Self = Self(1 << 5);
    pub const NORMAL: Self = Self(1 << 6);
    pub const VERTEX_COLOR: Self = Self(1 << 7);

    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u8::MAX);

    /// Everything that exists before the perspective divide
    pub const CLIP_EDGE: Self = Self(
        Self::WS.0 | Self::WSMX.0 | Self::CS.0 | Self::UV.0 | Self::NORMAL.0 | Self::VERTEX_COLOR.0,
    );

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for InterpolationMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct InterRenderVertex {
    /// World space, as submitted
    pub pos_ws: DVec3,
    /// World space after the world matrix
    pub pos_wsmx: DVec3,
    /// Homogeneous clip space
    pub pos_cs: DVec4,
    pub pos_ndc: DVec3,
    /// Pixel x/y; z keeps the clip-space z for depth tests
    pub pos_ss: DVec3,
    pub pos_uv: DVec2,
    pub normal: DVec3,
    pub color: Color,
    /// 1 / pos_cs.w, the perspective weight used for interpolation
    pub berp_iw: f64,
}

impl InterRenderVertex {
    pub fn from_vertex(v: &Vertex) -> Self {
        Self {
            pos_ws: v.pos_ws,
            pos_uv: v.pos_uv,
            normal: v.normal,
            color: v.color,
            ..Default::default()
        }
    }

    /// Vertex with only a clip-space position, mostly for clipping tests
    pub fn from_clip(pos_cs: DVec4) -> Self {
        Self {
            pos_cs,
            ..Default::default()
        }
    }

    /// Moves this vertex toward `other` by `t` on every field in `mask`
    pub fn interpolate(&mut self, other: &InterRenderVertex, t: f64, mask: InterpolationMask) {
        if mask.contains(InterpolationMask::WS) {
            self.pos_ws = self.pos_ws.lerp(other.pos_ws, t);
        }
        if mask.contains(InterpolationMask::WSMX) {
            self.pos_wsmx = self.pos_wsmx.lerp(other.pos_wsmx, t);
        }
        if mask.contains(InterpolationMask::CS) {
            self.pos_cs = self.pos_cs.lerp(other.pos_cs, t);
        }
        if mask.contains(InterpolationMask::NDC) {
            self.pos_ndc = self.pos_ndc.lerp(other.pos_ndc, t);
        }
        if mask.contains(InterpolationMask::SS) {
            self.pos_ss = self.pos_ss.lerp(other.pos_ss, t);
        }
        if mask.contains(InterpolationMask::UV) {
            self.pos_uv = self.pos_uv.lerp(other.pos_uv, t);
        }
        if mask.contains(InterpolationMask::NORMAL) {
            self.normal = self.normal.lerp(other.normal, t);
        }
        if mask.contains(InterpolationMask::VERTEX_COLOR) {
            self.color = Color::new(
                lerp(self.color.r, other.color.r, t),
                lerp(self.color.g, other.color.g, t),
                lerp(self.color.b, other.color.b, t),
                lerp(self.color.a, other.color.a, t),
            );
        }
    }

    /// Copy of this vertex moved toward `other` by `t`
    #[inline]
    pub fn interpolated(&self, other: &InterRenderVertex, t: f64, mask: InterpolationMask) -> Self {
        let mut out = *self;
        out.interpolate(other, t, mask);
        out
    }

    /// Perspective divide and viewport mapping
    #[inline]
    fn finalize_screen_space(&mut self, half_resolution: DVec2) {
        self.pos_ndc = self.pos_cs.truncate() / self.pos_cs.w;
        self.pos_ss = DVec3::new(
            self.pos_ndc.x * half_resolution.x + half_resolution.x,
            self.pos_ndc.y * half_resolution.y + half_resolution.y,
            self.pos_cs.z,
        );
        self.berp_iw = 1.0 / self.pos_cs.w;
    }
}

#[derive(Clone, Debug, Default)]
pub struct InterRenderTriangle {
    pub a: InterRenderVertex,
    pub b: InterRenderVertex,
    pub c: InterRenderVertex,
    /// Signed screen-space area (edge function of a, b, c)
    pub ss_area: f64,
    pub ss_iarea: f64,
    pub material: Option<Arc<Material>>,
}

impl InterRenderTriangle {
    pub fn new(a: InterRenderVertex, b: InterRenderVertex, c: InterRenderVertex) -> Self {
        Self {
            a,
            b,
            c,
            ..Default::default()
        }
    }

    pub fn from_clip(a: DVec4, b: DVec4, c: DVec4) -> Self {
        Self::new(
            InterRenderVertex::from_clip(a),
            InterRenderVertex::from_clip(b),
            InterRenderVertex::from_clip(c),
        )
    }

    /// Divides by w, maps NDC to pixels and caches the screen-space area
    pub fn finalize_screen_space(&mut self, half_resolution: DVec2) {
        self.a.finalize_screen_space(half_resolution);
        self.b.finalize_screen_space(half_resolution);
        self.c.finalize_screen_space(half_resolution);

        self.ss_area = edge_function(
            self.a.pos_ss.truncate(),
            self.b.pos_ss.truncate(),
            self.c.pos_ss.truncate(),
        );
        self.ss_iarea = 1.0 / self.ss_area;
    }

    /// Edge test with the swapped argument order that accepts
    /// counter-clockwise (y-up) triangles.
    #[inline]
    pub fn does_screenspace_contain_point(&self, p: DVec2) -> bool {
        let a = self.a.pos_ss.truncate();
        let b = self.b.pos_ss.truncate();
        let c = self.c.pos_ss.truncate();

        edge_function(b, a, p) >= 0.0 && edge_function(a, c, p) >= 0.0 && edge_function(c, b, p) >= 0.0
    }

    pub fn vertices(&self) -> [&InterRenderVertex; 3] {
        [&self.a, &self.b, &self.c]
    }
}
