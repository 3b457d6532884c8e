/// Small numeric helpers shared by the pipeline stages
use glam::{DMat4, DVec2};

use crate::error::{Result, TornadoError};

/// Signed doubled area of the triangle (a, b, p).
/// Positive when p lies to the right of the edge a->b in a y-up frame.
#[inline(always)]
pub fn edge_function(a: DVec2, b: DVec2, p: DVec2) -> f64 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

/// Inverts `m`, refusing matrices whose determinant is zero.
pub fn try_inverse(m: &DMat4) -> Result<DMat4> {
    let det = m.determinant();
    if det == 0.0 || !det.is_finite() {
        return Err(TornadoError::SingularMatrix);
    }
    Ok(m.inverse())
}

#[inline(always)]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
