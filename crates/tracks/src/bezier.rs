use bevy::math::Vec3;

/// A single cubic Bezier curve in segment-local space.
///
/// Callers clamp `u` to `[0, 1]` before evaluating; the polynomial is not
/// meaningful for track outside that range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
}

impl CubicBezier {
    pub const fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Straight curve with evenly spaced inner control points, so `u` maps
    /// linearly onto distance.
    pub fn straight(from: Vec3, to: Vec3) -> Self {
        let step = (to - from) / 3.0;
        Self::new(from, from + step, from + step * 2.0, to)
    }

    /// Evaluate the curve position at `u`.
    pub fn point(&self, u: f32) -> Vec3 {
        debug_assert!((0.0..=1.0).contains(&u), "bezier parameter {u} out of range");
        let v = 1.0 - u;
        let vv = v * v;
        let uu = u * u;
        v * vv * self.p0 + 3.0 * vv * u * self.p1 + 3.0 * v * uu * self.p2 + u * uu * self.p3
    }

    /// First derivative at `u` (not normalized).
    pub fn derivative(&self, u: f32) -> Vec3 {
        let v = 1.0 - u;
        3.0 * v * v * (self.p1 - self.p0)
            + 6.0 * v * u * (self.p2 - self.p1)
            + 3.0 * u * u * (self.p3 - self.p2)
    }

    /// Unit tangent at `u`. Zero when the derivative vanishes.
    pub fn tangent(&self, u: f32) -> Vec3 {
        self.derivative(u).normalize_or_zero()
    }

    /// Binormal at `u` relative to a reference `up` vector: `normalize(up x tangent)`.
    ///
    /// For a level curve heading -Z with `up = +Y` this is -X, so that
    /// `tangent x binormal` points back up.
    pub fn binormal(&self, u: f32, up: Vec3) -> Vec3 {
        up.cross(self.tangent(u)).normalize_or_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s_curve() -> CubicBezier {
        CubicBezier::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(3.0, 0.0, 1.0),
        )
    }

    #[test]
    fn test_point_hits_endpoints() {
        let curve = s_curve();
        assert!((curve.point(0.0) - curve.p0).length() < 1e-6);
        assert!((curve.point(1.0) - curve.p3).length() < 1e-6);
    }

    #[test]
    fn test_straight_is_linear_in_u() {
        let curve = CubicBezier::straight(Vec3::ZERO, Vec3::new(0.0, 0.0, -9.0));
        let quarter = curve.point(0.25);
        assert!((quarter - Vec3::new(0.0, 0.0, -2.25)).length() < 1e-5);
    }

    #[test]
    fn test_tangent_is_unit_length() {
        let curve = s_curve();
        for i in 0..=10 {
            let u = i as f32 / 10.0;
            let len = curve.tangent(u).length();
            assert!((len - 1.0).abs() < 1e-5, "tangent at {u} has length {len}");
        }
    }

    #[test]
    fn test_degenerate_curve_has_zero_tangent() {
        let p = Vec3::new(4.0, 1.0, 2.0);
        let curve = CubicBezier::new(p, p, p, p);
        assert_eq!(curve.tangent(0.5), Vec3::ZERO);
        assert_eq!(curve.binormal(0.5, Vec3::Y), Vec3::ZERO);
    }

    #[test]
    fn test_binormal_of_level_curve_heading_forward() {
        let curve = CubicBezier::straight(Vec3::ZERO, Vec3::NEG_Z);
        let binormal = curve.binormal(0.0, Vec3::Y);
        assert!((binormal - Vec3::NEG_X).length() < 1e-6);
        // tangent x binormal recovers the up vector
        let up = curve.tangent(0.0).cross(binormal);
        assert!((up - Vec3::Y).length() < 1e-6);
    }
}
