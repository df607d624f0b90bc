use glam::DVec3;

pub const U_MIN: f64 = -2.0;
pub const U_MAX: f64 = 2.0;
pub const V_MIN: f64 = -2.0;
pub const V_MAX: f64 = 2.0;

// The rational term is dropped exactly at u = v = 0.
pub fn position(u: f64, v: f64) -> DVec3 {
    let r2 = u * u + v * v;
    let (ru, rv) = if r2 == 0.0 { (0.0, 0.0) } else { (u / r2, v / r2) };

    DVec3::new(
        (1.0 / 3.0) * u.powi(3) - u * v.powi(2) + ru,
        -u.powi(2) * v + (1.0 / 3.0) * v.powi(3) - rv,
        2.0 * u,
    )
}

#[derive(Clone, Copy, Debug)]
pub struct Sample {
    pub position: DVec3,
    pub normal: DVec3,
}

pub fn sample(u: f64, v: f64, du: f64, dv: f64) -> Sample {
    let p = position(u, v);
    let tangent_u = position(u + du, v) - p;
    let tangent_v = position(u, v + dv) - p;

    Sample {
        position: p,
        normal: normalize_or_zero(tangent_u.cross(tangent_v)),
    }
}

/// A zero-length input yields the zero vector.
#[inline]
pub fn normalize_or_zero(v: DVec3) -> DVec3 {
    let len = v.length();
    if len == 0.0 { DVec3::ZERO } else { v / len }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn position_at_grid_corner() {
        let p = position(-2.0, -2.0);
        assert_relative_eq!(p.x, 61.0 / 12.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 67.0 / 12.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, -4.0);
    }

    #[test]
    fn position_is_odd_in_both_parameters() {
        let a = position(0.7, -1.3);
        let b = position(-0.7, 1.3);
        assert!(a.abs_diff_eq(-b, 1e-12));
    }

    #[test]
    fn origin_drops_rational_term() {
        let p = position(0.0, 0.0);
        assert_eq!(p, DVec3::ZERO);
        assert!(p.is_finite());
    }

    #[test]
    fn normal_follows_right_hand_rule() {
        let s = sample(2.0, 0.0, 1e-6, 1e-6);
        let tangent_u = position(2.0 + 1e-6, 0.0) - s.position;
        let tangent_v = position(2.0, 1e-6) - s.position;
        let expected = tangent_u.cross(tangent_v).normalize();
        assert!(s.normal.abs_diff_eq(expected, 1e-12));
        assert!(s.normal.dot(tangent_u).abs() < 1e-6);
    }

    #[test]
    fn normalize_zero_vector_is_zero() {
        assert_eq!(normalize_or_zero(DVec3::ZERO), DVec3::ZERO);
        assert_relative_eq!(normalize_or_zero(DVec3::new(3.0, 0.0, 4.0)).length(), 1.0);
    }

    #[test]
    fn sample_uses_forward_differences() {
        let s = sample(-2.0, -2.0, 2.0, 2.0);
        let expected = DVec3::new(
            0.418_196_763_454_645_8,
            -0.617_932_531_074_775_1,
            -0.665_785_892_067_097_6,
        );
        assert!(s.normal.abs_diff_eq(expected, 1e-12));
        assert_relative_eq!(s.normal.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn parallel_tangents_give_zero_normal() {
        // dv = 0 collapses the v tangent.
        let s = sample(1.0, 1.0, 0.1, 0.0);
        assert_eq!(s.normal, DVec3::ZERO);
    }
}
