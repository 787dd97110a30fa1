pub mod euler;
pub mod projection;
pub mod transform_3d;
pub mod vector3;

pub use euler::{Euler, RotationOrder};
pub use transform_3d::Transform3D;
pub use vector3::Vector3;

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1.0e-5
    }

    #[test]
    fn rotation_order_parses_all_six_orders() {
        for name in ["XYZ", "YZX", "ZXY", "XZY", "YXZ", "ZYX"] {
            let order: RotationOrder = name.parse().unwrap();
            assert_eq!(order.as_str(), name);
        }
        assert!("XXY".parse::<RotationOrder>().is_err());
        assert!("xyz".parse::<RotationOrder>().is_err());
    }

    #[test]
    fn translate_on_axis_follows_local_frame() {
        let mut t = Transform3D::default();
        // Quarter turn around Y maps local +X to world -Z.
        t.rotation = Euler::new(0.0, std::f32::consts::FRAC_PI_2, 0.0, RotationOrder::XYZ);
        t.translate_on_axis(Vector3::new(1.0, 0.0, 0.0), 2.0);
        assert!(approx(t.position.x, 0.0));
        assert!(approx(t.position.y, 0.0));
        assert!(approx(t.position.z, -2.0));
    }

    #[test]
    fn translate_on_axis_without_rotation_is_plain_offset() {
        let mut t = Transform3D::default();
        t.translate_on_axis(Vector3::new(0.0, 0.0, 1.0), 3.0);
        assert_eq!(t.position, Vector3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn euler_order_changes_resulting_rotation() {
        let a = Euler::new(0.3, 0.7, 0.0, RotationOrder::XYZ).to_quat();
        let b = Euler::new(0.3, 0.7, 0.0, RotationOrder::YXZ).to_quat();
        assert!(!a.abs_diff_eq(b, 1.0e-4));
    }

    #[test]
    fn perspective_zoom_matches_narrower_fov() {
        let zoomed = projection::perspective(90.0, 1.0, 0.1, 100.0, 2.0);
        let narrow = projection::perspective(2.0 * (0.5f32).atan().to_degrees(), 1.0, 0.1, 100.0, 1.0);
        assert!(zoomed.abs_diff_eq(narrow, 1.0e-4));
    }

    #[test]
    fn orthographic_zoom_halves_extent() {
        let m = projection::orthographic(-1.0, 1.0, 1.0, -1.0, 0.1, 10.0, 2.0);
        // x scale of an orthographic matrix is 2 / (right - left).
        assert!(approx(m.x_axis.x, 2.0));
    }

    #[test]
    fn vector_normalized_zero_stays_zero() {
        assert_eq!(Vector3::ZERO.normalized(), Vector3::ZERO);
        let n = Vector3::new(3.0, 0.0, 4.0).normalized();
        assert!(approx(n.length(), 1.0));
    }
}
