use glam::Mat4;

/// Perspective projection with a vertical `fov` in degrees, narrowed by `zoom`.
pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32, zoom: f32) -> Mat4 {
    let half = (fov.to_radians() * 0.5).tan() / zoom.max(f32::EPSILON);
    Mat4::perspective_rh_gl(2.0 * half.atan(), aspect, near, far)
}

/// Orthographic projection for the given frustum planes, scaled about its centre by `zoom`.
pub fn orthographic(
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    near: f32,
    far: f32,
    zoom: f32,
) -> Mat4 {
    let zoom = zoom.max(f32::EPSILON);
    let dx = (right - left) / (2.0 * zoom);
    let dy = (top - bottom) / (2.0 * zoom);
    let cx = (right + left) * 0.5;
    let cy = (top + bottom) * 0.5;
    Mat4::orthographic_rh_gl(cx - dx, cx + dx, cy - dy, cy + dy, near, far)
}
