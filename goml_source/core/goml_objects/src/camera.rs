use glam::Mat4;
use goml_structs::projection;

/// Perspective camera. Projection is cached and refreshed by
/// [`PerspectiveCamera::update_projection_matrix`].
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view, in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub zoom: f32,
    pub projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            fov,
            aspect,
            near,
            far,
            zoom: 1.0,
            projection: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection =
            projection::perspective(self.fov, self.aspect, self.near, self.far, self.zoom);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrthographicCamera {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    pub zoom: f32,
    pub projection: Mat4,
}

impl Default for OrthographicCamera {
    fn default() -> Self {
        Self::new(-1.0, 1.0, 1.0, -1.0, 0.1, 2000.0)
    }
}

impl OrthographicCamera {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            left,
            right,
            top,
            bottom,
            near,
            far,
            zoom: 1.0,
            projection: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }

    /// Centres the frustum on the origin with the given extent.
    pub fn set_width(&mut self, width: f32) {
        self.left = -width / 2.0;
        self.right = width / 2.0;
    }

    pub fn set_height(&mut self, height: f32) {
        self.top = height / 2.0;
        self.bottom = -height / 2.0;
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = projection::orthographic(
            self.left,
            self.right,
            self.top,
            self.bottom,
            self.near,
            self.far,
            self.zoom,
        );
    }
}

/// Either projection; shadow cameras use this.
#[derive(Clone, Debug, PartialEq)]
pub enum Camera {
    Perspective(PerspectiveCamera),
    Orthographic(OrthographicCamera),
}

impl Camera {
    /// Writes a named numeric property. Returns false for names the projection
    /// does not have. Does not recompute the projection.
    pub fn set_property(&mut self, name: &str, value: f32) -> bool {
        match self {
            Camera::Perspective(cam) => match name {
                "fov" => cam.fov = value,
                "aspect" => cam.aspect = value,
                "near" => cam.near = value,
                "far" => cam.far = value,
                "zoom" => cam.zoom = value,
                _ => return false,
            },
            Camera::Orthographic(cam) => match name {
                "left" => cam.left = value,
                "right" => cam.right = value,
                "top" => cam.top = value,
                "bottom" => cam.bottom = value,
                "near" => cam.near = value,
                "far" => cam.far = value,
                "zoom" => cam.zoom = value,
                "width" => cam.set_width(value),
                "height" => cam.set_height(value),
                _ => return false,
            },
        }
        true
    }

    pub fn property(&self, name: &str) -> Option<f32> {
        match self {
            Camera::Perspective(cam) => match name {
                "fov" => Some(cam.fov),
                "aspect" => Some(cam.aspect),
                "near" => Some(cam.near),
                "far" => Some(cam.far),
                "zoom" => Some(cam.zoom),
                _ => None,
            },
            Camera::Orthographic(cam) => match name {
                "left" => Some(cam.left),
                "right" => Some(cam.right),
                "top" => Some(cam.top),
                "bottom" => Some(cam.bottom),
                "near" => Some(cam.near),
                "far" => Some(cam.far),
                "zoom" => Some(cam.zoom),
                "width" => Some(cam.right - cam.left),
                "height" => Some(cam.top - cam.bottom),
                _ => None,
            },
        }
    }

    pub fn update_projection_matrix(&mut self) {
        match self {
            Camera::Perspective(cam) => cam.update_projection_matrix(),
            Camera::Orthographic(cam) => cam.update_projection_matrix(),
        }
    }

    pub fn projection(&self) -> Mat4 {
        match self {
            Camera::Perspective(cam) => cam.projection,
            Camera::Orthographic(cam) => cam.projection,
        }
    }
}
