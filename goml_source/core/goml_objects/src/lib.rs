pub mod camera;
pub mod drawable;
pub mod error;
pub mod factory;
pub mod graph;
pub mod helper;
pub mod light;
pub mod object_3d;

pub use camera::{Camera, OrthographicCamera, PerspectiveCamera};
pub use drawable::{Drawable, Geometry, Material};
pub use error::{FactoryError, ObjectError};
pub use factory::{DescriptorFactory, ResourceFactory};
pub use graph::ObjectGraph;
pub use helper::{Helper, HelperKind, HelperTarget};
pub use light::{LIGHT_TYPES, Light, LightKind, LightShadow, parse_color};
pub use object_3d::{Object3D, ObjectKind};
