use std::f32::consts::PI;

use ahash::AHashMap;
use goml_variant::Variant;
use once_cell::sync::Lazy;

use crate::camera::{Camera, OrthographicCamera, PerspectiveCamera};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightKind {
    Ambient,
    Directional,
    Hemisphere,
    Point,
    Spot,
    RectArea,
}

impl LightKind {
    pub const ALL: [LightKind; 6] = [
        LightKind::Ambient,
        LightKind::Directional,
        LightKind::Hemisphere,
        LightKind::Point,
        LightKind::Spot,
        LightKind::RectArea,
    ];

    pub const fn class_name(self) -> &'static str {
        match self {
            LightKind::Ambient => "AmbientLight",
            LightKind::Directional => "DirectionalLight",
            LightKind::Hemisphere => "HemisphereLight",
            LightKind::Point => "PointLight",
            LightKind::Spot => "SpotLight",
            LightKind::RectArea => "RectAreaLight",
        }
    }

    /// Resolves an abbreviation such as `"Dir"` through [`LIGHT_TYPES`].
    pub fn from_code(code: &str) -> Option<LightKind> {
        LIGHT_TYPES.get(code).copied()
    }

    pub const fn casts_shadow(self) -> bool {
        matches!(
            self,
            LightKind::Directional | LightKind::Point | LightKind::Spot
        )
    }
}

/// Three-letter code -> light class, keyed by the first three characters of
/// every class name ending in `Light`.
pub static LIGHT_TYPES: Lazy<AHashMap<&'static str, LightKind>> = Lazy::new(|| {
    LightKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let name = kind.class_name();
            match name.strip_suffix("Light") {
                Some(prefix) if !prefix.is_empty() => name.get(..3).map(|code| (code, kind)),
                _ => None,
            }
        })
        .collect()
});

#[derive(Clone, Debug, PartialEq)]
pub struct LightShadow {
    pub map_width: u32,
    pub map_height: u32,
    pub bias: f32,
    pub camera: Camera,
}

impl LightShadow {
    fn for_kind(kind: LightKind) -> Option<Self> {
        let camera = match kind {
            LightKind::Directional => Camera::Orthographic(OrthographicCamera::new(
                -5.0, 5.0, 5.0, -5.0, 0.5, 500.0,
            )),
            LightKind::Point => Camera::Perspective(PerspectiveCamera::new(90.0, 1.0, 0.5, 500.0)),
            LightKind::Spot => Camera::Perspective(PerspectiveCamera::new(50.0, 1.0, 0.5, 500.0)),
            _ => return None,
        };
        Some(Self {
            map_width: 512,
            map_height: 512,
            bias: 0.0,
            camera,
        })
    }

    /// `mapSize` sets both dimensions.
    pub fn set_map_size(&mut self, size: u32) {
        self.map_width = size;
        self.map_height = size;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: u32,
    pub intensity: f32,

    /// Hemisphere only.
    pub ground_color: u32,
    /// Point and spot: 0 means no cutoff.
    pub distance: f32,
    pub decay: f32,
    /// Spot cone half-angle, radians.
    pub angle: f32,
    pub penumbra: f32,
    /// Rect-area extent.
    pub width: f32,
    pub height: f32,

    pub shadow: Option<LightShadow>,
}

impl Light {
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            color: 0xffffff,
            intensity: 1.0,
            ground_color: 0xffffff,
            distance: 0.0,
            decay: 1.0,
            angle: PI / 3.0,
            penumbra: 0.0,
            width: 10.0,
            height: 10.0,
            shadow: LightShadow::for_kind(kind),
        }
    }

    /// Builds a light from positional constructor arguments, in the order each
    /// class takes them. Missing or mistyped arguments keep their defaults.
    pub fn from_params(kind: LightKind, params: &[Variant]) -> Self {
        let mut light = Self::new(kind);
        let color = |i: usize| params.get(i).and_then(parse_color);
        let num = |i: usize| params.get(i).and_then(Variant::as_f32);

        if kind == LightKind::Hemisphere {
            if let Some(c) = color(0) {
                light.color = c;
            }
            if let Some(c) = color(1) {
                light.ground_color = c;
            }
            if let Some(v) = num(2) {
                light.intensity = v;
            }
            return light;
        }

        if let Some(c) = color(0) {
            light.color = c;
        }
        if let Some(v) = num(1) {
            light.intensity = v;
        }
        match kind {
            LightKind::Point => {
                if let Some(v) = num(2) {
                    light.distance = v;
                }
                if let Some(v) = num(3) {
                    light.decay = v;
                }
            }
            LightKind::Spot => {
                if let Some(v) = num(2) {
                    light.distance = v;
                }
                if let Some(v) = num(3) {
                    light.angle = v;
                }
                if let Some(v) = num(4) {
                    light.penumbra = v;
                }
                if let Some(v) = num(5) {
                    light.decay = v;
                }
            }
            LightKind::RectArea => {
                if let Some(v) = num(2) {
                    light.width = v;
                }
                if let Some(v) = num(3) {
                    light.height = v;
                }
            }
            _ => {}
        }
        light
    }
}

/// Accepts `0xrrggbb` numbers and `"#rrggbb"` / `"0xrrggbb"` strings.
pub fn parse_color(value: &Variant) -> Option<u32> {
    // Strings are always hex, even when they would read as decimal.
    if let Some(n) = value.as_number().and_then(|n| n.as_i64_lossy()) {
        return u32::try_from(n).ok().filter(|c| *c <= 0xffffff);
    }
    let s = value.as_str()?;
    let hex = s
        .strip_prefix('#')
        .or_else(|| s.strip_prefix("0x"))
        .unwrap_or(s);
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
