// goml_variant/src/variant.rs

#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use goml_structs::Vector3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    I64(i64),
    F64(f64),
}

impl Number {
    #[inline]
    pub const fn is_int(&self) -> bool {
        matches!(self, Number::I64(_))
    }

    #[inline]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::F64(_))
    }

    /// Floats truncate toward zero; NaN and out-of-range floats give None.
    #[inline]
    pub fn as_i64_lossy(&self) -> Option<i64> {
        match *self {
            Number::I64(v) => Some(v),
            Number::F64(v) if v.is_finite() && v.abs() < i64::MAX as f64 => Some(v.trunc() as i64),
            Number::F64(_) => None,
        }
    }

    #[inline]
    pub fn as_f64_lossy(&self) -> f64 {
        match *self {
            Number::I64(v) => v as f64,
            Number::F64(v) => v,
        }
    }

    #[inline]
    pub fn is_zero_or_nan(&self) -> bool {
        match *self {
            Number::I64(v) => v == 0,
            Number::F64(v) => v == 0.0 || v.is_nan(),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(v) => write!(f, "{v}"),
            Number::F64(v) => write!(f, "{v}"),
        }
    }
}

/// Dynamic attribute value as written in markup or set by the host.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Variant {
    #[default]
    Null,

    Bool(bool),
    Number(Number),
    String(Arc<str>),

    Array(Vec<Variant>),

    // Deterministic ordering (better diffs, stable serialization).
    Object(BTreeMap<Arc<str>, Variant>),
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Null => write!(f, "null"),
            Variant::Bool(v) => write!(f, "{v}"),
            Variant::Number(v) => write!(f, "{v}"),
            Variant::String(v) => write!(f, "{:?}", v.as_ref()),
            Variant::Array(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Variant::Object(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key.as_ref(), value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// -------------------- Constructors --------------------

impl Variant {
    #[inline]
    pub const fn null() -> Self {
        Variant::Null
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Variant::Null)
    }

    #[inline]
    pub fn string<S: AsRef<str>>(s: S) -> Self {
        Variant::String(Arc::<str>::from(s.as_ref()))
    }

    #[inline]
    pub fn object() -> Self {
        Variant::Object(BTreeMap::new())
    }

    #[inline]
    pub fn array() -> Self {
        Variant::Array(Vec::new())
    }

    /// Builds an object from `(key, value)` pairs.
    pub fn object_from<K, V, I>(entries: I) -> Self
    where
        K: AsRef<str>,
        V: Into<Variant>,
        I: IntoIterator<Item = (K, V)>,
    {
        Variant::Object(
            entries
                .into_iter()
                .map(|(k, v)| (Arc::<str>::from(k.as_ref()), v.into()))
                .collect(),
        )
    }
}

// -------------------- Accessors --------------------

impl Variant {
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Variant::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Loose truthiness: null, false, 0, NaN and "" are false; containers are true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Variant::Null => false,
            Variant::Bool(v) => *v,
            Variant::Number(n) => !n.is_zero_or_nan(),
            Variant::String(s) => !s.is_empty(),
            Variant::Array(_) | Variant::Object(_) => true,
        }
    }

    /// True only for the literal boolean `false`.
    #[inline]
    pub fn is_false(&self) -> bool {
        matches!(self, Variant::Bool(false))
    }

    #[inline]
    pub fn as_number(&self) -> Option<Number> {
        match *self {
            Variant::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Numbers, or strings holding a decimal number (`"400"`, `" 2.5 "`).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Variant::Number(n) => Some(n.as_f64_lossy()),
            Variant::String(s) => parse_numeric(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|v| v as f32)
    }

    /// Same inputs as [`Variant::as_f64`]; floats truncate.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Variant::Number(n) => n.as_i64_lossy(),
            Variant::String(s) => parse_numeric(s).and_then(|v| Number::F64(v).as_i64_lossy()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&[Variant]> {
        match self {
            Variant::Array(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array_mut(&mut self) -> Option<&mut Vec<Variant>> {
        match self {
            Variant::Array(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&BTreeMap<Arc<str>, Variant>> {
        match self {
            Variant::Object(m) => Some(m),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object_mut(&mut self) -> Option<&mut BTreeMap<Arc<str>, Variant>> {
        match self {
            Variant::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Object member lookup; `None` for non-objects and missing keys.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Variant> {
        self.as_object().and_then(|m| m.get(key))
    }

    /// Three numbers as an array, or one number splatted. A string holding a
    /// list is not parsed.
    pub fn as_vec3(&self) -> Option<Vector3> {
        match self {
            Variant::Array(items) if items.len() == 3 => Some(Vector3::new(
                items[0].as_f32()?,
                items[1].as_f32()?,
                items[2].as_f32()?,
            )),
            Variant::Number(_) | Variant::String(_) => self.as_f32().map(Vector3::splat),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Null => "null",
            Variant::Bool(_) => "bool",
            Variant::Number(_) => "number",
            Variant::String(_) => "string",
            Variant::Array(_) => "array",
            Variant::Object(_) => "object",
        }
    }
}

// -------------------- From impls --------------------

impl From<bool> for Variant {
    #[inline]
    fn from(v: bool) -> Self {
        Variant::Bool(v)
    }
}
impl From<Number> for Variant {
    #[inline]
    fn from(v: Number) -> Self {
        Variant::Number(v)
    }
}
impl From<i32> for Variant {
    #[inline]
    fn from(v: i32) -> Self {
        Variant::Number(Number::I64(v as i64))
    }
}
impl From<i64> for Variant {
    #[inline]
    fn from(v: i64) -> Self {
        Variant::Number(Number::I64(v))
    }
}
impl From<u32> for Variant {
    #[inline]
    fn from(v: u32) -> Self {
        Variant::Number(Number::I64(v as i64))
    }
}
impl From<f32> for Variant {
    #[inline]
    fn from(v: f32) -> Self {
        Variant::Number(Number::F64(v as f64))
    }
}
impl From<f64> for Variant {
    #[inline]
    fn from(v: f64) -> Self {
        Variant::Number(Number::F64(v))
    }
}
impl From<&str> for Variant {
    #[inline]
    fn from(v: &str) -> Self {
        Variant::String(Arc::<str>::from(v))
    }
}
impl From<String> for Variant {
    #[inline]
    fn from(v: String) -> Self {
        Variant::String(Arc::<str>::from(v))
    }
}
impl From<Arc<str>> for Variant {
    #[inline]
    fn from(v: Arc<str>) -> Self {
        Variant::String(v)
    }
}
impl From<Vector3> for Variant {
    #[inline]
    fn from(v: Vector3) -> Self {
        Variant::Array(vec![v.x.into(), v.y.into(), v.z.into()])
    }
}
impl From<Vec<Variant>> for Variant {
    #[inline]
    fn from(v: Vec<Variant>) -> Self {
        Variant::Array(v)
    }
}
impl From<BTreeMap<Arc<str>, Variant>> for Variant {
    #[inline]
    fn from(v: BTreeMap<Arc<str>, Variant>) -> Self {
        Variant::Object(v)
    }
}

/// Decimal numbers only; `inf`, `nan` and hex stay strings.
fn parse_numeric(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit() || b"+-.eE".contains(&b)) {
        return None;
    }
    s.parse().ok()
}
