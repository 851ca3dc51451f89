//! LUT presets.
//!
//! A preset describes how a LUT is sampled and encoded: its dimensionality,
//! input and output ranges, bit depth or cube size, and the file extension
//! that selects a codec.
//!
//! Presets exist in two shapes:
//!
//! - [`RawPreset`] - a string-keyed mapping of loosely typed values, as read
//!   from a preset file or built by a caller. Codec defaults are raw presets.
//! - [`Preset`] - the validated, typed record the sampler and codecs consume.
//!   It is produced by [`validate`], [`check_preset`] or [`complete_preset`].
//!
//! # Example
//!
//! ```rust
//! use lutlab_export::preset::{self, RawPreset, LutType};
//!
//! let raw = RawPreset::new()
//!     .with(preset::TYPE, "1D")
//!     .with(preset::OUT_BITDEPTH, 10);
//!
//! let preset = preset::complete_preset(&raw).unwrap();
//! assert_eq!(preset.lut_type(), LutType::OneD);
//! assert_eq!(preset.curve_size(), Some(1024));
//! ```

mod file;
mod validate;

pub use file::{PRESETS_ENV, presets_from_dirs, presets_from_env, read_preset, write_preset};
pub use validate::{ValidationMode, check_preset, complete_preset, validate};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// LUT type attribute.
pub const TYPE: &str = "type";
/// Input range attribute.
pub const IN_RANGE: &str = "in_range";
/// Output range attribute.
pub const OUT_RANGE: &str = "out_range";
/// Output bit depth attribute (1D/2D).
pub const OUT_BITDEPTH: &str = "out_bitdepth";
/// Cube size attribute (3D).
pub const CUBE_SIZE: &str = "cube_size";
/// File extension attribute.
pub const EXT: &str = "ext";
/// Smoothing sample count attribute (1D/2D).
pub const SMOOTH: &str = "smooth";
/// Float output flag attribute.
pub const IS_FLOAT: &str = "is_float";
/// Title attribute.
pub const TITLE: &str = "title";
/// Comment attribute.
pub const COMMENT: &str = "comment";

/// Attributes every preset must carry.
pub const BASIC_ATTRS: [&str; 4] = [TYPE, EXT, IN_RANGE, OUT_RANGE];

/// Attributes interpreted by the preset model itself. Anything else is
/// kept as a codec extra.
pub(crate) const KNOWN_ATTRS: [&str; 10] = [
    TYPE,
    IN_RANGE,
    OUT_RANGE,
    OUT_BITDEPTH,
    CUBE_SIZE,
    EXT,
    SMOOTH,
    IS_FLOAT,
    TITLE,
    COMMENT,
];

/// Smallest accepted output bit depth.
pub const BITDEPTH_MIN: u32 = 1;
/// Largest accepted output bit depth.
pub const BITDEPTH_MAX: u32 = 24;
/// Smallest accepted cube size.
pub const CUBE_SIZE_MIN: u32 = 2;
/// Largest accepted cube size.
pub const CUBE_SIZE_MAX: u32 = 129;
/// Smallest accepted smoothing sample count.
pub const SMOOTH_MIN: u32 = 2;

/// LUT dimensionality as written in the `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LutType {
    /// Single shared curve.
    #[serde(rename = "1D")]
    OneD,
    /// One curve per channel.
    #[serde(rename = "2D")]
    TwoD,
    /// RGB cube.
    #[serde(rename = "3D")]
    ThreeD,
    /// Complete for every sampling mode at once.
    #[serde(rename = "default")]
    Default,
}

impl LutType {
    /// Parses the attribute spelling (`1D`, `2D`, `3D`, `default`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1D" => Some(LutType::OneD),
            "2D" => Some(LutType::TwoD),
            "3D" => Some(LutType::ThreeD),
            "default" => Some(LutType::Default),
            _ => None,
        }
    }

    /// Attribute spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            LutType::OneD => "1D",
            LutType::TwoD => "2D",
            LutType::ThreeD => "3D",
            LutType::Default => "default",
        }
    }
}

impl fmt::Display for LutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A range bound. Integer and float bounds are kept apart because integer
/// ranges switch the sampler to code-value arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Integer code value.
    Int(i64),
    /// Normalized float value.
    Float(f64),
}

impl Number {
    /// Value as `f64`.
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    /// True for integer bounds.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Number::Int(_))
    }

    fn from_json(value: &Value) -> Option<Self> {
        if let Some(v) = value.as_i64() {
            return Some(Number::Int(v));
        }
        if value.is_u64() {
            // Beyond i64: not a usable code value.
            return None;
        }
        value.as_f64().map(Number::Float)
    }

    fn to_json(self) -> Value {
        match self {
            Number::Int(v) => Value::from(v),
            Number::Float(v) => Value::from(v),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            // Debug keeps the trailing ".0" of integral floats.
            Number::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// An ordered `[low, high]` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Lower bound.
    pub low: Number,
    /// Upper bound.
    pub high: Number,
}

impl Range {
    /// Creates a range without checking the order of its bounds.
    pub const fn new(low: Number, high: Number) -> Self {
        Self { low, high }
    }

    /// Integer range `[low, high]`.
    pub const fn int(low: i64, high: i64) -> Self {
        Self::new(Number::Int(low), Number::Int(high))
    }

    /// Float range `[low, high]`.
    pub const fn float(low: f64, high: f64) -> Self {
        Self::new(Number::Float(low), Number::Float(high))
    }

    /// True when both bounds are integers.
    #[inline]
    pub fn is_int(&self) -> bool {
        self.low.is_int() && self.high.is_int()
    }

    /// Lower bound as `f64`.
    #[inline]
    pub fn low(&self) -> f64 {
        self.low.as_f64()
    }

    /// Upper bound as `f64`.
    #[inline]
    pub fn high(&self) -> f64 {
        self.high.as_f64()
    }

    /// `count` equally spaced values from `low` to `high`, both included.
    pub fn linspace(&self, count: usize) -> Vec<f64> {
        let (low, high) = (self.low(), self.high());
        match count {
            0 => Vec::new(),
            1 => vec![low],
            _ => {
                let step = (high - low) / (count - 1) as f64;
                let mut values: Vec<f64> = (0..count).map(|i| low + step * i as f64).collect();
                values[count - 1] = high;
                values
            }
        }
    }

    pub(crate) fn from_json(value: &Value) -> Option<Self> {
        let items = value.as_array()?;
        if items.len() != 2 {
            return None;
        }
        let low = Number::from_json(&items[0])?;
        let high = Number::from_json(&items[1])?;
        (low.as_f64() <= high.as_f64()).then_some(Range { low, high })
    }

    pub(crate) fn to_json(self) -> Value {
        Value::Array(vec![self.low.to_json(), self.high.to_json()])
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// Validated dimensionality with the sizes it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LutKind {
    /// Shared curve of `2^bitdepth` samples.
    OneD {
        /// Output bit depth.
        bitdepth: u32,
    },
    /// Per-channel curves of `2^bitdepth` samples.
    TwoD {
        /// Output bit depth.
        bitdepth: u32,
    },
    /// Cube of `cube_size^3` samples.
    ThreeD {
        /// Lattice side length.
        cube_size: u32,
    },
    /// Usable for curves and cubes.
    Default {
        /// Output bit depth.
        bitdepth: u32,
        /// Lattice side length.
        cube_size: u32,
    },
}

impl LutKind {
    /// The `type` attribute this kind was validated from.
    pub fn lut_type(&self) -> LutType {
        match self {
            LutKind::OneD { .. } => LutType::OneD,
            LutKind::TwoD { .. } => LutType::TwoD,
            LutKind::ThreeD { .. } => LutType::ThreeD,
            LutKind::Default { .. } => LutType::Default,
        }
    }

    /// Output bit depth, for kinds that sample curves.
    pub fn bitdepth(&self) -> Option<u32> {
        match *self {
            LutKind::OneD { bitdepth }
            | LutKind::TwoD { bitdepth }
            | LutKind::Default { bitdepth, .. } => Some(bitdepth),
            LutKind::ThreeD { .. } => None,
        }
    }

    /// Cube size, for kinds that sample cubes.
    pub fn cube_size(&self) -> Option<u32> {
        match *self {
            LutKind::ThreeD { cube_size } | LutKind::Default { cube_size, .. } => Some(cube_size),
            LutKind::OneD { .. } | LutKind::TwoD { .. } => None,
        }
    }
}

/// An unvalidated preset: attribute name to JSON-like value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPreset(BTreeMap<String, Value>);

impl RawPreset {
    /// Creates an empty preset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RawPreset::set`].
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Gets an attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Removes an attribute.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// True if the attribute is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no attribute is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Attribute names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `base` with every attribute of `self` written over it.
    pub fn over(&self, base: &RawPreset) -> RawPreset {
        let mut merged = base.clone();
        for (key, value) in &self.0 {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Sets a range attribute.
    pub fn with_range(self, key: &str, range: Range) -> Self {
        self.with(key, range.to_json())
    }
}

impl FromIterator<(String, Value)> for RawPreset {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, Value>> for RawPreset {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

/// A validated preset.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    /// Dimensionality and sizes.
    pub kind: LutKind,
    /// Domain sampled by the transform.
    pub in_range: Range,
    /// Range the transform output is rescaled to.
    pub out_range: Range,
    /// Output file extension.
    pub ext: String,
    /// Subsample count for smoothed curves.
    pub smooth: Option<u32>,
    /// Forces float serialization.
    pub is_float: bool,
    /// LUT title.
    pub title: Option<String>,
    /// LUT comment.
    pub comment: Option<String>,
    /// Codec-specific attributes.
    pub extras: BTreeMap<String, Value>,
}

impl Preset {
    /// The `type` attribute.
    #[inline]
    pub fn lut_type(&self) -> LutType {
        self.kind.lut_type()
    }

    /// True when input values are integer code values.
    #[inline]
    pub fn is_input_int(&self) -> bool {
        self.in_range.is_int()
    }

    /// True when output values are written as integers.
    #[inline]
    pub fn is_output_int(&self) -> bool {
        self.out_range.is_int() && !self.is_float
    }

    /// Number of curve samples (`2^bitdepth`), for curve kinds.
    pub fn curve_size(&self) -> Option<usize> {
        self.kind.bitdepth().map(|bits| 1usize << bits)
    }

    /// Cube size, for cube kinds.
    pub fn cube_size(&self) -> Option<usize> {
        self.kind.cube_size().map(|size| size as usize)
    }

    /// Boolean codec extra.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.extras.get(key).and_then(Value::as_bool)
    }

    /// Title, or `fallback` when unset.
    pub fn title_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(fallback)
    }

    /// Converts back to a raw preset.
    pub fn to_raw(&self) -> RawPreset {
        let mut raw = RawPreset::new();
        raw.set(TYPE, self.lut_type().as_str());
        if let Some(bits) = self.kind.bitdepth() {
            raw.set(OUT_BITDEPTH, bits);
        }
        if let Some(size) = self.kind.cube_size() {
            raw.set(CUBE_SIZE, size);
        }
        raw.set(IN_RANGE, self.in_range.to_json());
        raw.set(OUT_RANGE, self.out_range.to_json());
        raw.set(EXT, self.ext.as_str());
        raw.set(IS_FLOAT, self.is_float);
        if let Some(smooth) = self.smooth {
            raw.set(SMOOTH, smooth);
        }
        if let Some(title) = &self.title {
            raw.set(TITLE, title.as_str());
        }
        if let Some(comment) = &self.comment {
            raw.set(COMMENT, comment.as_str());
        }
        for (key, value) in &self.extras {
            raw.set(key, value.clone());
        }
        raw
    }
}

impl TryFrom<&RawPreset> for Preset {
    type Error = crate::PresetError;

    fn try_from(raw: &RawPreset) -> Result<Self, Self::Error> {
        check_preset(raw)
    }
}

/// The library default preset: normalized float ranges, 12-bit curves and
/// 17-point cubes, valid for every sampling mode.
pub fn default_preset() -> RawPreset {
    RawPreset::new()
        .with(TYPE, LutType::Default.as_str())
        .with(EXT, ".cube")
        .with_range(IN_RANGE, Range::float(0.0, 1.0))
        .with_range(OUT_RANGE, Range::float(0.0, 1.0))
        .with(OUT_BITDEPTH, 12)
        .with(CUBE_SIZE, 17)
        .with(TITLE, "LUT")
        .with(COMMENT, "Generated by lutlab")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_keeps_int_float_distinction() {
        let range = Range::from_json(&json!([0, 1023])).unwrap();
        assert!(range.is_int());
        let range = Range::from_json(&json!([0.0, 1.0])).unwrap();
        assert!(!range.is_int());
        // Mixed pairs are legal and treated as float.
        let range = Range::from_json(&json!([0.1, 1])).unwrap();
        assert!(!range.is_int());
    }

    #[test]
    fn range_rejects_malformed_values() {
        let illegal = [
            json!("test"),
            json!(["a", "a"]),
            json!([0.0, 0.5, 1.0]),
            json!(0.1),
            json!([1.0, 0.0]),
        ];
        for value in illegal {
            assert!(Range::from_json(&value).is_none(), "{value} should be rejected");
        }
    }

    #[test]
    fn range_display_matches_attribute_spelling() {
        assert_eq!(Range::int(0, 1023).to_string(), "[0, 1023]");
        assert_eq!(Range::float(0.0, 1.0).to_string(), "[0.0, 1.0]");
        assert_eq!(Range::float(-0.125, 1.5).to_string(), "[-0.125, 1.5]");
    }

    #[test]
    fn linspace_includes_endpoints() {
        let values = Range::float(0.0, 1.0).linspace(16);
        assert_eq!(values.len(), 16);
        assert_eq!(values[0], 0.0);
        assert_eq!(values[15], 1.0);
        assert!((values[1] - 1.0 / 15.0).abs() < 1e-12);

        assert_eq!(Range::int(0, 1023).linspace(2), vec![0.0, 1023.0]);
        assert_eq!(Range::float(0.5, 1.0).linspace(1), vec![0.5]);
    }

    #[test]
    fn lut_type_spelling() {
        for t in [LutType::OneD, LutType::TwoD, LutType::ThreeD, LutType::Default] {
            assert_eq!(LutType::parse(t.as_str()), Some(t));
        }
        assert_eq!(LutType::parse("4D"), None);
    }

    #[test]
    fn raw_preset_over_base() {
        let base = default_preset();
        let custom = RawPreset::new().with(TYPE, "1D").with(OUT_BITDEPTH, 10);
        let merged = custom.over(&base);
        assert_eq!(merged.get(TYPE), Some(&json!("1D")));
        assert_eq!(merged.get(OUT_BITDEPTH), Some(&json!(10)));
        assert_eq!(merged.get(CUBE_SIZE), Some(&json!(17)));
    }
}
