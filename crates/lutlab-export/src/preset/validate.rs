//! Preset validation.
//!
//! [`validate`] walks the attributes in a fixed order: basic attributes,
//! type, type-specific sizes, ranges, then optional attributes. In
//! [`ValidationMode::Raise`] the first violation is returned as an error.
//! In [`ValidationMode::Fill`] every violation is repaired from the supplied
//! default preset (or the library default when that one has a hole too).

use serde_json::Value;
use std::collections::BTreeMap;

use super::{
    BASIC_ATTRS, BITDEPTH_MAX, BITDEPTH_MIN, COMMENT, CUBE_SIZE, CUBE_SIZE_MAX, CUBE_SIZE_MIN, EXT,
    IN_RANGE, IS_FLOAT, KNOWN_ATTRS, LutKind, LutType, OUT_BITDEPTH, OUT_RANGE, Preset, Range,
    RawPreset, SMOOTH, SMOOTH_MIN, TITLE, TYPE, default_preset,
};
use crate::{PresetError, PresetResult};

/// What to do with a missing or illegal attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Return an error.
    #[default]
    Raise,
    /// Substitute the default value (or drop optional attributes).
    Fill,
}

/// Validates `raw` against the library default preset, raising on the first
/// violation.
pub fn check_preset(raw: &RawPreset) -> PresetResult<Preset> {
    validate(raw, ValidationMode::Raise, &default_preset())
}

/// Completes `raw` from the library default preset.
pub fn complete_preset(raw: &RawPreset) -> PresetResult<Preset> {
    validate(raw, ValidationMode::Fill, &default_preset())
}

/// Validates `raw`, raising or repairing according to `mode`.
///
/// `raw` is never modified; the returned [`Preset`] is a new value.
///
/// # Errors
///
/// In `Raise` mode, the first [`PresetError`] met. In `Fill` mode, only if
/// neither `default` nor the library default can supply a legal value.
pub fn validate(
    raw: &RawPreset,
    mode: ValidationMode,
    default: &RawPreset,
) -> PresetResult<Preset> {
    let fallback = default_preset();
    let v = Validator {
        raw,
        mode,
        default,
        fallback: &fallback,
    };

    if mode == ValidationMode::Raise {
        if let Some(attr) = BASIC_ATTRS.iter().find(|attr| !raw.contains(attr)) {
            return Err(PresetError::MissingAttribute {
                attr: attr.to_string(),
            });
        }
    }

    let lut_type = v.required(TYPE, parse_type, |value| PresetError::InvalidType { value })?;
    let kind = match lut_type {
        LutType::OneD => LutKind::OneD {
            bitdepth: v.bitdepth()?,
        },
        LutType::TwoD => LutKind::TwoD {
            bitdepth: v.bitdepth()?,
        },
        LutType::ThreeD => LutKind::ThreeD {
            cube_size: v.cube_size()?,
        },
        LutType::Default => LutKind::Default {
            bitdepth: v.bitdepth()?,
            cube_size: v.cube_size()?,
        },
    };

    let in_range = v.range(IN_RANGE)?;
    let out_range = v.range(OUT_RANGE)?;
    let ext = v.required(EXT, parse_text, |value| PresetError::InvalidText {
        attr: EXT.to_string(),
        value,
    })?;

    let smooth = v.optional(SMOOTH, parse_smooth, |value| PresetError::InvalidSmooth { value })?;
    let smooth = match (smooth, kind) {
        (Some(_), LutKind::ThreeD { .. }) if mode == ValidationMode::Raise => {
            return Err(PresetError::SmoothOnCube);
        }
        (Some(_), LutKind::ThreeD { .. }) => None,
        (smooth, _) => smooth,
    };

    let is_float = v
        .optional(IS_FLOAT, Value::as_bool, |value| PresetError::InvalidFlag {
            attr: IS_FLOAT.to_string(),
            value,
        })?
        .unwrap_or(false);
    let title = v.optional(TITLE, parse_text, |value| PresetError::InvalidText {
        attr: TITLE.to_string(),
        value,
    })?;
    let comment = v.optional(COMMENT, parse_text, |value| PresetError::InvalidText {
        attr: COMMENT.to_string(),
        value,
    })?;

    let extras: BTreeMap<String, Value> = raw
        .iter()
        .filter(|(key, _)| !KNOWN_ATTRS.contains(key))
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect();

    Ok(Preset {
        kind,
        in_range,
        out_range,
        ext,
        smooth,
        is_float,
        title,
        comment,
        extras,
    })
}

struct Validator<'a> {
    raw: &'a RawPreset,
    mode: ValidationMode,
    default: &'a RawPreset,
    fallback: &'a RawPreset,
}

impl Validator<'_> {
    /// Resolves a required attribute.
    fn required<T>(
        &self,
        key: &str,
        parse: impl Fn(&Value) -> Option<T>,
        invalid: impl FnOnce(String) -> PresetError,
    ) -> PresetResult<T> {
        match self.raw.get(key) {
            Some(value) => match parse(value) {
                Some(parsed) => Ok(parsed),
                None if self.mode == ValidationMode::Raise => Err(invalid(value.to_string())),
                None => self.from_defaults(key, &parse, invalid(value.to_string())),
            },
            None if self.mode == ValidationMode::Raise => Err(PresetError::MissingAttribute {
                attr: key.to_string(),
            }),
            None => self.from_defaults(
                key,
                &parse,
                PresetError::MissingAttribute {
                    attr: key.to_string(),
                },
            ),
        }
    }

    /// Resolves an optional attribute; illegal values are dropped in fill mode.
    fn optional<T>(
        &self,
        key: &str,
        parse: impl Fn(&Value) -> Option<T>,
        invalid: impl FnOnce(String) -> PresetError,
    ) -> PresetResult<Option<T>> {
        match self.raw.get(key) {
            None => Ok(None),
            Some(value) => match parse(value) {
                Some(parsed) => Ok(Some(parsed)),
                None if self.mode == ValidationMode::Raise => Err(invalid(value.to_string())),
                None => Ok(None),
            },
        }
    }

    fn from_defaults<T>(
        &self,
        key: &str,
        parse: &impl Fn(&Value) -> Option<T>,
        error: PresetError,
    ) -> PresetResult<T> {
        [self.default, self.fallback]
            .iter()
            .find_map(|preset| preset.get(key).and_then(parse))
            .ok_or(error)
    }

    fn bitdepth(&self) -> PresetResult<u32> {
        self.required(
            OUT_BITDEPTH,
            |value| parse_bounded(value, BITDEPTH_MIN, BITDEPTH_MAX),
            |value| PresetError::InvalidBitDepth {
                value,
                min: BITDEPTH_MIN,
                max: BITDEPTH_MAX,
            },
        )
    }

    fn cube_size(&self) -> PresetResult<u32> {
        self.required(
            CUBE_SIZE,
            |value| parse_bounded(value, CUBE_SIZE_MIN, CUBE_SIZE_MAX),
            |value| PresetError::InvalidCubeSize {
                value,
                min: CUBE_SIZE_MIN,
                max: CUBE_SIZE_MAX,
            },
        )
    }

    fn range(&self, key: &str) -> PresetResult<Range> {
        self.required(key, Range::from_json, |value| PresetError::InvalidRange {
            attr: key.to_string(),
            value,
        })
    }
}

fn parse_type(value: &Value) -> Option<LutType> {
    value.as_str().and_then(LutType::parse)
}

fn parse_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn parse_bounded(value: &Value, min: u32, max: u32) -> Option<u32> {
    let v = value.as_u64()?;
    (min as u64..=max as u64).contains(&v).then_some(v as u32)
}

fn parse_smooth(value: &Value) -> Option<u32> {
    let v = value.as_u64()?;
    (v >= SMOOTH_MIN as u64).then(|| v.min(u32::MAX as u64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::Number;
    use serde_json::json;

    fn basic() -> RawPreset {
        let default = default_preset();
        BASIC_ATTRS.iter().fold(RawPreset::new(), |raw, attr| {
            raw.with(attr, default.get(attr).cloned().unwrap())
        })
    }

    #[test]
    fn default_preset_is_valid() {
        let preset = check_preset(&default_preset()).unwrap();
        assert_eq!(
            preset.kind,
            LutKind::Default {
                bitdepth: 12,
                cube_size: 17
            }
        );
        assert_eq!(preset.in_range, Range::float(0.0, 1.0));
        assert!(!preset.is_output_int());
    }

    #[test]
    fn missing_basic_attributes_raise() {
        let default = default_preset();
        let mut raw = RawPreset::new();
        assert!(matches!(
            check_preset(&raw),
            Err(PresetError::MissingAttribute { .. })
        ));
        for attr in BASIC_ATTRS {
            raw.set(attr, default.get(attr).cloned().unwrap());
            // A "default" type still needs both sizes.
            assert!(check_preset(&raw).is_err(), "{attr}");
        }
    }

    #[test]
    fn type_specific_sizes() {
        let mut raw = basic();
        raw.set(TYPE, "1D");
        assert!(matches!(
            check_preset(&raw),
            Err(PresetError::MissingAttribute { attr }) if attr == OUT_BITDEPTH
        ));
        raw.set(OUT_BITDEPTH, 12);
        assert_eq!(check_preset(&raw).unwrap().kind, LutKind::OneD { bitdepth: 12 });

        raw.set(TYPE, "3D");
        assert!(check_preset(&raw).is_err());
        raw.set(CUBE_SIZE, 17);
        assert_eq!(check_preset(&raw).unwrap().kind, LutKind::ThreeD { cube_size: 17 });

        raw.set(CUBE_SIZE, CUBE_SIZE_MAX + 1);
        assert!(matches!(
            check_preset(&raw),
            Err(PresetError::InvalidCubeSize { .. })
        ));
        raw.set(CUBE_SIZE, 17.0);
        assert!(check_preset(&raw).is_err());
    }

    #[test]
    fn invalid_type_raises() {
        let raw = basic().with(TYPE, "4D");
        let err = check_preset(&raw).unwrap_err();
        assert_eq!(err.to_string(), "invalid type: \"4D\" (expected 1D, 2D, 3D or default)");
    }

    #[test]
    fn ranges_must_be_ordered_pairs() {
        let mut raw = basic().with(TYPE, "3D").with(CUBE_SIZE, 17);
        for bad in [json!("test"), json!(["a", "a"]), json!([0.0, 0.5, 1.0]), json!(0.1)] {
            raw.set(IN_RANGE, bad.clone());
            assert!(
                matches!(check_preset(&raw), Err(PresetError::InvalidRange { .. })),
                "{bad}"
            );
        }
        raw.set(IN_RANGE, json!([0.1, 1]));
        let preset = check_preset(&raw).unwrap();
        assert_eq!(preset.in_range, Range::new(Number::Float(0.1), Number::Int(1)));
    }

    #[test]
    fn smooth_rules() {
        let raw = basic().with(TYPE, "3D").with(CUBE_SIZE, 17).with(SMOOTH, 64);
        assert!(matches!(check_preset(&raw), Err(PresetError::SmoothOnCube)));
        assert_eq!(complete_preset(&raw).unwrap().smooth, None);

        let raw = basic().with(TYPE, "1D").with(OUT_BITDEPTH, 10).with(SMOOTH, 1.5);
        assert!(matches!(check_preset(&raw), Err(PresetError::InvalidSmooth { .. })));
        assert_eq!(complete_preset(&raw).unwrap().smooth, None);

        let raw = basic().with(TYPE, "1D").with(OUT_BITDEPTH, 10).with(SMOOTH, 64);
        assert_eq!(check_preset(&raw).unwrap().smooth, Some(64));
    }

    #[test]
    fn fill_repairs_everything() {
        let raw = RawPreset::new()
            .with(TYPE, "1D")
            .with(OUT_BITDEPTH, 99)
            .with(IN_RANGE, "oops")
            .with(IS_FLOAT, "yes");
        let preset = complete_preset(&raw).unwrap();
        assert_eq!(preset.kind, LutKind::OneD { bitdepth: 12 });
        assert_eq!(preset.in_range, Range::float(0.0, 1.0));
        assert!(!preset.is_float);
        assert_eq!(preset.ext, ".cube");
        // The input is left untouched.
        assert_eq!(raw.get(OUT_BITDEPTH), Some(&json!(99)));
    }

    #[test]
    fn fill_prefers_supplied_default() {
        let default = RawPreset::new()
            .with(TYPE, "3D")
            .with(EXT, ".3dl")
            .with_range(IN_RANGE, Range::int(0, 1023))
            .with(CUBE_SIZE, 33);
        let preset = validate(&RawPreset::new(), ValidationMode::Fill, &default).unwrap();
        assert_eq!(preset.kind, LutKind::ThreeD { cube_size: 33 });
        assert_eq!(preset.ext, ".3dl");
        assert_eq!(preset.in_range, Range::int(0, 1023));
        // Not in the supplied default: library default.
        assert_eq!(preset.out_range, Range::float(0.0, 1.0));
    }

    #[test]
    fn completed_presets_pass_check() {
        let inputs = [
            RawPreset::new(),
            RawPreset::new().with(TYPE, "2D").with(SMOOTH, 16),
            RawPreset::new().with(TYPE, "3D").with(SMOOTH, 16).with("shaper", true),
            RawPreset::new().with(TYPE, 3).with(IN_RANGE, json!([1, 0])),
        ];
        for raw in inputs {
            let completed = complete_preset(&raw).unwrap();
            let checked = check_preset(&completed.to_raw()).unwrap();
            assert_eq!(checked, completed);
        }
    }

    #[test]
    fn extras_are_kept() {
        let raw = default_preset().with("shaper", true);
        let preset = check_preset(&raw).unwrap();
        assert_eq!(preset.flag("shaper"), Some(true));
        assert_eq!(preset.to_raw().get("shaper"), Some(&json!(true)));
    }
}
