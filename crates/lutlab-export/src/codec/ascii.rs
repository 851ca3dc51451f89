//! Discreet-style ASCII .lut writer (1D/2D only).
//!
//! # Format
//!
//! ```text
//! LUT: <tables> <length> [32f]
//! <table 1 values, one per line>
//! <table 2 values>
//! <table 3 values>
//! ```
//!
//! A shared curve is one table, a per-channel curve three. Values are
//! integer code values unless `is_float` is set, in which case the header
//! carries the `32f` destination depth.
//!
//! Integer output must fill the declared output range exactly:
//! `2^out_bitdepth - 1 == out_high - out_low`.

use std::io::Write;
use std::path::Path;

use super::{CurveLayout, ExportReport, LutCodec, Pattern, export_curve};
use crate::preset::{self, LutType, Preset, Range, RawPreset};
use crate::sampler::{Rgb, Transform};
use crate::{LutError, LutResult};

const NAME: &str = "lut";

/// `.lut` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiCodec;

impl LutCodec for AsciiCodec {
    fn name(&self) -> &'static str {
        NAME
    }

    fn default_preset(&self) -> RawPreset {
        preset::default_preset()
            .with(preset::TYPE, "1D")
            .with(preset::EXT, ".lut")
            .with_range(preset::IN_RANGE, Range::int(0, 1023))
            .with_range(preset::OUT_RANGE, Range::int(0, 1023))
            .with(preset::OUT_BITDEPTH, 10)
            .with(preset::IS_FLOAT, false)
            .with(preset::TITLE, "ASCII LUT")
    }

    fn supports(&self, lut_type: LutType) -> bool {
        matches!(lut_type, LutType::OneD | LutType::TwoD)
    }

    fn extension(&self, _lut_type: LutType) -> &'static str {
        ".lut"
    }

    fn check_write(&self, preset: &Preset) -> LutResult<()> {
        check_writable(preset)
    }

    fn write_1d(&self, f: &Transform<'_>, path: &Path, raw: &RawPreset) -> LutResult<ExportReport> {
        export_curve(self, f, path, raw, CurveLayout::Shared, |w, curve, preset| {
            write_curve_to(w, curve, preset, CurveLayout::Shared)
        })
    }

    fn write_2d(&self, f: &Transform<'_>, path: &Path, raw: &RawPreset) -> LutResult<ExportReport> {
        export_curve(self, f, path, raw, CurveLayout::PerChannel, |w, curve, preset| {
            write_curve_to(w, curve, preset, CurveLayout::PerChannel)
        })
    }
}

/// Writes an ASCII .lut body.
///
/// # Errors
///
/// [`LutError::DimensionMismatch`] for 3D presets, [`LutError::Format`]
/// for float ranges and [`LutError::BitDepthMismatch`] for inconsistent
/// integer output. The last two do not apply when `is_float` is set.
pub fn write_curve_to<W: Write>(
    w: &mut W,
    curve: &[Rgb],
    preset: &Preset,
    layout: CurveLayout,
) -> LutResult<()> {
    check_writable(preset)?;
    let tables = match layout {
        CurveLayout::Shared => 1,
        CurveLayout::PerChannel => 3,
    };
    if preset.is_float {
        writeln!(w, "LUT: {} {} 32f", tables, curve.len())?;
    } else {
        writeln!(w, "LUT: {} {}", tables, curve.len())?;
    }

    let pattern = Pattern::for_preset(preset);
    for channel in 0..tables {
        for rgb in curve {
            pattern.write_value(w, rgb[channel])?;
        }
    }
    Ok(())
}

fn check_writable(preset: &Preset) -> LutResult<()> {
    let Some(bitdepth) = preset.kind.bitdepth() else {
        return Err(LutError::DimensionMismatch {
            expected: "1D / 2D",
            found: preset.lut_type(),
        });
    };
    if preset.is_float {
        return Ok(());
    }
    if !preset.in_range.is_int() || !preset.out_range.is_int() {
        return Err(LutError::Format {
            format: NAME,
            reason: format!(
                "in_range {} and out_range {} must be integer code values unless is_float is set",
                preset.in_range, preset.out_range
            ),
        });
    }

    let expected = (1u64 << bitdepth) - 1;
    let span = preset.out_range.high() - preset.out_range.low();
    if span != expected as f64 {
        return Err(LutError::BitDepthMismatch {
            format: NAME,
            bitdepth,
            expected,
            range: preset.out_range.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::sample_curve;
    use tempfile::tempdir;

    #[test]
    fn bitdepth_must_match_output_range() {
        let dir = tempdir().unwrap();
        let raw = AsciiCodec.default_preset().with(preset::OUT_BITDEPTH, 12);
        let path = dir.path().join("curve.lut");
        let err = AsciiCodec.write_1d(&|rgb| rgb, &path, &raw).unwrap_err();
        match err {
            LutError::BitDepthMismatch {
                bitdepth, expected, ..
            } => {
                assert_eq!(bitdepth, 12);
                assert_eq!(expected, 4095);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!path.exists());

        // Forcing float output lifts the rule.
        let raw = raw.with(preset::IS_FLOAT, true);
        AsciiCodec.write_1d(&|rgb| rgb, &path, &raw).unwrap();
    }

    #[test]
    fn float_range_needs_is_float() {
        let dir = tempdir().unwrap();
        let raw = AsciiCodec
            .default_preset()
            .with(preset::IN_RANGE, serde_json::json!([0, 1.0]));
        let path = dir.path().join("curve.lut");
        let err = AsciiCodec.write_1d(&|rgb| rgb, &path, &raw).unwrap_err();
        assert!(matches!(err, LutError::Format { format: "lut", .. }));

        let raw = raw.with(preset::IS_FLOAT, true);
        let report = AsciiCodec.write_1d(&|rgb| rgb, &path, &raw).unwrap();
        let text = std::fs::read_to_string(report.path).unwrap();
        assert!(text.starts_with("LUT: 1 1024 32f\n0.000000\n"));
    }

    #[test]
    fn cube_preset_is_wrong_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.lut");
        let raw = RawPreset::new()
            .with(preset::TYPE, "3D")
            .with(preset::CUBE_SIZE, 17);
        let err = AsciiCodec.write_1d(&|rgb| rgb, &path, &raw).unwrap_err();
        assert!(matches!(
            err,
            LutError::WrongType {
                format: "lut",
                requested: LutType::OneD,
                found: LutType::ThreeD,
            }
        ));
        assert!(!path.exists());

        let cube = AsciiCodec.complete_preset(&raw).unwrap();
        assert!(matches!(
            check_writable(&cube),
            Err(LutError::DimensionMismatch { found: LutType::ThreeD, .. })
        ));
    }

    #[test]
    fn no_3d() {
        let dir = tempdir().unwrap();
        let err = AsciiCodec
            .write_3d(&|rgb| rgb, dir.path(), &RawPreset::new())
            .unwrap_err();
        assert!(matches!(err, LutError::UnsupportedDimension { format: "lut", .. }));
    }

    #[test]
    fn tables_are_columns() {
        let raw = AsciiCodec.default_preset().with(preset::OUT_BITDEPTH, 1).with_range(
            preset::OUT_RANGE,
            Range::int(0, 1),
        );
        let preset = AsciiCodec.check_preset(&raw).unwrap();
        let curve = sample_curve(&|rgb: Rgb| [rgb[0], 1.0 - rgb[0], 0.0], &preset).unwrap();

        let mut out = Vec::new();
        write_curve_to(&mut out, &curve, &preset, CurveLayout::PerChannel).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "LUT: 3 2\n0\n1\n1\n0\n0\n0\n");

        let mut out = Vec::new();
        write_curve_to(&mut out, &curve, &preset, CurveLayout::Shared).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "LUT: 1 2\n0\n1\n");
    }

    #[test]
    fn default_export() {
        let dir = tempdir().unwrap();
        let report = AsciiCodec
            .write_2d(&|rgb| rgb, dir.path(), &RawPreset::new())
            .unwrap();
        assert_eq!(report.path, dir.path().join("ASCII_LUT.lut"));
        let text = std::fs::read_to_string(&report.path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "LUT: 3 1024");
        assert_eq!(lines.len(), 1 + 3 * 1024);
        assert_eq!(lines[1024], "1023");
    }
}
