//! Autodesk/Lustre .3dl writer.
//!
//! # Format
//!
//! ```text
//! 3DMESH
//! Mesh 4 12
//! 0 63 127 191 255 319 383 447 511 575 639 703 767 831 895 959 1023
//! 0 0 0
//! 0 0 255
//! ...
//! ```
//!
//! The mesh header is written when `mesh` is set and needs `cube_size - 1`
//! to be a power of two. The shaper line, written when `shaper` is set,
//! lists the input code value of each lattice coordinate. Values are
//! integer code values, blue fastest.

use std::io::Write;
use std::path::Path;

use super::{ExportReport, LutCodec, export_cube, format_flag};
use crate::preset::{self, LutKind, LutType, Preset, Range, RawPreset, ValidationMode};
use crate::sampler::{CubeSample, Transform};
use crate::{LutError, LutResult, PresetError, PresetResult};

/// Shaper line attribute.
pub const SHAPER: &str = "shaper";
/// Mesh header attribute.
pub const MESH: &str = "mesh";

/// Widest code value the shaper line and mesh header can describe.
pub const MAX_CODE_BITS: u32 = 32;

const NAME: &str = "3dl";

/// `.3dl` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeDlCodec;

impl LutCodec for ThreeDlCodec {
    fn name(&self) -> &'static str {
        NAME
    }

    fn default_preset(&self) -> RawPreset {
        preset::default_preset()
            .with(preset::TYPE, "3D")
            .with(preset::EXT, ".3dl")
            .with_range(preset::IN_RANGE, Range::int(0, 1023))
            .with_range(preset::OUT_RANGE, Range::int(0, 4095))
            .with(preset::OUT_BITDEPTH, 12)
            .with(preset::CUBE_SIZE, 17)
            .with(preset::TITLE, "3DL LUT")
            .with(SHAPER, true)
            .with(MESH, true)
    }

    fn supports(&self, lut_type: LutType) -> bool {
        lut_type == LutType::ThreeD
    }

    fn extension(&self, _lut_type: LutType) -> &'static str {
        ".3dl"
    }

    fn validate_format(&self, mut preset: Preset, mode: ValidationMode) -> PresetResult<Preset> {
        let default = self.default_preset();
        match (preset.kind, mode) {
            (LutKind::ThreeD { .. }, _) => {}
            (found, ValidationMode::Raise) => {
                return Err(PresetError::FormatType {
                    format: NAME,
                    expected: LutType::ThreeD,
                    found: found.lut_type(),
                });
            }
            (found, ValidationMode::Fill) => {
                let cube_size = found.cube_size().unwrap_or(17);
                preset.kind = LutKind::ThreeD { cube_size };
                preset.smooth = None;
            }
        }
        format_flag(&mut preset, SHAPER, NAME, mode, &default)?;
        format_flag(&mut preset, MESH, NAME, mode, &default)?;
        Ok(preset)
    }

    fn check_write(&self, preset: &Preset) -> LutResult<()> {
        check_writable(preset)
    }

    fn write_3d(&self, f: &Transform<'_>, path: &Path, raw: &RawPreset) -> LutResult<ExportReport> {
        export_cube(self, f, path, raw, write_cube_to)
    }
}

/// Writes a .3dl body.
///
/// # Errors
///
/// [`LutError::DimensionMismatch`] for curve presets. [`LutError::Format`]
/// for float ranges, code values wider than [`MAX_CODE_BITS`], float output,
/// or a mesh header on a cube size that is not a power of two plus one.
pub fn write_cube_to<W: Write>(w: &mut W, cube: &[CubeSample], preset: &Preset) -> LutResult<()> {
    check_writable(preset)?;
    let size = preset.cube_size().unwrap_or(0);
    if cube.len() != size * size * size {
        return Err(LutError::Format {
            format: NAME,
            reason: format!(
                "expected {} samples for cube_size {}, got {}",
                size * size * size,
                size,
                cube.len()
            ),
        });
    }

    if preset.flag(MESH).unwrap_or(false) {
        let steps = size.saturating_sub(1) as u64;
        writeln!(w, "3DMESH")?;
        writeln!(w, "Mesh {} {}", steps.trailing_zeros(), bits(preset.out_range.high()))?;
    }

    if preset.flag(SHAPER).unwrap_or(false) {
        let line: Vec<String> = shaper(size, bits(preset.in_range.high()))
            .iter()
            .map(u64::to_string)
            .collect();
        writeln!(w, "{}", line.join(" "))?;
    }

    for r in 0..size {
        for g in 0..size {
            for b in 0..size {
                let rgb = cube[r + g * size + b * size * size].rgb;
                writeln!(w, "{} {} {}", rgb[0] as i64, rgb[1] as i64, rgb[2] as i64)?;
            }
        }
    }
    Ok(())
}

/// Input code value of each lattice coordinate for a `bit_depth` shaper.
pub fn shaper(cube_size: usize, bit_depth: u32) -> Vec<u64> {
    let max = 1u64.checked_shl(bit_depth).map_or(u64::MAX, |v| v - 1) as f64;
    let step = max / (cube_size.max(2) - 1) as f64;
    (0..cube_size).map(|i| (i as f64 * step) as u64).collect()
}

/// Number of bits needed to store `value` as a code value.
fn bits(value: f64) -> u32 {
    let v = value.max(0.0) as u64;
    u64::BITS - v.leading_zeros()
}

fn check_writable(preset: &Preset) -> LutResult<()> {
    let Some(size) = preset.cube_size() else {
        return Err(LutError::DimensionMismatch {
            expected: "3D",
            found: preset.lut_type(),
        });
    };
    if !preset.in_range.is_int() || !preset.out_range.is_int() {
        return Err(LutError::Format {
            format: NAME,
            reason: format!(
                "in_range {} and out_range {} must be integer code values",
                preset.in_range, preset.out_range
            ),
        });
    }
    let ranges = [
        (preset::IN_RANGE, &preset.in_range),
        (preset::OUT_RANGE, &preset.out_range),
    ];
    for (attr, range) in ranges {
        if bits(range.high()) > MAX_CODE_BITS {
            return Err(LutError::Format {
                format: NAME,
                reason: format!("{} {} exceeds {}-bit code values", attr, range, MAX_CODE_BITS),
            });
        }
    }
    if preset.is_float {
        return Err(LutError::Format {
            format: NAME,
            reason: "float output is not supported".to_string(),
        });
    }
    if preset.flag(MESH).unwrap_or(false) && !size.saturating_sub(1).is_power_of_two() {
        return Err(LutError::Format {
            format: NAME,
            reason: format!(
                "mesh needs cube_size - 1 to be a power of two, got cube_size {}",
                size
            ),
        });
    }
    Ok(())
}
