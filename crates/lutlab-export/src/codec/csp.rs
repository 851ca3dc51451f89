//! Rising Sun Research CineSpace (.csp) writer.
//!
//! # Format
//!
//! ```text
//! CSPLUTV100
//! 3D
//!
//! BEGIN METADATA
//! comment
//! END METADATA
//!
//! 2
//! 0.0 1.0
//! 0.0 1.0
//! (x3, one identity pre-LUT per channel spanning the input range)
//!
//! 17 17 17
//! r g b
//! ...
//! ```

use std::io::Write;
use std::path::Path;

use super::{CurveLayout, ExportReport, LutCodec, Pattern, export_cube, export_curve};
use crate::LutResult;
use crate::preset::{self, LutType, Preset, RawPreset};
use crate::sampler::{CubeSample, Rgb, Transform};

/// `.csp` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct CspCodec;

impl LutCodec for CspCodec {
    fn name(&self) -> &'static str {
        "csp"
    }

    fn default_preset(&self) -> RawPreset {
        preset::default_preset()
            .with(preset::EXT, ".csp")
            .with(preset::TITLE, "CSP LUT")
    }

    fn supports(&self, _lut_type: LutType) -> bool {
        true
    }

    fn extension(&self, _lut_type: LutType) -> &'static str {
        ".csp"
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

    fn write_3d(&self, f: &Transform<'_>, path: &Path, raw: &RawPreset) -> LutResult<ExportReport> {
        export_cube(self, f, path, raw, write_cube_to)
    }
}

/// Writes a 1D or 2D .csp body. CSP curves always carry three channels;
/// a shared curve repeats red.
pub fn write_curve_to<W: Write>(
    w: &mut W,
    curve: &[Rgb],
    preset: &Preset,
    layout: CurveLayout,
) -> LutResult<()> {
    write_header(w, preset, "1D")?;
    writeln!(w, "{}", curve.len())?;
    let pattern = Pattern::for_preset(preset);
    for rgb in curve {
        match layout {
            CurveLayout::Shared => pattern.write_rgb(w, [rgb[0]; 3])?,
            CurveLayout::PerChannel => pattern.write_rgb(w, *rgb)?,
        }
    }
    Ok(())
}

/// Writes a 3D .csp body.
pub fn write_cube_to<W: Write>(w: &mut W, cube: &[CubeSample], preset: &Preset) -> LutResult<()> {
    write_header(w, preset, "3D")?;
    let size = preset.cube_size().unwrap_or(0);
    writeln!(w, "{} {} {}", size, size, size)?;
    let pattern = Pattern::for_preset(preset);
    for sample in cube {
        pattern.write_rgb(w, sample.rgb)?;
    }
    Ok(())
}

fn write_header<W: Write>(w: &mut W, preset: &Preset, kind: &str) -> LutResult<()> {
    writeln!(w, "CSPLUTV100")?;
    writeln!(w, "{}", kind)?;
    writeln!(w)?;

    if let Some(comment) = &preset.comment {
        writeln!(w, "BEGIN METADATA")?;
        writeln!(w, "{}", comment)?;
        writeln!(w, "END METADATA")?;
        writeln!(w)?;
    }

    let range = preset.in_range;
    for _ in 0..3 {
        writeln!(w, "2")?;
        writeln!(w, "{} {}", range.low, range.high)?;
        writeln!(w, "0.0 1.0")?;
        writeln!(w)?;
    }
    Ok(())
}
