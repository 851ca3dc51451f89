//! Adobe/Resolve .cube writer.
//!
//! # Format
//!
//! ```text
//! #Generated by lutlab
//! TITLE "Cube LUT"
//!
//! LUT_3D_SIZE 17
//! DOMAIN_MIN -0.1 -0.1 -0.1
//! DOMAIN_MAX 1.2 1.2 1.2
//!
//! 0.000000 0.000000 0.000000
//! ...
//! ```
//!
//! The domain lines only appear for float input ranges other than [0, 1].
//! Cube data is red fastest, as sampled.

use std::io::Write;
use std::path::Path;

use super::{CurveLayout, ExportReport, LutCodec, Pattern, export_cube, export_curve};
use crate::LutResult;
use crate::preset::{self, LutType, Preset, Range, RawPreset};
use crate::sampler::{CubeSample, Rgb, Transform};

/// `.cube` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct CubeCodec;

impl LutCodec for CubeCodec {
    fn name(&self) -> &'static str {
        "cube"
    }

    fn default_preset(&self) -> RawPreset {
        preset::default_preset()
            .with(preset::EXT, ".cube")
            .with(preset::TITLE, "Cube LUT")
    }

    fn supports(&self, _lut_type: LutType) -> bool {
        true
    }

    fn extension(&self, _lut_type: LutType) -> &'static str {
        ".cube"
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

/// Writes a 1D or 2D .cube body. A shared curve repeats its red channel.
pub fn write_curve_to<W: Write>(
    w: &mut W,
    curve: &[Rgb],
    preset: &Preset,
    layout: CurveLayout,
) -> LutResult<()> {
    write_header(w, preset, &format!("LUT_1D_SIZE {}", curve.len()))?;
    let pattern = Pattern::for_preset(preset);
    for rgb in curve {
        match layout {
            CurveLayout::Shared => pattern.write_rgb(w, [rgb[0]; 3])?,
            CurveLayout::PerChannel => pattern.write_rgb(w, *rgb)?,
        }
    }
    Ok(())
}

/// Writes a 3D .cube body.
pub fn write_cube_to<W: Write>(w: &mut W, cube: &[CubeSample], preset: &Preset) -> LutResult<()> {
    let size = preset.cube_size().unwrap_or(0);
    write_header(w, preset, &format!("LUT_3D_SIZE {}", size))?;
    let pattern = Pattern::for_preset(preset);
    for sample in cube {
        pattern.write_rgb(w, sample.rgb)?;
    }
    Ok(())
}

fn write_header<W: Write>(w: &mut W, preset: &Preset, size_line: &str) -> LutResult<()> {
    if let Some(comment) = &preset.comment {
        writeln!(w, "#{}", comment)?;
    }
    writeln!(w, "TITLE \"{}\"", preset.title_or("Cube LUT"))?;
    writeln!(w)?;
    writeln!(w, "{}", size_line)?;

    let range = preset.in_range;
    if !range.is_int() && range != Range::float(0.0, 1.0) {
        let (min, max) = (range.low, range.high);
        writeln!(w, "DOMAIN_MIN {} {} {}", min, min, min)?;
        writeln!(w, "DOMAIN_MAX {} {} {}", max, max, max)?;
    }
    writeln!(w)?;
    Ok(())
}
