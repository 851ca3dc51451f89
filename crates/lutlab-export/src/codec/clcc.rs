//! Colour Cube (.cc) writer.
//!
//! A fixed, self-describing header followed by one `r,g,b` line per
//! lattice point, red fastest, with 10 decimals.
//!
//! # Format
//!
//! ```text
//! Colour Cube data v1.0
//! v1.0
//!
//! Name
//! Colour Cube LUT
//! Description
//! Created with lutlab
//! Input Colour space - RGB=1, CIEXYZ=2, DENSITY=3
//! 1
//! ...
//! Creation Date
//! 2026-01-01 12:00:00.000000
//! Data
//! 0.0000000000,0.0000000000,0.0000000000
//! ```

use std::io::Write;
use std::path::Path;

use super::{ExportReport, LutCodec, export_cube};
use crate::LutResult;
use crate::preset::{self, LutType, Preset, RawPreset};
use crate::sampler::{CubeSample, Transform};

/// Header version string.
pub const VERSION: &str = "v1.0";

/// `.cc` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClccCodec;

impl LutCodec for ClccCodec {
    fn name(&self) -> &'static str {
        "clcc"
    }

    fn default_preset(&self) -> RawPreset {
        preset::default_preset()
            .with(preset::TYPE, "3D")
            .with(preset::EXT, ".cc")
            .with(preset::CUBE_SIZE, 17)
            .with(preset::TITLE, "Colour Cube LUT")
            .with(preset::COMMENT, "Created with lutlab")
    }

    fn supports(&self, lut_type: LutType) -> bool {
        lut_type == LutType::ThreeD
    }

    fn extension(&self, _lut_type: LutType) -> &'static str {
        ".cc"
    }

    fn write_3d(&self, f: &Transform<'_>, path: &Path, raw: &RawPreset) -> LutResult<ExportReport> {
        let date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();
        export_cube(self, f, path, raw, |w, cube, preset| write_cube_to(w, cube, preset, &date))
    }
}

/// Writes a .cc body stamped with `date`.
pub fn write_cube_to<W: Write>(
    w: &mut W,
    cube: &[CubeSample],
    preset: &Preset,
    date: &str,
) -> LutResult<()> {
    let size = preset.cube_size().unwrap_or(0);
    writeln!(w, "Colour Cube data {}", VERSION)?;
    writeln!(w, "{}", VERSION)?;
    writeln!(w)?;
    writeln!(w, "Name")?;
    writeln!(w, "{}", preset.title_or("Colour Cube LUT"))?;
    writeln!(w, "Description")?;
    writeln!(w, "{}", preset.comment.as_deref().unwrap_or(""))?;
    writeln!(w, "Input Colour space - RGB=1, CIEXYZ=2, DENSITY=3")?;
    writeln!(w, "1")?;
    writeln!(w, "Output Colour space - RGB=1, CIEXYZ=2, DENSITY=3")?;
    writeln!(w, "1")?;
    writeln!(w, "Size x,y,z")?;
    writeln!(w, "{},{},{}", size, size, size)?;
    for component in ["A", "B", "C"] {
        writeln!(w, "Name component {}", component)?;
        writeln!(w, "component {}", component)?;
    }
    writeln!(w, "Creation Date")?;
    writeln!(w, "{}", date)?;
    writeln!(w, "Data")?;

    for sample in cube {
        let rgb = sample.rgb;
        writeln!(w, "{:.10},{:.10},{:.10}", rgb[0], rgb[1], rgb[2])?;
    }
    Ok(())
}
