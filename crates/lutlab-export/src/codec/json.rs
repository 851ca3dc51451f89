//! JSON cube dump.
//!
//! One object with the cube size, the output channels as three flat lists
//! and the input color of each lattice point, red fastest:
//!
//! ```text
//! {"cubesize":2,"red_values":[...],"green_values":[...],"blue_values":[...],
//!  "input_colors":[[0.0,0.0,0.0],...]}
//! ```
//!
//! With `hexa_values` set, input colors are `#rrggbb` strings instead.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ExportReport, LutCodec, export_cube};
use crate::preset::{self, LutType, Preset, RawPreset, ValidationMode};
use crate::sampler::{CubeSample, Rgb, Transform};
use crate::{LutResult, PresetError, PresetResult};

/// Hex input color attribute.
pub const HEXA_VALUES: &str = "hexa_values";

const NAME: &str = "json";

/// `.json` codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

/// Serialized cube.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeDump {
    /// Lattice side length.
    pub cubesize: usize,
    /// Output red channel.
    pub red_values: Vec<f64>,
    /// Output green channel.
    pub green_values: Vec<f64>,
    /// Output blue channel.
    pub blue_values: Vec<f64>,
    /// Input color of each lattice point.
    pub input_colors: Vec<InputColor>,
}

/// Input color label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputColor {
    /// `#rrggbb`.
    Hex(String),
    /// Normalized triplet.
    Rgb(Rgb),
}

impl CubeDump {
    /// Builds the dump from sampled lattice points.
    pub fn new(cube: &[CubeSample], cube_size: usize, hexa_values: bool) -> Self {
        let max = cube_size.saturating_sub(1).max(1) as f64;
        let mut dump = CubeDump {
            cubesize: cube_size,
            red_values: Vec::with_capacity(cube.len()),
            green_values: Vec::with_capacity(cube.len()),
            blue_values: Vec::with_capacity(cube.len()),
            input_colors: Vec::with_capacity(cube.len()),
        };
        for sample in cube {
            dump.red_values.push(sample.rgb[0]);
            dump.green_values.push(sample.rgb[1]);
            dump.blue_values.push(sample.rgb[2]);
            let input = sample.index.map(|i| i as f64 / max);
            dump.input_colors.push(if hexa_values {
                InputColor::Hex(to_hex(input))
            } else {
                InputColor::Rgb(input)
            });
        }
        dump
    }
}

fn to_hex(rgb: Rgb) -> String {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

impl LutCodec for JsonCodec {
    fn name(&self) -> &'static str {
        NAME
    }

    fn default_preset(&self) -> RawPreset {
        preset::default_preset()
            .with(preset::TYPE, "3D")
            .with(preset::EXT, ".json")
            .with(preset::TITLE, "JSON LUT")
            .with(HEXA_VALUES, false)
    }

    fn supports(&self, lut_type: LutType) -> bool {
        lut_type == LutType::ThreeD
    }

    fn extension(&self, _lut_type: LutType) -> &'static str {
        ".json"
    }

    fn validate_format(&self, mut preset: Preset, mode: ValidationMode) -> PresetResult<Preset> {
        let invalid = match preset.extras.get(HEXA_VALUES) {
            None | Some(Value::Bool(_)) => None,
            Some(other) => Some(other.to_string()),
        };
        if let Some(value) = invalid {
            if mode == ValidationMode::Raise {
                return Err(PresetError::InvalidFormatAttribute {
                    format: NAME,
                    attr: HEXA_VALUES.to_string(),
                    value,
                });
            }
            preset.extras.insert(HEXA_VALUES.to_string(), Value::Bool(false));
        }
        Ok(preset)
    }

    fn write_3d(&self, f: &Transform<'_>, path: &Path, raw: &RawPreset) -> LutResult<ExportReport> {
        export_cube(self, f, path, raw, write_cube_to)
    }
}

/// Writes the cube as compact JSON.
pub fn write_cube_to<W: Write>(w: &mut W, cube: &[CubeSample], preset: &Preset) -> LutResult<()> {
    let hexa_values = preset.flag(HEXA_VALUES).unwrap_or(false);
    let dump = CubeDump::new(cube, preset.cube_size().unwrap_or(0), hexa_values);
    serde_json::to_writer(&mut *w, &dump)?;
    Ok(())
}
