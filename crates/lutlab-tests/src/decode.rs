//! Minimal readers for the files written by `lutlab-export`.
//!
//! They only understand what the writers emit and exist to check exports
//! end to end. Every reader returns a [`Table`] of RGB rows in file order.

use std::io::{self, ErrorKind};

/// Decoded LUT rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Curve length or cube side length.
    pub size: usize,
    /// Rows in file order. Single-channel curves are widened to RGB.
    pub rows: Vec<[f64; 3]>,
}

fn invalid(msg: impl Into<String>) -> io::Error {
    io::Error::new(ErrorKind::InvalidData, msg.into())
}

fn numbers(line: &str) -> io::Result<Vec<f64>> {
    line.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().map_err(|e| invalid(format!("{}: {}", s, e))))
        .collect()
}

fn rgb(line: &str) -> io::Result<[f64; 3]> {
    match numbers(line)?.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        other => Err(invalid(format!("expected 3 values, found {}", other.len()))),
    }
}

fn keyword_size(line: &str) -> io::Result<usize> {
    line.split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| invalid(format!("bad size line: {}", line)))
}

fn check_len(table: Table, expected: usize) -> io::Result<Table> {
    if table.rows.len() != expected {
        return Err(invalid(format!(
            "expected {} entries, found {}",
            expected,
            table.rows.len()
        )));
    }
    Ok(table)
}

/// Parses a .cube file (1D or 3D).
pub fn parse_cube(text: &str) -> io::Result<Table> {
    let mut size = None;
    let mut cube = false;
    let mut rows = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with('#')
            || line.starts_with("TITLE")
            || line.starts_with("DOMAIN_")
        {
            continue;
        }
        if line.starts_with("LUT_1D_SIZE") {
            size = Some(keyword_size(line)?);
        } else if line.starts_with("LUT_3D_SIZE") {
            size = Some(keyword_size(line)?);
            cube = true;
        } else {
            rows.push(rgb(line)?);
        }
    }

    let size = size.ok_or_else(|| invalid("missing LUT size"))?;
    let expected = if cube { size * size * size } else { size };
    check_len(Table { size, rows }, expected)
}

/// Parses a .csp file (1D or 3D), skipping metadata and pre-LUTs.
pub fn parse_csp(text: &str) -> io::Result<Table> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    if lines.next() != Some("CSPLUTV100") {
        return Err(invalid("missing CSPLUTV100"));
    }
    let cube = match lines.next() {
        Some("1D") => false,
        Some("3D") => true,
        other => return Err(invalid(format!("bad csp type: {:?}", other))),
    };

    let mut line = lines.next().ok_or_else(|| invalid("truncated csp"))?;
    if line == "BEGIN METADATA" {
        for l in lines.by_ref() {
            if l == "END METADATA" {
                break;
            }
        }
        line = lines.next().ok_or_else(|| invalid("truncated csp"))?;
    }

    // Three pre-LUTs: point count, then input and output rows.
    for channel in 0..3 {
        if channel > 0 {
            line = lines.next().ok_or_else(|| invalid("truncated csp"))?;
        }
        if line.parse::<usize>().is_err() {
            return Err(invalid(format!("bad pre-LUT count: {}", line)));
        }
        lines.next();
        lines.next();
    }

    let size_line = lines.next().ok_or_else(|| invalid("missing csp size"))?;
    let size = numbers(size_line)?
        .first()
        .map(|s| *s as usize)
        .ok_or_else(|| invalid("missing csp size"))?;
    let rows = lines.map(rgb).collect::<io::Result<Vec<_>>>()?;
    let expected = if cube { size * size * size } else { size };
    check_len(Table { size, rows }, expected)
}

/// Parses an .spi1d file.
pub fn parse_spi1d(text: &str) -> io::Result<Table> {
    let mut size = 0;
    let mut components = 1;
    let mut rows = Vec::new();
    let mut in_data = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if in_data {
            if line == "}" {
                in_data = false;
                continue;
            }
            let values = numbers(line)?;
            match (components, values.as_slice()) {
                (1, [v]) => rows.push([*v; 3]),
                (3, [r, g, b]) => rows.push([*r, *g, *b]),
                _ => return Err(invalid(format!("bad spi1d row: {}", line))),
            }
        } else if line.starts_with("Length") {
            size = keyword_size(line)?;
        } else if line.starts_with("Components") {
            components = keyword_size(line)?;
        } else if line == "{" {
            in_data = true;
        }
    }
    check_len(Table { size, rows }, size)
}

/// Parses an .spi3d file, placing rows by their lattice indices (red
/// fastest).
pub fn parse_spi3d(text: &str) -> io::Result<Table> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    if lines.next() != Some("SPILUT 1.0") {
        return Err(invalid("missing SPILUT 1.0"));
    }
    lines.next();
    let size = numbers(lines.next().ok_or_else(|| invalid("missing spi3d size"))?)?
        .first()
        .map(|s| *s as usize)
        .ok_or_else(|| invalid("missing spi3d size"))?;

    let mut rows = vec![[f64::NAN; 3]; size * size * size];
    for line in lines {
        let v = numbers(line)?;
        if v.len() != 6 {
            return Err(invalid(format!("bad spi3d row: {}", line)));
        }
        let (r, g, b) = (v[0] as usize, v[1] as usize, v[2] as usize);
        let idx = r + g * size + b * size * size;
        let slot = rows.get_mut(idx).ok_or_else(|| invalid("index out of range"))?;
        *slot = [v[3], v[4], v[5]];
    }
    if rows.iter().any(|row| row[0].is_nan()) {
        return Err(invalid("missing spi3d rows"));
    }
    Ok(Table { size, rows })
}

/// Parses a discreet .lut file. Tables are zipped back into rows.
pub fn parse_discreet(text: &str) -> io::Result<Table> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines.next().ok_or_else(|| invalid("empty file"))?;
    let fields: Vec<&str> = header.split_whitespace().collect();
    if fields.first() != Some(&"LUT:") || fields.len() < 3 {
        return Err(invalid(format!("bad header: {}", header)));
    }
    let tables: usize = fields[1].parse().map_err(|_| invalid("bad table count"))?;
    let size: usize = fields[2].parse().map_err(|_| invalid("bad table length"))?;

    let values = lines
        .map(|l| l.parse::<f64>().map_err(|e| invalid(e.to_string())))
        .collect::<io::Result<Vec<_>>>()?;
    if values.len() != tables * size {
        return Err(invalid(format!("expected {} values, found {}", tables * size, values.len())));
    }

    let rows = (0..size)
        .map(|i| match tables {
            1 => [values[i]; 3],
            _ => [values[i], values[size + i], values[2 * size + i]],
        })
        .collect();
    Ok(Table { size, rows })
}

/// Parses a .3dl file and reorders its blue-fastest rows to red fastest.
pub fn parse_3dl(text: &str) -> io::Result<Table> {
    let mut shaper_len = None;
    let mut data = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line == "3DMESH" || line.starts_with("Mesh") {
            continue;
        }
        let values = numbers(line)?;
        if values.len() == 3 {
            data.push([values[0], values[1], values[2]]);
        } else if shaper_len.is_none() && data.is_empty() {
            shaper_len = Some(values.len());
        } else {
            return Err(invalid(format!("bad 3dl row: {}", line)));
        }
    }

    let size = (data.len() as f64).cbrt().round() as usize;
    if size * size * size != data.len() {
        return Err(invalid(format!("{} rows is not a cube", data.len())));
    }
    if shaper_len.is_some_and(|len| len != size) {
        return Err(invalid("shaper length differs from cube size"));
    }

    let mut rows = vec![[0.0; 3]; data.len()];
    for r in 0..size {
        for g in 0..size {
            for b in 0..size {
                rows[r + g * size + b * size * size] = data[b + g * size + r * size * size];
            }
        }
    }
    Ok(Table { size, rows })
}

/// Parses a .cc file.
pub fn parse_clcc(text: &str) -> io::Result<Table> {
    let mut lines = text.lines().map(str::trim);
    let mut size = None;
    while let Some(line) = lines.next() {
        if line == "Size x,y,z" {
            let dims = numbers(lines.next().unwrap_or(""))?;
            size = dims.first().map(|s| *s as usize);
        }
        if line == "Data" {
            break;
        }
    }
    let size = size.ok_or_else(|| invalid("missing size"))?;
    let rows = lines
        .filter(|l| !l.is_empty())
        .map(rgb)
        .collect::<io::Result<Vec<_>>>()?;
    check_len(Table { size, rows }, size * size * size)
}
