use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use groundcover_core::{cloud::PointCloud, nalgebra::Vector3};
use log::info;

/// How the fields of one line are separated
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Delimiter {
    /// Any run of whitespace
    Whitespace,
    Char(char),
}

impl Default for Delimiter {
    fn default() -> Self {
        Delimiter::Whitespace
    }
}

impl FromStr for Delimiter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "whitespace" => Ok(Delimiter::Whitespace),
            "\\t" | "tab" => Ok(Delimiter::Char('\t')),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Delimiter::Char(c)),
                    _ => Err(anyhow!("Delimiter must be a single character, got '{}'", s)),
                }
            }
        }
    }
}

fn parse_field<T: FromStr>(fields: &[&str], index: usize, what: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    fields[index]
        .parse::<T>()
        .with_context(|| format!("Invalid {} '{}'", what, fields[index]))
}

fn parse_line(line: &str, delimiter: Delimiter) -> Result<(Vector3<f64>, Vector3<u8>)> {
    let fields: Vec<&str> = match delimiter {
        Delimiter::Whitespace => line.split_whitespace().collect(),
        Delimiter::Char(c) => line.split(c).map(str::trim).collect(),
    };
    if fields.len() < 6 {
        return Err(anyhow!(
            "Expected at least 6 fields (x y z r g b), got {}",
            fields.len()
        ));
    }
    let position = Vector3::new(
        parse_field(&fields, 0, "x coordinate")?,
        parse_field(&fields, 1, "y coordinate")?,
        parse_field(&fields, 2, "z coordinate")?,
    );
    let color = Vector3::new(
        parse_field(&fields, 3, "red channel")?,
        parse_field(&fields, 4, "green channel")?,
        parse_field(&fields, 5, "blue channel")?,
    );
    Ok((position, color))
}

/// Reads a colored point cloud from ASCII text with one point per line: `x y z r g b`, coordinates as decimal
/// numbers and color channels as integers in `0..=255`. Fields beyond the sixth are ignored. Empty lines and lines
/// starting with `#` are skipped. Errors name the offending line.
pub fn parse_ascii_cloud<R: BufRead>(
    reader: R,
    name: &str,
    delimiter: Delimiter,
) -> Result<PointCloud> {
    let mut positions = vec![];
    let mut colors = vec![];
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("Could not read line {}", line_number))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (position, color) =
            parse_line(trimmed, delimiter).with_context(|| format!("Line {}", line_number))?;
        positions.push(position);
        colors.push(color);
    }
    Ok(PointCloud::from_points(name, positions, colors)?)
}

/// Opens the file at `path` and reads it with [`parse_ascii_cloud`]. The cloud is named after the file stem
pub fn read_ascii_cloud<P: AsRef<Path>>(path: P, delimiter: Delimiter) -> Result<PointCloud> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Could not open {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cloud".to_string());
    let cloud = parse_ascii_cloud(BufReader::new(file), &name, delimiter)
        .with_context(|| format!("Could not parse {}", path.display()))?;
    info!("Read {} points from {}", cloud.len(), path.display());
    Ok(cloud)
}
