pub mod csv;
pub mod geojson;

pub use self::csv::{load_csv, parse_csv};
pub use self::geojson::{load_geojson, parse_geojson};

use anyhow::{Context, Result};
use crate::core::Route;
use chrono::Duration;
use std::path::Path;

/// Input format detection result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Csv,
    GeoJson,
    Unknown,
}

/// Detect the format of an input file from its leading content
pub fn detect_format(data: &[u8]) -> InputFormat {
    if is_geojson(data) {
        return InputFormat::GeoJson;
    }

    if is_csv(data) {
        return InputFormat::Csv;
    }

    InputFormat::Unknown
}

fn sample(data: &[u8]) -> Option<&str> {
    let end = data.len().min(500);
    // Cutting at 500 bytes may split a multi-byte character
    match std::str::from_utf8(&data[..end]) {
        Ok(text) => Some(text),
        Err(e) if e.valid_up_to() > 0 => std::str::from_utf8(&data[..e.valid_up_to()]).ok(),
        Err(_) => None,
    }
}

fn is_geojson(data: &[u8]) -> bool {
    match sample(data) {
        Some(text) => text.trim_start().starts_with('{') && text.contains("\"type\""),
        None => false,
    }
}

fn is_csv(data: &[u8]) -> bool {
    // Header line must have at least two columns
    match sample(data) {
        Some(text) => text
            .lines()
            .next()
            .map(|line| line.chars().filter(|&c| c == ',').count() >= 1)
            .unwrap_or(false),
        None => false,
    }
}

/// Load a route from a file, auto-detecting format
///
/// Coordinates without timestamps are spaced `spacing` apart, starting now.
pub fn load_file<P: AsRef<Path>>(path: P, spacing: Duration) -> Result<Route> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read route file: {:?}", path))?;

    match detect_format(&data) {
        InputFormat::Csv => load_csv(path, spacing),
        InputFormat::GeoJson => load_geojson(path, spacing),
        InputFormat::Unknown => anyhow::bail!("Unknown input format: {:?}", path),
    }
}
