use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use crate::core::route::spaced_timestamp;
use crate::core::{Route, Waypoint};
use chrono::{DateTime, Duration, Utc};

/// Load a route from a CSV file
///
/// See [`parse_csv`] for the accepted layout.
pub fn load_csv<P: AsRef<Path>>(path: P, spacing: Duration) -> Result<Route> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open CSV file: {:?}", path))?;
    parse_csv(file, Utc::now(), spacing)
}

/// Parse a route from CSV
///
/// Supports flexible column names:
/// - latitude / lat
/// - longitude / lon / lng / long
/// - timestamp / time / ts / t (optional)
///
/// Timestamps may be RFC 3339 instants or numbers of seconds relative to
/// `anchor`. Without a timestamp column, rows are spaced `spacing` apart.
pub fn parse_csv<R: Read>(reader: R, anchor: DateTime<Utc>, spacing: Duration) -> Result<Route> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?;
    let (lat_idx, lon_idx, time_idx) = detect_columns(headers)?;

    let mut waypoints = Vec::new();

    for (row, result) in rdr.records().enumerate() {
        let record = result.context("Failed to read CSV row")?;
        // Header is line 1
        let line = row + 2;

        let latitude = parse_number(record.get(lat_idx), "latitude", line)?;
        let longitude = parse_number(record.get(lon_idx), "longitude", line)?;

        let timestamp = match time_idx {
            Some(idx) => {
                let raw = record
                    .get(idx)
                    .with_context(|| format!("Missing timestamp on line {}", line))?;
                parse_timestamp(raw, anchor)
                    .with_context(|| format!("Unparseable timestamp {:?} on line {}", raw, line))?
            }
            None => spaced_timestamp(anchor, spacing, waypoints.len())
                .with_context(|| format!("Synthesized timestamp out of range on line {}", line))?,
        };

        waypoints.push(Waypoint::new(latitude, longitude, timestamp));
    }

    Ok(Route::new(waypoints)?)
}

fn parse_number(field: Option<&str>, name: &str, line: usize) -> Result<f64> {
    let raw = field.with_context(|| format!("Missing {} on line {}", name, line))?;
    raw.parse::<f64>()
        .with_context(|| format!("Invalid {} {:?} on line {}", name, raw, line))
}

/// RFC 3339 instant, or seconds relative to `anchor`
fn parse_timestamp(raw: &str, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    let relative_secs = raw.parse::<f64>().ok().filter(|s| s.is_finite())?;
    let ms = (relative_secs * 1000.0).round();
    // `as` saturates, so reject anything outside i64 first
    if !(i64::MIN as f64..i64::MAX as f64).contains(&ms) {
        return None;
    }
    anchor.checked_add_signed(Duration::try_milliseconds(ms as i64)?)
}

/// Detect column indices from CSV headers
fn detect_columns(headers: &csv::StringRecord) -> Result<(usize, usize, Option<usize>)> {
    let lat_idx = find_column(headers, &["latitude", "lat"])
        .context("Could not find a latitude column")?;
    let lon_idx = find_column(headers, &["longitude", "lon", "lng", "long"])
        .context("Could not find a longitude column")?;
    let time_idx = find_column(headers, &["timestamp", "time", "ts", "t"]);

    Ok((lat_idx, lon_idx, time_idx))
}

/// Find a column by checking possible names
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        let header_lower = header.to_lowercase();
        names.iter().any(|&name| header_lower == name)
    })
}
