use std::path::{Path, PathBuf};

/// Polylines as (lat, lon) pairs in degrees.
pub fn parse_geojson_coastlines(json: &str) -> Result<Vec<Vec<(f64, f64)>>, String> {
    let v: serde_json::Value = serde_json::from_str(json).map_err(|e| format!("{}", e))?;
    let features = v["features"].as_array().ok_or("no features")?;
    let mut polylines = Vec::new();
    for feat in features {
        let geom = &feat["geometry"];
        match geom["type"].as_str() {
            Some("LineString") => {
                if let Some(line) = extract_coord_line(&geom["coordinates"]) {
                    polylines.push(line);
                }
            }
            Some("MultiLineString") => {
                if let Some(arrs) = geom["coordinates"].as_array() {
                    for arr in arrs {
                        if let Some(line) = extract_coord_line(arr) {
                            polylines.push(line);
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(polylines)
}

fn extract_coord_line(arr: &serde_json::Value) -> Option<Vec<(f64, f64)>> {
    let points = arr.as_array()?;
    let coords: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| {
            let a = p.as_array()?;
            Some((a.get(1)?.as_f64()?, a.first()?.as_f64()?))
        })
        .collect();
    if coords.is_empty() { None } else { Some(coords) }
}

pub fn dirs_cache() -> PathBuf {
    if let Some(dir) = dirs_sys_cache() {
        dir
    } else {
        PathBuf::from(".")
    }
}

fn dirs_sys_cache() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".cache"))
}

fn fetch_or_cache_geojson(filename: &str, url: &str) -> Result<String, String> {
    let cache_dir = dirs_cache().join("orbit-viz").join("geodata");
    let _ = std::fs::create_dir_all(&cache_dir);
    let path = cache_dir.join(filename);
    if path.exists() {
        return std::fs::read_to_string(&path).map_err(|e| format!("{}", e));
    }
    let resp = ureq::get(url).call().map_err(|e| format!("{}", e))?;
    let data = resp.into_string().map_err(|e| format!("{}", e))?;
    let _ = std::fs::write(&path, &data);
    Ok(data)
}

pub fn load_coastlines() -> Result<Vec<Vec<(f64, f64)>>, String> {
    let json = fetch_or_cache_geojson(
        "ne_110m_coastline.geojson",
        "https://raw.githubusercontent.com/nvkelso/natural-earth-vector/master/geojson/ne_110m_coastline.geojson",
    )?;
    parse_geojson_coastlines(&json)
}

pub const ZONE_HEADER_LINES: usize = 3;

/// Restricted-zone vertices as (lon, lat) pairs, in file order.
///
/// The file carries a fixed 3-line header, then three numeric columns:
/// altitude (unused), longitude, latitude.
pub fn parse_zone(text: &str) -> Result<Vec<(f64, f64)>, String> {
    let mut vertices = Vec::new();
    for (offset, line) in text.lines().skip(ZONE_HEADER_LINES).enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lineno = offset + ZONE_HEADER_LINES + 1;
        let mut cols = line.split_whitespace();
        let _altitude = cols
            .next()
            .ok_or_else(|| format!("zone line {}: missing columns", lineno))?;
        let lon: f64 = cols
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| format!("zone line {}: bad longitude in {:?}", lineno, line))?;
        let lat: f64 = cols
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| format!("zone line {}: bad latitude in {:?}", lineno, line))?;
        vertices.push((lon, lat));
    }
    if vertices.is_empty() {
        Err("zone file holds no vertices".to_string())
    } else {
        Ok(vertices)
    }
}

pub fn load_zone(path: &Path) -> Result<Vec<(f64, f64)>, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    parse_zone(&text)
}
