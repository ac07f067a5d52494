//! Coordinate axis normalization
//!
//! Some WFS servers emit GeoJSON positions as `[lat, lon]` while consumers
//! expect `[lon, lat]`, or the other way around. [`normalize`] performs the
//! unconditional swap; [`AxisPolicy`] makes the swap a decision, including a
//! mode that looks at the CRS the response declares.

use geojson::{FeatureCollection, Geometry, Position, Value};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;

use crate::commons::error::WfsError;
use crate::geo_core::{CoordinateAxisOrder, Crs};

#[cfg(feature = "proj")]
use anyhow::{Context, Result};
#[cfg(feature = "proj")]
use proj::Proj;

/// When to swap the first two ordinates of every position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisPolicy {
    /// Always swap
    #[default]
    Swap,
    /// Never swap
    Keep,
    /// Swap only when the declared CRS is latitude-first, yielding `[lon, lat]`
    FromCrs,
}

impl FromStr for AxisPolicy {
    type Err = WfsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "swap" => Ok(AxisPolicy::Swap),
            "keep" => Ok(AxisPolicy::Keep),
            "from_crs" => Ok(AxisPolicy::FromCrs),
            other => Err(WfsError::Config {
                message: format!(
                    "unknown axis policy '{}' (expected swap, keep or from_crs)",
                    other
                ),
            }),
        }
    }
}

impl AxisPolicy {
    /// Decide whether `collection` gets its axes swapped
    pub fn should_swap(&self, collection: &FeatureCollection) -> bool {
        match self {
            AxisPolicy::Swap => true,
            AxisPolicy::Keep => false,
            AxisPolicy::FromCrs => match declared_crs(collection) {
                Some(crs) => crs.axis_order() == CoordinateAxisOrder::LatLon,
                None => {
                    warn!("Response declares no recognizable CRS, leaving axes untouched");
                    false
                }
            },
        }
    }

    /// Apply the policy
    pub fn apply(&self, collection: FeatureCollection) -> FeatureCollection {
        if self.should_swap(&collection) {
            normalize(collection)
        } else {
            collection
        }
    }
}

/// CRS named by the legacy GeoJSON `crs` member, if any
///
/// Understands `{"type": "name", "properties": {"name": ...}}` and
/// `{"type": "EPSG", "properties": {"code": ...}}`.
pub fn declared_crs(collection: &FeatureCollection) -> Option<Crs> {
    let crs = collection.foreign_members.as_ref()?.get("crs")?;
    let properties = crs.get("properties")?;

    match crs.get("type").and_then(JsonValue::as_str) {
        Some(kind) if kind.eq_ignore_ascii_case("name") => {
            Crs::parse(properties.get("name")?.as_str()?)
        }
        Some(kind) if kind.eq_ignore_ascii_case("epsg") => {
            let code = properties.get("code")?;
            let code = code
                .as_u64()
                .or_else(|| code.as_str().and_then(|s| s.parse().ok()))?;
            Crs::parse(&format!("EPSG:{}", code))
        }
        _ => None,
    }
}

/// Swap the first two ordinates of every geometry in the collection
///
/// Feature order and count are preserved; features without geometry pass
/// through unchanged. Applying it twice gives back the input.
pub fn normalize(mut collection: FeatureCollection) -> FeatureCollection {
    if let Some(bbox) = collection.bbox.as_mut() {
        swap_bbox(bbox);
    }
    for feature in collection.features.iter_mut() {
        if let Some(bbox) = feature.bbox.as_mut() {
            swap_bbox(bbox);
        }
        if let Some(geometry) = feature.geometry.as_mut() {
            swap_axes(geometry);
        }
    }
    collection
}

/// Swap the first two ordinates of every position of a geometry
pub fn swap_axes(geometry: &mut Geometry) {
    if let Some(bbox) = geometry.bbox.as_mut() {
        swap_bbox(bbox);
    }
    match &mut geometry.value {
        Value::GeometryCollection(geometries) => geometries.iter_mut().for_each(swap_axes),
        value => for_each_position(value, &mut swap_position),
    }
}

fn swap_position(position: &mut Position) {
    if position.len() >= 2 {
        position.swap(0, 1);
    }
}

// [minx, miny, maxx, maxy] or [minx, miny, minz, maxx, maxy, maxz]
fn swap_bbox(bbox: &mut [f64]) {
    let half = bbox.len() / 2;
    if bbox.len() % 2 == 0 && half >= 2 {
        bbox.swap(0, 1);
        bbox.swap(half, half + 1);
    }
}

fn for_each_position<F: FnMut(&mut Position)>(value: &mut Value, f: &mut F) {
    match value {
        Value::Point(position) => f(position),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            positions.iter_mut().for_each(|p| f(p))
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => lines
            .iter_mut()
            .flat_map(|line| line.iter_mut())
            .for_each(|p| f(p)),
        Value::MultiPolygon(polygons) => polygons
            .iter_mut()
            .flat_map(|polygon| polygon.iter_mut())
            .flat_map(|ring| ring.iter_mut())
            .for_each(|p| f(p)),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries.iter_mut() {
                for_each_position(&mut geometry.value, f);
            }
        }
    }
}

/// Reproject every position of the collection between two EPSG codes
///
/// Positions are read and written longitude-first. Bounding boxes are dropped
/// since they no longer match, and the `crs` member is rewritten to the target.
#[cfg(feature = "proj")]
pub fn reproject(
    mut collection: FeatureCollection,
    from_epsg: u32,
    to_epsg: u32,
) -> Result<FeatureCollection> {
    let proj = Proj::new_known_crs(
        &format!("EPSG:{}", from_epsg),
        &format!("EPSG:{}", to_epsg),
        None,
    )
    .context("Failed to create Proj transformation")?;

    let mut failure = None;
    for feature in collection.features.iter_mut() {
        if let Some(geometry) = feature.geometry.as_mut() {
            for_each_position(&mut geometry.value, &mut |position: &mut Position| {
                if failure.is_some() || position.len() < 2 {
                    return;
                }
                match proj.convert((position[0], position[1])) {
                    Ok((x, y)) => {
                        position[0] = x;
                        position[1] = y;
                    }
                    Err(e) => failure = Some(e),
                }
            });
            geometry.bbox = None;
        }
        feature.bbox = None;
    }
    collection.bbox = None;

    let mut crs = serde_json::Map::new();
    crs.insert("type".to_string(), JsonValue::from("name"));
    crs.insert(
        "properties".to_string(),
        serde_json::json!({ "name": format!("EPSG:{}", to_epsg) }),
    );
    collection
        .foreign_members
        .get_or_insert_with(serde_json::Map::new)
        .insert("crs".to_string(), JsonValue::Object(crs));

    match failure {
        Some(e) => Err(e).context("Failed to transform coordinates"),
        None => Ok(collection),
    }
}
