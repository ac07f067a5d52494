use geo::{BoundingRect, CoordsIter, Geometry as GeoGeometry, Rect};
use geojson::feature::Id;
use geojson::FeatureCollection;
use serde_json::{Map, Value as JsonValue};

use crate::commons::error::{Result, WfsError};

/// One feature as a table row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub id: Option<String>,
    /// `None` for features with a null geometry
    pub geometry: Option<GeoGeometry<f64>>,
    pub properties: Map<String, JsonValue>,
}

/// Features laid out as a table: one row per feature, one column per attribute
///
/// Columns are the union of every feature's property names in first-seen
/// order; a row lacking a column reads as `None`. The geometry lives beside
/// the attribute columns rather than among them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn from_collection(collection: &FeatureCollection) -> Result<Self> {
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(collection.features.len());

        for (index, feature) in collection.features.iter().enumerate() {
            let properties = feature.properties.clone().unwrap_or_default();
            for key in properties.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }

            let geometry = match &feature.geometry {
                Some(geometry) => Some(GeoGeometry::<f64>::try_from(geometry.clone()).map_err(
                    |e| WfsError::malformed("GeoJSON", format!("feature {}: {}", index, e)),
                )?),
                None => None,
            };

            let id = feature.id.as_ref().map(|id| match id {
                Id::String(s) => s.clone(),
                Id::Number(n) => n.to_string(),
            });

            rows.push(FeatureRow {
                id,
                geometry,
                properties,
            });
        }

        Ok(FeatureTable { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&JsonValue> {
        self.rows.get(row)?.properties.get(column)
    }

    /// All values of one attribute column, `None` where a row lacks it
    pub fn column(&self, name: &str) -> Vec<Option<&JsonValue>> {
        self.rows.iter().map(|row| row.properties.get(name)).collect()
    }

    pub fn geometry(&self, row: usize) -> Option<&GeoGeometry<f64>> {
        self.rows.get(row)?.geometry.as_ref()
    }

    /// First coordinate pair of a row's geometry as `(x, y)`
    pub fn first_coord(&self, row: usize) -> Option<(f64, f64)> {
        self.geometry(row)?
            .coords_iter()
            .next()
            .map(|coord| (coord.x, coord.y))
    }

    /// Extent of all geometries
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.rows
            .iter()
            .filter_map(|row| row.geometry.as_ref()?.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                    (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
                )
            })
    }

    /// Write the table as CSV: `id`, the attribute columns, then `geometry` as GeoJSON text
    #[cfg(feature = "csv")]
    pub fn to_csv<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["id"];
        header.extend(self.columns.iter().map(String::as_str));
        header.push("geometry");
        csv_writer
            .write_record(&header)
            .map_err(std::io::Error::from)?;

        for row in &self.rows {
            let mut record = vec![row.id.clone().unwrap_or_default()];
            record.extend(
                self.columns
                    .iter()
                    .map(|column| cell(row.properties.get(column))),
            );
            let geometry = match &row.geometry {
                Some(geometry) => {
                    let value = geojson::Value::from(geometry);
                    serde_json::to_string(&geojson::Geometry::new(value))
                        .map_err(|e| WfsError::malformed("geometry", e))?
                }
                None => String::new(),
            };
            record.push(geometry);
            csv_writer
                .write_record(&record)
                .map_err(std::io::Error::from)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(feature = "csv")]
fn cell(value: Option<&JsonValue>) -> String {
    match value {
        None | Some(JsonValue::Null) => String::new(),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
