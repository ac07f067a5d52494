//! Retrieval of OGC Web Feature Service layers as GeoJSON, with coordinate
//! axis normalization and a tabular view of the features.
//!
//! ```no_run
//! use rswfs::geometric::wfs_layer::WfsLayer;
//!
//! let layer = WfsLayer::new("https://example.org/geoserver/wfs", None)?.run()?;
//! let table = layer.to_table()?;
//! println!("{} features, columns {:?}", table.len(), table.columns());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod collect;
pub mod commons;
pub mod geo_core;
pub mod geometric;

pub use collect::wfs::endpoint::ServiceEndpoint;
pub use collect::wfs::wfs_collect::{fetch, LayerSelection, WfsCollect};
pub use commons::config::WfsConfig;
pub use commons::error::{Result, WfsError};
pub use geometric::axis::{normalize, AxisPolicy};
pub use geometric::feature_table::FeatureTable;
pub use geometric::wfs_layer::WfsLayer;
