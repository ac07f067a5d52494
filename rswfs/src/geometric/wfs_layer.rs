use anyhow::{Context, Result};
use geojson::{FeatureCollection, GeoJson};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::collect::global_variables::TEMP_PATH;
use crate::collect::wfs::endpoint::ServiceEndpoint;
use crate::collect::wfs::wfs_collect::WfsCollect;
use crate::commons::config::WfsConfig;
use crate::geometric::axis::{normalize, AxisPolicy};
use crate::geometric::feature_table::FeatureTable;

#[cfg(feature = "proj")]
use crate::geometric::axis::{declared_crs, reproject};

/// Features of one WFS layer, fetched, axis-normalized and ready to tabulate
pub struct WfsLayer {
    /// WfsCollect instance for the requests
    wfs_collect: WfsCollect,
    /// Output path for exported data
    output_path: PathBuf,
    axis_policy: AxisPolicy,
    /// CRS to reproject into after fetching
    #[cfg(feature = "proj")]
    target_epsg: Option<u32>,
    /// Normalized feature collection
    geojson: Option<FeatureCollection>,
}

impl WfsLayer {
    pub fn new(url: &str, output_path: Option<String>) -> Result<Self> {
        Self::with_config(url, output_path, WfsConfig::default())
    }

    pub fn with_config(url: &str, output_path: Option<String>, config: WfsConfig) -> Result<Self> {
        let endpoint = ServiceEndpoint::parse(url)?;
        let axis_policy = config.axis_policy;
        let wfs_collect =
            WfsCollect::with_config(endpoint, config).context("Failed to set up WFS collector")?;

        Ok(WfsLayer {
            wfs_collect,
            output_path: PathBuf::from(output_path.as_deref().unwrap_or(TEMP_PATH)),
            axis_policy,
            #[cfg(feature = "proj")]
            target_epsg: None,
            geojson: None,
        })
    }

    /// Restrict the request to a WGS84 bounding box
    pub fn set_bbox(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.wfs_collect.set_bbox(min_x, min_y, max_x, max_y);
    }

    pub fn set_axis_policy(&mut self, axis_policy: AxisPolicy) {
        self.axis_policy = axis_policy;
    }

    /// Reproject fetched features into `epsg`; replaces the axis policy
    #[cfg(feature = "proj")]
    pub fn set_crs(&mut self, epsg: u32) {
        self.target_epsg = Some(epsg);
    }

    /// Run: fetch from the WFS server, parse GeoJSON, normalize axes
    pub fn run(mut self) -> Result<Self> {
        self.run_internal()?;
        Ok(self)
    }

    /// Internal run method that can be called mutably
    pub fn run_internal(&mut self) -> Result<()> {
        let collection = self
            .wfs_collect
            .fetch_collection()
            .context("Failed to fetch features from WFS server")?;

        // Reprojected output is easting-first; the axis policy does not apply
        #[cfg(feature = "proj")]
        {
            if let Some(epsg) = self.target_epsg {
                let source = declared_crs(&collection).map_or(4326, |crs| crs.epsg());
                let collection = reproject(AxisPolicy::FromCrs.apply(collection), source, epsg)?;
                self.geojson = Some(collection);
                return Ok(());
            }
        }

        let collection = if self.axis_policy.should_swap(&collection) {
            info!("Swapping coordinate axes of {} feature(s)", collection.features.len());
            normalize(collection)
        } else {
            collection
        };
        self.geojson = Some(collection);

        Ok(())
    }

    pub fn get_geojson(&self) -> Option<&FeatureCollection> {
        self.geojson.as_ref()
    }

    /// Feature type retrieved by the last run
    pub fn type_name(&self) -> Option<&str> {
        self.wfs_collect.selected.as_deref()
    }

    pub fn collector(&self) -> &WfsCollect {
        &self.wfs_collect
    }

    /// Tabulate the features (rows = features, columns = attributes)
    pub fn to_table(&self) -> Result<FeatureTable> {
        let geojson = self
            .geojson
            .as_ref()
            .context("No GeoJSON data available. Call run() first.")?;
        Ok(FeatureTable::from_collection(geojson)?)
    }

    /// Save to `<output_path>/<name>.geojson`; the name defaults to the layer name
    pub fn to_geojson(&self, name: Option<&str>) -> Result<PathBuf> {
        let geojson = self
            .geojson
            .as_ref()
            .context("No GeoJSON data available. Call run() first.")?;

        let output_file = self.output_file(name, "geojson")?;
        let geojson_str = GeoJson::FeatureCollection(geojson.clone()).to_string();
        fs::write(&output_file, geojson_str)
            .context(format!("Failed to write GeoJSON file: {:?}", output_file))?;

        info!("Features saved to {:?}", output_file);
        Ok(output_file)
    }

    /// Save the table to `<output_path>/<name>.csv`
    #[cfg(feature = "csv")]
    pub fn to_csv(&self, name: Option<&str>) -> Result<PathBuf> {
        let table = self.to_table()?;
        let output_file = self.output_file(name, "csv")?;
        let file = fs::File::create(&output_file)
            .context(format!("Failed to create CSV file: {:?}", output_file))?;
        table
            .to_csv(file)
            .context(format!("Failed to write CSV file: {:?}", output_file))?;

        info!("Table saved to {:?}", output_file);
        Ok(output_file)
    }

    pub fn get_output_path(&self) -> &Path {
        &self.output_path
    }

    fn output_file(&self, name: Option<&str>, extension: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_path).context(format!(
            "Failed to create output directory: {:?}",
            self.output_path
        ))?;

        let stem = match name {
            Some(name) => name.to_string(),
            None => self
                .type_name()
                .map(|t| t.replace([':', '/', '\\'], "_"))
                .unwrap_or_else(|| "features".to_string()),
        };
        Ok(self.output_path.join(format!("{}.{}", stem, extension)))
    }
}
