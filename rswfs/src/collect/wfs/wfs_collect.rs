use geojson::{FeatureCollection, GeoJson};
use log::{debug, info, warn};
use reqwest::blocking::Client;
use url::Url;

use crate::collect::wfs::capabilities::{parse_exception_report, Capabilities, FeatureType};
use crate::collect::wfs::endpoint::ServiceEndpoint;
use crate::commons::config::{WfsConfig, SUPPORTED_VERSIONS};
use crate::commons::error::{Result, WfsError};
use crate::geo_core::{BoundingBox, GeoCore};

/// Which advertised feature type a fetch retrieves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LayerSelection {
    /// First feature type in capabilities document order
    #[default]
    First,
    /// A specific feature type; it must be advertised
    Named(String),
}

/// WFS feature collector
///
/// One `fetch` is one capabilities exchange followed by one GetFeature
/// exchange. Nothing is cached between calls and nothing is retried.
pub struct WfsCollect {
    pub endpoint: ServiceEndpoint,
    pub config: WfsConfig,
    /// Raw body of the last GetFeature response
    pub content: Option<Vec<u8>>,
    /// Capabilities seen by the last fetch
    pub capabilities: Option<Capabilities>,
    /// Feature type retrieved by the last fetch
    pub selected: Option<String>,
    pub geo_core: GeoCore,
    client: Client,
}

impl WfsCollect {
    pub fn new(endpoint: ServiceEndpoint) -> Result<Self> {
        Self::with_config(endpoint, WfsConfig::default())
    }

    pub fn with_config(endpoint: ServiceEndpoint, config: WfsConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(concat!("rswfs/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()
            .map_err(|e| WfsError::Config {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        if let Some(embedded) = endpoint.version() {
            if embedded != config.version {
                debug!(
                    "Endpoint embeds version {}, requesting configured version {}",
                    embedded, config.version
                );
            }
        }

        Ok(WfsCollect {
            endpoint,
            config,
            content: None,
            capabilities: None,
            selected: None,
            geo_core: GeoCore::default(),
            client,
        })
    }

    /// Restrict GetFeature to a bounding box expressed in `geo_core.epsg`
    pub fn set_bbox(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.geo_core
            .set_bbox(Some(BoundingBox::new(min_x, min_y, max_x, max_y)));
    }

    /// GetCapabilities URL; pass-through parameters belong to GetFeature only
    pub fn capabilities_url(&self) -> Url {
        let mut url = self.endpoint.base_url().clone();
        url.query_pairs_mut()
            .append_pair("SERVICE", "WFS")
            .append_pair("VERSION", &self.config.version)
            .append_pair("REQUEST", "GetCapabilities");
        url
    }

    /// Ask the server what it offers
    pub fn get_capabilities(&self) -> Result<Capabilities> {
        let url = self.capabilities_url();
        info!("Requesting WFS capabilities from {}", self.endpoint.base_url());
        let body = self.send(&url)?;
        let xml = String::from_utf8_lossy(&body);
        let capabilities = Capabilities::parse(&xml, &self.config.version)?;

        debug!(
            "Server negotiated version {} with {} feature type(s)",
            capabilities.version,
            capabilities.feature_types.len()
        );
        debug!("GetFeature output formats: {:?}", capabilities.output_formats);
        Ok(capabilities)
    }

    /// Pick the feature type to retrieve according to the configured selection
    pub fn select_feature_type<'a>(&self, capabilities: &'a Capabilities) -> Result<&'a FeatureType> {
        match self.config.layer_selection() {
            LayerSelection::First => capabilities
                .first_feature_type()
                .ok_or(WfsError::NoFeatureTypes),
            LayerSelection::Named(name) => {
                if capabilities.feature_types.is_empty() {
                    return Err(WfsError::NoFeatureTypes);
                }
                capabilities
                    .feature_type(&name)
                    .ok_or(WfsError::UnknownFeatureType { name })
            }
        }
    }

    /// GetFeature URL for `type_name` phrased for `version`
    ///
    /// The output format is always set from the configuration, whatever the
    /// endpoint embedded. Pass-through parameters follow the control ones.
    pub fn get_feature_url(&self, type_name: &str, version: &str) -> Url {
        let v2 = version.starts_with("2.");
        let mut control: Vec<(&str, String)> = vec![
            ("SERVICE", "WFS".to_string()),
            ("VERSION", version.to_string()),
            ("REQUEST", "GetFeature".to_string()),
            (if v2 { "TYPENAMES" } else { "TYPENAME" }, type_name.to_string()),
            ("OUTPUTFORMAT", self.config.output_format.clone()),
        ];

        if let Some(limit) = self.config.max_features {
            control.push((if v2 { "COUNT" } else { "MAXFEATURES" }, limit.to_string()));
        }

        if let Some(bbox) = self.geo_core.get_bbox() {
            if self.endpoint.has_param("bbox") {
                warn!("Endpoint already carries a BBOX parameter, ignoring the configured one");
            } else {
                control.push(("BBOX", bbox.to_wfs_param(self.geo_core.get_epsg(), version)));
            }
        }

        let control: Vec<(&str, &str)> = control.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.endpoint.request_url(&control)
    }

    /// Retrieve the raw GetFeature body for the selected feature type
    pub fn fetch(&mut self) -> Result<Vec<u8>> {
        let capabilities = self.get_capabilities()?;
        let feature_type = self.select_feature_type(&capabilities)?.clone();

        if !capabilities.supports_geojson() {
            warn!(
                "Server does not advertise a GeoJSON output format, requesting {} anyway",
                self.config.output_format
            );
        }

        let version = if SUPPORTED_VERSIONS.contains(&capabilities.version.as_str()) {
            capabilities.version.clone()
        } else {
            warn!(
                "Server answered with unsupported version {}, keeping {}",
                capabilities.version, self.config.version
            );
            self.config.version.clone()
        };

        let url = self.get_feature_url(&feature_type.name, &version);
        info!("Requesting features of {} (WFS {})", feature_type.name, version);
        let body = self.send(&url)?;

        // Some servers answer GetFeature errors with 200 and an XML report
        if body.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'<') {
            let text = String::from_utf8_lossy(&body);
            return Err(parse_exception_report(&text).unwrap_or_else(|| {
                WfsError::malformed("GeoJSON", "server returned XML instead of GeoJSON")
            }));
        }

        self.selected = Some(feature_type.name);
        self.capabilities = Some(capabilities);
        self.content = Some(body.clone());
        Ok(body)
    }

    /// `fetch` followed by GeoJSON parsing
    pub fn fetch_collection(&mut self) -> Result<FeatureCollection> {
        let body = self.fetch()?;
        let collection = parse_feature_collection(&body)?;
        info!("Received {} feature(s)", collection.features.len());
        Ok(collection)
    }

    /// Get the content as a string (for debugging)
    pub fn content_as_string(&self) -> Result<String> {
        let content = self
            .content
            .as_ref()
            .ok_or_else(|| WfsError::malformed("response", "no content fetched yet"))?;
        String::from_utf8(content.clone()).map_err(|e| WfsError::malformed("response", e))
    }

    fn send(&self, url: &Url) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self.client.get(url.as_str()).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            if let Some(err) = parse_exception_report(&body) {
                return Err(err);
            }
            return Err(WfsError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes()?.to_vec())
    }
}

/// Fetch the first advertised feature type of `endpoint` with default settings
pub fn fetch(endpoint: ServiceEndpoint) -> Result<FeatureCollection> {
    WfsCollect::new(endpoint)?.fetch_collection()
}

/// Parse a GetFeature body; a lone Feature is wrapped in a collection
pub fn parse_feature_collection(body: &[u8]) -> Result<FeatureCollection> {
    let text = std::str::from_utf8(body).map_err(|e| WfsError::malformed("GeoJSON", e))?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| WfsError::malformed("GeoJSON", e))?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => Err(WfsError::malformed(
            "GeoJSON",
            "expected a FeatureCollection, got a bare geometry",
        )),
    }
}
