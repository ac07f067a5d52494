use url::Url;

use crate::commons::error::{Result, WfsError};

/// Query parameters the collector sets itself; matched case-insensitively
const CONTROL_PARAMS: &[&str] = &[
    "service",
    "version",
    "request",
    "typename",
    "typenames",
    "outputformat",
];

/// A WFS server URL as supplied by the caller
///
/// The URL may be a bare service root (`https://host/geoserver/wfs`) or a full
/// GetFeature URL. Protocol-control parameters are pulled out so the collector
/// can set them; everything else (`srsname`, `propertyname`, `bbox`, vendor
/// parameters) is kept in its original order and passed through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEndpoint {
    base: Url,
    version: Option<String>,
    type_name: Option<String>,
    output_format: Option<String>,
    pass_through: Vec<(String, String)>,
}

impl ServiceEndpoint {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |message: String| WfsError::InvalidEndpoint {
            url: raw.to_string(),
            message,
        };

        let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host".to_string()));
        }

        let mut version = None;
        let mut type_name = None;
        let mut output_format = None;
        let mut pass_through = Vec::new();

        for (key, value) in url.query_pairs() {
            let lower = key.to_ascii_lowercase();
            match lower.as_str() {
                "version" => version = Some(value.into_owned()),
                "typename" | "typenames" => type_name = Some(value.into_owned()),
                "outputformat" => output_format = Some(value.into_owned()),
                _ if CONTROL_PARAMS.contains(&lower.as_str()) => {}
                _ => pass_through.push((key.into_owned(), value.into_owned())),
            }
        }

        let mut base = url;
        base.set_query(None);
        base.set_fragment(None);

        Ok(ServiceEndpoint {
            base,
            version,
            type_name,
            output_format,
            pass_through,
        })
    }

    /// Service root without any query string
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `version` embedded in the caller URL, if any
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// `typeName`/`typeNames` embedded in the caller URL, if any
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// `outputFormat` embedded in the caller URL; never forwarded as-is
    pub fn output_format(&self) -> Option<&str> {
        self.output_format.as_deref()
    }

    pub fn pass_through(&self) -> &[(String, String)] {
        &self.pass_through
    }

    /// True if the caller URL already carries the named parameter
    pub fn has_param(&self, name: &str) -> bool {
        self.pass_through
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Build a request URL: the control parameters first, then the pass-through ones
    pub fn request_url(&self, control: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in control {
                query.append_pair(key, value);
            }
            for (key, value) in &self.pass_through {
                query.append_pair(key, value);
            }
        }
        url
    }
}

impl std::str::FromStr for ServiceEndpoint {
    type Err = WfsError;

    fn from_str(s: &str) -> Result<Self> {
        ServiceEndpoint::parse(s)
    }
}
