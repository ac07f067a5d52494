use std::fmt;

/// Geographic CRSs whose authority definition puts latitude first
const LATITUDE_FIRST_EPSG: &[u32] = &[
    4326, 4258, 4267, 4269, 4283, 4167, 4171, 4230, 4490, 4612, 4674,
];

/// Spatial settings of a request: the CRS and optional bounding box
#[derive(Debug, Clone)]
pub struct GeoCore {
    /// EPSG code the bounding box is expressed in
    pub epsg: u32,
    /// Bounding box used to restrict requests
    pub bbox: Option<BoundingBox>,
}

impl GeoCore {
    pub fn new(epsg: u32) -> Self {
        GeoCore { epsg, bbox: None }
    }

    pub fn get_epsg(&self) -> u32 {
        self.epsg
    }

    pub fn get_bbox(&self) -> Option<BoundingBox> {
        self.bbox
    }

    pub fn set_bbox(&mut self, bbox: Option<BoundingBox>) {
        self.bbox = bbox;
    }
}

impl Default for GeoCore {
    /// WGS84, the CRS GeoJSON output is expressed in
    fn default() -> Self {
        GeoCore::new(4326)
    }
}

/// Bounding box structure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64, // min longitude
    pub min_y: f64, // min latitude
    pub max_x: f64, // max longitude
    pub max_y: f64, // max latitude
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Value of a WFS `BBOX` parameter for this box expressed in `epsg`
    ///
    /// WFS 1.1 and later honour the authority axis order of the CRS named in
    /// the parameter, so latitude-first CRSs get their corners swapped.
    pub fn to_wfs_param(&self, epsg: u32, version: &str) -> String {
        let crs = Crs::from_epsg(epsg);
        if version.starts_with("1.0") {
            return format!(
                "{},{},{},{}",
                self.min_x, self.min_y, self.max_x, self.max_y
            );
        }
        match crs.axis_order() {
            CoordinateAxisOrder::LatLon => format!(
                "{},{},{},{},{}",
                self.min_y,
                self.min_x,
                self.max_y,
                self.max_x,
                crs.urn()
            ),
            CoordinateAxisOrder::LonLat => format!(
                "{},{},{},{},{}",
                self.min_x,
                self.min_y,
                self.max_x,
                self.max_y,
                crs.urn()
            ),
        }
    }
}

/// Order in which the first two ordinates of a position are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateAxisOrder {
    /// x = longitude (or easting), y = latitude (or northing)
    LonLat,
    /// x = latitude, y = longitude
    LatLon,
}

/// How a CRS was written; the legacy forms imply longitude-first order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CrsForm {
    /// `EPSG:4326`
    Code,
    /// `http://www.opengis.net/gml/srs/epsg.xml#4326`
    GmlXml,
    /// `urn:ogc:def:crs:EPSG::4326`
    Urn,
    /// `http://www.opengis.net/def/crs/EPSG/0/4326`
    Uri,
    /// `urn:ogc:def:crs:OGC:1.3:CRS84`
    Crs84,
}

/// A coordinate reference system identified by an EPSG code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crs {
    epsg: u32,
    form: CrsForm,
}

impl Crs {
    /// Authority form (`urn:ogc:def:crs:EPSG::n`) of an EPSG code
    pub fn from_epsg(epsg: u32) -> Self {
        Crs {
            epsg,
            form: CrsForm::Urn,
        }
    }

    /// Parse the CRS identifiers WFS servers put in capabilities and GeoJSON output
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let lower = name.to_ascii_lowercase();

        if lower.ends_with("crs84") {
            return Some(Crs {
                epsg: 4326,
                form: CrsForm::Crs84,
            });
        }

        let (digits, form) = if let Some(rest) = lower.strip_prefix("epsg:") {
            (rest, CrsForm::Code)
        } else if let Some(rest) = lower.strip_prefix("urn:ogc:def:crs:epsg:") {
            // urn:ogc:def:crs:EPSG::4326 or urn:ogc:def:crs:EPSG:6.6:4326
            (rest.rsplit(':').next().unwrap_or(rest), CrsForm::Urn)
        } else if let Some(rest) = lower.strip_prefix("urn:x-ogc:def:crs:epsg:") {
            (rest.rsplit(':').next().unwrap_or(rest), CrsForm::Urn)
        } else if let Some(rest) = lower.strip_prefix("http://www.opengis.net/def/crs/epsg/") {
            (rest.rsplit('/').next().unwrap_or(rest), CrsForm::Uri)
        } else if let Some(rest) = lower.strip_prefix("http://www.opengis.net/gml/srs/epsg.xml#") {
            (rest, CrsForm::GmlXml)
        } else {
            return None;
        };

        digits.parse().ok().map(|epsg| Crs { epsg, form })
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn urn(&self) -> String {
        match self.form {
            CrsForm::Crs84 => "urn:ogc:def:crs:OGC:1.3:CRS84".to_string(),
            _ => format!("urn:ogc:def:crs:EPSG::{}", self.epsg),
        }
    }

    /// Axis order of coordinates written in this CRS
    ///
    /// Only the authority forms (URN and `/def/crs/` URI) carry the EPSG axis
    /// order; `EPSG:n` and `epsg.xml#n` are longitude-first by convention.
    pub fn axis_order(&self) -> CoordinateAxisOrder {
        match self.form {
            CrsForm::Urn | CrsForm::Uri if LATITUDE_FIRST_EPSG.contains(&self.epsg) => {
                CoordinateAxisOrder::LatLon
            }
            _ => CoordinateAxisOrder::LonLat,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.form {
            CrsForm::Code | CrsForm::GmlXml => write!(f, "EPSG:{}", self.epsg),
            _ => f.write_str(&self.urn()),
        }
    }
}
