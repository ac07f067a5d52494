pub const TEMP_PATH: &str = "./temp";

/// WFS version requested when nothing else is configured
pub const DEFAULT_WFS_VERSION: &str = "2.0.0";

/// Output format sent with every GetFeature request
pub const GEOJSON_OUTPUT_FORMAT: &str = "application/json";

/// Other spellings servers use to advertise GeoJSON output
pub const GEOJSON_FORMAT_ALIASES: &[&str] = &[
    "application/json",
    "application/geo+json",
    "json",
    "geojson",
    "application/json; subtype=geojson",
];

/// True when `format` is one of the known GeoJSON output format names
pub fn is_geojson_format(format: &str) -> bool {
    let format = format.trim().to_ascii_lowercase();
    GEOJSON_FORMAT_ALIASES.iter().any(|alias| *alias == format)
}
