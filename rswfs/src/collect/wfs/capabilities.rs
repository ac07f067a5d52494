//! WFS `GetCapabilities` documents
//!
//! Only the parts the collector needs are read: the negotiated version, the
//! advertised feature types (in document order) and the GetFeature output
//! formats. Namespace prefixes are ignored, elements are matched by local name,
//! which lets the same scanner handle WFS 1.0.0, 1.1.0 and 2.0.x documents.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::collect::global_variables::is_geojson_format;
use crate::commons::error::{Result, WfsError};

/// A feature type (layer) advertised by a WFS server
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureType {
    /// Qualified name used as `TYPENAMES`, e.g. `topp:states`
    pub name: String,
    pub title: Option<String>,
    /// `DefaultCRS` (2.0), `DefaultSRS` (1.1) or `SRS` (1.0)
    pub default_crs: Option<String>,
    pub other_crs: Vec<String>,
    /// Per-type output formats (2.0 `OutputFormats/Format`)
    pub output_formats: Vec<String>,
}

/// What a server advertises in its capabilities document
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    /// Version the server answered with
    pub version: String,
    pub feature_types: Vec<FeatureType>,
    /// Output formats declared for the GetFeature operation
    pub output_formats: Vec<String>,
}

impl Capabilities {
    /// Parse a capabilities document
    ///
    /// `requested_version` is assumed when the root element carries no
    /// `version` attribute. An OWS exception report becomes
    /// [`WfsError::Protocol`].
    pub fn parse(xml: &str, requested_version: &str) -> Result<Self> {
        match scan(xml)? {
            Document::Capabilities {
                version,
                feature_types,
                output_formats,
            } => Ok(Capabilities {
                version: version.unwrap_or_else(|| requested_version.to_string()),
                feature_types,
                output_formats,
            }),
            Document::Exception { code, message } => Err(WfsError::Protocol { code, message }),
            Document::Other(root) => Err(WfsError::malformed(
                "capabilities document",
                format!("unexpected root element <{}>", root),
            )),
        }
    }

    pub fn first_feature_type(&self) -> Option<&FeatureType> {
        self.feature_types.first()
    }

    pub fn feature_type(&self, name: &str) -> Option<&FeatureType> {
        self.feature_types.iter().find(|ft| ft.name == name)
    }

    pub fn type_names(&self) -> Vec<&str> {
        self.feature_types.iter().map(|ft| ft.name.as_str()).collect()
    }

    /// True when any advertised output format looks like GeoJSON
    pub fn supports_geojson(&self) -> bool {
        self.output_formats
            .iter()
            .chain(self.feature_types.iter().flat_map(|ft| ft.output_formats.iter()))
            .any(|format| is_geojson_format(format) || format.to_ascii_lowercase().contains("json"))
    }
}

/// Turn an XML exception report into a protocol error
///
/// Returns `None` when `xml` is not an exception report.
pub fn parse_exception_report(xml: &str) -> Option<WfsError> {
    match scan(xml) {
        Ok(Document::Exception { code, message }) => Some(WfsError::Protocol { code, message }),
        _ => None,
    }
}

enum Document {
    Capabilities {
        version: Option<String>,
        feature_types: Vec<FeatureType>,
        output_formats: Vec<String>,
    },
    Exception {
        code: String,
        message: String,
    },
    Other(String),
}

#[derive(Default)]
struct Scanner {
    stack: Vec<String>,
    root: Option<String>,
    version: Option<String>,
    feature_types: Vec<FeatureType>,
    current: Option<FeatureType>,
    output_formats: Vec<String>,
    operation: Option<String>,
    parameter: Option<String>,
    exception_code: Option<String>,
    exception_texts: Vec<String>,
}

fn scan(xml: &str) -> Result<Document> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut scanner = Scanner::default();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                scanner.start(&e, &name);
                scanner.stack.push(name);
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e);
                scanner.start(&e, &name);
                scanner.end(&name, "");
                text.clear();
            }
            Ok(Event::Text(t)) => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| WfsError::malformed("capabilities document", e))?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(c)) => {
                text.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Ok(Event::End(_)) => {
                if let Some(name) = scanner.stack.pop() {
                    scanner.end(&name, text.trim());
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(WfsError::malformed(
                    "capabilities document",
                    format!("at position {}: {}", reader.buffer_position(), e),
                ))
            }
        }
    }

    scanner.finish()
}

fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref().eq_ignore_ascii_case(name.as_bytes()))
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

impl Scanner {
    fn parent(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    fn inside(&self, name: &str) -> bool {
        self.stack.iter().any(|s| s == name)
    }

    fn start(&mut self, e: &BytesStart, name: &str) {
        if self.root.is_none() {
            self.root = Some(name.to_string());
            self.version = attribute(e, "version");
            return;
        }

        match name {
            "FeatureType" if self.parent() == Some("FeatureTypeList") => {
                self.current = Some(FeatureType::default());
            }
            "Operation" => self.operation = attribute(e, "name"),
            "Parameter" => self.parameter = attribute(e, "name"),
            "Exception" => self.exception_code = attribute(e, "exceptionCode"),
            "ServiceException" => self.exception_code = attribute(e, "code"),
            _ => {
                // WFS 1.0.0: <GetFeature><ResultFormat><GML2/><JSON/></ResultFormat>
                if self.parent() == Some("ResultFormat") && self.inside("GetFeature") {
                    push_unique(&mut self.output_formats, name);
                }
            }
        }
    }

    fn end(&mut self, name: &str, text: &str) {
        let parent = self.parent().map(str::to_string);
        let in_feature_type = parent.as_deref() == Some("FeatureType");

        match name {
            "FeatureType" => {
                if let Some(ft) = self.current.take() {
                    if !ft.name.is_empty() {
                        self.feature_types.push(ft);
                    }
                }
            }
            "Name" if in_feature_type => {
                if let Some(ft) = self.current.as_mut() {
                    ft.name = text.to_string();
                }
            }
            "Title" if in_feature_type => {
                if let Some(ft) = self.current.as_mut() {
                    ft.title = Some(text.to_string()).filter(|t| !t.is_empty());
                }
            }
            "DefaultCRS" | "DefaultSRS" | "SRS" if in_feature_type => {
                if let Some(ft) = self.current.as_mut() {
                    ft.default_crs = Some(text.to_string()).filter(|t| !t.is_empty());
                }
            }
            "OtherCRS" | "OtherSRS" if in_feature_type => {
                if let Some(ft) = self.current.as_mut() {
                    push_unique(&mut ft.other_crs, text);
                }
            }
            "Format" if parent.as_deref() == Some("OutputFormats") => {
                if let Some(ft) = self.current.as_mut() {
                    push_unique(&mut ft.output_formats, text);
                }
            }
            "Value" => {
                let is_output_format = self
                    .parameter
                    .as_deref()
                    .is_some_and(|p| p.eq_ignore_ascii_case("outputFormat"));
                let for_get_feature = self
                    .operation
                    .as_deref()
                    .map_or(true, |op| op == "GetFeature");
                if is_output_format && for_get_feature {
                    push_unique(&mut self.output_formats, text);
                }
            }
            "Parameter" => self.parameter = None,
            "Operation" => self.operation = None,
            "ExceptionText" | "ServiceException" => {
                if !text.is_empty() {
                    self.exception_texts.push(text.to_string());
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Result<Document> {
        let root = self
            .root
            .ok_or_else(|| WfsError::malformed("capabilities document", "no root element"))?;

        Ok(match root.as_str() {
            "WFS_Capabilities" => Document::Capabilities {
                version: self.version,
                feature_types: self.feature_types,
                output_formats: self.output_formats,
            },
            "ExceptionReport" | "ServiceExceptionReport" => Document::Exception {
                code: self
                    .exception_code
                    .unwrap_or_else(|| "NoApplicableCode".to_string()),
                message: self.exception_texts.join("; "),
            },
            _ => Document::Other(root),
        })
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
