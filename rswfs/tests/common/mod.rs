#![allow(dead_code)]

pub const CAPABILITIES_TWO_LAYERS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:WFS_Capabilities version="2.0.0"
    xmlns:wfs="http://www.opengis.net/wfs/2.0"
    xmlns:ows="http://www.opengis.net/ows/1.1">
  <ows:OperationsMetadata>
    <ows:Operation name="GetFeature">
      <ows:Parameter name="outputFormat">
        <ows:AllowedValues>
          <ows:Value>application/gml+xml; version=3.2</ows:Value>
          <ows:Value>application/json</ows:Value>
        </ows:AllowedValues>
      </ows:Parameter>
    </ows:Operation>
  </ows:OperationsMetadata>
  <wfs:FeatureTypeList>
    <wfs:FeatureType>
      <wfs:Name>cpc:outlook_temp</wfs:Name>
      <wfs:Title>Temperature outlook</wfs:Title>
      <wfs:DefaultCRS>urn:ogc:def:crs:EPSG::4326</wfs:DefaultCRS>
    </wfs:FeatureType>
    <wfs:FeatureType>
      <wfs:Name>cpc:outlook_precip</wfs:Name>
      <wfs:Title>Precipitation outlook</wfs:Title>
      <wfs:DefaultCRS>urn:ogc:def:crs:EPSG::4326</wfs:DefaultCRS>
    </wfs:FeatureType>
  </wfs:FeatureTypeList>
</wfs:WFS_Capabilities>"#;

pub const CAPABILITIES_EMPTY: &str = r#"<wfs:WFS_Capabilities version="2.0.0"
    xmlns:wfs="http://www.opengis.net/wfs/2.0">
  <wfs:FeatureTypeList/>
</wfs:WFS_Capabilities>"#;

pub const CAPABILITIES_110: &str = r#"<wfs:WFS_Capabilities version="1.1.0"
    xmlns:wfs="http://www.opengis.net/wfs">
  <FeatureTypeList>
    <FeatureType><Name>topp:states</Name><DefaultSRS>EPSG:4326</DefaultSRS></FeatureType>
  </FeatureTypeList>
</wfs:WFS_Capabilities>"#;

pub const EXCEPTION_REPORT: &str = r#"<ows:ExceptionReport xmlns:ows="http://www.opengis.net/ows/1.1" version="2.0.0">
  <ows:Exception exceptionCode="InvalidParameterValue" locator="typeNames">
    <ows:ExceptionText>Feature type cpc:outlook_temp unknown</ows:ExceptionText>
  </ows:Exception>
</ows:ExceptionReport>"#;

pub const OUTLOOK_POLYGON: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "id": "outlook_temp.1",
      "geometry": {
        "type": "Polygon",
        "coordinates": [[[-88.26, 40.1], [-87.9, 40.1], [-87.9, 40.4], [-88.26, 40.1]]]
      },
      "properties": {"cat": "Above", "prob": 33}
    }
  ]
}"#;

pub const TWO_POINTS: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-100.0, 45.0]}, "properties": {"name": "a"}},
    {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-101.0, 46.0]}, "properties": {"name": "b"}}
  ]
}"#;
