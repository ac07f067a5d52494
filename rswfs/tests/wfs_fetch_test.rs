mod common;

use common::*;
use httpmock::prelude::*;
use rswfs::{ServiceEndpoint, WfsCollect, WfsConfig, WfsError};

fn collector(url: &str) -> WfsCollect {
    WfsCollect::new(ServiceEndpoint::parse(url).unwrap()).unwrap()
}

#[test]
fn test_fetch_selects_first_layer_and_requests_geojson() {
    let server = MockServer::start();

    let capabilities = server.mock(|when, then| {
        when.method(GET)
            .path("/geoserver/wfs")
            .query_param("SERVICE", "WFS")
            .query_param("VERSION", "2.0.0")
            .query_param("REQUEST", "GetCapabilities");
        then.status(200)
            .header("content-type", "application/xml")
            .body(CAPABILITIES_TWO_LAYERS);
    });
    let get_feature = server.mock(|when, then| {
        when.method(GET)
            .path("/geoserver/wfs")
            .query_param("REQUEST", "GetFeature")
            .query_param("VERSION", "2.0.0")
            .query_param("TYPENAMES", "cpc:outlook_temp")
            .query_param("OUTPUTFORMAT", "application/json");
        then.status(200)
            .header("content-type", "application/json")
            .body(OUTLOOK_POLYGON);
    });

    let mut wfs = collector(&server.url("/geoserver/wfs"));
    let collection = wfs.fetch_collection().unwrap();

    capabilities.assert();
    get_feature.assert();
    assert_eq!(collection.features.len(), 1);
    assert_eq!(wfs.selected.as_deref(), Some("cpc:outlook_temp"));
    assert_eq!(
        wfs.capabilities.as_ref().unwrap().type_names(),
        vec!["cpc:outlook_temp", "cpc:outlook_precip"]
    );
    assert!(wfs.content_as_string().unwrap().contains("Above"));
}

#[test]
fn test_layer_selection_is_stable_across_fetches() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetCapabilities");
        then.status(200).body(CAPABILITIES_TWO_LAYERS);
    });
    let get_feature = server.mock(|when, then| {
        when.method(GET)
            .query_param("REQUEST", "GetFeature")
            .query_param("TYPENAMES", "cpc:outlook_temp");
        then.status(200).body(TWO_POINTS);
    });

    let mut wfs = collector(&server.url("/wfs"));
    for _ in 0..3 {
        wfs.fetch().unwrap();
        assert_eq!(wfs.selected.as_deref(), Some("cpc:outlook_temp"));
    }
    assert_eq!(get_feature.hits(), 3);
}

#[test]
fn test_endpoint_output_format_is_overridden_and_extras_pass_through() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetCapabilities");
        then.status(200).body(CAPABILITIES_TWO_LAYERS);
    });
    let get_feature = server.mock(|when, then| {
        when.method(GET)
            .query_param("REQUEST", "GetFeature")
            .query_param("OUTPUTFORMAT", "application/json")
            .query_param("srsname", "EPSG:4326")
            .query_param("propertyname", "cat,prob");
        then.status(200).body(OUTLOOK_POLYGON);
    });

    let url = format!(
        "{}?service=WFS&version=2.0.0&request=GetFeature&typeName=cpc:outlook_temp&outputFormat=GML3&srsname=EPSG:4326&propertyname=cat,prob",
        server.url("/wfs")
    );
    let mut wfs = collector(&url);
    wfs.fetch().unwrap();
    get_feature.assert();
}

#[test]
fn test_negotiated_version_shapes_get_feature() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetCapabilities");
        then.status(200).body(CAPABILITIES_110);
    });
    let get_feature = server.mock(|when, then| {
        when.method(GET)
            .query_param("REQUEST", "GetFeature")
            .query_param("VERSION", "1.1.0")
            .query_param("TYPENAME", "topp:states")
            .query_param("MAXFEATURES", "50");
        then.status(200).body(TWO_POINTS);
    });

    let config = WfsConfig {
        max_features: Some(50),
        ..WfsConfig::default()
    };
    let endpoint = ServiceEndpoint::parse(&server.url("/wfs")).unwrap();
    let mut wfs = WfsCollect::with_config(endpoint, config).unwrap();
    let collection = wfs.fetch_collection().unwrap();

    get_feature.assert();
    assert_eq!(collection.features.len(), 2);
}

#[test]
fn test_empty_layer_list_fails_without_get_feature() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetCapabilities");
        then.status(200).body(CAPABILITIES_EMPTY);
    });
    let get_feature = server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetFeature");
        then.status(200).body(TWO_POINTS);
    });

    let mut wfs = collector(&server.url("/wfs"));
    let err = wfs.fetch().unwrap_err();

    assert!(matches!(err, WfsError::NoFeatureTypes));
    assert!(!err.is_retryable());
    assert_eq!(get_feature.hits(), 0);
    assert!(wfs.content.is_none());
}

#[test]
fn test_unknown_named_layer() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetCapabilities");
        then.status(200).body(CAPABILITIES_TWO_LAYERS);
    });

    let config = WfsConfig {
        type_name: Some("cpc:drought".to_string()),
        ..WfsConfig::default()
    };
    let endpoint = ServiceEndpoint::parse(&server.url("/wfs")).unwrap();
    let mut wfs = WfsCollect::with_config(endpoint, config).unwrap();

    match wfs.fetch() {
        Err(WfsError::UnknownFeatureType { name }) => assert_eq!(name, "cpc:drought"),
        other => panic!("expected UnknownFeatureType, got {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn test_rejected_request_is_protocol_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetCapabilities");
        then.status(400).body(EXCEPTION_REPORT);
    });

    let err = collector(&server.url("/wfs")).fetch().unwrap_err();
    match &err {
        WfsError::Protocol { code, message } => {
            assert_eq!(code, "InvalidParameterValue");
            assert!(message.contains("unknown"));
        }
        other => panic!("expected protocol error, got {:?}", other),
    }
    assert!(!err.is_retryable());
}

#[test]
fn test_exception_report_with_ok_status() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetCapabilities");
        then.status(200).body(CAPABILITIES_TWO_LAYERS);
    });
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetFeature");
        then.status(200).body(EXCEPTION_REPORT);
    });

    let err = collector(&server.url("/wfs")).fetch().unwrap_err();
    assert!(matches!(err, WfsError::Protocol { .. }));
}

#[test]
fn test_server_error_is_retryable() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(503).body("maintenance");
    });

    let err = collector(&server.url("/wfs")).fetch().unwrap_err();
    match &err {
        WfsError::HttpStatus { status, body } => {
            assert_eq!(*status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected HTTP status error, got {:?}", other),
    }
    assert!(err.is_retryable());
}

#[test]
fn test_malformed_geojson() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetCapabilities");
        then.status(200).body(CAPABILITIES_TWO_LAYERS);
    });
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetFeature");
        then.status(200).body("{\"type\": \"FeatureCollection\", \"features\": [");
    });

    let err = collector(&server.url("/wfs")).fetch_collection().unwrap_err();
    assert!(matches!(err, WfsError::MalformedResponse { .. }));
}

#[test]
fn test_malformed_capabilities() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).query_param("REQUEST", "GetCapabilities");
        then.status(200).body("<html><body>Welcome</body></html>");
    });

    let err = collector(&server.url("/wfs")).fetch().unwrap_err();
    assert!(matches!(err, WfsError::MalformedResponse { .. }));
}

#[test]
fn test_unreachable_server_is_connectivity_error() {
    // Nothing listens on port 1
    let err = collector("http://127.0.0.1:1/wfs").fetch().unwrap_err();
    assert!(matches!(err, WfsError::Connectivity(_)));
    assert!(err.is_retryable());
}
