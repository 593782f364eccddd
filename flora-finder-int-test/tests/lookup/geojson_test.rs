use flora_finder::{
    AttributeMap, EvcProperties, FloraError, LookupConfig, MalformedPolicy, RegionLookupService,
};
use flora_finder_int_test::test_util::{
    evc_properties, feature_collection, polygon_feature, square_ring,
};
use serde_json::{json, Value};

fn evc_json(evc: i64, name: &str) -> Value {
    let props = evc_properties(evc, name, "Riverine Grassy Woodlands or Forests");
    let mut object = serde_json::Map::new();
    for (key, value) in props.to_attribute_map().iter() {
        let value = match value {
            flora_finder::AttributeValue::Integer(i) => json!(i),
            flora_finder::AttributeValue::Float(f) => json!(f),
            flora_finder::AttributeValue::Text(s) => json!(s),
            flora_finder::AttributeValue::Null => Value::Null,
        };
        object.insert(key.to_string(), value);
    }
    Value::Object(object)
}

#[test]
fn test_geojson_layer_with_mixed_geometry() {
    let doc = feature_collection(vec![
        polygon_feature(&[square_ring(0.0, 0.0, 1.0)], json!({"NAME": "a"})),
        json!({
            "type": "Feature",
            "properties": {"NAME": "multi"},
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [[[[5, 5], [6, 5], [6, 6], [5, 6], [5, 5]]]]
            }
        }),
        json!({
            "type": "Feature",
            "properties": {"NAME": "road"},
            "geometry": {"type": "LineString", "coordinates": [[0, 0], [3, 3]]}
        }),
        polygon_feature(&[square_ring(1.0, 0.0, 1.0)], json!({"NAME": "b"})),
    ]);

    let service: RegionLookupService<AttributeMap> =
        RegionLookupService::from_geojson_str(&doc, &LookupConfig::new()).unwrap();
    assert_eq!(service.len(), 2);
    assert_eq!(service.build_report().skipped_non_polygon, 2);

    let name = |lat: f64, lon: f64| {
        service
            .find_region(lat, lon)
            .and_then(|r| r.attributes().get("NAME"))
            .and_then(|v| v.as_str().map(str::to_string))
    };
    assert_eq!(name(0.5, 0.5), Some("a".to_string()));
    assert_eq!(name(0.5, 1.5), Some("b".to_string()));
    // inside the skipped multipolygon
    assert_eq!(name(5.5, 5.5), None);
}

#[test]
fn test_geojson_polygon_with_hole() {
    let doc = feature_collection(vec![polygon_feature(
        &[square_ring(0.0, 0.0, 10.0), square_ring(4.0, 4.0, 2.0)],
        json!({"NAME": "ring road"}),
    )]);
    let service: RegionLookupService<AttributeMap> =
        RegionLookupService::from_geojson_str(&doc, &LookupConfig::new()).unwrap();

    assert!(service.find_region(5.0, 5.0).is_none());
    assert!(service.find_region(1.0, 1.0).is_some());

    // only the exterior ring is rendered
    let region = service.find_region(1.0, 1.0).unwrap();
    assert_eq!(region.holes().len(), 1);
    assert_eq!(
        service.to_boundary_text(region).unwrap(),
        "POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0))"
    );
}

#[test]
fn test_geojson_typed_evc_layer() {
    let doc = feature_collection(vec![
        polygon_feature(&[square_ring(146.0, -36.5, 0.1)], evc_json(56, "Floodplain Riparian Woodland")),
        polygon_feature(&[square_ring(146.1, -36.5, 0.1)], evc_json(68, "Creekline Grassy Woodland")),
    ]);
    let service: RegionLookupService<EvcProperties> =
        RegionLookupService::from_geojson_str(&doc, &LookupConfig::new()).unwrap();

    let region = service.find_region(-36.45, 146.15).unwrap();
    assert_eq!(region.attributes().evc, 68);
    assert_eq!(region.attributes().x_evcname, "Creekline Grassy Woodland");
    assert_eq!(region.attributes().scale, 25000);
}

#[test]
fn test_geojson_null_geometry() {
    let doc = feature_collection(vec![
        json!({"type": "Feature", "properties": {"NAME": "nothing"}, "geometry": null}),
        polygon_feature(&[square_ring(0.0, 0.0, 1.0)], json!({"NAME": "a"})),
    ]);

    let err = RegionLookupService::<AttributeMap>::from_geojson_str(&doc, &LookupConfig::new())
        .unwrap_err();
    assert!(matches!(err, FloraError::MalformedGeometry { record: 0, .. }));

    let lenient = LookupConfig::builder()
        .malformed_policy(MalformedPolicy::Skip)
        .build();
    let service =
        RegionLookupService::<AttributeMap>::from_geojson_str(&doc, &lenient).unwrap();
    assert_eq!(service.len(), 1);
    assert_eq!(service.build_report().malformed_skipped, 1);
}

#[test]
fn test_geojson_not_a_feature_collection() {
    let doc = json!({"type": "Feature", "properties": {}, "geometry": null}).to_string();
    let err = RegionLookupService::<AttributeMap>::from_geojson_str(&doc, &LookupConfig::new())
        .unwrap_err();
    assert!(matches!(err, FloraError::Source(_)));

    let err = RegionLookupService::<AttributeMap>::from_geojson_str("not json", &LookupConfig::new())
        .unwrap_err();
    assert!(matches!(err, FloraError::Source(_)));
}
