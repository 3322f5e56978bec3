use chrono::{DateTime, TimeZone, Utc};
use geo::{LineString, MultiPoint};
use tracelayer::{
    AttrValue, EntityId, Feature, InterpolatedLayer, LayerRegistry, LayerSettings,
    LinearInterpolator, OverlayLayer, Point, SampleStore, TimeFrame, TimeLayer, TimeVectorLayer,
    TraceError, VectorLayer,
};
use tracelayer_types::entity::EntityIdScheme;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn layer(
    features: Vec<Feature>,
    settings: LayerSettings,
    registry: &LayerRegistry,
) -> InterpolatedLayer<TimeVectorLayer<VectorLayer>> {
    let base = TimeVectorLayer::new(VectorLayer::from_features("edge", features), settings)
        .expect("Failed to create base layer");
    InterpolatedLayer::new(base, registry).expect("Failed to create interpolated layer")
}

/// Test 1: Empty source layer
#[test]
fn test_empty_source_layer() {
    init_logging();
    let registry = LayerRegistry::new();
    let base = TimeVectorLayer::new(
        VectorLayer::new("empty", tracelayer::GeometryType::Point),
        LayerSettings::new("t").with_id_attribute("id"),
    )
    .expect("Failed to create base layer");
    let mut layer = InterpolatedLayer::new(base, &registry).expect("Failed to create layer");

    assert!(layer.store().is_empty());
    layer
        .set_time_restriction(at(0), TimeFrame::seconds(10))
        .expect("Failed to move window");
    assert!(layer.overlay_points().is_empty());
    assert_eq!(layer.overlay().stats().repaint_count, 0);
}

/// Test 2: Mixed geometries in a point layer
#[test]
fn test_non_point_geometries_are_skipped() {
    init_logging();
    let registry = LayerRegistry::new();
    let features = vec![
        Feature::point(1, Point::new(0.0, 0.0))
            .with_attribute("id", "A")
            .with_attribute("t", 0_i64),
        Feature::point(2, Point::new(10.0, 0.0))
            .with_attribute("id", "A")
            .with_attribute("t", 10_i64),
        Feature::new(3)
            .with_geometry(MultiPoint::from(vec![(3.0, 3.0)]))
            .with_attribute("id", "A")
            .with_attribute("t", 3_i64),
        Feature::new(4)
            .with_geometry(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]))
            .with_attribute("id", "C")
            .with_attribute("t", 4_i64),
    ];
    let mut layer = layer(
        features,
        LayerSettings::new("t").with_id_attribute("id"),
        &registry,
    );

    assert_eq!(layer.store().sample_count(), 2);
    assert_eq!(layer.store().stats().skipped_geometry, 2);

    // C has no samples, so only A gets a stand-in.
    layer
        .set_time_restriction(at(5), TimeFrame::seconds(1))
        .expect("Failed to move window");
    assert_eq!(layer.overlay_points(), vec![Point::new(5.0, 0.0)]);
}

/// Test 3: Null id values
#[test]
fn test_null_ids_are_skipped() {
    init_logging();
    let scheme = EntityIdScheme::PerAttribute("id".into());
    let features = vec![
        Feature::point(1, Point::new(0.0, 0.0))
            .with_attribute("id", AttrValue::Null)
            .with_attribute("t", 0_i64),
        Feature::point(2, Point::new(1.0, 1.0))
            .with_attribute("id", 7_i64)
            .with_attribute("t", 0_i64),
    ];
    let store = SampleStore::build(&features, &scheme, "t", "%Y-%m-%d %H:%M:%S")
        .expect("Failed to build store");

    assert_eq!(store.entity_count(), 1);
    assert_eq!(store.stats().skipped_null_id, 1);
    assert!(store.universe().contains(&EntityId::Int(7)));
}

/// Test 4: Integral float ids name the same entity as integers
#[test]
fn test_float_and_integer_ids_merge() {
    init_logging();
    let scheme = EntityIdScheme::PerAttribute("id".into());
    let features = vec![
        Feature::point(1, Point::new(0.0, 0.0))
            .with_attribute("id", 7_i64)
            .with_attribute("t", 0_i64),
        Feature::point(2, Point::new(8.0, 8.0))
            .with_attribute("id", 7.0_f64)
            .with_attribute("t", 8_i64),
    ];
    let store = SampleStore::build(&features, &scheme, "t", "%Y-%m-%d %H:%M:%S")
        .expect("Failed to build store");
    let interp = LinearInterpolator::new(store);

    assert_eq!(
        interp.query(&EntityId::Int(7), 2, 3),
        Some(Point::new(2.0, 2.0))
    );
}

/// Test 5: Several samples at the same instant
#[test]
fn test_duplicate_timestamps_keep_arrival_order() {
    init_logging();
    let scheme = EntityIdScheme::SingleStream;
    let features = vec![
        Feature::point(1, Point::new(0.0, 0.0)).with_attribute("t", 0_i64),
        Feature::point(2, Point::new(1.0, 1.0)).with_attribute("t", 5_i64),
        Feature::point(3, Point::new(2.0, 2.0)).with_attribute("t", 5_i64),
        Feature::point(4, Point::new(12.0, 2.0)).with_attribute("t", 10_i64),
    ];
    let store = SampleStore::build(&features, &scheme, "t", "%Y-%m-%d %H:%M:%S")
        .expect("Failed to build store");
    let interp = LinearInterpolator::new(store);

    assert_eq!(
        interp.query(&EntityId::Default, 5, 5),
        Some(Point::new(2.0, 2.0))
    );
    assert_eq!(
        interp.query(&EntityId::Default, 4, 5),
        Some(Point::new(0.8, 0.8))
    );
    assert_eq!(
        interp.query(&EntityId::Default, 6, 7),
        Some(Point::new(4.0, 2.0))
    );
}

/// Test 6: Zero-width frame
#[test]
fn test_zero_width_frame() {
    init_logging();
    let registry = LayerRegistry::new();
    let features = vec![
        Feature::point(1, Point::new(0.0, 0.0))
            .with_attribute("id", "A")
            .with_attribute("t", 0_i64),
        Feature::point(2, Point::new(10.0, 10.0))
            .with_attribute("id", "A")
            .with_attribute("t", 10_i64),
    ];
    let mut layer = layer(
        features,
        LayerSettings::new("t").with_id_attribute("id"),
        &registry,
    );

    // An empty window shows nothing, so A is interpolated even at a sample time.
    layer
        .set_time_restriction(at(0), TimeFrame::seconds(0))
        .expect("Failed to move window");
    assert!(layer.visible_features().is_empty());
    assert_eq!(layer.overlay_points(), vec![Point::new(0.0, 0.0)]);
}

/// Test 7: Negative frames are rejected before the overlay is touched
#[test]
fn test_negative_frame_rejected() {
    init_logging();
    let registry = LayerRegistry::new();
    let features = vec![
        Feature::point(1, Point::new(0.0, 0.0))
            .with_attribute("id", "A")
            .with_attribute("t", 0_i64),
    ];
    let mut layer = layer(
        features,
        LayerSettings::new("t").with_id_attribute("id"),
        &registry,
    );

    let err = layer
        .set_time_restriction(at(0), TimeFrame::seconds(-5))
        .unwrap_err();
    assert!(matches!(err, TraceError::InvalidInput(_)));
    assert_eq!(layer.overlay().stats().operations_count, 0);
}

/// Test 8: Overlay removed from the registry behind the layer's back
#[test]
fn test_overlay_removed_externally() {
    init_logging();
    let registry = LayerRegistry::new();
    let features = vec![
        Feature::point(1, Point::new(0.0, 0.0))
            .with_attribute("id", "A")
            .with_attribute("t", 0_i64),
    ];
    let mut layer = layer(
        features,
        LayerSettings::new("t").with_id_attribute("id"),
        &registry,
    );

    assert!(registry.remove_map_layer(layer.overlay_layer_id()));

    // The layer keeps its own handle and keeps working.
    layer
        .set_time_restriction(at(3), TimeFrame::seconds(1))
        .expect("Failed to move window");
    assert_eq!(layer.overlay_points(), vec![Point::new(0.0, 0.0)]);

    drop(layer);
    assert!(registry.is_empty());
}

/// Test 9: Disabled time filter shows everything
#[test]
fn test_disabled_layer_draws_nothing() {
    init_logging();
    let registry = LayerRegistry::new();
    let features = vec![
        Feature::point(1, Point::new(0.0, 0.0))
            .with_attribute("id", "A")
            .with_attribute("t", 0_i64),
        Feature::point(2, Point::new(1.0, 0.0))
            .with_attribute("id", "B")
            .with_attribute("t", 50_i64),
    ];
    let mut settings = LayerSettings::new("t").with_id_attribute("id");
    settings.enabled = false;
    let mut layer = layer(features, settings, &registry);

    layer
        .set_time_restriction(at(1000), TimeFrame::seconds(1))
        .expect("Failed to move window");
    assert_eq!(layer.visible_features().len(), 2);
    assert!(layer.overlay_points().is_empty());
}

/// Test 10: Large layer
#[test]
fn test_many_entities() {
    init_logging();
    let registry = LayerRegistry::new();
    let mut features = Vec::new();
    for entity in 0..200_i64 {
        for step in 0..10_i64 {
            let fid = entity * 10 + step;
            features.push(
                Feature::point(fid, Point::new(step as f64 * 10.0, entity as f64))
                    .with_attribute("id", entity)
                    .with_attribute("t", step * 100),
            );
        }
    }
    let mut layer = layer(
        features,
        LayerSettings::new("t").with_id_attribute("id"),
        &registry,
    );
    assert_eq!(layer.store().entity_count(), 200);

    layer
        .set_time_restriction(at(250), TimeFrame::seconds(10))
        .expect("Failed to move window");
    let points = layer.overlay_points();
    assert_eq!(points.len(), 200);
    assert!(points.iter().all(|p| p.x() == 25.0));
}

/// Test 11: Non-finite source positions
#[test]
fn test_non_finite_positions_are_skipped() {
    init_logging();
    let registry = LayerRegistry::new();
    let features = vec![
        Feature::point(1, Point::new(0.0, 0.0))
            .with_attribute("id", "A")
            .with_attribute("t", 0_i64),
        Feature::point(2, Point::new(10.0, 10.0))
            .with_attribute("id", "A")
            .with_attribute("t", 10_i64),
        Feature::point(3, Point::new(f64::NAN, 0.0))
            .with_attribute("id", "B")
            .with_attribute("t", 5_i64),
        Feature::point(4, Point::new(5.0, 5.0))
            .with_attribute("id", "B")
            .with_attribute("t", 20_i64),
    ];
    let mut layer = layer(
        features,
        LayerSettings::new("t").with_id_attribute("id"),
        &registry,
    );
    assert_eq!(layer.store().stats().skipped_non_finite, 1);
    assert_eq!(layer.store().sample_count(), 3);

    // B clamps to its only usable sample.
    layer
        .set_time_restriction(at(3), TimeFrame::seconds(1))
        .expect("Failed to move window");
    assert_eq!(
        layer.overlay_points(),
        vec![Point::new(3.0, 3.0), Point::new(5.0, 5.0)]
    );

    layer
        .set_time_restriction(at(4), TimeFrame::seconds(1))
        .expect("Failed to move window");
    assert!(!layer.render_sync().is_poisoned());
    assert_eq!(
        layer.overlay_points(),
        vec![Point::new(4.0, 4.0), Point::new(5.0, 5.0)]
    );
}
