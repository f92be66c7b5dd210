use std::cell::Cell;

use butterfly_common::{great_circle_distance, Coordinate};
use butterfly_routing::constants::MAXIMAL_EDGE_DURATION;
use butterfly_routing::matrix::{fallback_duration, scale_duration, Annotations, TableCellRef};
use butterfly_routing::phantom::Component;
use butterfly_routing::{
    Bearing, EngineConfig, Error, ErrorResponse, IndexedSegment, ManyToManyTables,
    PhantomCandidates, RoutingAlgorithms, SpatialIndex, TableApi, TableParameters, TablePlugin,
};

const U: u32 = MAXIMAL_EDGE_DURATION;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("butterfly_routing=debug")
        .with_test_writer()
        .try_init();
}

/// Search backend returning canned matrices
struct FakeEngine {
    index: SpatialIndex,
    many_to_many: bool,
    exclude_flags: bool,
    tables: ManyToManyTables,
    searches: Cell<usize>,
}

impl FakeEngine {
    fn new(tables: ManyToManyTables) -> Self {
        Self {
            index: SpatialIndex::build(vec![
                segment(4.35, 50.85, 0),
                segment(4.36, 50.85, 1),
                segment(4.40, 50.90, 2),
            ]),
            many_to_many: true,
            exclude_flags: false,
            tables,
            searches: Cell::new(0),
        }
    }
}

impl RoutingAlgorithms for FakeEngine {
    type Facade = SpatialIndex;

    fn has_many_to_many_search(&self) -> bool {
        self.many_to_many
    }

    fn many_to_many_search(
        &self,
        _phantoms: &[PhantomCandidates],
        _sources: &[usize],
        _destinations: &[usize],
        calculate_distance: bool,
    ) -> ManyToManyTables {
        self.searches.set(self.searches.get() + 1);
        let mut tables = self.tables.clone();
        if !calculate_distance {
            tables.distances.clear();
        }
        tables
    }

    fn facade(&self) -> &SpatialIndex {
        &self.index
    }

    fn has_exclude_flags(&self) -> bool {
        self.exclude_flags
    }
}

fn segment(lon: f64, lat: f64, node: u32) -> IndexedSegment {
    IndexedSegment {
        coords: [lon, lat],
        node,
        bearing: 90.0,
        component: Component::default(),
    }
}

fn on_network() -> Vec<Coordinate> {
    vec![
        Coordinate::new(4.35, 50.85),
        Coordinate::new(4.36, 50.85),
        Coordinate::new(4.40, 50.90),
    ]
}

fn full_tables() -> ManyToManyTables {
    ManyToManyTables {
        durations: vec![0, 100, U, 100, 0, 50, U, 50, 0],
        distances: vec![0.0, 700.0, f32::MAX, 700.0, 0.0, 6000.0, f32::MAX, 6000.0, 0.0],
        energy: vec![],
    }
}

fn expect_err(plugin: &TablePlugin, engine: &FakeEngine, params: &TableParameters) -> Error {
    plugin
        .handle_request(engine, params, &TableApi)
        .expect_err("request should fail")
}

#[test]
fn test_missing_many_to_many_search_is_reported_first() {
    init_tracing();
    let mut engine = FakeEngine::new(full_tables());
    engine.many_to_many = false;

    // Invalid on every other count too
    let params = TableParameters::new(vec![Coordinate::new(999.0, 999.0)]);
    let err = expect_err(&TablePlugin::new(1, None), &engine, &params);

    assert_eq!(err.code(), "NotImplemented");
    assert_eq!(
        err.message(),
        "Many to many search is not implemented for the chosen search algorithm."
    );
    assert_eq!(engine.searches.get(), 0);
}

#[test]
fn test_invalid_options() {
    init_tracing();
    let engine = FakeEngine::new(full_tables());
    let plugin = TablePlugin::new(0, None);

    let single = TableParameters::new(vec![Coordinate::new(4.35, 50.85)]);
    assert_eq!(expect_err(&plugin, &engine, &single).code(), "InvalidOptions");

    let mut coordinates = on_network();
    coordinates[1] = Coordinate::new(4.36, 95.0);
    let err = expect_err(&plugin, &engine, &TableParameters::new(coordinates));
    assert_eq!(err, Error::InvalidOptions("Coordinates are invalid".to_string()));

    let params = TableParameters {
        bearings: vec![Some(Bearing::new(90, 20))],
        ..TableParameters::new(on_network())
    };
    let err = expect_err(&plugin, &engine, &params);
    assert_eq!(
        err,
        Error::InvalidOptions("Number of bearings does not match number of coordinates".to_string())
    );
    assert_eq!(engine.searches.get(), 0);
}

#[test]
fn test_too_big() {
    init_tracing();
    let engine = FakeEngine::new(full_tables());
    let params = TableParameters::new(on_network());

    let err = expect_err(&TablePlugin::new(2, None), &engine, &params);
    assert_eq!(err, Error::TooBig("Too many table coordinates".to_string()));
    assert_eq!(engine.searches.get(), 0);

    // 0 disables the limit
    assert!(TablePlugin::new(0, None)
        .handle_request(&engine, &params, &TableApi)
        .is_ok());

    // The limit is on the product, not on the coordinate count
    let subset = TableParameters {
        sources: vec![0],
        destinations: vec![1, 2],
        ..params
    };
    let engine = FakeEngine::new(ManyToManyTables {
        durations: vec![100, U],
        ..Default::default()
    });
    assert!(TablePlugin::new(2, None)
        .handle_request(&engine, &subset, &TableApi)
        .is_ok());
}

#[test]
fn test_exclude_flags() {
    init_tracing();
    let mut engine = FakeEngine::new(full_tables());
    let params = TableParameters {
        exclude: vec!["toll".to_string()],
        ..TableParameters::new(on_network())
    };
    let plugin = TablePlugin::new(0, None);

    let err = expect_err(&plugin, &engine, &params);
    assert_eq!(err.code(), "NotImplemented");
    assert_eq!(err.message(), "This algorithm does not support exclude flags.");

    engine.exclude_flags = true;
    let err = expect_err(&plugin, &engine, &params);
    assert_eq!(
        err,
        Error::InvalidValue("Exclude flag combination is not supported.".to_string())
    );
}

#[test]
fn test_no_segment_names_every_missing_coordinate() {
    init_tracing();
    let engine = FakeEngine::new(full_tables());

    // ~1.1 km north of the nearest segment
    let mut coordinates = on_network();
    coordinates[1] = Coordinate::new(4.36, 50.86);
    let params = TableParameters {
        radiuses: vec![None, Some(50.0), None],
        ..TableParameters::new(coordinates.clone())
    };
    let err = expect_err(&TablePlugin::new(0, None), &engine, &params);
    assert_eq!(
        err,
        Error::NoSegment("Could not find a matching segment for coordinate 1".to_string())
    );

    // The configured default radius applies where the request sets none
    coordinates[2] = Coordinate::new(4.40, 50.91);
    let err = expect_err(
        &TablePlugin::new(0, Some(100.0)),
        &engine,
        &TableParameters::new(coordinates),
    );
    assert_eq!(
        err.message(),
        "Could not find a matching segment for coordinates 1, 2"
    );
    assert_eq!(engine.searches.get(), 0);
}

#[test]
fn test_no_table_for_requested_annotation() {
    init_tracing();
    let engine = FakeEngine::new(ManyToManyTables {
        durations: full_tables().durations,
        ..Default::default()
    });
    let params = TableParameters {
        annotations: Annotations::DURATION | Annotations::DISTANCE,
        ..TableParameters::new(on_network())
    };
    let err = expect_err(&TablePlugin::new(0, None), &engine, &params);
    assert_eq!(err, Error::NoTable("No table found".to_string()));
    assert_eq!(engine.searches.get(), 1);

    let empty = FakeEngine::new(ManyToManyTables::default());
    let err = expect_err(&TablePlugin::new(0, None), &empty, &TableParameters::new(on_network()));
    assert_eq!(err.code(), "NoTable");
}

#[test]
fn test_plain_table() {
    init_tracing();
    let engine = FakeEngine::new(full_tables());
    let params = TableParameters {
        annotations: Annotations::DURATION | Annotations::DISTANCE,
        ..TableParameters::new(on_network())
    };
    let response = TablePlugin::new(0, None)
        .handle_request(&engine, &params, &TableApi)
        .unwrap();

    assert_eq!(response.code, "Ok");
    let durations = response.durations.unwrap();
    assert_eq!(durations[0], vec![Some(0.0), Some(10.0), None]);
    assert_eq!(durations[1][2], Some(5.0));
    let distances = response.distances.unwrap();
    assert_eq!(distances[1], vec![Some(700.0), Some(0.0), Some(6000.0)]);
    assert_eq!(distances[2][0], None);
    assert!(response.fallback_speed_cells.is_empty());

    let nodes: Vec<u32> = response.sources.iter().map(|w| w.node).collect();
    assert_eq!(nodes, vec![0, 1, 2]);
    assert_eq!(response.destinations[2].location, [4.40, 50.90]);
    assert_eq!(response.sources[0].distance, 0.0);
}

#[test]
fn test_fallback_and_scale() {
    init_tracing();
    let engine = FakeEngine::new(full_tables());
    let speed = 10.0;
    let params = TableParameters {
        fallback_speed: speed,
        scale_factor: 2.0,
        ..TableParameters::new(on_network())
    };
    let result = TablePlugin::new(0, None).compute(&engine, &params).unwrap();

    assert_eq!(
        result.estimated_cells,
        vec![TableCellRef::new(0, 2), TableCellRef::new(2, 0)]
    );

    let coordinates = on_network();
    let crow_fly = great_circle_distance(coordinates[0], coordinates[2]);
    let expected = scale_duration(fallback_duration(crow_fly, speed), 2.0);
    assert_eq!(result.tables.durations[2], expected);
    assert_eq!(result.tables.durations[6], expected);
    assert_eq!(result.tables.durations[1], 200);
    assert!(result.tables.durations.iter().all(|&d| d != U));

    let response = TablePlugin::new(0, None)
        .handle_request(&engine, &params, &TableApi)
        .unwrap();
    assert_eq!(response.fallback_speed_cells, vec![[0, 2], [2, 0]]);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["durations"][0][1], 20.0);
    assert_eq!(json["fallback_speed_cells"][1][0], 2);
}

#[test]
fn test_plugin_from_config() {
    init_tracing();
    let config =
        EngineConfig::from_toml_str("max_locations_distance_table = 2\ndefault_snapping_radius = 10.0")
            .unwrap();
    let plugin = TablePlugin::from_config(&config);
    let engine = FakeEngine::new(full_tables());

    let err = expect_err(&plugin, &engine, &TableParameters::new(on_network()));
    let body = serde_json::to_value(ErrorResponse::from(&err)).unwrap();
    assert_eq!(body["code"], "TooBig");
    assert_eq!(body["message"], "Too many table coordinates");
}
