use flora_finder::{
    AttributeMap, EdgePolicy, EvcProperties, FloraError, GeoPoint, LookupConfig, MalformedPolicy,
    RawGeometry, RegionLookupService, SourceRecord,
};
use flora_finder_int_test::test_util::{
    cell_center, cell_name, cleanup, create_grid_context, create_test_context, evc_properties,
    grid_records, random_points, region_name, run_test, square_record, square_ring, GRID_ORIGIN,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[test]
fn test_every_cell_centre_finds_its_cell() {
    run_test(
        || create_test_context(),
        |ctx| {
            let service = ctx.service();
            assert_eq!(service.len(), ctx.side() * ctx.side());

            for row in 0..ctx.side() {
                for col in 0..ctx.side() {
                    let name = region_name(&service, &cell_center(row, col));
                    assert_eq!(name, Some(cell_name(row, col)));
                }
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_points_outside_layer_find_nothing() {
    run_test(
        || create_grid_context(5),
        |ctx| {
            let service = ctx.service();
            let (x0, y0) = GRID_ORIGIN;
            assert!(service.find_region(y0 - 0.5, x0 + 1.5).is_none());
            assert!(service.find_region(y0 + 1.5, x0 + 5.5).is_none());
            assert!(service.find_region(0.0, 0.0).is_none());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_boundary_text_of_found_cell() {
    run_test(
        || create_grid_context(3),
        |ctx| {
            let service = ctx.service();
            let region = service.find_region(-37.5, 145.5).unwrap();
            assert_eq!(
                service.to_boundary_text(region)?,
                "POLYGON ((145 -38, 146 -38, 146 -37, 145 -37, 145 -38))"
            );
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_answers_do_not_depend_on_record_order() {
    run_test(
        || create_grid_context(15),
        |ctx| {
            let service = ctx.service();
            let points = random_points(7, 2000, ctx.side());

            let mut rng = StdRng::seed_from_u64(42);
            for _ in 0..3 {
                let mut records = grid_records(ctx.side());
                records.shuffle(&mut rng);
                let shuffled: RegionLookupService<AttributeMap> =
                    RegionLookupService::from_records(records, &LookupConfig::new())?;

                for point in &points {
                    assert_eq!(
                        region_name(&shuffled, point),
                        region_name(&service, point),
                        "different answer for {}",
                        point
                    );
                }
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_repeated_queries_are_identical() {
    run_test(
        || create_test_context(),
        |ctx| {
            let service = ctx.service();
            for point in random_points(3, 200, ctx.side()) {
                let first = service.locate(&point);
                for _ in 0..5 {
                    assert_eq!(service.locate(&point), first);
                }
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_shared_corner_respects_edge_policy() {
    let records = grid_records(2);
    let (x0, y0) = GRID_ORIGIN;
    let corner = GeoPoint::new(y0 + 1.0, x0 + 1.0);

    let inclusive: RegionLookupService<AttributeMap> =
        RegionLookupService::from_records(records.clone(), &LookupConfig::new()).unwrap();
    assert!(inclusive.find_region_at(&corner).is_some());

    let exclusive: RegionLookupService<AttributeMap> = RegionLookupService::from_records(
        records,
        &LookupConfig::builder().edge_policy(EdgePolicy::Exclusive).build(),
    )
    .unwrap();
    assert!(exclusive.find_region_at(&corner).is_none());
    assert!(exclusive.find_region_at(&cell_center(1, 1)).is_some());
}

#[test]
fn test_typed_evc_lookup() {
    let records = vec![
        SourceRecord::polygon(
            &square_ring(144.0, -38.0, 0.5),
            evc_properties(55, "Plains Grassy Woodland", "Plains Woodlands or Forests")
                .to_attribute_map(),
        ),
        SourceRecord::polygon(
            &square_ring(144.5, -38.0, 0.5),
            evc_properties(132, "Plains Grassland", "Plains Grasslands and Chenopod Shrublands")
                .to_attribute_map(),
        ),
    ];
    let service: RegionLookupService<EvcProperties> =
        RegionLookupService::from_records(records, &LookupConfig::new()).unwrap();

    let region = service.find_region(-37.75, 144.75).unwrap();
    assert_eq!(region.attributes().evc, 132);
    assert_eq!(region.attributes().x_evcname, "Plains Grassland");
    assert_eq!(
        service.to_boundary_text(region).unwrap(),
        "POLYGON ((144.5 -38, 145 -38, 145 -37.5, 144.5 -37.5, 144.5 -38))"
    );
}

#[test]
fn test_malformed_records_abort_or_skip() {
    let records = vec![
        square_record(0.0, 0.0, 1.0, "first"),
        SourceRecord::new(
            RawGeometry::Unreadable {
                reason: "bad shape".to_string(),
            },
            AttributeMap::new(),
        ),
        square_record(1.0, 0.0, 1.0, "second"),
        SourceRecord::new(RawGeometry::Point(vec![0.5, 0.5]), AttributeMap::new()),
    ];

    let err = RegionLookupService::<AttributeMap>::from_records(records.clone(), &LookupConfig::new())
        .unwrap_err();
    assert!(matches!(err, FloraError::MalformedGeometry { record: 1, .. }));
    assert_eq!(err.record(), Some(1));

    let service = RegionLookupService::<AttributeMap>::from_records(
        records,
        &LookupConfig::builder()
            .malformed_policy(MalformedPolicy::Skip)
            .build(),
    )
    .unwrap();
    let report = service.build_report();
    assert_eq!(report.records_read, 4);
    assert_eq!(report.regions_indexed, 2);
    assert_eq!(report.malformed_skipped, 1);
    assert_eq!(report.skipped_non_polygon, 1);
    assert_eq!(region_name(&service, &GeoPoint::new(0.5, 1.5)), Some("second".to_string()));
}

#[test]
fn test_missing_evc_field_fails_build() {
    let records = vec![square_record(0.0, 0.0, 1.0, "no evc fields")];
    let err = RegionLookupService::<EvcProperties>::from_records(records, &LookupConfig::new())
        .unwrap_err();
    assert!(matches!(err, FloraError::InvalidAttributes { record: 0, .. }));
}

#[test]
fn test_concave_region_box_hit_is_not_a_match() {
    // L-shaped region; its bounding box covers the missing upper-right quarter
    let l_shape = SourceRecord::polygon(
        &[
            (0.0, 0.0),
            (2.0, 0.0),
            (2.0, 1.0),
            (1.0, 1.0),
            (1.0, 2.0),
            (0.0, 2.0),
            (0.0, 0.0),
        ],
        AttributeMap::new().with("NAME", "L"),
    );
    let service: RegionLookupService<AttributeMap> =
        RegionLookupService::from_records(vec![l_shape], &LookupConfig::new()).unwrap();

    let notch = GeoPoint::new(1.5, 1.5);
    assert_eq!(service.index().candidates(&notch.to_coordinate()), vec![0]);
    assert!(service.find_region_at(&notch).is_none());
    assert!(service.find_region(0.5, 1.5).is_some());
    assert!(service.find_region(1.5, 0.5).is_some());
}
