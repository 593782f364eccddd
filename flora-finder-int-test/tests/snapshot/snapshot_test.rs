//! Snapshot integration tests.
//!
//! A restored service must answer every query exactly like the service that
//! was saved, without access to the source records.

use flora_finder::{
    AttributeMap, EdgePolicy, EvcProperties, FloraError, LookupConfig, RegionLookupService,
    SourceRecord,
};
use flora_finder_int_test::test_util::{
    cleanup, create_grid_context, create_test_context, evc_properties, random_points,
    region_name, run_test, square_ring,
};
use std::fs;

#[test]
fn test_restored_service_answers_identically() {
    run_test(
        || create_grid_context(25),
        |ctx| {
            let service = ctx.service();
            let path = ctx.snapshot_path("grid");
            service.save_snapshot(&path)?;

            let restored: RegionLookupService<AttributeMap> =
                RegionLookupService::from_snapshot_file(&path, &LookupConfig::new())?;
            assert_eq!(restored.len(), service.len());
            assert_eq!(restored.index().regions(), service.index().regions());

            for point in random_points(19, 3000, ctx.side()) {
                assert_eq!(restored.locate(&point), service.locate(&point));
                assert_eq!(region_name(&restored, &point), region_name(&service, &point));
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_boundary_text_survives_snapshot() {
    run_test(
        || create_test_context(),
        |ctx| {
            let service = ctx.service();
            let path = ctx.snapshot_path("text");
            service.save_snapshot(&path)?;
            let restored: RegionLookupService<AttributeMap> =
                RegionLookupService::from_snapshot_file(&path, &LookupConfig::new())?;

            for point in random_points(23, 200, ctx.side()) {
                let before = service.find_region_at(&point).map(|r| r.to_boundary_text());
                let after = restored.find_region_at(&point).map(|r| r.to_boundary_text());
                match (before, after) {
                    (Some(a), Some(b)) => assert_eq!(a?, b?),
                    (None, None) => {}
                    other => panic!("services disagree at {}: {:?}", point, other),
                }
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_typed_snapshot() {
    run_test(
        || create_test_context(),
        |ctx| {
            let records = vec![
                SourceRecord::polygon(
                    &square_ring(147.0, -37.0, 0.25),
                    evc_properties(175, "Grassy Woodland", "Dry Forests").to_attribute_map(),
                ),
                SourceRecord::polygon(
                    &square_ring(147.25, -37.0, 0.25),
                    evc_properties(23, "Herb-rich Foothill Forest", "Herb-rich Woodlands")
                        .to_attribute_map(),
                ),
            ];
            let service: RegionLookupService<EvcProperties> =
                RegionLookupService::from_records(records, &LookupConfig::new())?;
            let path = ctx.snapshot_path("evc");
            service.save_snapshot(&path)?;

            let restored: RegionLookupService<EvcProperties> =
                RegionLookupService::from_snapshot_file(&path, &LookupConfig::new())?;
            let region = restored.find_region(-36.9, 147.3).unwrap();
            assert_eq!(region.attributes().evc, 23);
            assert_eq!(region.attributes(), service.find_region(-36.9, 147.3).unwrap().attributes());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_edge_policy_is_chosen_at_load() {
    run_test(
        || create_grid_context(2),
        |ctx| {
            let path = ctx.snapshot_path("policy");
            ctx.service().save_snapshot(&path)?;

            let exclusive = LookupConfig::builder().edge_policy(EdgePolicy::Exclusive).build();
            let restored: RegionLookupService<AttributeMap> =
                RegionLookupService::from_snapshot_file(&path, &exclusive)?;
            assert_eq!(restored.index().edge_policy(), EdgePolicy::Exclusive);
            // shared corner of all four cells
            assert!(restored.find_region(-38.0, 145.0).is_none());
            assert!(ctx.service().find_region(-38.0, 145.0).is_some());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_corrupted_snapshot_is_rejected() {
    run_test(
        || create_grid_context(4),
        |ctx| {
            let path = ctx.snapshot_path("corrupt");
            ctx.service().save_snapshot(&path)?;

            let mut bytes = fs::read(&path)?;
            let middle = bytes.len() / 2;
            bytes[middle] = bytes[middle].wrapping_add(1);
            fs::write(&path, &bytes)?;

            let result = RegionLookupService::<AttributeMap>::from_snapshot_file(&path, &LookupConfig::new());
            assert!(matches!(result, Err(FloraError::Snapshot(_))));

            bytes.truncate(middle);
            fs::write(&path, &bytes)?;
            let result = RegionLookupService::<AttributeMap>::from_snapshot_file(&path, &LookupConfig::new());
            assert!(matches!(result, Err(FloraError::Snapshot(_))));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_resave_replaces_previous_snapshot() {
    run_test(
        || create_grid_context(3),
        |ctx| {
            let path = ctx.snapshot_path("layer");
            ctx.service().save_snapshot(&path)?;

            let smaller: RegionLookupService<AttributeMap> = RegionLookupService::from_records(
                vec![SourceRecord::polygon(&square_ring(0.0, 0.0, 1.0), AttributeMap::new())],
                &LookupConfig::new(),
            )?;
            smaller.save_snapshot(&path)?;

            let restored: RegionLookupService<AttributeMap> =
                RegionLookupService::from_snapshot_file(&path, &LookupConfig::new())?;
            assert_eq!(restored.len(), 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
