use flora_finder_int_test::test_util::{
    cleanup, create_grid_context, random_points, region_name, run_test,
};
use std::thread;

#[test]
fn test_scoped_threads_share_one_service() {
    run_test(
        || create_grid_context(30),
        |ctx| {
            let service = ctx.service();
            let points = random_points(11, 4000, ctx.side());
            let expected: Vec<Option<String>> =
                points.iter().map(|p| region_name(&service, p)).collect();

            thread::scope(|s| {
                for chunk in 0..8 {
                    let service = &service;
                    let points = &points;
                    let expected = &expected;
                    s.spawn(move || {
                        for (i, point) in points.iter().enumerate().skip(chunk).step_by(8) {
                            assert_eq!(region_name(service, point), expected[i]);
                        }
                    });
                }
            });
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_cloned_handles_on_spawned_threads() {
    run_test(
        || create_grid_context(10),
        |ctx| {
            let points = random_points(5, 500, ctx.side());
            let expected: Vec<Option<String>> = points
                .iter()
                .map(|p| region_name(&ctx.service(), p))
                .collect();

            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let service = ctx.service();
                    let points = points.clone();
                    thread::spawn(move || {
                        points
                            .iter()
                            .map(|p| region_name(&service, p))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            for handle in handles {
                let answers = handle.join().expect("lookup thread panicked");
                assert_eq!(answers, expected);
            }
            log::info!("4 threads answered {} lookups each", points.len());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}
