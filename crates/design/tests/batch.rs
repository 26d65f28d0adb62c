use approx::assert_relative_eq;
use stormline_design::{
    CatchmentInput, ChannelShape, DesignConfig, DesignStatus, Project, Rainfall, ReferenceData,
    run_batch,
};

fn catchment(id: &str, surface_type: &str, area: f64) -> CatchmentInput {
    CatchmentInput {
        id: id.to_owned(),
        area,
        average_slope: 1.5,
        flow_path_length: 80.0,
        surface_type: surface_type.to_owned(),
        sub_areas: Vec::new(),
        return_period: 10,
        rainfall: Rainfall::Idf,
        temporary_design: false,
    }
}

#[test]
fn one_bad_catchment_does_not_stop_the_batch() {
    let catchments = vec![
        catchment("C1", "asphalt", 3000.0),
        catchment("C2", "brick", 1800.0),
        catchment("C3", "no_such_surface", 2500.0),
        catchment("C4", "grassland_heavy_steep", 9000.0),
        catchment("C5", "roof", 600.0),
    ];

    let results = run_batch(
        &ReferenceData::builtin(),
        &DesignConfig::default(),
        &catchments,
        &[],
    );

    assert_eq!(results.len(), catchments.len());
    let unprocessed: Vec<_> = results.iter().filter(|r| !r.processed).collect();
    assert_eq!(unprocessed.len(), 1);

    let failed = unprocessed[0];
    assert_eq!(failed.catchment_id, "C3");
    assert_eq!(failed.peak_flow, 0.0);
    assert!(
        failed
            .processing_error
            .as_deref()
            .unwrap()
            .contains("no_such_surface")
    );

    for (input, result) in catchments.iter().zip(&results) {
        assert_eq!(input.id, result.catchment_id);
    }
}

#[test]
fn selected_channels_are_never_undersized() {
    let reference = ReferenceData::builtin();
    let config = DesignConfig::default();
    let catchments: Vec<_> = [200.0, 1500.0, 6000.0, 20_000.0, 45_000.0]
        .into_iter()
        .enumerate()
        .map(|(i, area)| catchment(&format!("C{i}"), "concrete", area))
        .collect();

    for result in run_batch(&reference, &config, &catchments, &[]) {
        assert!(result.processed, "{:?}", result.processing_error);
        assert!(
            result.utilization <= 1.0,
            "{} utilization {}",
            result.catchment_id,
            result.utilization
        );
        assert!(result.selected_width >= result.required_width);
        assert_relative_eq!(result.utilization, result.peak_flow / result.capacity);
    }
}

#[test]
fn project_file_runs_end_to_end() {
    let project = Project::from_toml_str(
        r#"
        [config]
        parallel = false

        [reference]
        u_channel_sizes = [
            { size_mm = 600, label = "U600" },
            { size_mm = 300, label = "U300" },
            { size_mm = 450, label = "U450" },
        ]

        [[catchments]]
        id = "north"
        area = 2400.0
        average_slope = 3.0
        flow_path_length = 70.0
        surface_type = "asphalt"
        return_period = 50

        [[catchments]]
        id = "south"
        area = 8000.0
        average_slope = 1.0
        flow_path_length = 160.0
        surface_type = "grassland_sandy_flat"
        return_period = 5
        temporary_design = true

        [[catchments]]
        id = "east"
        area = 1000.0
        average_slope = 2.0
        flow_path_length = 40.0
        surface_type = "concrete"
        return_period = 25

        [[channels]]
        id = "N1"
        catchment_id = "north"
        shape = "u_channel"
        length = 90.0
        terrain_gradient = 0.02

        [[channels]]
        id = "S1"
        catchment_id = "south"
        length = 120.0
        terrain_gradient = 0.008
        material = "earth"
        upstream = ["N1"]
        "#,
    )
    .unwrap();

    assert_eq!(project.reference.u_channel_sizes[0].size_mm, 300);

    let report = project.run();
    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.failed, 1);

    let north = &report.results[0];
    assert_eq!(north.channel_shape, ChannelShape::UChannel);
    assert!(["U300", "U450", "U600"].contains(&north.selected_size.as_str()));
    assert!(north.intensity.uplift_applied);

    let south = &report.results[1];
    assert!(!south.intensity.uplift_applied);
    assert!(south.time_of_concentration.upstream > 0.0);
    assert_eq!(south.material, "earth");

    let east = &report.results[2];
    assert!(!east.processed);
    assert!(
        east.processing_error
            .as_deref()
            .unwrap()
            .contains("25-year return period")
    );
    assert_eq!(east.status, DesignStatus::NotOk);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"][0]["catchment_id"], "north");
    assert_eq!(json["summary"]["failed"], 1);
}

#[test]
fn demo_site_designs_every_catchment() {
    let project = Project::from_toml_str(include_str!("../../../demos/site.toml")).unwrap();
    let report = project.run();

    assert_eq!(report.summary.total, 3);
    assert_eq!(report.summary.processed, 3);
    assert_eq!(report.summary.failed, 0);

    let ids: Vec<&str> = report.results.iter().map(|r| r.catchment_id.as_str()).collect();
    assert_eq!(ids, ["north-car-park", "east-verge", "site-compound"]);

    let car_park = &report.results[0];
    assert_eq!(car_park.channel_shape, ChannelShape::UChannel);
    assert!(car_park.utilization <= 1.0 || car_park.warning.is_some());

    let compound = &report.results[2];
    assert!(!compound.intensity.uplift_applied);
    assert_relative_eq!(compound.intensity.design, 75.0);
    assert_relative_eq!(compound.channel_gradient, 0.008);
}
