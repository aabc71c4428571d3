//! End-to-end planning scenarios
//!
//! Each test builds a request, runs the full planner and checks the report:
//! placements, feasibility records, determinism and re-validation.

use site_planner::geometry::angle::angular_distance_deg;
use site_planner::parcel::{ExclusionInput, ExclusionKind};
use site_planner::search::SearchBudget;
use site_planner::validation::RejectionKind;
use site_planner::{
    plan, EngineConfig, Parcel, ParcelInput, PlanRequest, PlannerError, RotationPolicy, Setbacks,
    StructureSpec,
};

fn request(structures: Vec<StructureSpec>) -> PlanRequest {
    PlanRequest {
        parcel: ParcelInput::rectangle(40.0, 30.0, 40.0),
        setbacks: Setbacks::uniform(3.0),
        structures,
        config: EngineConfig::default(),
    }
}

/// Every returned layout passes the validator again, placement by placement
fn assert_layouts_verify(request: &PlanRequest) {
    let report = plan(request).unwrap();
    let parcel = Parcel::build(&request.parcel, &request.setbacks, &request.config).unwrap();
    for layout in &report.layouts {
        if let Err(violation) = layout.verify(&parcel, &request.config) {
            panic!("{} layout failed re-validation: {}", layout.ordering, violation);
        }
    }
}

// ============================================================================
// Reference scenario
// ============================================================================

#[test]
fn test_single_structure_on_reference_lot() {
    let report = plan(&request(vec![StructureSpec::new("home", 10.0, 8.0)])).unwrap();
    let best = report.best().unwrap();

    assert_eq!(best.placements.len(), 1);
    assert!(best.infeasible.is_empty());
    assert!((report.buildable_area - 34.0 * 24.0).abs() < 1e-6);

    let home = &best.placements[0];
    for vertex in home.footprint.vertices() {
        assert!(vertex.x >= 3.0 - 1e-9 && vertex.x <= 37.0 + 1e-9);
        assert!(vertex.y >= 3.0 - 1e-9 && vertex.y <= 27.0 + 1e-9);
    }
    // Long facade faces due south at 40°N
    assert!(angular_distance_deg(home.solar.facade_azimuth_deg, 180.0) < 1e-6);
    assert!(home.solar.score > 0.0 && home.solar.score <= 1.0);
}

#[test]
fn test_southern_hemisphere_faces_north() {
    let mut request = request(vec![StructureSpec::new("home", 10.0, 8.0)]);
    request.parcel.latitude = -35.0;
    let report = plan(&request).unwrap();
    let home = &report.best().unwrap().placements[0];
    assert!(angular_distance_deg(home.solar.facade_azimuth_deg, 0.0) < 1e-6);
}

#[test]
fn test_setbacks_consume_parcel() {
    let mut request = request(vec![StructureSpec::new("home", 10.0, 8.0)]);
    request.setbacks = Setbacks::uniform(20.0);
    assert!(matches!(plan(&request), Err(PlannerError::NoBuildableArea)));
}

#[test]
fn test_malformed_boundary_rejected() {
    let mut request = request(vec![StructureSpec::new("home", 10.0, 8.0)]);
    request.parcel.boundary = vec![[0.0, 0.0], [10.0, 10.0], [10.0, 0.0], [0.0, 10.0]];
    assert!(matches!(
        plan(&request),
        Err(PlannerError::InvalidParcelGeometry(_))
    ));
}

#[test]
fn test_boundary_pinched_within_tolerance_rejected() {
    let mut request = request(vec![StructureSpec::new("home", 10.0, 8.0)]);
    request.parcel.boundary = vec![[0.0, 0.0], [40.0, 0.0], [40.0, 30.0], [20.0, 1e-9], [0.0, 30.0]];
    assert!(matches!(
        plan(&request),
        Err(PlannerError::InvalidParcelGeometry(_))
    ));
}

// ============================================================================
// Feasibility reporting
// ============================================================================

#[test]
fn test_oversized_structure_reported_not_fatal() {
    let report = plan(&request(vec![
        StructureSpec::new("home", 10.0, 8.0),
        StructureSpec::new("warehouse", 36.0, 26.0),
    ]))
    .unwrap();
    let best = report.best().unwrap();

    assert!(best.placement("home").is_some());
    let warehouse = best
        .infeasible
        .iter()
        .find(|i| i.spec_id == "warehouse")
        .unwrap();
    assert_eq!(warehouse.reason, RejectionKind::FootprintExceedsBuildableArea);
    assert!(!best.mandatory_satisfied());
    assert!(best.notes.iter().any(|n| n.contains("warehouse")));
}

#[test]
fn test_every_structure_accounted_for() {
    let specs = vec![
        StructureSpec::new("a", 12.0, 10.0).with_clearances(3.0, 0.0),
        StructureSpec::new("b", 12.0, 10.0).with_clearances(3.0, 0.0),
        StructureSpec::new("c", 12.0, 10.0).with_clearances(3.0, 0.0),
        StructureSpec::new("d", 12.0, 10.0).with_clearances(3.0, 0.0),
    ];
    let report = plan(&request(specs)).unwrap();
    for layout in &report.layouts {
        assert_eq!(layout.placements.len() + layout.infeasible.len(), 4);
    }
}

#[test]
fn test_exclusion_is_avoided() {
    let mut request = request(vec![StructureSpec::new("studio", 6.0, 6.0)]);
    request.parcel.exclusions.push(ExclusionInput {
        id: "pond".into(),
        kind: ExclusionKind::Other,
        vertices: vec![[10.0, 0.0], [30.0, 0.0], [30.0, 30.0], [10.0, 30.0]],
    });
    let report = plan(&request).unwrap();
    let studio = &report.best().unwrap().placements[0];
    let xs: Vec<f64> = studio.footprint.vertices().iter().map(|v| v.x).collect();
    let max_x = xs.iter().cloned().fold(f64::MIN, f64::max);
    let min_x = xs.iter().cloned().fold(f64::MAX, f64::min);
    assert!(max_x <= 10.0 + 1e-6 || min_x >= 30.0 - 1e-6);
    assert_layouts_verify(&request);
}

#[test]
fn test_budget_truncation_is_graceful() {
    let mut request = request(vec![
        StructureSpec::new("home", 10.0, 8.0),
        StructureSpec::new("shed", 3.0, 3.0),
    ]);
    request.config.budget = SearchBudget::default().with_max_candidates(100);
    let report = plan(&request).unwrap();

    for layout in &report.layouts {
        assert!(layout.budget_truncated);
        assert!(layout.candidates_evaluated <= 100);
        assert_eq!(layout.placements.len() + layout.infeasible.len(), 2);
    }
}

// ============================================================================
// Rotation and determinism
// ============================================================================

#[test]
fn test_fixed_angle_reported_exactly() {
    let spec = StructureSpec::new("pavilion", 8.0, 6.0)
        .with_rotation(RotationPolicy::FixedAngle { degrees: 217.5 });
    let report = plan(&request(vec![spec])).unwrap();
    let pavilion = &report.best().unwrap().placements[0];
    assert_eq!(pavilion.rotation_deg, 217.5);
}

#[test]
fn test_identical_requests_serialize_identically() {
    let specs = vec![
        StructureSpec::new("home", 12.0, 9.0).with_clearances(3.0, 0.0).with_height(7.0),
        StructureSpec::new("garage", 6.0, 6.0).with_rotation(RotationPolicy::FixedToParcelEdge),
        StructureSpec::new("shed", 3.0, 3.0).with_adjacency("garage", 8.0),
    ];
    let request = request(specs);
    let first = plan(&request).unwrap().to_json(false).unwrap();
    let second = plan(&request).unwrap().to_json(false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_clockwise_boundary_matches_counter_clockwise() {
    let ccw = request(vec![StructureSpec::new("home", 10.0, 8.0)]);
    let mut cw = ccw.clone();
    cw.parcel.boundary.reverse();
    // Reversed ring edges: top, right, bottom, left
    cw.setbacks = Setbacks::PerEdge {
        distances: vec![1.0, 2.0, 3.0, 4.0],
    };
    let mut ccw = ccw;
    // The same sides in counter-clockwise order: bottom, right, top, left
    ccw.setbacks = Setbacks::PerEdge {
        distances: vec![3.0, 2.0, 1.0, 4.0],
    };

    let a = plan(&ccw).unwrap();
    let b = plan(&cw).unwrap();
    assert!((a.buildable_area - b.buildable_area).abs() < 1e-6);
    assert!((a.buildable_area - 34.0 * 26.0).abs() < 1e-6);
}

// ============================================================================
// Sample request
// ============================================================================

#[test]
fn test_sample_request_plans() {
    let request = PlanRequest::from_toml_str(include_str!("../data/requests/suburban_lot.toml")).unwrap();
    let report = plan(&request).unwrap();
    let best = report.best().unwrap();

    assert!(best.placement("home").is_some());
    assert!(best.placement("garage").is_some());
    assert!(best.mandatory_satisfied());
    assert!(best.summary.lot_coverage <= 0.4);
    assert!(report.layouts.len() <= 3);
    assert_eq!(report.energy_inputs().len(), best.placements.len());

    for pair in report.layouts.windows(2) {
        assert!(pair[0].score.total >= pair[1].score.total);
    }
    assert_layouts_verify(&request);
}
