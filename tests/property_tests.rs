//! Property tests for the geometry kernel, solar evaluator and planner.

use geo::{Area, Coord};
use proptest::prelude::*;

use site_planner::geometry::bounds::rectangle;
use site_planner::geometry::buffer::inset_uniform;
use site_planner::geometry::ops::{interiors_overlap, polygon_distance};
use site_planner::geometry::{SitePolygon, Tolerance};
use site_planner::{plan, EngineConfig, Parcel, ParcelInput, PlanRequest, Setbacks, SolarEvaluator, StructureSpec};

fn tol() -> Tolerance {
    Tolerance::for_extent(Tolerance::DEFAULT_RELATIVE, 100.0)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Rotation preserves a footprint's area.
    #[test]
    fn property_rectangle_area_invariant(
        w in 0.5f64..40.0,
        d in 0.5f64..40.0,
        rotation in 0.0f64..360.0,
    ) {
        let footprint = rectangle(Coord { x: 10.0, y: -5.0 }, w, d, rotation);
        prop_assert!((footprint.unsigned_area() - w * d).abs() < 1e-6 * w * d);
    }

    /// PROPERTY: Polygon distance is symmetric, non-negative, and zero
    /// exactly when footprints touch or overlap.
    #[test]
    fn property_polygon_distance_symmetric(
        dx in -20.0f64..20.0,
        dy in -20.0f64..20.0,
        rotation in 0.0f64..180.0,
    ) {
        let a = rectangle(Coord { x: 0.0, y: 0.0 }, 6.0, 4.0, 0.0);
        let b = rectangle(Coord { x: dx, y: dy }, 5.0, 3.0, rotation);
        let ab = polygon_distance(&a, &b, &tol());
        let ba = polygon_distance(&b, &a, &tol());
        prop_assert!(ab >= 0.0);
        prop_assert!((ab - ba).abs() < 1e-9);
        if interiors_overlap(&a, &b, &tol()) {
            prop_assert_eq!(ab, 0.0);
        }
    }

    /// PROPERTY: Insetting further never grows the region.
    #[test]
    fn property_inset_monotone(
        w in 10.0f64..60.0,
        d in 10.0f64..60.0,
        small in 0.0f64..3.0,
        extra in 0.0f64..3.0,
    ) {
        let parcel = SitePolygon::new(&[[0.0, 0.0], [w, 0.0], [w, d], [0.0, d]]).unwrap();
        let near = inset_uniform(&parcel, small, &tol()).unsigned_area();
        let far = inset_uniform(&parcel, small + extra, &tol()).unsigned_area();
        prop_assert!(far <= near + 1e-6);
        prop_assert!(near <= w * d + 1e-6);
    }

    /// PROPERTY: Solar scores stay in [0, 1] for any latitude and rotation.
    #[test]
    fn property_solar_score_bounded(
        latitude in -89.0f64..89.0,
        north_offset in 0.0f64..360.0,
        rotation in -360.0f64..360.0,
        w in 1.0f64..30.0,
        d in 1.0f64..30.0,
    ) {
        let solar = SolarEvaluator::new(latitude, north_offset);
        let score = solar.evaluate(rotation, w, d);
        prop_assert!((0.0..=1.0).contains(&score.score));
        prop_assert!((0.0..=1.0).contains(&score.alignment));
        prop_assert!((0.0..360.0).contains(&score.facade_azimuth_deg));
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 16,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Every returned layout re-validates and accounts for every
    /// requested structure.
    #[test]
    fn property_layouts_are_valid(
        w in 20.0f64..50.0,
        d in 20.0f64..50.0,
        setback in 0.0f64..4.0,
        home_w in 6.0f64..14.0,
        home_d in 6.0f64..12.0,
        clearance in 0.0f64..3.0,
    ) {
        let request = PlanRequest {
            parcel: ParcelInput::rectangle(w, d, 40.0),
            setbacks: Setbacks::uniform(setback),
            structures: vec![
                StructureSpec::new("home", home_w, home_d).with_clearances(clearance, 0.0),
                StructureSpec::new("shed", 3.0, 3.0).with_clearances(clearance, 0.0),
            ],
            config: EngineConfig {
                grid_resolution: 2.0,
                rotation_step_deg: 30.0,
                ..EngineConfig::default()
            },
        };
        let report = plan(&request).unwrap();
        let parcel = Parcel::build(&request.parcel, &request.setbacks, &request.config).unwrap();
        prop_assert!(!report.layouts.is_empty());
        for layout in &report.layouts {
            prop_assert!(layout.verify(&parcel, &request.config).is_ok());
            prop_assert_eq!(layout.placements.len() + layout.infeasible.len(), 2);
            prop_assert!((0.0..=1.0).contains(&layout.score.total));
        }
    }
}
