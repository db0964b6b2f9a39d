// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Whole-engine properties, exercised through the public API

use approx::assert_relative_eq;
use nalgebra::Isometry3;
use shedkit_core::{
    CladdingParams, CoveringStyle, EngineConfig, Opening, RidgeAxis, WallName, WallRef, WallVariant,
};
use shedkit_geometry::roof::hipped;
use shedkit_geometry::solver::crest_offset;
use shedkit_geometry::walls::framing::opening_layout;
use shedkit_geometry::walls::panels::{frame_zones, layout_panels};
use shedkit_geometry::walls::wall_specs;
use shedkit_geometry::{
    anchors, build_walls, envelope, generate, layout_caps, solve_rise, ClippingProcessor, LayerStack,
    NoOpenings, Overhangs, PlanRect, RoofInput, RoofLayer, RoofShape, Scene, SyntheticState, WallLayout,
    WallProfile,
};

fn input(config: &EngineConfig, w: f64, d: f64) -> RoofInput<'_> {
    RoofInput {
        rect: PlanRect::new(0.0, w, 0.0, d),
        overhang: Overhangs::uniform(75.0),
        covering: CoveringStyle::Felt,
        ornaments: true,
        config,
    }
}

#[test]
fn test_solver_round_trip_grid() {
    let config = EngineConfig::default();
    let t = config.roof.sheathing;
    for half_span in [300.0, 600.0, 900.0, 1500.0, 2400.0] {
        for eaves in [1500.0, 1850.0, 2100.0] {
            let mut delta = t;
            while delta <= 1500.0 {
                let rise = solve_rise(eaves, eaves + delta, half_span, &config.roof);
                let achieved = crest_offset(rise.rise, half_span, t);
                assert!(
                    (achieved - delta).abs() < 1.0,
                    "half span {} delta {}: got {}",
                    half_span,
                    delta,
                    achieved
                );
                delta += 37.0;
            }
        }
    }
}

#[test]
fn test_layers_never_interpenetrate() {
    let config = EngineConfig::default();
    for clearance in [0.5, 1.0, 2.0] {
        let mut roof = config.roof.clone();
        roof.layer_clearance = clearance;
        let stack = LayerStack::full(&roof);
        let layers: Vec<RoofLayer> = stack.layers().collect();
        for pair in layers.windows(2) {
            let lower = stack.offset(pair[0]).unwrap() + stack.thickness(pair[0]).unwrap() / 2.0;
            let upper = stack.offset(pair[1]).unwrap() - stack.thickness(pair[1]).unwrap() / 2.0;
            assert!(upper > lower, "{:?} meets {:?}", pair[1], pair[0]);
        }
    }
}

#[test]
fn test_cap_tiling_covers_line() {
    let config = EngineConfig::default();
    let caps = &config.caps;
    let mut length = 1.0;
    while length < 6000.0 {
        let segments = layout_caps(length, caps);
        let covered: f64 = segments.iter().map(|s| s.depth).sum::<f64>() + segments.len() as f64 * caps.gap;
        assert!(covered <= length + 1e-9, "overshoot at {}", length);
        assert!(covered >= length - caps.exposed_length, "gap at {}", length);
        length += 13.7;
    }
}

#[test]
fn test_seams_clear_openings_on_real_walls() {
    let config = EngineConfig::default();
    let stud = 50.0;
    for length in [2500.0, 3000.0, 3600.0, 4800.0] {
        let mut x = 100u32;
        while (x + 700) as f64 <= length {
            let state = SyntheticState {
                w: length,
                d: 2000.0,
                variant: WallVariant::Basic,
                openings: vec![Opening::door("d", WallRef::Front, x, 700, 1800)],
                thickness: stud,
                depth: 75.0,
                layout: WallLayout::Standard,
                walls: vec![(WallName::Front, WallProfile::flat(2000.0, 2050.0))],
                cladding: CladdingParams::default(),
            };
            let spec = &wall_specs(&state)[0];
            let openings: Vec<&Opening> = state.openings.iter().collect();
            let zones = frame_zones(spec, &openings, stud);
            let panels = layout_panels(spec.length, &zones, stud, config.walls.panel_max_width);
            assert!(panels.len() > 1);
            for pair in panels.windows(2) {
                let seam = pair[0].1;
                let (a, b) = (x as f64, (x + 700) as f64);
                assert!(seam <= a - stud || seam >= b + stud, "seam {} in door {}..{}", seam, a, b);
            }
            x += 53;
        }
    }
}

#[test]
fn test_envelope_monotonic_for_every_parent_style() {
    let config = EngineConfig::default();
    let crest = 2600.0;
    for wall in WallName::ALL {
        let mut last = [f64::NEG_INFINITY; 3];
        let mut eaves = 1600.0;
        while eaves <= 2500.0 {
            let rise = solve_rise(eaves, crest, 900.0, &config.roof);
            let parents = [
                RoofShape::Apex {
                    ridge: RidgeAxis::Width,
                    rise,
                },
                RoofShape::Hipped { rise },
                RoofShape::pent(WallName::Back, eaves, crest),
            ];
            for (i, parent) in parents.iter().enumerate() {
                let env = envelope(parent, wall, 0.0, true, &config);
                assert!(env.max_crest >= last[i] - 1e-9);
                last[i] = env.max_crest;
            }
            eaves += 50.0;
        }
    }
}

#[test]
fn test_material_cache_shared_across_builds() {
    let config = EngineConfig::default();
    let mut scene = Scene::new();
    let anchor = scene
        .add_transform_node(anchors::ROOF, None, Isometry3::identity())
        .unwrap();
    let shape = RoofShape::Apex {
        ridge: RidgeAxis::Depth,
        rise: solve_rise(1850.0, 2200.0, 900.0, &config.roof),
    };
    shedkit_geometry::build_roof(&mut scene, &input(&config, 1800.0, 2400.0), &shape).unwrap();
    let materials = scene.material_count();
    let osb = scene.material_by_name("osb").unwrap();
    scene.clear_children(anchor);
    shedkit_geometry::build_roof(&mut scene, &input(&config, 1800.0, 2400.0), &shape).unwrap();
    assert_eq!(scene.material_count(), materials);
    assert_eq!(scene.get_or_create_material("osb"), osb);
}

#[test]
fn test_scenario_apex_1800_by_2400() {
    let config = EngineConfig::default();
    let rise = solve_rise(1850.0, 2200.0, 900.0, &config.roof);
    // rise + 18·900/√(900² + rise²) = 350 puts the rise near 333
    assert!(rise.rise > 315.0 && rise.rise < 340.0, "rise {}", rise.rise);
    assert!(rise.residual.abs() < 1.0);
    assert_relative_eq!(rise.angle, rise.rise.atan2(900.0), epsilon = 1e-12);
    assert!(rise.angle.to_degrees() > 19.0 && rise.angle.to_degrees() < 21.0);

    let geometry = generate(
        &input(&config, 1800.0, 2400.0),
        &RoofShape::Apex {
            ridge: RidgeAxis::Depth,
            rise,
        },
    );
    assert_eq!(geometry.summary.truss_count, 5);
    for part in &geometry.parts {
        part.mesh.validate().unwrap();
    }
}

#[test]
fn test_scenario_hipped_ridge_lengths() {
    let config = EngineConfig::default();
    let rise = solve_rise(1850.0, 2300.0, 1200.0, &config.roof);

    let long = generate(&input(&config, 2400.0, 4000.0), &RoofShape::Hipped { rise });
    assert_relative_eq!(long.summary.ridge_length, 1600.0, epsilon = 1e-9);
    assert!(long.summary.ridge_cap_count > 0);
    assert_relative_eq!(
        long.summary.hip_rafter_length.unwrap(),
        hipped::hip_rafter_length(1200.0, rise.rise),
        epsilon = 1e-9
    );

    let square = generate(&input(&config, 2400.0, 2400.0), &RoofShape::Hipped { rise });
    assert_relative_eq!(square.summary.ridge_length, 0.0);
    assert_eq!(square.summary.ridge_cap_count, 0);
    assert!(square.summary.hip_cap_count > 0);
}

#[test]
fn test_scenario_door_on_basic_wall() {
    let config = EngineConfig::default();
    let door = Opening::door("d1", WallRef::Front, 500, 800, 1900);
    let state = SyntheticState {
        w: 2400.0,
        d: 1800.0,
        variant: WallVariant::Basic,
        openings: vec![door.clone()],
        thickness: 50.0,
        depth: 75.0,
        layout: WallLayout::Standard,
        walls: vec![(WallName::Front, WallProfile::flat(2000.0, 2075.0))],
        cladding: CladdingParams {
            visible: false,
            ..Default::default()
        },
    };

    let spec = &wall_specs(&state)[0];
    let layout = opening_layout(spec, &door, 50.0, &config);
    assert_eq!(layout.uprights, [450.0, 1300.0]);

    let mut scene = Scene::new();
    scene
        .add_transform_node(anchors::WALLS, None, Isometry3::identity())
        .unwrap();
    let build = build_walls(&mut scene, &state, &config, &ClippingProcessor::new(), &NoOpenings).unwrap();
    assert_eq!(build.walls.len(), 1);
    assert_eq!(build.walls[0].panels, vec![(0.0, 2400.0)]);
    assert_eq!(build.walls[0].studs, vec![0.0, 2350.0]);
}
