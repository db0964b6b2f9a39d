// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Timber base frame.
//!
//! The floor deck top is `y = 0`; the walls stand on it. Perimeter bearers
//! and the joists between them hang below the deck.

use crate::error::Result;
use crate::mesh::Mesh;
use crate::primitives::aabb_mesh;
use crate::roof::fixed_stations;
use crate::scene::{anchors, Layer, NodeKey, Part, Scene};
use crate::transform::PlanRect;
use nalgebra::Point3;
use shedkit_core::{BaseParams, EngineConfig};

/// Result of emitting a base
#[derive(Debug, Clone, Default)]
pub struct BaseBuild {
    pub nodes: Vec<NodeKey>,
    pub joist_count: usize,
}

/// Base parts over `rect`, in the anchor's coordinates
pub fn base_parts(rect: &PlanRect, params: &BaseParams, config: &EngineConfig) -> (Vec<Part>, usize) {
    let deck = config.base.deck_thickness;
    let bw = config.base.bearer_width;
    let h = params.height_mm as f64;
    let (y0, y1) = (-deck - h, -deck);

    if rect.size_x() <= 2.0 * bw || rect.size_z() <= 2.0 * bw {
        tracing::warn!(w = rect.size_x(), d = rect.size_z(), "Base too small for bearers");
        return (Vec::new(), 0);
    }

    let mut bearers = Mesh::new();
    // front and back run the full width, sides fit between them
    bearers.merge(&aabb_mesh(
        Point3::new(rect.min_x, y0, rect.min_z),
        Point3::new(rect.max_x, y1, rect.min_z + bw),
    ));
    bearers.merge(&aabb_mesh(
        Point3::new(rect.min_x, y0, rect.max_z - bw),
        Point3::new(rect.max_x, y1, rect.max_z),
    ));
    bearers.merge(&aabb_mesh(
        Point3::new(rect.min_x, y0, rect.min_z + bw),
        Point3::new(rect.min_x + bw, y1, rect.max_z - bw),
    ));
    bearers.merge(&aabb_mesh(
        Point3::new(rect.max_x - bw, y0, rect.min_z + bw),
        Point3::new(rect.max_x, y1, rect.max_z - bw),
    ));

    let stations = fixed_stations(rect.min_x, rect.max_x - bw, config.roof.truss_spacing);
    let inner = stations.get(1..stations.len().saturating_sub(1)).unwrap_or(&[]);
    let mut joists = Mesh::new();
    for &x in inner {
        joists.merge(&aabb_mesh(
            Point3::new(x, y0, rect.min_z + bw),
            Point3::new(x + bw, y1, rect.max_z - bw),
        ));
    }

    let deck_mesh = aabb_mesh(
        Point3::new(rect.min_x, y1, rect.min_z),
        Point3::new(rect.max_x, 0.0, rect.max_z),
    );

    let parts = vec![
        Part::new("base-bearers", bearers, "timber-base", Layer::Base),
        Part::new("base-joists", joists, "timber-base", Layer::Base),
        Part::new("base-deck", deck_mesh, "plywood", Layer::Base),
    ];
    (parts, inner.len())
}

/// Build the main building's base under the scene's `base-root` anchor
pub fn build_base(scene: &mut Scene, rect: &PlanRect, params: &BaseParams, config: &EngineConfig) -> Result<BaseBuild> {
    let anchor = scene.find_node(anchors::BASE);
    build_base_under(scene, anchor, rect, params, config, None)
}

pub fn build_base_under(
    scene: &mut Scene,
    anchor: Option<NodeKey>,
    rect: &PlanRect,
    params: &BaseParams,
    config: &EngineConfig,
    attachment_id: Option<&str>,
) -> Result<BaseBuild> {
    let Some(anchor) = anchor else {
        tracing::warn!(attachment = ?attachment_id, "No base anchor in scene, base not built");
        return Ok(BaseBuild::default());
    };
    if !params.enabled {
        return Ok(BaseBuild::default());
    }
    let (parts, joist_count) = base_parts(rect, params, config);
    let nodes = scene.emit(anchor, parts, attachment_id)?;
    tracing::debug!(attachment = ?attachment_id, joists = joist_count, "Base built");
    Ok(BaseBuild { nodes, joist_count })
}
