// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shedkit Geometry
//!
//! Solid modelling for timber garden buildings: roofs, walls, cladding and
//! docked attachments, emitted into an in-memory scene graph.
//!
//! Meshes are built from a handful of primitives (boxes, explicit
//! hexahedra, slabs) and nalgebra rigid transforms; boolean cuts go through
//! csgrs behind the [`BooleanOps`] trait. Millimetres throughout, Y up.

pub mod attachment;
pub mod base;
pub mod cladding;
pub mod csg;
pub mod error;
pub mod mesh;
pub mod openings;
pub mod primitives;
pub mod roof;
pub mod scene;
pub mod slope;
pub mod solver;
pub mod transform;
pub mod triangulation;
pub mod walls;

// Re-export nalgebra types for convenience
pub use nalgebra::{Isometry3, Point3, UnitQuaternion, Vector3};

pub use attachment::{
    build_attachment, dock, envelope, plan_attachment, AttachmentBuild, AttachmentPlan, ClampRecord,
    Clamped, Docking, Envelope, ParentBuilding,
};
pub use base::{build_base, build_base_under, BaseBuild};
pub use cladding::{clip_cladding, CladdingOutcome, ClipResult};
pub use csg::{BooleanOps, ClippingProcessor};
pub use error::{Error, Result};
pub use mesh::Mesh;
pub use openings::{DefaultOpenings, NoOpenings, OpeningBuilder};
pub use roof::caps::{layout_caps, CapSegment};
pub use roof::{build_roof, build_roof_under, generate, Overhangs, RoofBuild, RoofGeometry, RoofInput, RoofShape, RoofSummary};
pub use scene::{anchors, Layer, MaterialKey, NodeKey, NodeTags, Part, Scene};
pub use slope::{LayerStack, RoofLayer, SlopeDescriptor, SlopeSide};
pub use solver::{resolve_rise, solve_rise, ApexRise};
pub use transform::{PlanRect, RigidFrame};
pub use walls::{
    build_walls, build_walls_under, wall_profiles, SectionContext, SyntheticState, WallLayout, WallProfile,
    WallReport, WallSpec, WallTop, WallsBuild,
};
