// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable summary of one rebuild.
//!
//! Clamped heights and failed boolean passes never surface as errors, so
//! the report is where a caller (or a test) observes them.

use serde::Serialize;
use shedkit_core::{ResolvedDimensions, RoofStyle, WallName};
use shedkit_geometry::{AttachmentBuild, ClampRecord, ClipResult, RoofSummary, WallReport};

/// Everything a rebuild did
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    /// Subtrees disposed and rebuilt, in build order
    pub rebuilt: Vec<String>,
    pub nodes_disposed: usize,
    pub nodes_built: usize,
    pub materials_disposed: usize,
    pub dimensions: Option<ResolvedDimensions>,
    pub roof: Option<RoofReport>,
    pub base_joists: Option<usize>,
    pub walls: Vec<WallEntry>,
    pub attachments: Vec<AttachmentEntry>,
    pub clamps: Vec<ClampEntry>,
    pub csg_fallbacks: Vec<FallbackEntry>,
}

impl BuildReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Record a built section's walls and any cladding passes that fell back
    pub(crate) fn add_walls(&mut self, section: Option<&str>, walls: &[WallReport]) {
        for wall in walls {
            if let Some(outcome) = &wall.cladding {
                for (pass, result) in [("roofline", &outcome.roofline), ("openings", &outcome.openings)] {
                    if let ClipResult::Failed(error) = result {
                        self.csg_fallbacks.push(FallbackEntry {
                            section: section.map(str::to_string),
                            wall: wall.wall,
                            pass,
                            error: error.clone(),
                        });
                    }
                }
            }
            self.walls.push(WallEntry {
                section: section.map(str::to_string),
                wall: wall.wall,
                length_mm: wall.length,
                panels: wall.panels.len(),
                studs: wall.studs.len(),
                cladding_courses: wall.cladding.as_ref().map(|c| c.courses),
            });
        }
    }

    pub(crate) fn add_roof(&mut self, section: Option<&str>, summary: &RoofSummary, requested: Option<f64>) {
        if summary.crest_clamped {
            self.clamps.push(ClampEntry {
                section: section.map(str::to_string),
                field: "crest",
                requested,
                value: summary.crest,
            });
        }
    }

    pub(crate) fn add_attachment(&mut self, build: &AttachmentBuild, nodes: usize) {
        let plan = &build.plan;
        self.add_walls(Some(&plan.id), &build.walls.walls);
        self.add_roof(Some(&plan.id), &build.roof.summary, None);
        self.clamps.extend(plan.clamps.iter().map(ClampEntry::from));
        let rect = plan.docking.rect;
        self.attachments.push(AttachmentEntry {
            id: plan.id.clone(),
            parent_wall: plan.docking.parent_wall,
            docked: plan.docking.docked,
            rect: [rect.min_x, rect.max_x, rect.min_z, rect.max_z],
            level_mm: plan.docking.level,
            style: plan.shape.style(),
            eaves_mm: build.roof.summary.eaves,
            crest_mm: build.roof.summary.crest,
            max_wall_mm: plan.envelope.max_wall,
            max_roof_mm: plan.envelope.max_roof,
            max_crest_mm: plan.envelope.max_crest,
            diamond_limited: plan.envelope.diamond_limited,
            nodes,
        });
    }
}

/// Roof figures for the main building
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoofReport {
    pub style: Option<RoofStyle>,
    pub rise_mm: f64,
    pub angle_deg: f64,
    pub eaves_mm: f64,
    pub crest_mm: f64,
    pub ridge_length_mm: f64,
    pub hip_angle_deg: Option<f64>,
    pub hip_rafter_length_mm: Option<f64>,
    pub trusses: usize,
    pub rafters: usize,
    pub purlins: usize,
    pub battens: usize,
    pub ridge_caps: usize,
    pub hip_caps: usize,
    pub fascia_bottom_mm: f64,
    pub diamond_bottom_mm: Option<f64>,
}

impl From<&RoofSummary> for RoofReport {
    fn from(s: &RoofSummary) -> Self {
        Self {
            style: s.style,
            rise_mm: s.rise,
            angle_deg: s.angle.to_degrees(),
            eaves_mm: s.eaves,
            crest_mm: s.crest,
            ridge_length_mm: s.ridge_length,
            hip_angle_deg: s.hip_angle.map(f64::to_degrees),
            hip_rafter_length_mm: s.hip_rafter_length,
            trusses: s.truss_count,
            rafters: s.rafter_count,
            purlins: s.purlin_count,
            battens: s.batten_count,
            ridge_caps: s.ridge_cap_count,
            hip_caps: s.hip_cap_count,
            fascia_bottom_mm: s.fascia_bottom,
            diamond_bottom_mm: s.diamond_bottom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallEntry {
    /// Attachment id, `None` for the main building
    pub section: Option<String>,
    pub wall: WallName,
    pub length_mm: f64,
    pub panels: usize,
    pub studs: usize,
    pub cladding_courses: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentEntry {
    pub id: String,
    pub parent_wall: WallName,
    pub docked: WallName,
    /// `[min_x, max_x, min_z, max_z]` in parent coordinates
    pub rect: [f64; 4],
    pub level_mm: f64,
    pub style: RoofStyle,
    pub eaves_mm: f64,
    pub crest_mm: f64,
    pub max_wall_mm: f64,
    pub max_roof_mm: f64,
    pub max_crest_mm: f64,
    pub diamond_limited: bool,
    pub nodes: usize,
}

/// A user value replaced by a limit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClampEntry {
    pub section: Option<String>,
    pub field: &'static str,
    pub requested: Option<f64>,
    pub value: f64,
}

impl From<&ClampRecord> for ClampEntry {
    fn from(c: &ClampRecord) -> Self {
        Self {
            section: Some(c.attachment.clone()),
            field: c.field,
            requested: Some(c.requested),
            value: c.value,
        }
    }
}

/// A boolean pass that failed and kept its input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackEntry {
    pub section: Option<String>,
    pub wall: WallName,
    pub pass: &'static str,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use shedkit_geometry::CladdingOutcome;

    fn wall(roofline: ClipResult) -> WallReport {
        WallReport {
            wall: WallName::Front,
            length: 2400.0,
            panels: vec![(0.0, 2400.0)],
            studs: vec![0.0, 1200.0, 2350.0],
            cladding: Some(CladdingOutcome {
                courses: 15,
                roofline,
                openings: ClipResult::Skipped,
            }),
        }
    }

    #[test]
    fn test_fallbacks_are_recorded() {
        let mut report = BuildReport::default();
        report.add_walls(None, &[wall(ClipResult::Applied)]);
        assert!(report.csg_fallbacks.is_empty());
        report.add_walls(Some("a1"), &[wall(ClipResult::Failed("degenerate".into()))]);
        assert_eq!(report.csg_fallbacks.len(), 1);
        assert_eq!(report.csg_fallbacks[0].pass, "roofline");
        assert_eq!(report.csg_fallbacks[0].section.as_deref(), Some("a1"));
        assert_eq!(report.walls[1].cladding_courses, Some(15));
        assert_eq!(report.walls[1].studs, 3);
    }

    #[test]
    fn test_report_serializes() {
        let mut report = BuildReport::default();
        report.add_walls(None, &[wall(ClipResult::Applied)]);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"length_mm\": 2400.0"));
        assert!(json.contains("\"csg_fallbacks\": []"));
    }
}
