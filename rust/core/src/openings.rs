// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall naming and door/window openings

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four standard walls of a rectangular building.
///
/// World convention: X runs left to right, Z runs front to back, Y is up.
/// The front wall faces -Z, the left wall faces -X.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallName {
    Front,
    Back,
    Left,
    Right,
}

impl WallName {
    pub const ALL: [WallName; 4] = [
        WallName::Front,
        WallName::Back,
        WallName::Left,
        WallName::Right,
    ];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            WallName::Front => "front",
            WallName::Back => "back",
            WallName::Left => "left",
            WallName::Right => "right",
        }
    }

    /// Wall on the opposite side of the building
    #[inline]
    pub fn opposite(&self) -> WallName {
        match self {
            WallName::Front => WallName::Back,
            WallName::Back => WallName::Front,
            WallName::Left => WallName::Right,
            WallName::Right => WallName::Left,
        }
    }

    /// Front and back walls run along the X axis
    #[inline]
    pub fn runs_along_x(&self) -> bool {
        matches!(self, WallName::Front | WallName::Back)
    }
}

impl fmt::Display for WallName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WallName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "front" => Ok(WallName::Front),
            "back" => Ok(WallName::Back),
            "left" => Ok(WallName::Left),
            "right" => Ok(WallName::Right),
            other => Err(Error::UnknownWall(other.to_string())),
        }
    }
}

/// Wall reference carried by an opening.
///
/// Attachments name their far wall `outer`; everything else uses the standard
/// four names. Attachment openings are remapped to standard names before any
/// framing or cladding is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallRef {
    Front,
    Back,
    Left,
    Right,
    Outer,
}

impl WallRef {
    /// Standard wall name, or `None` for `outer`
    pub fn standard(&self) -> Option<WallName> {
        match self {
            WallRef::Front => Some(WallName::Front),
            WallRef::Back => Some(WallName::Back),
            WallRef::Left => Some(WallName::Left),
            WallRef::Right => Some(WallName::Right),
            WallRef::Outer => None,
        }
    }
}

impl From<WallName> for WallRef {
    fn from(name: WallName) -> Self {
        match name {
            WallName::Front => WallRef::Front,
            WallName::Back => WallRef::Back,
            WallName::Left => WallRef::Left,
            WallName::Right => WallRef::Right,
        }
    }
}

impl Default for WallRef {
    fn default() -> Self {
        WallRef::Front
    }
}

/// Opening type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Door,
    Window,
}

impl Default for OpeningKind {
    fn default() -> Self {
        OpeningKind::Door
    }
}

/// Default sill height for windows that do not carry an explicit `y_mm`
pub const DEFAULT_WINDOW_SILL_MM: u32 = 900;

/// A door or window cut into one wall.
///
/// `x_mm` is measured along the wall from its local origin: the left end for
/// front/back walls, the front end for left/right walls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Opening {
    pub id: String,
    pub wall: WallRef,
    #[serde(rename = "type")]
    pub kind: OpeningKind,
    #[serde(rename = "x_mm")]
    pub x_mm: u32,
    #[serde(rename = "width_mm")]
    pub width_mm: u32,
    #[serde(rename = "height_mm")]
    pub height_mm: u32,
    /// Sill height, windows only
    #[serde(rename = "y_mm", skip_serializing_if = "Option::is_none")]
    pub y_mm: Option<u32>,
}

impl Default for Opening {
    fn default() -> Self {
        Self {
            id: String::new(),
            wall: WallRef::Front,
            kind: OpeningKind::Door,
            x_mm: 0,
            width_mm: 800,
            height_mm: 1900,
            y_mm: None,
        }
    }
}

impl Opening {
    pub fn door(id: impl Into<String>, wall: WallRef, x_mm: u32, width_mm: u32, height_mm: u32) -> Self {
        Self {
            id: id.into(),
            wall,
            kind: OpeningKind::Door,
            x_mm,
            width_mm,
            height_mm,
            y_mm: None,
        }
    }

    pub fn window(
        id: impl Into<String>,
        wall: WallRef,
        x_mm: u32,
        y_mm: u32,
        width_mm: u32,
        height_mm: u32,
    ) -> Self {
        Self {
            id: id.into(),
            wall,
            kind: OpeningKind::Window,
            x_mm,
            width_mm,
            height_mm,
            y_mm: Some(y_mm),
        }
    }

    #[inline]
    pub fn is_door(&self) -> bool {
        self.kind == OpeningKind::Door
    }

    /// Height of the opening's bottom edge above the wall base
    #[inline]
    pub fn bottom_mm(&self) -> u32 {
        match self.kind {
            OpeningKind::Door => 0,
            OpeningKind::Window => self.y_mm.unwrap_or(DEFAULT_WINDOW_SILL_MM),
        }
    }

    /// Horizontal extent including one stud width of framing on either side
    #[inline]
    pub fn frame_zone(&self, stud_width: f64) -> (f64, f64) {
        (
            self.x_mm as f64 - stud_width,
            (self.x_mm + self.width_mm) as f64 + stud_width,
        )
    }

    /// Center of the opening along the wall
    #[inline]
    pub fn center_mm(&self) -> f64 {
        self.x_mm as f64 + self.width_mm as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_name_round_trip() {
        for wall in WallName::ALL {
            assert_eq!(wall.as_str().parse::<WallName>().unwrap(), wall);
        }
        assert!("roof".parse::<WallName>().is_err());
    }

    #[test]
    fn test_opening_deserialize_window() {
        let json = r#"{"id":"w1","wall":"left","type":"window","x_mm":300,"width_mm":600,"height_mm":500,"y_mm":1100}"#;
        let opening: Opening = serde_json::from_str(json).unwrap();
        assert_eq!(opening.wall, WallRef::Left);
        assert_eq!(opening.kind, OpeningKind::Window);
        assert_eq!(opening.bottom_mm(), 1100);
    }

    #[test]
    fn test_window_without_sill_uses_default() {
        let json = r#"{"id":"w2","wall":"front","type":"window","x_mm":0,"width_mm":600,"height_mm":500}"#;
        let opening: Opening = serde_json::from_str(json).unwrap();
        assert_eq!(opening.bottom_mm(), DEFAULT_WINDOW_SILL_MM);
        // absent y stays absent on the way back out
        let out = serde_json::to_string(&opening).unwrap();
        assert!(!out.contains("y_mm"));
    }

    #[test]
    fn test_frame_zone() {
        let door = Opening::door("d1", WallRef::Front, 500, 800, 1900);
        assert_eq!(door.frame_zone(50.0), (450.0, 1350.0));
    }

    #[test]
    fn test_outer_has_no_standard_name() {
        assert_eq!(WallRef::Outer.standard(), None);
        assert_eq!(WallRef::from(WallName::Back).standard(), Some(WallName::Back));
    }
}
