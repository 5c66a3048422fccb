//! Building catalog: footprints and port counts per machine kind.
//!
//! Every non-conveyor machine is 3 cells deep on its short axis; fillers and
//! grinders stretch to 6 cells on the long axis, the rest are square. The
//! long axis carries the ports (one per cell) and is always oriented along
//! grid X.

use serde::{Deserialize, Serialize};

/// Kind tag for every placeable object, conveyors included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    Filler,
    Grinder,
    Molder,
    Refinery,
    Crusher,
    Conveyor,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 6] = [
        BuildingKind::Filler,
        BuildingKind::Grinder,
        BuildingKind::Molder,
        BuildingKind::Refinery,
        BuildingKind::Crusher,
        BuildingKind::Conveyor,
    ];
}

/// Static definition of a building kind.
#[derive(Debug, Clone, Copy)]
pub struct BuildingDef {
    pub kind: BuildingKind,
    pub name: &'static str,
    /// Long (port-carrying) side, along grid X.
    pub long: u32,
    /// Short side, along grid Y.
    pub short: u32,
}

impl BuildingDef {
    pub fn area(&self) -> u32 {
        self.long * self.short
    }
}

/// Look up the full definition for a kind.
pub fn building_def(kind: BuildingKind) -> BuildingDef {
    match kind {
        BuildingKind::Filler => BuildingDef { kind, name: "Filler", long: 6, short: 3 },
        BuildingKind::Grinder => BuildingDef { kind, name: "Grinder", long: 6, short: 3 },
        BuildingKind::Molder => BuildingDef { kind, name: "Molder", long: 3, short: 3 },
        BuildingKind::Refinery => BuildingDef { kind, name: "Refinery", long: 3, short: 3 },
        BuildingKind::Crusher => BuildingDef { kind, name: "Crusher", long: 3, short: 3 },
        BuildingKind::Conveyor => BuildingDef { kind, name: "Conveyor", long: 1, short: 1 },
    }
}

/// Footprint as `(long, short)`.
pub fn footprint(kind: BuildingKind) -> (u32, u32) {
    let def = building_def(kind);
    (def.long, def.short)
}

/// Number of input ports (equal to the number of output ports): one per
/// cell of the long edge.
pub fn ports(kind: BuildingKind) -> u32 {
    building_def(kind).long
}
