use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use crate::game::math::{FixedNum, FixedVec2};

/// A vessel (or ruin, or wreck). Everything inside it is stored in its local
/// frame and moves with `origin`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u16);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HullId(pub u32);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GapId(pub u32);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoorId(pub u32);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub u32);

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LadderId(pub u32);

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeamId(pub u8);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    /// World position of the region's local origin.
    pub origin: FixedVec2,
    pub team: TeamId,
    pub is_ruin: bool,
    pub is_wreck: bool,
}

/// Which way an agent moves when passing through a gap or door.
///
/// `Horizontal` is an ordinary door in a wall, `Vertical` is a hatch in a
/// floor or ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassageAxis {
    Horizontal,
    Vertical,
}

/// Who may operate a door or control.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessRule {
    #[default]
    Anyone,
    Teams(SmallVec<[TeamId; 2]>),
    Nobody,
}

impl AccessRule {
    pub fn grants(&self, team: TeamId) -> bool {
        match self {
            AccessRule::Anyone => true,
            AccessRule::Teams(teams) => teams.contains(&team),
            AccessRule::Nobody => false,
        }
    }
}

/// A room. `min`/`max` are in the owning region's frame, y up.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Hull {
    pub id: HullId,
    pub region: Option<RegionId>,
    pub min: FixedVec2,
    pub max: FixedVec2,
    /// Water area in the room (width × water depth).
    pub water_volume: FixedNum,
    /// Horizontal extent of each burning fire source.
    pub fire_sizes: SmallVec<[FixedNum; 2]>,
}

impl Hull {
    pub fn width(&self) -> FixedNum {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> FixedNum {
        self.max.y - self.min.y
    }

    pub fn volume(&self) -> FixedNum {
        self.width() * self.height()
    }

    pub fn water_depth(&self) -> FixedNum {
        let width = self.width();
        if width <= FixedNum::ZERO {
            return FixedNum::ZERO;
        }
        self.water_volume / width
    }

    /// Local y of the water surface.
    pub fn surface(&self) -> FixedNum {
        self.min.y + self.water_depth()
    }

    pub fn is_flooded(&self) -> bool {
        self.water_volume >= self.volume()
    }

    pub fn contains(&self, local: FixedVec2) -> bool {
        local.x >= self.min.x && local.x <= self.max.x &&
        local.y >= self.min.y && local.y <= self.max.y
    }
}

/// An opening between two hulls (or a hull and the outside).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Gap {
    pub id: GapId,
    pub region: Option<RegionId>,
    pub position: FixedVec2,
    pub width: FixedNum,
    /// 0 = sealed, 1 = fully open.
    pub open: FixedNum,
    pub axis: PassageAxis,
    /// False for airlocks and hull breaches to the outside.
    pub room_to_room: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Door {
    pub id: DoorId,
    pub region: Option<RegionId>,
    pub position: FixedVec2,
    /// Half-length of the door leaf; a closed door blocks this far either side
    /// of `position` across the passage axis.
    pub half_extent: FixedNum,
    pub axis: PassageAxis,
    pub gap: Option<GapId>,
    pub is_open: bool,
    pub is_broken: bool,
    pub is_stuck: bool,
    pub is_jammed: bool,
    /// The door is operated directly instead of through separate controls.
    pub integrated_buttons: bool,
    pub access: AccessRule,
    pub indestructible: bool,
    pub interactable: bool,
    pub controls: SmallVec<[ControlId; 2]>,
}

impl Door {
    pub fn can_be_traversed(&self) -> bool {
        self.is_open || self.is_broken
    }

    pub fn is_hatch(&self) -> bool {
        self.axis == PassageAxis::Vertical
    }
}

/// A button or panel wired to one or more doors.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Control {
    pub id: ControlId,
    pub region: Option<RegionId>,
    pub position: FixedVec2,
    pub access: AccessRule,
    pub interact_distance: FixedNum,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ladder {
    pub id: LadderId,
    pub region: Option<RegionId>,
    pub x: FixedNum,
    pub bottom: FixedNum,
    pub top: FixedNum,
    pub interactable: bool,
    pub interact_distance: FixedNum,
}

/// Solid level geometry, local to `region`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Wall {
    pub region: Option<RegionId>,
    pub start: FixedVec2,
    pub end: FixedVec2,
}
