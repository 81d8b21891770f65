/// Vessel layout - the live environment the steering core reads.
///
/// This module is organized into:
/// - **types**: regions, hulls, gaps, doors, controls, ladders, walls
/// - **raycast**: line-of-sight obstruction picks against walls and closed doors
/// - **io**: compressed binary layout files
///
/// Door, control and ladder state is owned by external state machines. The
/// steering core only reads it; changes are proposed through interaction
/// messages.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use crate::game::math::{FixedNum, FixedVec2};

mod types;
mod raycast;
pub mod io;

pub use types::*;
pub use raycast::Obstruction;

#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct VesselLayout {
    pub regions: Vec<Region>,
    pub hulls: Vec<Hull>,
    pub gaps: Vec<Gap>,
    pub doors: Vec<Door>,
    pub controls: Vec<Control>,
    pub ladders: Vec<Ladder>,
    pub walls: Vec<Wall>,
}

impl VesselLayout {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Lookups (dangling ids resolve to None)
    // ========================================================================

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0 as usize)
    }

    pub fn hull(&self, id: HullId) -> Option<&Hull> {
        self.hulls.get(id.0 as usize)
    }

    pub fn gap(&self, id: GapId) -> Option<&Gap> {
        self.gaps.get(id.0 as usize)
    }

    pub fn door(&self, id: DoorId) -> Option<&Door> {
        self.doors.get(id.0 as usize)
    }

    pub fn door_mut(&mut self, id: DoorId) -> Option<&mut Door> {
        self.doors.get_mut(id.0 as usize)
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.get(id.0 as usize)
    }

    pub fn ladder(&self, id: LadderId) -> Option<&Ladder> {
        self.ladders.get(id.0 as usize)
    }

    // ========================================================================
    // Frames
    // ========================================================================

    /// World position of a region's origin; open water has origin zero.
    pub fn origin(&self, region: Option<RegionId>) -> FixedVec2 {
        region
            .and_then(|id| self.region(id))
            .map(|r| r.origin)
            .unwrap_or(FixedVec2::ZERO)
    }

    pub fn to_world(&self, region: Option<RegionId>, local: FixedVec2) -> FixedVec2 {
        local + self.origin(region)
    }

    pub fn door_world_position(&self, door: &Door) -> FixedVec2 {
        self.to_world(door.region, door.position)
    }

    pub fn control_world_position(&self, control: &Control) -> FixedVec2 {
        self.to_world(control.region, control.position)
    }

    pub fn ladder_world_x(&self, ladder: &Ladder) -> FixedNum {
        ladder.x + self.origin(ladder.region).x
    }

    /// World y of a hull's water surface.
    pub fn hull_surface_world(&self, hull: &Hull) -> FixedNum {
        hull.surface() + self.origin(hull.region).y
    }

    /// Whether `world` is inside the ladder's trigger band.
    pub fn ladder_in_range(&self, ladder: &Ladder, world: FixedVec2) -> bool {
        let origin = self.origin(ladder.region);
        let reach = ladder.interact_distance;
        (world.x - (ladder.x + origin.x)).abs() <= reach &&
        world.y >= ladder.bottom + origin.y - reach &&
        world.y <= ladder.top + origin.y + reach
    }

    /// Hull containing a world position, if any.
    pub fn hull_at(&self, world: FixedVec2) -> Option<HullId> {
        self.hulls
            .iter()
            .find(|hull| hull.contains(world - self.origin(hull.region)))
            .map(|hull| hull.id)
    }

    // ========================================================================
    // Building
    // ========================================================================

    pub fn add_region(&mut self, name: impl Into<String>, origin: FixedVec2, team: TeamId) -> RegionId {
        let id = RegionId(self.regions.len() as u16);
        self.regions.push(Region {
            id,
            name: name.into(),
            origin,
            team,
            is_ruin: false,
            is_wreck: false,
        });
        id
    }

    pub fn add_hull(&mut self, region: Option<RegionId>, min: FixedVec2, max: FixedVec2) -> HullId {
        let id = HullId(self.hulls.len() as u32);
        self.hulls.push(Hull {
            id,
            region,
            min,
            max,
            water_volume: FixedNum::ZERO,
            fire_sizes: Default::default(),
        });
        id
    }

    pub fn add_gap(&mut self, region: Option<RegionId>, position: FixedVec2, width: FixedNum, axis: PassageAxis) -> GapId {
        let id = GapId(self.gaps.len() as u32);
        self.gaps.push(Gap {
            id,
            region,
            position,
            width,
            open: FixedNum::ONE,
            axis,
            room_to_room: true,
        });
        id
    }

    /// Adds a closed door sealing a new gap of the same width.
    pub fn add_door(&mut self, region: Option<RegionId>, position: FixedVec2, half_extent: FixedNum, axis: PassageAxis) -> DoorId {
        let gap = self.add_gap(region, position, half_extent * FixedNum::from_num(2), axis);
        if let Some(gap) = self.gaps.get_mut(gap.0 as usize) {
            gap.open = FixedNum::ZERO;
        }
        let id = DoorId(self.doors.len() as u32);
        self.doors.push(Door {
            id,
            region,
            position,
            half_extent,
            axis,
            gap: Some(gap),
            is_open: false,
            is_broken: false,
            is_stuck: false,
            is_jammed: false,
            integrated_buttons: false,
            access: AccessRule::Anyone,
            indestructible: false,
            interactable: true,
            controls: Default::default(),
        });
        id
    }

    /// Adds a control and wires it to `door`.
    pub fn add_control(&mut self, door: DoorId, position: FixedVec2, interact_distance: FixedNum) -> ControlId {
        let region = self.door(door).and_then(|d| d.region);
        let id = ControlId(self.controls.len() as u32);
        self.controls.push(Control {
            id,
            region,
            position,
            access: AccessRule::Anyone,
            interact_distance,
        });
        if let Some(door) = self.door_mut(door) {
            door.controls.push(id);
        }
        id
    }

    pub fn add_ladder(&mut self, region: Option<RegionId>, x: FixedNum, bottom: FixedNum, top: FixedNum) -> LadderId {
        let id = LadderId(self.ladders.len() as u32);
        self.ladders.push(Ladder {
            id,
            region,
            x,
            bottom,
            top,
            interactable: true,
            interact_distance: FixedNum::from_num(0.5),
        });
        id
    }

    pub fn add_wall(&mut self, region: Option<RegionId>, start: FixedVec2, end: FixedVec2) {
        self.walls.push(Wall { region, start, end });
    }

    /// Sets a door's open state and mirrors it onto its gap.
    pub fn set_door_open(&mut self, id: DoorId, open: bool) {
        let Some(door) = self.door_mut(id) else {
            return;
        };
        door.is_open = open;
        let gap = door.gap;
        if let Some(gap) = gap.and_then(|g| self.gaps.get_mut(g.0 as usize)) {
            gap.open = if open { FixedNum::ONE } else { FixedNum::ZERO };
        }
    }
}
