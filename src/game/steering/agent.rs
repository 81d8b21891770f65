use bevy::prelude::*;
use crate::game::math::{fx, FixedNum, FixedVec2};
use crate::game::layout::{HullId, LadderId, RegionId, TeamId, VesselLayout};

/// What an agent is able and allowed to do while navigating.
///
/// Read every tick; the steering core never writes to it.
#[derive(Component, Clone, Debug)]
pub struct AgentCapabilities {
    pub can_open_doors: bool,
    pub can_break_doors: bool,
    /// Only humanoid bodies can use ladders or climb ledges.
    pub can_climb: bool,
    pub hands_locked: bool,
    pub needs_air: bool,
    pub has_diving_gear: bool,
    pub pressure_protection: FixedNum,
    /// 0 = replan lazily, 1 = replan as often as allowed.
    pub replan_priority: FixedNum,
    /// Close doors behind the agent after passing them.
    pub keep_doors_closed: bool,
    pub team: TeamId,
}

impl AgentCapabilities {
    /// A crew member: opens doors, climbs ladders, breathes air.
    pub fn humanoid(team: TeamId) -> Self {
        Self {
            can_open_doors: true,
            can_break_doors: false,
            can_climb: true,
            hands_locked: false,
            needs_air: true,
            has_diving_gear: false,
            pressure_protection: FixedNum::ZERO,
            replan_priority: fx(0.5),
            keep_doors_closed: false,
            team,
        }
    }

    /// A non-humanoid creature: no doors, no ladders.
    pub fn creature(team: TeamId) -> Self {
        Self {
            can_open_doors: false,
            can_climb: false,
            needs_air: false,
            ..Self::humanoid(team)
        }
    }
}

impl Default for AgentCapabilities {
    fn default() -> Self {
        Self::humanoid(TeamId::default())
    }
}

/// Read-only view of the physical body the steering output drives.
#[derive(Component, Clone, Debug)]
pub struct AgentBody {
    /// Collider centre in the agent's frame: local to `region` when inside
    /// one, world otherwise.
    pub position: FixedVec2,
    pub region: Option<RegionId>,
    pub hull: Option<HullId>,
    pub velocity: FixedVec2,
    /// Collider width and height.
    pub size: FixedVec2,
    /// Gap between the collider bottom and the feet.
    pub collider_height_from_floor: FixedNum,
    /// Local y of the floor below the agent.
    pub floor_y: FixedNum,
    pub in_water: bool,
    pub head_in_water: bool,
    pub is_climbing: bool,
    pub selected_ladder: Option<LadderId>,
    pub max_speed: FixedNum,
}

impl AgentBody {
    pub fn new(region: Option<RegionId>, position: FixedVec2) -> Self {
        Self {
            position,
            region,
            hull: None,
            velocity: FixedVec2::ZERO,
            size: FixedVec2::from_f32(0.5, 1.6),
            collider_height_from_floor: fx(0.2),
            floor_y: position.y - fx(1.0),
            in_water: false,
            head_in_water: false,
            is_climbing: false,
            selected_ladder: None,
            max_speed: fx(1.5),
        }
    }

    pub fn world_position(&self, layout: &VesselLayout) -> FixedVec2 {
        layout.to_world(self.region, self.position)
    }

    pub fn collider_bottom(&self) -> FixedNum {
        self.position.y - self.size.y / FixedNum::from_num(2)
    }

    pub fn height_from_floor(&self) -> FixedNum {
        self.collider_bottom() - self.floor_y
    }

    pub fn collider_length(&self) -> FixedNum {
        self.size.x.max(self.size.y)
    }

    pub fn is_diving(&self) -> bool {
        self.in_water && self.head_in_water
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creature_cannot_climb_or_open() {
        let caps = AgentCapabilities::creature(TeamId(2));
        assert!(!caps.can_climb);
        assert!(!caps.can_open_doors);
        assert_eq!(caps.team, TeamId(2));
    }

    #[test]
    fn test_body_floor_height() {
        let mut body = AgentBody::new(None, FixedVec2::from_f32(0.0, 1.0));
        body.floor_y = fx(0.0);
        // 1.0 - 1.6 / 2
        assert_eq!(body.height_from_floor(), fx(0.2));
        assert_eq!(body.collider_length(), fx(1.6));
    }
}
