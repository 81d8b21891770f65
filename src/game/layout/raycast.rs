use crate::game::math::{FixedNum, FixedVec2};
use super::{DoorId, PassageAxis, VesselLayout};

/// First solid thing hit by a line-of-sight pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Obstruction {
    /// Index into [`VesselLayout::walls`].
    Wall(usize),
    Door(DoorId),
}

/// Parametric position of the hit along `from → to`, if the segments cross.
fn segment_hit(from: FixedVec2, to: FixedVec2, a: FixedVec2, b: FixedVec2) -> Option<FixedNum> {
    let r = to - from;
    let s = b - a;
    let denom = r.cross(s);
    if denom == FixedNum::ZERO {
        // Parallel or degenerate - treat as no hit
        return None;
    }
    let qp = a - from;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if t < FixedNum::ZERO || t > FixedNum::ONE || u < FixedNum::ZERO || u > FixedNum::ONE {
        return None;
    }
    Some(t)
}

impl VesselLayout {
    /// Closest wall or closed door crossing the segment between two world
    /// positions. Open and broken doors never obstruct.
    pub fn pick_obstruction(&self, from: FixedVec2, to: FixedVec2) -> Option<Obstruction> {
        let mut closest: Option<(FixedNum, Obstruction)> = None;
        let mut consider = |t: FixedNum, hit: Obstruction| {
            if closest.map_or(true, |(best, _)| t < best) {
                closest = Some((t, hit));
            }
        };

        for (idx, wall) in self.walls.iter().enumerate() {
            let origin = self.origin(wall.region);
            if let Some(t) = segment_hit(from, to, wall.start + origin, wall.end + origin) {
                consider(t, Obstruction::Wall(idx));
            }
        }

        for door in &self.doors {
            if door.can_be_traversed() {
                continue;
            }
            let center = self.door_world_position(door);
            let leaf = match door.axis {
                // A regular door blocks vertically, a hatch horizontally
                PassageAxis::Horizontal => FixedVec2::new(FixedNum::ZERO, door.half_extent),
                PassageAxis::Vertical => FixedVec2::new(door.half_extent, FixedNum::ZERO),
            };
            if let Some(t) = segment_hit(from, to, center - leaf, center + leaf) {
                consider(t, Obstruction::Door(door.id));
            }
        }

        closest.map(|(_, hit)| hit)
    }

    /// True if nothing solid lies between the two world positions.
    pub fn has_line_of_sight(&self, from: FixedVec2, to: FixedVec2) -> bool {
        self.pick_obstruction(from, to).is_none()
    }
}
