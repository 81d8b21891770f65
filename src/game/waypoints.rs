//! Static waypoint graph the path oracle searches and routes refer to.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use crate::game::math::{FixedNum, FixedVec2};
use crate::game::layout::{DoorId, GapId, HullId, LadderId, RegionId, VesselLayout};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaypointId(pub u32);

impl WaypointId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: WaypointId,
    /// Position in the owning region's frame.
    pub position: FixedVec2,
    /// `None` for open water outside every vessel.
    pub region: Option<RegionId>,
    pub hull: Option<HullId>,
    pub ladder: Option<LadderId>,
    pub stairs: bool,
    pub door: Option<DoorId>,
    pub gap: Option<GapId>,
    pub obstructed: bool,
    pub links: SmallVec<[WaypointId; 4]>,
}

impl Waypoint {
    pub fn new(id: WaypointId, region: Option<RegionId>, position: FixedVec2) -> Self {
        Self {
            id,
            position,
            region,
            hull: None,
            ladder: None,
            stairs: false,
            door: None,
            gap: None,
            obstructed: false,
            links: SmallVec::new(),
        }
    }

    pub fn world_position(&self, layout: &VesselLayout) -> FixedVec2 {
        layout.to_world(self.region, self.position)
    }
}

#[derive(Resource, Clone, Debug, Default, Serialize, Deserialize)]
pub struct WaypointGraph {
    nodes: Vec<Waypoint>,
}

impl WaypointGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: WaypointId) -> Option<&Waypoint> {
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: WaypointId) -> Option<&mut Waypoint> {
        self.nodes.get_mut(id.index())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Waypoint> {
        self.nodes.iter()
    }

    /// Adds a node with no metadata; fill the rest via [`Self::node_mut`].
    pub fn add_node(&mut self, region: Option<RegionId>, position: FixedVec2) -> WaypointId {
        let id = WaypointId(self.nodes.len() as u32);
        self.nodes.push(Waypoint::new(id, region, position));
        id
    }

    /// Connects two nodes in both directions. Duplicate links are ignored.
    pub fn link(&mut self, a: WaypointId, b: WaypointId) {
        if a == b || self.node(a).is_none() || self.node(b).is_none() {
            return;
        }
        for (from, to) in [(a, b), (b, a)] {
            let links = &mut self.nodes[from.index()].links;
            if !links.contains(&to) {
                links.push(to);
            }
        }
    }

    /// Links consecutive nodes of `chain`.
    pub fn link_chain(&mut self, chain: &[WaypointId]) {
        for pair in chain.windows(2) {
            self.link(pair[0], pair[1]);
        }
    }

    /// Waypoints are marked obstructed by external level state (debris,
    /// flooding that blocks a duct, ...).
    pub fn set_obstructed(&mut self, id: WaypointId, obstructed: bool) {
        if let Some(node) = self.node_mut(id) {
            node.obstructed = obstructed;
        }
    }

    pub fn world_position(&self, id: WaypointId, layout: &VesselLayout) -> Option<FixedVec2> {
        self.node(id).map(|node| node.world_position(layout))
    }

    /// Sum of world distances between consecutive nodes of `ids`.
    pub fn polyline_length(&self, ids: &[WaypointId], layout: &VesselLayout) -> FixedNum {
        ids.windows(2)
            .filter_map(|pair| {
                let a = self.world_position(pair[0], layout)?;
                let b = self.world_position(pair[1], layout)?;
                Some(a.distance(b))
            })
            .fold(FixedNum::ZERO, |acc, d| acc + d)
    }
}
