use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use flate2::write::ZlibEncoder;
use flate2::read::ZlibDecoder;
use flate2::Compression;
use crate::game::waypoints::WaypointGraph;
use super::VesselLayout;

pub const LAYOUT_VERSION: u32 = 1;

/// Everything needed to navigate one scene: the waypoint graph plus the
/// vessel layout it refers to.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LayoutData {
    pub version: u32,
    pub graph: WaypointGraph,
    pub layout: VesselLayout,
}

impl LayoutData {
    pub fn new(graph: WaypointGraph, layout: VesselLayout) -> Self {
        Self {
            version: LAYOUT_VERSION,
            graph,
            layout,
        }
    }
}

fn check_version(data: &LayoutData) -> Result<(), Box<dyn std::error::Error>> {
    if data.version != LAYOUT_VERSION {
        return Err(format!(
            "unsupported layout version {} (expected {})",
            data.version, LAYOUT_VERSION
        ).into());
    }
    Ok(())
}

/// Writes a zlib-compressed bincode layout file.
pub fn save_layout(path: &str, data: &LayoutData) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let mut encoder = ZlibEncoder::new(writer, Compression::default());
    bincode::serialize_into(&mut encoder, data)?;
    encoder.finish()?;
    Ok(())
}

pub fn load_layout(path: &str) -> Result<LayoutData, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut decoder = ZlibDecoder::new(reader);
    let data: LayoutData = bincode::deserialize_from(&mut decoder)?;
    check_version(&data)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::math::{fx, FixedVec2};
    use crate::game::layout::PassageAxis;

    #[test]
    fn test_rejects_unknown_version() {
        let mut data = LayoutData::new(WaypointGraph::new(), VesselLayout::new());
        data.version = LAYOUT_VERSION + 1;
        assert!(check_version(&data).is_err());
    }

    #[test]
    fn test_compressed_file_keeps_door_state() {
        let mut layout = VesselLayout::new();
        let door = layout.add_door(None, FixedVec2::from_f32(3.0, 1.0), fx(1.0), PassageAxis::Horizontal);
        layout.add_control(door, FixedVec2::from_f32(2.5, 1.0), fx(1.0));
        layout.doors[door.0 as usize].is_jammed = true;
        let mut graph = WaypointGraph::new();
        let a = graph.add_node(None, FixedVec2::ZERO);
        let b = graph.add_node(None, FixedVec2::from_f32(3.0, 0.0));
        graph.link(a, b);

        let path = std::env::temp_dir().join(format!("petrel_layout_{}.bin", std::process::id()));
        let path = path.to_string_lossy().to_string();
        save_layout(&path, &LayoutData::new(graph, layout)).expect("save should succeed");
        let loaded = load_layout(&path).expect("load should succeed");
        let _ = std::fs::remove_file(&path);

        let door = loaded.layout.door(door).expect("Door should survive the file");
        assert!(door.is_jammed);
        assert_eq!(door.controls.len(), 1);
        assert_eq!(loaded.graph.node(b).unwrap().links.as_slice(), &[a]);
    }
}
