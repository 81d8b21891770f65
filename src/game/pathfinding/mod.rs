/// Route planning over the waypoint graph.
///
/// - **oracle**: the `PathOracle` contract the steering manager plans through
/// - **astar**: reference A* implementation of that contract
///
/// The steering manager only ever sees the trait; swap the oracle to plug in
/// a different search.

mod oracle;
mod astar;

pub use oracle::{NodeFilter, PathOracle, RouteRequest};
pub use astar::WaypointPathFinder;
