use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use flanker_core::enums::MoveType;
use flanker_core::errors::StoreError;
use flanker_core::types::Vec2;
use flanker_geometry::point_in_polygon;
use flanker_sim::systems::{los, movement};
use flanker_sim::GameState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaypointNode {
    pub position: Vec2,
    /// Nodes inside this node's visibility polygon, or whose polygon
    /// contains this node.
    pub visible_nodes: BTreeSet<usize>,
    /// Per reachable destination: the nodes within the path tolerance of
    /// the straight walk, ordered by distance along it. Starts here and
    /// ends at the destination.
    pub movable_paths: BTreeMap<usize, Vec<usize>>,
}

impl WaypointNode {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            visible_nodes: BTreeSet::new(),
            movable_paths: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaypointGraph {
    nodes: Vec<WaypointNode>,
    path_tolerance: f64,
}

impl WaypointGraph {
    /// Nodes at `points`, connected against the world's terrain.
    pub fn build(world: &GameState, points: &[Vec2], path_tolerance: f64) -> Result<Self, StoreError> {
        let mut graph = Self::from_nodes(Vec::new(), path_tolerance);
        graph.extend(world, points)?;
        tracing::debug!(nodes = graph.len(), path_tolerance, "waypoint graph built");
        Ok(graph)
    }

    /// A graph with precomputed relationships.
    pub fn from_nodes(nodes: Vec<WaypointNode>, path_tolerance: f64) -> Self {
        Self {
            nodes,
            path_tolerance,
        }
    }

    /// Append nodes at `points` and connect them to every existing node in
    /// both directions. Paths between existing nodes are not recomputed.
    /// Returns the new node ids in `points` order.
    pub fn extend(&mut self, world: &GameState, points: &[Vec2]) -> Result<Vec<usize>, StoreError> {
        let first = self.nodes.len();
        self.nodes.extend(points.iter().map(|&p| WaypointNode::new(p)));
        let added: Vec<usize> = (first..self.nodes.len()).collect();

        self.connect_visibility(world, &added)?;
        self.connect_paths(world, &added)?;
        Ok(added)
    }

    pub fn nodes(&self) -> &[WaypointNode] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> Option<&WaypointNode> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn path_tolerance(&self) -> f64 {
        self.path_tolerance
    }

    pub fn can_see(&self, from: usize, to: usize) -> bool {
        self.node(from)
            .is_some_and(|node| node.visible_nodes.contains(&to))
    }

    pub fn path(&self, from: usize, to: usize) -> Option<&[usize]> {
        self.node(from)
            .and_then(|node| node.movable_paths.get(&to))
            .map(Vec::as_slice)
    }

    fn connect_visibility(&mut self, world: &GameState, added: &[usize]) -> Result<(), StoreError> {
        for &id in added {
            let polygon = los::get_los_polygon(world, self.nodes[id].position)?;
            for other in 0..self.nodes.len() {
                if point_in_polygon(self.nodes[other].position, &polygon) {
                    self.nodes[id].visible_nodes.insert(other);
                    self.nodes[other].visible_nodes.insert(id);
                }
            }
        }
        Ok(())
    }

    fn connect_paths(&mut self, world: &GameState, added: &[usize]) -> Result<(), StoreError> {
        let added: BTreeSet<usize> = added.iter().copied().collect();
        for from in 0..self.nodes.len() {
            for to in 0..self.nodes.len() {
                if from == to || !(added.contains(&from) || added.contains(&to)) {
                    continue;
                }
                let (start, end) = (self.nodes[from].position, self.nodes[to].position);
                if !movement::path_is_clear(world, start, end, MoveType::Foot)? {
                    continue;
                }
                let path = self.corridor(from, to);
                self.nodes[from].movable_paths.insert(to, path);
            }
        }
        Ok(())
    }

    /// Nodes within the path tolerance of the segment `from -> to` whose
    /// projection falls on it, plus both endpoints, by projection.
    fn corridor(&self, from: usize, to: usize) -> Vec<usize> {
        let start = self.nodes[from].position;
        let end = self.nodes[to].position;
        let length = start.distance(end);
        let direction = (end - start).normalize_or_zero();

        let mut path: Vec<(f64, usize)> = Vec::new();
        for (id, node) in self.nodes.iter().enumerate() {
            let offset = node.position - start;
            let t = offset.dot(direction);
            if id != from && id != to {
                if t < 0.0 || t > length {
                    continue;
                }
                if (offset - direction * t).length() > self.path_tolerance {
                    continue;
                }
            }
            path.push((t, id));
        }
        path.sort_by(|a, b| a.0.total_cmp(&b.0));
        path.into_iter().map(|(_, id)| id).collect()
    }
}
