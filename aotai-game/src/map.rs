//! Route graph of the traverse.
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::data::{CatalogError, CatalogKind};

/// Ground type of a node, driving hiking speed and event triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    #[default]
    Normal,
    Meadow,
    Forest,
    Rocky,
    Ridge,
    Danger,
}

impl Terrain {
    /// Movement speed multiplier for this ground type.
    #[must_use]
    pub const fn speed_factor(self) -> f64 {
        match self {
            Self::Normal | Self::Meadow => 1.0,
            Self::Forest => 0.8,
            Self::Rocky => 0.6,
            Self::Ridge => 0.5,
            Self::Danger => 0.4,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Meadow => "meadow",
            Self::Forest => "forest",
            Self::Rocky => "rocky",
            Self::Ridge => "ridge",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One waypoint on the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    #[serde(rename = "node_id")]
    pub id: String,
    pub name: String,
    pub altitude: f64,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub distance_to_next: f64,
    #[serde(default)]
    pub connections: Vec<String>,
    /// Arrival here offers an early bail-out from the traverse.
    #[serde(default)]
    pub retreat: bool,
    #[serde(default)]
    pub description: String,
}

impl MapNode {
    /// A node without onward connections ends the route.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.connections.is_empty()
    }
}

/// Immutable directed acyclic route graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapGraph {
    nodes: Vec<MapNode>,
    index: HashMap<String, usize>,
}

impl MapGraph {
    /// Parse and validate the node list.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON and [`CatalogError::Invalid`]
    /// for duplicate ids, negative distances, or cycles.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let nodes: Vec<MapNode> =
            serde_json::from_str(json).map_err(|source| CatalogError::Parse {
                catalog: CatalogKind::Map,
                source,
            })?;
        Self::from_nodes(nodes)
    }

    /// Build a graph from parsed nodes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Invalid`] for duplicate ids, negative distances, or cycles.
    pub fn from_nodes(nodes: Vec<MapNode>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if node.distance_to_next < 0.0 {
                return Err(CatalogError::invalid(
                    CatalogKind::Map,
                    format!("node `{}` has a negative distance", node.id),
                ));
            }
            if index.insert(node.id.clone(), position).is_some() {
                return Err(CatalogError::invalid(
                    CatalogKind::Map,
                    format!("duplicate node id `{}`", node.id),
                ));
            }
        }
        let graph = Self { nodes, index };
        for node in &graph.nodes {
            for target in &node.connections {
                if !graph.index.contains_key(target) {
                    log::warn!("node `{}` links to unknown node `{target}`", node.id);
                }
            }
        }
        if let Some(node) = graph.find_cycle() {
            return Err(CatalogError::invalid(
                CatalogKind::Map,
                format!("route contains a cycle through `{node}`"),
            ));
        }
        Ok(graph)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MapNode> {
        self.index.get(id).and_then(|&position| self.nodes.get(position))
    }

    /// Onward nodes that actually exist in the graph.
    pub fn connections<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a MapNode> + use<'a> {
        let targets = self.get(id).map(|node| node.connections.as_slice()).unwrap_or(&[]);
        targets.iter().filter_map(|target| self.get(target))
    }

    /// Whether `to` is a direct successor of `from`.
    #[must_use]
    pub fn is_connected(&self, from: &str, to: &str) -> bool {
        self.get(from)
            .is_some_and(|node| node.connections.iter().any(|target| target == to))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapNode> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn find_cycle(&self) -> Option<&str> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }
        let mut marks: HashMap<&str, Mark> = HashMap::new();
        for start in &self.nodes {
            if marks.contains_key(start.id.as_str()) {
                continue;
            }
            let mut stack: Vec<(&str, usize)> = vec![(start.id.as_str(), 0)];
            marks.insert(start.id.as_str(), Mark::Visiting);
            while let Some((current, child)) = stack.pop() {
                let Some(node) = self.get(current) else {
                    marks.insert(current, Mark::Done);
                    continue;
                };
                if let Some(next) = node.connections.get(child) {
                    stack.push((current, child + 1));
                    if self.get(next).is_none() {
                        continue;
                    }
                    match marks.get(next.as_str()) {
                        Some(Mark::Visiting) => return Some(current),
                        Some(Mark::Done) => {}
                        None => {
                            marks.insert(next.as_str(), Mark::Visiting);
                            stack.push((next.as_str(), 0));
                        }
                    }
                } else {
                    marks.insert(current, Mark::Done);
                }
            }
        }
        None
    }

    /// Sum of leg distances along the first-connection path from `start`.
    #[must_use]
    pub fn route_length(&self, start: &str) -> f64 {
        let mut visited = HashSet::new();
        let mut total = 0.0;
        let mut cursor = self.get(start);
        while let Some(node) = cursor {
            if !visited.insert(node.id.as_str()) {
                break;
            }
            total += node.distance_to_next;
            cursor = node.connections.first().and_then(|next| self.get(next));
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, connections: &[&str]) -> MapNode {
        MapNode {
            id: id.to_string(),
            name: id.to_uppercase(),
            altitude: 2_000.0,
            terrain: Terrain::Normal,
            distance_to_next: 4.0,
            connections: connections.iter().map(|c| (*c).to_string()).collect(),
            retreat: false,
            description: String::new(),
        }
    }

    #[test]
    fn terrain_factors_match_ground_types() {
        assert!((Terrain::Forest.speed_factor() - 0.8).abs() < f64::EPSILON);
        assert!((Terrain::Danger.speed_factor() - 0.4).abs() < f64::EPSILON);
        assert!((Terrain::Meadow.speed_factor() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn graph_resolves_connections_and_terminals() {
        let graph = MapGraph::from_nodes(vec![
            node("start", &["a", "missing"]),
            node("a", &["end"]),
            node("end", &[]),
        ])
        .unwrap();
        let onward: Vec<_> = graph.connections("start").map(|n| n.id.as_str()).collect();
        assert_eq!(onward, vec!["a"]);
        assert!(graph.get("end").unwrap().is_terminal());
        assert!(graph.is_connected("a", "end"));
        assert!(!graph.is_connected("start", "end"));
        assert!((graph.route_length("start") - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cycles_are_rejected() {
        let result = MapGraph::from_nodes(vec![node("a", &["b"]), node("b", &["a"])]);
        assert!(matches!(result, Err(CatalogError::Invalid { .. })));
    }

    #[test]
    fn node_json_uses_node_id_and_defaults() {
        let graph = MapGraph::from_json(
            r#"[{"node_id": "start", "name": "Trailhead", "altitude": 1800}]"#,
        )
        .unwrap();
        let start = graph.get("start").unwrap();
        assert_eq!(start.terrain, Terrain::Normal);
        assert!(!start.retreat);
        assert!(start.is_terminal());
    }
}
