//! Reduction of the cell graph into a semantic room/hallway graph.
//!
//! Two collapse passes: connected clusters of room and corner cells merge
//! into one room node each, then runs of pure hallway cells merge into one
//! hallway node each. Whatever survives is a junction. Merged nodes reuse
//! the smallest member cell index, so every index in the reduced graph is
//! also a valid index into the cell graph arena.

use crate::error::{Error, Result};
use crate::graph::{CellGraph, RawType};
use crate::grid::BoxGrid;
use crate::location::Location;
use fnv::{FnvHashMap, FnvHashSet};
use log::*;
use pathfinding::undirected::connected_components::connected_components;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CornerKind {
    Concave,
    Convex,
    Doorway,
}

impl CornerKind {
    pub fn from_raw(raw: RawType) -> Option<CornerKind> {
        match raw {
            RawType::CornerCcv => Some(CornerKind::Concave),
            RawType::CornerCvx => Some(CornerKind::Convex),
            RawType::CornerDrw => Some(CornerKind::Doorway),
            _ => None,
        }
    }
}

/// A corner cell retained on a room node for camera candidate poses.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCorner {
    pub cell: usize,
    pub kind: CornerKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Room {
        /// Uncovered cell count; the camera stage decrements it in
        /// lock-step with `room_nodes`.
        area: usize,
        /// Original member cell indices still uncovered.
        room_nodes: Vec<usize>,
        corners: Vec<RoomCorner>,
        is_dead_end: bool,
    },
    Hallway {
        /// Chain length in cells.
        area: usize,
    },
    Junction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReducedNode {
    /// Box coordinates `(col, row)`; fractional for merged nodes.
    pub pos: (f64, f64),
    pub neighbors: Vec<usize>,
    pub kind: NodeKind,
}

impl ReducedNode {
    pub fn area(&self) -> usize {
        match &self.kind {
            NodeKind::Room { area, .. } => *area,
            NodeKind::Hallway { area } => *area,
            NodeKind::Junction => 1,
        }
    }

    #[inline]
    pub fn is_hallway(&self) -> bool {
        matches!(self.kind, NodeKind::Hallway { .. })
    }

    #[inline]
    pub fn is_room(&self) -> bool {
        matches!(self.kind, NodeKind::Room { .. })
    }
}

/// The reduced semantic graph. Keys are surviving cell indices.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReducedGraph {
    width: u32,
    nodes: FnvHashMap<usize, ReducedNode>,
}

impl ReducedGraph {
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn node(&self, id: usize) -> Option<&ReducedNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: usize) -> Option<&mut ReducedNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: usize) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node ids in ascending order. Iteration-order tie-breaks in the
    /// placement pipeline rely on this being deterministic.
    pub fn node_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn is_hallway(&self, id: usize) -> bool {
        self.node(id).map(|n| n.is_hallway()).unwrap_or(false)
    }

    pub fn hallway_nodes(&self) -> Vec<usize> {
        self.node_ids()
            .into_iter()
            .filter(|&id| self.is_hallway(id))
            .collect()
    }

    pub fn room_nodes(&self) -> Vec<usize> {
        self.node_ids()
            .into_iter()
            .filter(|&id| self.nodes[&id].is_room())
            .collect()
    }

    /// Remove a node and detach it from every neighbour. Total and
    /// idempotent: removing an absent node is a no-op.
    pub fn remove_node(&mut self, id: usize) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        for nbr in node.neighbors {
            if let Some(n) = self.nodes.get_mut(&nbr) {
                n.neighbors.retain(|&m| m != id);
            }
        }
    }

    /// Remove every node whose neighbour list is empty. Isolated
    /// singletons inflate the cycle count.
    pub fn prune_isolated(&mut self) {
        let isolated: Vec<usize> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.neighbors.is_empty())
            .map(|(&id, _)| id)
            .collect();
        for id in isolated {
            self.nodes.remove(&id);
        }
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.neighbors.len()).sum::<usize>() / 2
    }

    fn components(&self) -> Vec<FnvHashSet<usize>> {
        let ids = self.node_ids();
        connected_components(&ids, |&id| {
            self.nodes
                .get(&id)
                .map(|n| n.neighbors.clone())
                .unwrap_or_default()
        })
        .into_iter()
        .map(|set| set.into_iter().collect())
        .collect()
    }

    /// Number of independent cycles: `|E| - |V| + components`. The
    /// component term matters once sensor removal has split the graph.
    pub fn number_of_cycles(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        self.edge_count() + self.components().len() - self.len()
    }

    /// Sizes of each connected component.
    pub fn sub_graph_sizes(&self) -> Vec<usize> {
        self.components().into_iter().map(|c| c.len()).collect()
    }
}

/// Collapse one cluster in the working adjacency: detach the members,
/// insert a merged node at the smallest member index, and reconnect the
/// external neighbours. Returns `(merged_index, exits, mean_position)`.
fn collapse_cluster(
    adj: &mut FnvHashMap<usize, Vec<usize>>,
    pos: &mut FnvHashMap<usize, (f64, f64)>,
    members: &[usize],
) -> (usize, Vec<usize>, (f64, f64)) {
    let member_set: FnvHashSet<usize> = members.iter().copied().collect();

    let mut exits: Vec<usize> = members
        .iter()
        .flat_map(|m| adj[m].iter().copied())
        .filter(|n| !member_set.contains(n))
        .collect();
    exits.sort_unstable();
    exits.dedup();

    let mut sum = (0.0, 0.0);
    for m in members {
        let p = pos[m];
        sum.0 += p.0;
        sum.1 += p.1;
    }
    let mean = (sum.0 / members.len() as f64, sum.1 / members.len() as f64);

    for &m in members {
        if let Some(neighbors) = adj.remove(&m) {
            for nbr in neighbors {
                if let Some(list) = adj.get_mut(&nbr) {
                    list.retain(|&n| n != m);
                }
            }
        }
        pos.remove(&m);
    }

    let merged = members[0];
    adj.insert(merged, exits.clone());
    for &e in &exits {
        adj.get_mut(&e).expect("exit survives collapse").push(merged);
    }
    pos.insert(merged, mean);

    (merged, exits, mean)
}

/// Partition `candidates` into connected clusters using the given
/// adjacency, keeping only edges between candidates.
fn cluster_candidates(
    candidates: &[usize],
    adj: &FnvHashMap<usize, Vec<usize>>,
) -> Vec<Vec<usize>> {
    let candidate_set: FnvHashSet<usize> = candidates.iter().copied().collect();
    connected_components(candidates, |&id| {
        adj.get(&id)
            .map(|ns| {
                ns.iter()
                    .copied()
                    .filter(|n| candidate_set.contains(n))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    })
    .into_iter()
    .map(|set| {
        let mut members: Vec<usize> = set.into_iter().collect();
        members.sort_unstable();
        members
    })
    .collect()
}

/// Reduce the cell graph to the semantic room/hallway graph.
pub fn reduce(graph: &CellGraph) -> ReducedGraph {
    let width = graph.width();

    let mut adj: FnvHashMap<usize, Vec<usize>> = graph
        .iter()
        .map(|(i, n)| (i, n.neighbors.clone()))
        .collect();
    let mut pos: FnvHashMap<usize, (f64, f64)> = graph
        .iter()
        .map(|(i, n)| (i, (n.pos.x() as f64, n.pos.y() as f64)))
        .collect();
    let mut kinds: FnvHashMap<usize, NodeKind> = FnvHashMap::default();

    // Pass 1: room clusters (room cells plus every corner sub-type).
    let mut seeds: Vec<usize> = graph
        .iter()
        .filter(|(_, n)| n.raw_type.is_cluster_seed())
        .map(|(i, _)| i)
        .collect();
    seeds.sort_unstable();

    for members in cluster_candidates(&seeds, &adj) {
        let (merged, exits, _) = collapse_cluster(&mut adj, &mut pos, &members);
        let corners: Vec<RoomCorner> = members
            .iter()
            .filter_map(|&cell| {
                CornerKind::from_raw(graph.raw_type(cell).expect("member is a free cell"))
                    .map(|kind| RoomCorner { cell, kind })
            })
            .collect();
        kinds.insert(
            merged,
            NodeKind::Room {
                area: members.len(),
                room_nodes: members.clone(),
                corners,
                is_dead_end: exits.len() == 1,
            },
        );
    }

    // Pass 2: straight hallway chains among the survivors.
    let mut hallway_cells: Vec<usize> = adj
        .keys()
        .copied()
        .filter(|id| {
            !kinds.contains_key(id) && graph.raw_type(*id) == Some(RawType::Hallway)
        })
        .collect();
    hallway_cells.sort_unstable();

    for members in cluster_candidates(&hallway_cells, &adj) {
        let (merged, _, _) = collapse_cluster(&mut adj, &mut pos, &members);
        kinds.insert(
            merged,
            NodeKind::Hallway {
                area: members.len(),
            },
        );
    }

    // Everything else (junctions, dead ends, stray cells) survives as a
    // single junction node.
    let nodes: FnvHashMap<usize, ReducedNode> = adj
        .into_iter()
        .map(|(id, mut neighbors)| {
            neighbors.sort_unstable();
            let kind = kinds.remove(&id).unwrap_or(NodeKind::Junction);
            let node = ReducedNode {
                pos: pos[&id],
                neighbors,
                kind,
            };
            (id, node)
        })
        .collect();

    debug!(
        "reduced {} cells to {} nodes ({} rooms, {} hallways)",
        graph.len(),
        nodes.len(),
        nodes.values().filter(|n| n.is_room()).count(),
        nodes.values().filter(|n| n.is_hallway()).count()
    );

    ReducedGraph { width, nodes }
}

/// The full semantic map: the box grid, its cell graph, and the reduced
/// graph, built once at start-up and persisted as an opaque blob.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomMap {
    pub boxes: BoxGrid,
    pub cells: CellGraph,
    pub reduced: ReducedGraph,
    digest: u64,
}

impl RoomMap {
    pub fn build(boxes: BoxGrid) -> RoomMap {
        let cells = CellGraph::build(&boxes);
        let reduced = reduce(&cells);
        let digest = boxes.digest();
        RoomMap {
            boxes,
            cells,
            reduced,
            digest,
        }
    }

    /// True when this map was built from a grid with identical contents.
    pub fn matches(&self, boxes: &BoxGrid) -> bool {
        self.digest == boxes.digest()
    }

    /// Cell position of a reduced-graph member cell index.
    pub fn cell_pos(&self, cell: usize) -> (f64, f64) {
        let loc = Location::from_index(cell, self.boxes.width());
        (loc.x() as f64, loc.y() as f64)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<RoomMap> {
        let bytes = std::fs::read(path)?;
        let map: RoomMap = bincode::deserialize(&bytes)?;
        if map.digest != map.boxes.digest() {
            return Err(Error::Graph(
                "persisted graph digest does not match its own grid".to_string(),
            ));
        }
        Ok(map)
    }
}
