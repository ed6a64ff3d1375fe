//! Cell-level connectivity graph over the box grid.
//!
//! One node per free cell, addressed by its dense row-major index. Nodes are
//! held in an append-only arena indexed by cell id; reduction never re-mints
//! indices, so arena slots stay valid for the lifetime of the map.

use crate::grid::BoxGrid;
use crate::location::Location;
use serde::{Deserialize, Serialize};

const ORTHO_OFFSETS: [(i64, i64); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];
const DIAG_OFFSETS: [(i64, i64); 4] = [(-1, -1), (1, -1), (-1, 1), (1, 1)];
// The two orthogonal cells between each diagonal pair, same order as
// DIAG_OFFSETS. A diagonal connects only when both are free.
const DIAG_GATES: [[(i64, i64); 2]; 4] = [
    [(-1, 0), (0, -1)],
    [(1, 0), (0, -1)],
    [(-1, 0), (0, 1)],
    [(1, 0), (0, 1)],
];

/// Local-connectivity classification of a cell node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RawType {
    Default,
    Room,
    CornerCcv,
    CornerCvx,
    CornerDrw,
    Hallway,
    LJunction,
    TJunction,
    XJunction,
    DeadEnd,
}

impl RawType {
    #[inline]
    pub fn is_corner(self) -> bool {
        matches!(
            self,
            RawType::CornerCcv | RawType::CornerCvx | RawType::CornerDrw
        )
    }

    /// Room and corner cells seed the room-cluster reduction pass.
    #[inline]
    pub fn is_cluster_seed(self) -> bool {
        self == RawType::Room || self.is_corner()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellNode {
    pub pos: Location,
    /// All neighbours, orthogonal then diagonal.
    pub neighbors: Vec<usize>,
    /// The orthogonal subset.
    pub nbr_str: Vec<usize>,
    /// The diagonal subset (corner-safe only).
    pub nbr_diag: Vec<usize>,
    pub raw_type: RawType,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellGraph {
    width: u32,
    height: u32,
    nodes: Vec<Option<CellNode>>,
}

impl CellGraph {
    /// Build the full graph for a box grid and classify every node.
    pub fn build(grid: &BoxGrid) -> CellGraph {
        let width = grid.width();
        let height = grid.height();
        let mut nodes: Vec<Option<CellNode>> =
            vec![None; (width as usize) * (height as usize)];

        for y in 0..height as i64 {
            for x in 0..width as i64 {
                if !grid.is_free(x, y) {
                    continue;
                }
                let mut node = CellNode {
                    pos: Location::from_coords(x as u32, y as u32),
                    neighbors: Vec::new(),
                    nbr_str: Vec::new(),
                    nbr_diag: Vec::new(),
                    raw_type: RawType::Default,
                };
                for (dx, dy) in ORTHO_OFFSETS {
                    if grid.is_free(x + dx, y + dy) {
                        let index = ((y + dy) as u32 * width + (x + dx) as u32) as usize;
                        node.neighbors.push(index);
                        node.nbr_str.push(index);
                    }
                }
                for (i, (dx, dy)) in DIAG_OFFSETS.into_iter().enumerate() {
                    if grid.is_free(x + dx, y + dy) {
                        let [(ax, ay), (bx, by)] = DIAG_GATES[i];
                        if grid.is_free(x + ax, y + ay) && grid.is_free(x + bx, y + by) {
                            let index = ((y + dy) as u32 * width + (x + dx) as u32) as usize;
                            node.neighbors.push(index);
                            node.nbr_diag.push(index);
                        }
                    }
                }
                let index = (y as u32 * width + x as u32) as usize;
                nodes[index] = Some(node);
            }
        }

        let mut graph = CellGraph {
            width,
            height,
            nodes,
        };
        for index in 0..graph.nodes.len() {
            if graph.nodes[index].is_some() {
                let raw_type = graph.classify(index);
                graph.nodes[index]
                    .as_mut()
                    .expect("checked above")
                    .raw_type = raw_type;
            }
        }
        graph
    }

    /// Classification is a pure function of the node's stored neighbour
    /// lists; evaluation order across nodes does not matter.
    fn classify(&self, index: usize) -> RawType {
        let node = self.nodes[index].as_ref().expect("classify on free cell");
        let ns = node.nbr_str.len();
        let nd = node.nbr_diag.len();

        // Two orthogonal neighbours are aligned when they share a column or
        // a row; otherwise the node sits on a turn.
        let aligned = if ns == 2 {
            let a = Location::from_index(node.nbr_str[0], self.width);
            let b = Location::from_index(node.nbr_str[1], self.width);
            a.x() == b.x() || a.y() == b.y()
        } else {
            true
        };

        let mut raw_type = RawType::Default;

        if node.neighbors.len() > 4 {
            raw_type = RawType::Room;
        }

        // Corner sub-types require a non-empty diagonal set and override
        // the room tag.
        if ns == 2 {
            if nd > 0 && !aligned {
                raw_type = RawType::CornerCcv;
            }
        } else if ns == 3 && nd == 1 {
            raw_type = RawType::CornerDrw;
        } else if ns == 4 && nd == 3 {
            raw_type = RawType::CornerCvx;
        }

        // Pure corridor cells have no diagonals at all.
        if nd == 0 {
            raw_type = match ns {
                1 => RawType::DeadEnd,
                2 if aligned => RawType::Hallway,
                2 => RawType::LJunction,
                3 => RawType::TJunction,
                4 => RawType::XJunction,
                _ => raw_type,
            };
        }

        raw_type
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn node(&self, index: usize) -> Option<&CellNode> {
        self.nodes.get(index).and_then(|n| n.as_ref())
    }

    pub fn raw_type(&self, index: usize) -> Option<RawType> {
        self.node(index).map(|n| n.raw_type)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &CellNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|node| (i, node)))
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|n| n.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BoxGrid;

    fn graph_from(rows: &[&str]) -> CellGraph {
        let matrix: Vec<Vec<u8>> = rows
            .iter()
            .map(|r| r.bytes().map(|b| if b == b'#' { 0 } else { 1 }).collect())
            .collect();
        CellGraph::build(&BoxGrid::from_matrix(&matrix).unwrap())
    }

    fn type_at(graph: &CellGraph, x: u32, y: u32) -> RawType {
        graph
            .raw_type((y * graph.width() + x) as usize)
            .expect("free cell")
    }

    #[test]
    fn one_node_per_free_cell_and_symmetric() {
        let graph = graph_from(&["#####", "#...#", "#.#.#", "#...#", "#####"]);
        let free = 8;
        assert_eq!(graph.len(), free);
        for (index, node) in graph.iter() {
            for &nbr in &node.neighbors {
                let back = graph.node(nbr).expect("neighbour exists");
                assert!(back.neighbors.contains(&index));
            }
        }
    }

    #[test]
    fn diagonals_never_cut_corners() {
        // Two free cells touching only at a corner must not connect.
        let graph = graph_from(&["####", "#.##", "##.#", "####"]);
        for (_, node) in graph.iter() {
            assert!(node.nbr_diag.is_empty());
            assert!(node.neighbors.is_empty());
        }
    }

    #[test]
    fn corridor_classification() {
        let graph = graph_from(&["#####", "#...#", "#####"]);
        assert_eq!(type_at(&graph, 1, 1), RawType::DeadEnd);
        assert_eq!(type_at(&graph, 2, 1), RawType::Hallway);
        assert_eq!(type_at(&graph, 3, 1), RawType::DeadEnd);
    }

    #[test]
    fn junction_classification() {
        let graph = graph_from(&[
            "#####", //
            "##.##", //
            "#...#", //
            "##.##", //
            "#####",
        ]);
        assert_eq!(type_at(&graph, 2, 2), RawType::XJunction);
        let t = graph_from(&["#####", "#...#", "##.##", "#####"]);
        assert_eq!(type_at(&t, 2, 1), RawType::TJunction);
        let l = graph_from(&["####", "#.##", "#..#", "####"]);
        assert_eq!(type_at(&l, 1, 2), RawType::LJunction);
    }

    #[test]
    fn room_and_corner_classification() {
        let graph = graph_from(&[
            "######", //
            "#....#", //
            "#....#", //
            "#....#", //
            "######",
        ]);
        // Interior cells of an open area have degree > 4.
        assert_eq!(type_at(&graph, 2, 2), RawType::Room);
        // The concave corners of the room.
        assert_eq!(type_at(&graph, 1, 1), RawType::CornerCcv);
        assert_eq!(type_at(&graph, 4, 3), RawType::CornerCcv);
    }

    #[test]
    fn doorway_corner_beside_an_opening() {
        // Room over a corridor dropping out of its bottom-left side; the
        // cell just inside the opening keeps three orthogonal neighbours
        // and a single gated diagonal.
        let graph = graph_from(&[
            "######", //
            "#....#", //
            "#....#", //
            "#.####", //
            "#.####", //
            "######",
        ]);
        assert_eq!(type_at(&graph, 1, 2), RawType::CornerDrw);
        assert_eq!(type_at(&graph, 1, 3), RawType::Hallway);
    }

    #[test]
    fn convex_corner_at_an_inner_bend() {
        let graph = graph_from(&[
            "######", //
            "#....#", //
            "#....#", //
            "#..###", //
            "#..###", //
            "######",
        ]);
        assert_eq!(type_at(&graph, 2, 2), RawType::CornerCvx);
    }
}
