//! Bipartite structure detection by BFS two-colouring.

use crate::error::{GraphError, Result};
use crate::graph::{BipartiteGraph, Graph, Side};
use log::info;
use std::collections::VecDeque;

/// Find a side labelling of `graph` such that every edge joins side A
/// to side B.
///
/// Components are coloured independently; the lowest-index vertex of each
/// component is put on side A, so isolated vertices end up on side A.
/// A self loop or an odd cycle yields `NotBipartite` with the offending edge.
pub fn detect_sides(graph: &Graph) -> Result<Vec<Side>> {
    let n = graph.num_vertices();
    let mut sides: Vec<Option<Side>> = vec![None; n];
    let mut queue = VecDeque::new();

    for root in 0..n {
        if sides[root].is_some() {
            continue;
        }
        sides[root] = Some(Side::A);
        queue.push_back(root);

        while let Some(u) = queue.pop_front() {
            let su = sides[u].unwrap_or(Side::A);
            for &v in graph.neighbors(u) {
                match sides[v] {
                    None => {
                        sides[v] = Some(su.opposite());
                        queue.push_back(v);
                    }
                    Some(sv) if sv == su => {
                        return Err(GraphError::NotBipartite { u, v });
                    }
                    Some(_) => {}
                }
            }
        }
    }

    Ok(sides.into_iter().map(|s| s.unwrap_or(Side::A)).collect())
}

/// Label the sides of `graph`, consuming it into a [`BipartiteGraph`].
pub fn into_bipartite(graph: Graph) -> Result<BipartiteGraph> {
    info!("Finding a bipartite mapping...");
    let sides = detect_sides(&graph)?;
    let ret = BipartiteGraph { graph, sides };
    info!(
        "Mapping successful: {} vertices on side A, {} on side B",
        ret.count_side(Side::A),
        ret.count_side(Side::B)
    );
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_is_bipartite() {
        let g = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let sides = detect_sides(&g).unwrap();
        assert_eq!(sides, vec![Side::A, Side::B, Side::A, Side::B]);
    }

    #[test]
    fn test_isolated_and_components() {
        // component {1,2}, isolated 0 and 3, component {4,5,6}
        let g = Graph::from_edges(7, &[(2, 1), (5, 4), (5, 6)]);
        let sides = detect_sides(&g).unwrap();
        assert_eq!(sides[0], Side::A);
        assert_eq!(sides[1], Side::A);
        assert_eq!(sides[2], Side::B);
        assert_eq!(sides[3], Side::A);
        assert_eq!(sides[4], Side::A);
        assert_eq!(sides[5], Side::B);
        assert_eq!(sides[6], Side::A);
    }

    #[test]
    fn test_triangle_is_not_bipartite() {
        let g = Graph::from_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        match detect_sides(&g) {
            Err(GraphError::NotBipartite { .. }) => {}
            other => panic!("expected NotBipartite, got {:?}", other),
        }
    }

    #[test]
    fn test_self_loop_is_not_bipartite() {
        let g = Graph::from_edges(2, &[(0, 1), (1, 1)]);
        assert!(matches!(
            detect_sides(&g),
            Err(GraphError::NotBipartite { u: 1, v: 1 })
        ));
    }

    #[test]
    fn test_even_cycle() {
        let g = Graph::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let bg = into_bipartite(g).unwrap();
        assert_eq!(bg.count_side(Side::A), 2);
        assert_eq!(bg.count_side(Side::B), 2);
        for (u, v) in bg.graph.edges() {
            assert_ne!(bg.sides[u], bg.sides[v]);
        }
    }
}
