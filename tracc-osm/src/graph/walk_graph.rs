use crate::OsmError;
use geo::{Distance, Haversine, Point};
use rstar::primitives::GeomWithData;
use rstar::RTree;
use std::collections::{HashMap, VecDeque};

/// the pedestrian street network: nodes in WGS-84 lon/lat, undirected
/// edges with haversine lengths in meters, and a spatial index for
/// snapping arbitrary points (tract centroids, transit stops) to their
/// nearest walkable node. immutable after construction and safe to share
/// across concurrent reachability queries.
#[derive(Clone, Debug)]
pub struct WalkGraph {
    points: Vec<Point<f64>>,
    osmids: Vec<i64>,
    adjacency: Vec<Vec<(usize, f64)>>,
    rtree: RTree<GeomWithData<[f64; 2], usize>>,
}

impl WalkGraph {
    /// assembles a graph from OSM nodes and the node-id pairs of walkable
    /// way segments. segments referencing a node absent from the extract
    /// fail the build: a truncated extract is a misconfiguration, not a
    /// condition to paper over.
    pub fn new(
        nodes: Vec<(i64, Point<f64>)>,
        segments: Vec<(i64, i64)>,
    ) -> Result<WalkGraph, OsmError> {
        let mut index: HashMap<i64, usize> = HashMap::with_capacity(nodes.len());
        let mut points = Vec::with_capacity(nodes.len());
        let mut osmids = Vec::with_capacity(nodes.len());
        for (osmid, point) in nodes {
            index.entry(osmid).or_insert_with(|| {
                points.push(point);
                osmids.push(osmid);
                points.len() - 1
            });
        }

        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![vec![]; points.len()];
        for (src_osmid, dst_osmid) in segments {
            let src = *index
                .get(&src_osmid)
                .ok_or(OsmError::MissingNodeError(src_osmid))?;
            let dst = *index
                .get(&dst_osmid)
                .ok_or(OsmError::MissingNodeError(dst_osmid))?;
            if src == dst {
                continue;
            }
            let length = Haversine.distance(points[src], points[dst]);
            if !adjacency[src].iter().any(|(n, _)| *n == dst) {
                adjacency[src].push((dst, length));
                adjacency[dst].push((src, length));
            }
        }

        let rtree = RTree::bulk_load(
            points
                .iter()
                .enumerate()
                .map(|(i, p)| GeomWithData::new([p.x(), p.y()], i))
                .collect(),
        );

        Ok(WalkGraph {
            points,
            osmids,
            adjacency,
            rtree,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, node: usize) -> Point<f64> {
        self.points[node]
    }

    pub fn osmid(&self, node: usize) -> i64 {
        self.osmids[node]
    }

    pub fn neighbors(&self, node: usize) -> &[(usize, f64)] {
        &self.adjacency[node]
    }

    /// snaps a WGS-84 point to the nearest graph node, returning the node
    /// index and the haversine snap distance in meters. nearest-neighbor
    /// search runs in degree space, which is a fine approximation at city
    /// extents away from the poles.
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(usize, f64)> {
        let found = self.rtree.nearest_neighbor(&[point.x(), point.y()])?;
        let node = found.data;
        let meters = Haversine.distance(*point, self.points[node]);
        Some((node, meters))
    }

    /// retains only the largest connected component, discarding stranded
    /// slivers (parking lots, private paths) that would otherwise trap a
    /// snapped origin on an island of a handful of nodes.
    pub fn largest_component(&self) -> Result<WalkGraph, OsmError> {
        let components = self.connected_components();
        let largest = components
            .iter()
            .max_by_key(|c| c.len())
            .ok_or_else(|| OsmError::InternalError(String::from("graph has no components")))?;
        if components.len() > 1 {
            log::info!(
                "retaining largest of {} components: {} of {} nodes",
                components.len(),
                largest.len(),
                self.len()
            );
        }

        let keep: Vec<usize> = largest.clone();
        let nodes: Vec<(i64, Point<f64>)> = keep
            .iter()
            .map(|&n| (self.osmids[n], self.points[n]))
            .collect();
        let mut segments = vec![];
        for &n in &keep {
            for (dst, _) in &self.adjacency[n] {
                if n < *dst {
                    segments.push((self.osmids[n], self.osmids[*dst]));
                }
            }
        }
        WalkGraph::new(nodes, segments)
    }

    /// groups all nodes into connected components via breadth-first search.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let mut visited = vec![false; self.len()];
        let mut components = vec![];
        for start in 0..self.len() {
            if visited[start] {
                continue;
            }
            let mut component = vec![];
            let mut queue = VecDeque::from([start]);
            visited[start] = true;
            while let Some(node) = queue.pop_front() {
                component.push(node);
                for (next, _) in &self.adjacency[node] {
                    if !visited[*next] {
                        visited[*next] = true;
                        queue.push_back(*next);
                    }
                }
            }
            components.push(component);
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// a 2x2 square of nodes plus one disconnected pair, roughly 100m apart
    fn two_component_graph() -> WalkGraph {
        let nodes = vec![
            (1, Point::new(-79.4000, 43.7000)),
            (2, Point::new(-79.3990, 43.7000)),
            (3, Point::new(-79.3990, 43.7009)),
            (4, Point::new(-79.4000, 43.7009)),
            (5, Point::new(-79.3000, 43.7500)),
            (6, Point::new(-79.2990, 43.7500)),
        ];
        let segments = vec![(1, 2), (2, 3), (3, 4), (4, 1), (5, 6)];
        WalkGraph::new(nodes, segments).unwrap()
    }

    #[test]
    fn test_edge_lengths_are_haversine_meters() {
        let graph = two_component_graph();
        let (_, length) = graph.neighbors(0)[0];
        // ~0.001 degrees of longitude at 43.7N is ~80m
        assert!((50.0..120.0).contains(&length), "got {length}");
    }

    #[test]
    fn test_connected_components() {
        let graph = two_component_graph();
        let components = graph.connected_components();
        assert_eq!(components.len(), 2);
        let mut sizes: Vec<usize> = components.iter().map(|c| c.len()).collect();
        sizes.sort();
        assert_eq!(sizes, vec![2, 4]);
    }

    #[test]
    fn test_largest_component_retained() {
        let graph = two_component_graph().largest_component().unwrap();
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.connected_components().len(), 1);
    }

    #[test]
    fn test_nearest_node_snaps() {
        let graph = two_component_graph();
        let (node, meters) = graph
            .nearest_node(&Point::new(-79.4001, 43.7001))
            .unwrap();
        assert_eq!(graph.osmid(node), 1);
        assert!(meters < 50.0);
    }

    #[test]
    fn test_missing_node_reference_fails() {
        let nodes = vec![(1, Point::new(0.0, 0.0))];
        let result = WalkGraph::new(nodes, vec![(1, 99)]);
        assert!(matches!(result, Err(OsmError::MissingNodeError(99))));
    }
}
