use super::WayFilter;
use crate::graph::WalkGraph;
use crate::OsmError;
use geo::Point;
use itertools::Itertools;
use kdam::tqdm;
use osmpbf::{Element, ElementReader};
use std::collections::HashMap;
use std::path::Path;

/// reads a PBF extract and assembles the walkable street network. nodes
/// and ways are collected in a single streaming pass, then reduced to the
/// largest connected component.
pub fn read_walk_network(filepath: &str, filter: &WayFilter) -> Result<WalkGraph, OsmError> {
    let reader =
        ElementReader::from_path(Path::new(filepath)).map_err(|e| OsmError::PbfReadError {
            path: filepath.to_string(),
            source: e,
        })?;

    let mut coords: HashMap<i64, Point<f64>> = HashMap::new();
    let mut ways: Vec<Vec<i64>> = vec![];
    let mut ways_visited: usize = 0;
    reader
        .for_each(|element| match element {
            Element::Node(node) => {
                coords.insert(node.id(), Point::new(node.lon(), node.lat()));
            }
            Element::DenseNode(dense) => {
                // per the osmpbf docs, matching on Node implies you likely
                // also want DenseNode
                coords.insert(dense.id(), Point::new(dense.lon(), dense.lat()));
            }
            Element::Way(way) => {
                ways_visited += 1;
                let mut highway = None;
                let mut foot = None;
                for (key, value) in way.tags() {
                    match key {
                        "highway" => highway = Some(value),
                        "foot" => foot = Some(value),
                        _ => {}
                    }
                }
                if filter.walkable(highway, foot) {
                    ways.push(way.refs().collect());
                }
            }
            Element::Relation(_) => {}
        })
        .map_err(|e| OsmError::PbfReadError {
            path: filepath.to_string(),
            source: e,
        })?;
    log::info!(
        "{}: {} nodes, {} of {} ways retained as walkable",
        filepath,
        coords.len(),
        ways.len(),
        ways_visited
    );
    if ways.is_empty() {
        return Err(OsmError::EmptyNetworkError(filepath.to_string()));
    }

    // assemble segments from consecutive node pairs, dropping segments
    // whose endpoints fall outside the extract bounds
    let mut nodes: HashMap<i64, Point<f64>> = HashMap::new();
    let mut segments: Vec<(i64, i64)> = vec![];
    let mut dangling: usize = 0;
    for way in tqdm!(ways.iter(), desc = "assembling walk segments") {
        for (src, dst) in way.iter().tuple_windows() {
            match (coords.get(src), coords.get(dst)) {
                (Some(src_point), Some(dst_point)) => {
                    nodes.entry(*src).or_insert(*src_point);
                    nodes.entry(*dst).or_insert(*dst_point);
                    segments.push((*src, *dst));
                }
                _ => dangling += 1,
            }
        }
    }
    eprintln!();
    if dangling > 0 {
        log::warn!("dropped {dangling} segments with endpoints outside the extract");
    }

    let graph = WalkGraph::new(nodes.into_iter().collect(), segments)?;
    let connected = graph.largest_component()?;
    if connected.is_empty() {
        return Err(OsmError::EmptyNetworkError(filepath.to_string()));
    }
    log::info!("walk network ready: {} nodes", connected.len());
    Ok(connected)
}
