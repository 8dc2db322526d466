use geo::{BooleanOps, MultiPolygon, Polygon};

/// merges independently-polygonized reachable fragments into a single
/// (possibly multipart) region. a routing result may legitimately contain
/// disjoint fragments (transit islands reached by a ride with no walkable
/// connection back); all of them belong to the reachable area, so the
/// merge is a union, never a selection of one outer boundary.
pub fn merge_fragments(fragments: &[Polygon<f64>]) -> MultiPolygon<f64> {
    fragments
        .iter()
        .filter(|p| p.exterior().0.len() >= 4)
        .fold(MultiPolygon::new(vec![]), |acc, polygon| {
            if acc.0.is_empty() {
                MultiPolygon::new(vec![polygon.clone()])
            } else {
                acc.union(polygon)
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    fn square(x0: f64, y0: f64, side: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + side, y: y0),
            (x: x0 + side, y: y0 + side),
            (x: x0, y: y0 + side),
            (x: x0, y: y0),
        ]
    }

    #[test]
    fn test_disjoint_fragments_all_survive() {
        // two disconnected reachable regions: the merged area is the sum of
        // both fragments, not just the larger one
        let merged = merge_fragments(&[square(0.0, 0.0, 10.0), square(100.0, 0.0, 5.0)]);
        assert_eq!(merged.0.len(), 2);
        assert!((merged.unsigned_area() - 125.0).abs() < 1e-6);
    }

    #[test]
    fn test_overlapping_fragments_do_not_double_count() {
        let merged = merge_fragments(&[square(0.0, 0.0, 10.0), square(5.0, 0.0, 10.0)]);
        assert_eq!(merged.0.len(), 1);
        assert!((merged.unsigned_area() - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_fragments_dropped() {
        let degenerate = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        let merged = merge_fragments(&[degenerate, square(0.0, 0.0, 2.0)]);
        assert_eq!(merged.0.len(), 1);
        assert!((merged.unsigned_area() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_fragments_yields_empty_region() {
        let merged = merge_fragments(&[]);
        assert!(merged.0.is_empty());
        assert_eq!(merged.unsigned_area(), 0.0);
    }
}
