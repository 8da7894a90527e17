//! Integration tests for the KD-tree spatial index.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use trajclust::{BoundingBox, HasBoundingBox, KdTree, Point, Segment};

fn random_points(count: usize, seed: u64) -> Vec<Point<2>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| Point::xy(rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0)))
        .collect()
}

fn random_segments(count: usize, seed: u64) -> Vec<Segment<2>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let start = Point::xy(rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0));
            let end = Point::xy(
                start.coord(0) + rng.gen_range(-100.0..100.0),
                start.coord(1) + rng.gen_range(-100.0..100.0),
            );
            Segment::new(start, end)
        })
        .collect()
}

/// Reference implementation: linear scan over all key boxes.
fn brute_force<K: HasBoundingBox<2>>(keys: &[K], query: &BoundingBox<2>) -> Vec<usize> {
    keys.iter()
        .enumerate()
        .filter(|(_, k)| k.bounding_box().overlaps(query))
        .map(|(i, _)| i)
        .collect()
}

fn probe_boxes(seed: u64) -> Vec<BoundingBox<2>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..50)
        .map(|_| {
            let cx: f64 = rng.gen_range(-500.0..500.0);
            let cy: f64 = rng.gen_range(-500.0..500.0);
            let w: f64 = rng.gen_range(1.0..200.0);
            BoundingBox {
                lo: [cx - w, cy - w],
                hi: [cx + w, cy + w],
            }
        })
        .collect()
}

#[test]
fn point_queries_match_brute_force() {
    let points = random_points(300, 7);
    let tree = KdTree::build(&points);

    for query in probe_boxes(11) {
        let mut hits: Vec<usize> = tree.search(&query).collect();
        hits.sort_unstable();
        hits.dedup();
        assert_eq!(hits, brute_force(&points, &query));
    }
}

#[test]
fn segment_queries_match_brute_force() {
    let segments = random_segments(300, 13);
    let tree = KdTree::build(&segments);

    for query in probe_boxes(17) {
        let mut hits: Vec<usize> = tree.search(&query).collect();
        hits.sort_unstable();
        hits.dedup();
        assert_eq!(hits, brute_force(&segments, &query));
    }
}

#[test]
fn duplicate_coordinates_are_all_found() {
    let mut points = vec![Point::xy(5.0, 5.0); 30];
    points.extend(random_points(100, 19));
    let tree = KdTree::build(&points);

    let query = BoundingBox {
        lo: [4.9, 4.9],
        hi: [5.1, 5.1],
    };
    let hits: Vec<usize> = tree.search(&query).collect();
    for i in 0..30 {
        assert!(hits.contains(&i), "duplicate point {i} missing");
    }
}

#[test]
fn size_bookkeeping() {
    let points = random_points(200, 23);
    let tree = KdTree::build(&points);
    assert_eq!(tree.len(), 200);
    assert!(!tree.is_empty());
    // Leaves hold several entries each, so the tree is much shallower than
    // a binary tree over individual points, but must still be a real tree.
    let depth = tree.depth();
    assert!(depth >= 2, "depth {depth} too shallow for 200 points");
    assert!(depth <= 200);
}

#[test]
fn three_dimensional_keys_work() {
    let points: Vec<Point<3>> = (0..60)
        .map(|i| Point::xyz(i as f64, (i % 5) as f64, (i % 7) as f64))
        .collect();
    let tree = KdTree::build(&points);

    let query = BoundingBox {
        lo: [10.0, 0.0, 0.0],
        hi: [20.0, 4.0, 6.0],
    };
    let mut hits: Vec<usize> = tree.search(&query).collect();
    hits.sort_unstable();
    let expected: Vec<usize> = (10..=20).collect();
    assert_eq!(hits, expected);
}

#[test]
fn lazy_query_supports_early_termination() {
    let points = random_points(1000, 29);
    let tree = KdTree::build(&points);

    let everything = BoundingBox {
        lo: [-1000.0, -1000.0],
        hi: [1000.0, 1000.0],
    };
    // Taking only the first few candidates must not require scanning all.
    let first: Vec<usize> = tree.search(&everything).take(3).collect();
    assert_eq!(first.len(), 3);
}
