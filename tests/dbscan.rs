//! Integration tests for generic density clustering.

use trajclust::{dbscan_euclidean, Labeling, Point};

fn grid(width: usize, height: usize, spacing: f64) -> Vec<Point<2>> {
    (0..width * height)
        .map(|i| {
            Point::xy(
                (i % width) as f64 * spacing,
                (i / width) as f64 * spacing,
            )
        })
        .collect()
}

/// Two well-separated blobs on a line: indices 0..5 spaced 1 apart, then a
/// 50-unit gap, then indices 5..10 spaced 1 apart.
fn two_blobs() -> Vec<Point<2>> {
    let mut points: Vec<Point<2>> = (0..5).map(|i| Point::xy(i as f64, 0.0)).collect();
    points.extend((0..5).map(|i| Point::xy(100.0 + i as f64, 0.0)));
    points
}

#[test]
fn empty_input_yields_empty_labeling() {
    let points: Vec<Point<2>> = vec![];
    let labeling = dbscan_euclidean(&points, 1.0, 3);
    assert_eq!(labeling.cluster_count(), 0);
    assert!(labeling.labels().is_empty());
    assert!(labeling.clusters().is_empty());
}

#[test]
fn min_points_one_never_reports_noise() {
    // Every point is within eps of itself, so a threshold of one makes
    // every point a (possibly singleton) cluster.
    let mut points = two_blobs();
    points.push(Point::xy(-1000.0, 500.0));
    let labeling = dbscan_euclidean(&points, 1.5, 1);
    for i in 0..points.len() {
        assert!(
            !labeling.is_noise(i),
            "point {i} reported as noise with min_points = 1"
        );
    }
}

#[test]
fn separated_blobs_form_separate_clusters() {
    let points = two_blobs();
    let labeling = dbscan_euclidean(&points, 1.5, 3);
    assert_eq!(labeling.cluster_count(), 2);
    // First-scanned seed gets cluster 0.
    for i in 0..5 {
        assert_eq!(labeling.label(i), 0);
    }
    for i in 5..10 {
        assert_eq!(labeling.label(i), 1);
    }
}

#[test]
fn eps_monotonicity_merges_but_never_splits() {
    let points = two_blobs();

    let fine = dbscan_euclidean(&points, 1.5, 3);
    let coarse = dbscan_euclidean(&points, 200.0, 3);

    assert_eq!(fine.cluster_count(), 2);
    assert_eq!(coarse.cluster_count(), 1);

    // Every fine cluster must land inside exactly one coarse cluster.
    for members in fine.clusters() {
        let coarse_labels: Vec<i32> = members.iter().map(|&i| coarse.label(i)).collect();
        assert!(coarse_labels.iter().all(|&l| l >= 0));
        assert!(
            coarse_labels.windows(2).all(|w| w[0] == w[1]),
            "fine cluster split across coarse clusters: {coarse_labels:?}"
        );
    }
}

#[test]
fn rerun_is_deterministic() {
    let points = grid(10, 10, 2.0);
    let a = dbscan_euclidean(&points, 2.5, 4);
    let b = dbscan_euclidean(&points, 2.5, 4);
    assert_eq!(a.labels(), b.labels());
    assert_eq!(a.cluster_count(), b.cluster_count());
}

#[test]
fn border_point_is_absorbed_not_noise() {
    // A dense line plus one outlying point within eps of its end: the
    // outlier is not core (one neighbor + itself) but must be absorbed as
    // a border member, even though the scan labels it noise first.
    let mut points: Vec<Point<2>> = vec![Point::xy(-0.8, 0.5)];
    points.extend((0..6).map(|i| Point::xy(i as f64 * 0.5, 0.0)));
    let labeling = dbscan_euclidean(&points, 1.0, 3);

    assert_eq!(labeling.cluster_count(), 1);
    assert_eq!(labeling.label(0), 0, "border point dropped as noise");
}

#[test]
fn clusters_listing_matches_labels() {
    let points = two_blobs();
    let labeling: Labeling = dbscan_euclidean(&points, 1.5, 3);
    let clusters = labeling.clusters();
    assert_eq!(clusters.len(), labeling.cluster_count());
    for (id, members) in clusters.iter().enumerate() {
        assert!(members.windows(2).all(|w| w[0] < w[1]));
        for &m in members {
            assert_eq!(labeling.label(m), id as i32);
        }
    }
}

#[test]
fn all_noise_when_fewer_entities_than_min_points() {
    let points = vec![Point::xy(0.0, 0.0), Point::xy(0.1, 0.0)];
    let labeling = dbscan_euclidean(&points, 10.0, 3);
    assert_eq!(labeling.cluster_count(), 0);
    assert!(labeling.is_noise(0));
    assert!(labeling.is_noise(1));
}
