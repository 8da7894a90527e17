//! Integration tests for TraClus trajectory clustering.

use trajclust::{cluster_trajectories, Point, Rotation, TraclusConfig};

/// Straight traversals of a shared corridor with deterministic lateral
/// offsets.
fn corridor_bundle(count: usize, y_offset: f64, y_spacing: f64) -> Vec<Vec<Point<2>>> {
    (0..count)
        .map(|t| {
            (0..21)
                .map(|i| Point::xy(i as f64 * 50.0, y_offset + t as f64 * y_spacing))
                .collect()
        })
        .collect()
}

fn test_config() -> TraclusConfig {
    TraclusConfig {
        eps: 25.0,
        min_segments: 3,
        directional: true,
        min_length: 100.0,
        cost_advantage: 25.0,
    }
}

#[test]
fn empty_input_yields_no_clusters() {
    let trajectories: Vec<Vec<Point<2>>> = vec![];
    let clusters = cluster_trajectories(&trajectories, &test_config()).unwrap();
    assert!(clusters.is_empty());
}

#[test]
fn undersized_input_yields_no_clusters() {
    let trajectories = corridor_bundle(2, 0.0, 3.0);
    let clusters = cluster_trajectories(&trajectories, &test_config()).unwrap();
    assert!(clusters.is_empty());
}

#[test]
fn bundle_produces_one_representative_near_the_centerline() {
    let trajectories = corridor_bundle(6, 0.0, 3.0);
    let clusters = cluster_trajectories(&trajectories, &test_config()).unwrap();

    assert_eq!(clusters.len(), 1);
    let cluster = &clusters[0];
    assert!(cluster.representative.len() >= 2);
    assert!(cluster.length > 900.0 && cluster.length < 1100.0);

    // Offsets span [0, 15]; the average path must run inside that band,
    // near its middle.
    for vertex in &cluster.representative {
        let y = vertex.coord(1);
        assert!((5.0..=10.0).contains(&y), "vertex off-center at y = {y}");
    }

    // Sweep positions advance monotonically.
    let xs: Vec<f64> = cluster.representative.iter().map(|p| p.coord(0)).collect();
    assert!(xs.windows(2).all(|w| w[0] < w[1]), "non-monotone: {xs:?}");

    // Every trajectory contributed, with full index ranges.
    assert_eq!(cluster.contributions.len(), 6);
    for (t, span) in cluster.contributions.iter().enumerate() {
        assert_eq!(span.trajectory, t);
        assert_eq!(span.start_index, 0);
        assert_eq!(span.end_index, 20);
    }
}

#[test]
fn separated_bundles_stay_separate() {
    let mut trajectories = corridor_bundle(4, 0.0, 3.0);
    trajectories.extend(corridor_bundle(4, 10_000.0, 3.0));

    let clusters = cluster_trajectories(&trajectories, &test_config()).unwrap();
    assert_eq!(clusters.len(), 2);

    // Clusters come out in first-scanned order: the low bundle first.
    let y0 = clusters[0].representative[0].coord(1);
    let y1 = clusters[1].representative[0].coord(1);
    assert!(y0 < 100.0, "first cluster at y = {y0}");
    assert!(y1 > 9000.0, "second cluster at y = {y1}");
}

#[test]
fn degenerate_trajectories_are_ignored() {
    let mut trajectories = corridor_bundle(5, 0.0, 3.0);
    trajectories.push(vec![]);
    trajectories.push(vec![Point::xy(4.0, 4.0)]);
    trajectories.push(vec![Point::xy(0.0, 0.0); 7]);

    let clusters = cluster_trajectories(&trajectories, &test_config()).unwrap();
    assert_eq!(clusters.len(), 1);
    assert!(clusters[0]
        .contributions
        .iter()
        .all(|span| span.trajectory < 5));
}

#[test]
fn rerun_is_deterministic() {
    let trajectories = corridor_bundle(6, 0.0, 3.0);
    let a = cluster_trajectories(&trajectories, &test_config()).unwrap();
    let b = cluster_trajectories(&trajectories, &test_config()).unwrap();

    assert_eq!(a.len(), b.len());
    for (ca, cb) in a.iter().zip(&b) {
        assert_eq!(ca.representative, cb.representative);
        assert_eq!(ca.contributions, cb.contributions);
    }
}

#[test]
fn opposite_traversals_cluster_when_not_directional() {
    // Three eastbound and three westbound traversals of one corridor.
    let mut trajectories = corridor_bundle(3, 0.0, 3.0);
    trajectories.extend(corridor_bundle(3, 9.0, 3.0).into_iter().map(|mut t| {
        t.reverse();
        t
    }));

    let directional = cluster_trajectories(&trajectories, &test_config()).unwrap();
    let either_way = cluster_trajectories(
        &trajectories,
        &TraclusConfig {
            directional: false,
            ..test_config()
        },
    )
    .unwrap();

    // Direction-sensitive: two clusters (or none reaching the threshold);
    // direction-insensitive: the whole corridor merges into one.
    assert_eq!(either_way.len(), 1);
    assert!(directional.len() != 1);
    let spans: std::collections::BTreeSet<usize> = either_way[0]
        .contributions
        .iter()
        .map(|s| s.trajectory)
        .collect();
    assert_eq!(spans.len(), 6);
}

#[test]
fn rotation_into_3d_reproduces_the_2d_result() {
    let flat_corpus = corridor_bundle(5, 0.0, 3.0);
    let config = test_config();
    let flat = cluster_trajectories(&flat_corpus, &config).unwrap();
    assert!(!flat.is_empty());

    // Rigidly rotate the whole corpus out of the plane.
    let rotation = Rotation::<3>::aligning(&Point::xyz(1.0, 0.0, 0.0), &Point::xyz(1.0, 2.0, 2.0));
    let spun_corpus: Vec<Vec<Point<3>>> = flat_corpus
        .iter()
        .map(|t| {
            t.iter()
                .map(|p| rotation.apply(&Point::xyz(p.coord(0), p.coord(1), 0.0)))
                .collect()
        })
        .collect();

    let spun = cluster_trajectories(&spun_corpus, &config).unwrap();
    assert_eq!(flat.len(), spun.len());

    for (flat_cluster, spun_cluster) in flat.iter().zip(&spun) {
        assert_eq!(
            flat_cluster.representative.len(),
            spun_cluster.representative.len()
        );
        assert_eq!(flat_cluster.contributions, spun_cluster.contributions);

        for (fv, sv) in flat_cluster
            .representative
            .iter()
            .zip(&spun_cluster.representative)
        {
            let back = rotation.invert(sv);
            let embedded = Point::xyz(fv.coord(0), fv.coord(1), 0.0);
            let error = back.distance(&embedded);
            assert!(error < 1e-6, "vertex drifted by {error}");
        }
    }
}
