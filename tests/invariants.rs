use pointhood::{
    squared_distance, FlatPoints, FnAccessor, Neighborhood, NeighborhoodConfig, NeighborQuery,
    Point, PointAccessor, QueryStatus,
};
use rand::prelude::*;
use rand::rngs::StdRng;

fn uniform_cloud(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| [rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)])
        .collect()
}

/// A few tight clusters and a sparse background, with some snapped coordinates to create ties.
fn clustered_cloud(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let centers: Vec<Point> = (0..4)
        .map(|_| [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)])
        .collect();
    (0..n)
        .map(|i| {
            if i % 10 == 0 {
                [rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)]
            } else if i % 7 == 0 {
                let c = centers[i % centers.len()];
                [c[0].round(), c[1].round(), (c[2] + rng.gen_range(0..3) as f64).round()]
            } else {
                let c = centers[i % centers.len()];
                [
                    c[0] + rng.gen_range(-0.5..0.5),
                    c[1] + rng.gen_range(-0.5..0.5),
                    c[2] + rng.gen_range(-0.5..0.5),
                ]
            }
        })
        .collect()
}

fn random_queries(n: usize, seed: u64, max: f64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| [rng.gen_range(0.0..max), rng.gen_range(0.0..max), rng.gen_range(0.0..max)])
        .collect()
}

/// All indices sorted by (distance, index).
fn brute_force_order(points: &[Point], q: &Point) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        squared_distance(&points[a], q)
            .total_cmp(&squared_distance(&points[b], q))
            .then(a.cmp(&b))
    });
    order
}

fn brute_force_range(points: &[Point], q: &Point, radius: f64) -> Vec<usize> {
    (0..points.len())
        .filter(|&i| squared_distance(&points[i], q) <= radius * radius)
        .collect()
}

fn sorted(mut v: Vec<usize>) -> Vec<usize> {
    v.sort_unstable();
    v
}

#[test]
fn test_knn_matches_brute_force() {
    for (points, queries) in [
        (uniform_cloud(2000, 1), random_queries(40, 2, 10.0)),
        (clustered_cloud(2000, 3), random_queries(40, 4, 100.0)),
    ] {
        for leaf_bucket_size in [1, 16, 100] {
            let config = NeighborhoodConfig::default().with_leaf_bucket_size(leaf_bucket_size);
            let neighborhood = Neighborhood::with_config(&points[..], config).unwrap();
            for k in [1, 5, 17, 64] {
                let query = neighborhood.k_neighbor_query(k).unwrap();
                for q in &queries {
                    let (found, status) = query.neighbors(*q);
                    assert!(status.is_complete());
                    let expected = &brute_force_order(&points, q)[..k];
                    assert_eq!(found, expected, "k = {}, leaf = {}, q = {:?}", k, leaf_bucket_size, q);
                }
            }
        }
    }
}

#[test]
fn test_knn_distances_non_decreasing_and_indices_valid() {
    let points = clustered_cloud(3000, 5);
    let neighborhood = Neighborhood::new(&points[..]);
    let query = neighborhood.k_neighbor_query(50).unwrap();
    for q in random_queries(30, 6, 100.0) {
        let (found, _) = query.neighbors(q);
        assert_eq!(found.len(), 50);
        for pair in found.windows(2) {
            let (da, db) = (squared_distance(&points[pair[0]], &q), squared_distance(&points[pair[1]], &q));
            assert!(da < db || (da == db && pair[0] < pair[1]), "bad order at {:?}", pair);
        }
        assert!(found.iter().all(|&i| i < points.len()));
    }
}

#[test]
fn test_range_matches_brute_force() {
    let points = uniform_cloud(3000, 7);
    let neighborhood = Neighborhood::new(&points[..]);
    for radius in [0.0, 0.3, 1.0, 2.5, 7.0, 30.0] {
        let query = neighborhood.range_neighbor_query(radius).unwrap();
        for q in random_queries(25, 8, 10.0) {
            let (found, status) = query.neighbors(q);
            assert!(status.is_complete());
            assert_eq!(sorted(found), brute_force_range(&points, &q, radius), "radius {}", radius);
        }
    }
}

#[test]
fn test_range_contains_knn() {
    let points = clustered_cloud(2000, 9);
    let neighborhood = Neighborhood::new(&points[..]);
    for q in random_queries(30, 10, 100.0) {
        for k in [1, 8, 40] {
            let (knn, _) = neighborhood.k_neighbor_query(k).unwrap().neighbors(q);
            let d = knn
                .iter()
                .map(|&i| squared_distance(&points[i], &q))
                .fold(0.0, f64::max)
                .sqrt();
            // Guard against sqrt/square round-off at the boundary.
            let (range, _) = neighborhood.range_neighbor_query(d * (1.0 + 1e-12)).unwrap().neighbors(q);
            assert!(range.len() >= k);
            for i in &knn {
                assert!(range.contains(i), "knn result {} missing from range", i);
            }
        }
    }
}

#[test]
fn test_fuzzy_range_reports_at_least_exact_range() {
    let points = uniform_cloud(1500, 11);
    let neighborhood = Neighborhood::new(&points[..]);
    let q = [4.0, 5.0, 6.0];
    let mut fuzzy = Vec::new();
    neighborhood.range_neighbors_fuzzy(q, 2.0, 0.25, |i| fuzzy.push(i)).unwrap();
    let fuzzy = sorted(fuzzy);
    for i in brute_force_range(&points, &q, 2.0) {
        assert!(fuzzy.binary_search(&i).is_ok());
    }
    for &i in &fuzzy {
        assert!(squared_distance(&points[i], &q) <= 2.5 * 2.5);
    }
}

#[test]
fn test_results_are_deterministic() {
    let points = clustered_cloud(2500, 12);
    let queries = random_queries(20, 13, 100.0);
    let run = || {
        let neighborhood = Neighborhood::new(&points[..]);
        let knn = neighborhood.k_neighbor_query(12).unwrap();
        let range = neighborhood.range_neighbor_query(3.0).unwrap();
        queries
            .iter()
            .map(|&q| (knn.neighbors(q).0, range.neighbors(q).0))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_parallel_queries_match_serial() {
    let points = uniform_cloud(5000, 14);
    let neighborhood = Neighborhood::new(&points[..]);
    let queries = random_queries(500, 15, 10.0);

    let knn = neighborhood.k_neighbor_query(10).unwrap();
    let serial: Vec<_> = queries.iter().map(|&q| knn.neighbors(q)).collect();
    assert_eq!(knn.par_neighbors(&queries), serial);

    let range = neighborhood.range_neighbor_query(0.8).unwrap();
    let serial: Vec<_> = queries.iter().map(|&q| range.neighbors(q)).collect();
    assert_eq!(range.par_neighbors(&queries), serial);

    // Plain threads sharing the same neighborhood.
    let chunks: Vec<&[Point]> = queries.chunks(125).collect();
    let threaded: Vec<Vec<usize>> = std::thread::scope(|s| {
        let handles: Vec<_> = chunks
            .iter()
            .map(|chunk| s.spawn(move || chunk.iter().map(|&q| knn.neighbors(q).0).collect::<Vec<_>>()))
            .collect();
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
    });
    let serial: Vec<Vec<usize>> = queries.iter().map(|&q| knn.neighbors(q).0).collect();
    assert_eq!(threaded, serial);
}

#[test]
fn test_par_input_neighborhoods() {
    let points = uniform_cloud(1000, 16);
    let neighborhood = Neighborhood::new(&points[..]);
    let knn = neighborhood.k_neighbor_query(6).unwrap();
    let all = neighborhood.par_input_neighborhoods(&knn);
    assert_eq!(all.len(), points.len());
    for (i, (neighbors, status)) in all.iter().enumerate() {
        assert_eq!(neighbors, &knn.neighbors(points[i]).0);
        assert!(status.is_complete());
        // Each point is its own nearest neighbor.
        assert_eq!(neighbors[0], i);
    }
}

#[test]
fn test_parallel_paths_report_underfull() {
    let points = uniform_cloud(40, 21);
    let config = NeighborhoodConfig::default().with_voxel_size(5.0);
    let neighborhood = Neighborhood::with_config(&points[..], config).unwrap();
    let indexed = neighborhood.len();
    assert!(indexed < points.len());

    let knn = neighborhood.k_neighbor_query(indexed + 3).unwrap();
    let underfull = QueryStatus::Underfull { found: indexed, requested: indexed + 3 };
    for (neighbors, status) in neighborhood.par_input_neighborhoods(&knn) {
        assert_eq!(neighbors.len(), indexed);
        assert_eq!(status, underfull);
    }
    for (neighbors, status) in knn.par_neighbors(&random_queries(10, 22, 10.0)) {
        assert_eq!(neighbors.len(), indexed);
        assert_eq!(status, underfull);
    }
}

#[test]
fn test_geometric_cloud() {
    // Exponentially spaced points along each axis make the tree as deep as the
    // cloud is large.
    let mut points: Vec<Point> = Vec::new();
    for i in 0..1070 {
        let t = 0.5f64.powi(i);
        points.extend([[t, 0.0, 0.0], [0.0, t, 0.0], [0.0, 0.0, t]]);
    }
    let config = NeighborhoodConfig::default().with_leaf_bucket_size(1);
    let neighborhood = Neighborhood::with_config(&points[..], config).unwrap();
    assert_eq!(neighborhood.len(), points.len());

    let queries = [[0.0; 3], [0.3, 0.2, 0.1], [1e-5, 0.0, 2e-5], [1.0, 1.0, 1.0]];
    for q in queries {
        let (found, status) = neighborhood.k_neighbor_query(12).unwrap().neighbors(q);
        assert!(status.is_complete());
        assert_eq!(found, &brute_force_order(&points, &q)[..12], "q = {:?}", q);

        for radius in [1e-4, 0.25, 2.0] {
            let (within, _) = neighborhood.range_neighbor_query(radius).unwrap().neighbors(q);
            assert_eq!(sorted(within), brute_force_range(&points, &q, radius), "q = {:?}", q);
        }
    }
}

#[test]
fn test_accessor_layouts_agree() {
    let points = uniform_cloud(1200, 17);
    let flat: Vec<f64> = points.iter().flat_map(|p| p.iter().copied()).collect();
    let xs: Vec<f64> = points.iter().map(|p| p[0]).collect();
    let ys: Vec<f64> = points.iter().map(|p| p[1]).collect();
    let zs: Vec<f64> = points.iter().map(|p| p[2]).collect();

    let by_array = Neighborhood::new(&points[..]);
    let by_flat = Neighborhood::new(FlatPoints::new(&flat));
    let by_columns = Neighborhood::new(FnAccessor::new(xs.len(), |i| [xs[i], ys[i], zs[i]]));
    assert_eq!(by_flat.accessor().len(), points.len());

    for q in random_queries(20, 18, 10.0) {
        let expected = by_array.k_neighbor_query(9).unwrap().neighbors(q).0;
        assert_eq!(by_flat.k_neighbor_query(9).unwrap().neighbors(q).0, expected);
        assert_eq!(by_columns.k_neighbor_query(9).unwrap().neighbors(q).0, expected);
    }
}

#[test]
fn test_subset_index() {
    let points = uniform_cloud(1000, 19);
    let subset: Vec<usize> = (0..points.len()).filter(|i| i % 3 == 0).collect();
    let neighborhood =
        Neighborhood::from_indices(&points[..], subset.iter().copied(), NeighborhoodConfig::default()).unwrap();
    assert_eq!(neighborhood.len(), subset.len());

    let subset_points: Vec<Point> = subset.iter().map(|&i| points[i]).collect();
    for q in random_queries(20, 20, 10.0) {
        let (found, _) = neighborhood.k_neighbor_query(5).unwrap().neighbors(q);
        let expected: Vec<usize> = brute_force_order(&subset_points, &q)[..5].iter().map(|&j| subset[j]).collect();
        assert_eq!(found, expected);
    }
}
