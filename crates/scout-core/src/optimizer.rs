//! Closed-tour ordering via the nearest-neighbor heuristic.

use crate::geo::distance_m;
use crate::models::Waypoint;

/// Reorder waypoints into a closed survey tour.
///
/// Greedy nearest-neighbor: keep the current first waypoint as the anchor,
/// then repeatedly append the unvisited waypoint closest to the last placed
/// one. Ties go to the earliest remaining waypoint in input order, so the
/// result is deterministic for a fixed input. Ids are reassigned to `0..n`
/// in the new order.
///
/// With two or fewer waypoints there is nothing to reorder and the input is
/// left untouched (this also makes an empty input a no-op). O(n^2), which is
/// fine at interactive route sizes. Nearest-neighbor approximates the
/// traveling-salesperson tour; it is not guaranteed optimal.
pub fn optimize(waypoints: &mut Vec<Waypoint>) {
    if waypoints.len() <= 2 {
        return;
    }

    let mut remaining: Vec<Waypoint> = std::mem::take(waypoints);
    let mut ordered = Vec::with_capacity(remaining.len());
    ordered.push(remaining.remove(0));

    while !remaining.is_empty() {
        let last = &ordered[ordered.len() - 1];

        let mut nearest_idx = 0;
        let mut nearest_dist = f64::INFINITY;
        for (idx, candidate) in remaining.iter().enumerate() {
            let dist = distance_m(&last.coord, &candidate.coord);
            if dist < nearest_dist {
                nearest_dist = dist;
                nearest_idx = idx;
            }
        }

        ordered.push(remaining.remove(nearest_idx));
    }

    for (idx, wp) in ordered.iter_mut().enumerate() {
        wp.id = idx;
    }

    *waypoints = ordered;
}

/// Total length of the closed tour in meters, including the synthetic
/// return leg back to the first waypoint.
pub fn tour_length(waypoints: &[Waypoint]) -> f64 {
    if waypoints.len() < 2 {
        return 0.0;
    }

    let legs: f64 = waypoints
        .windows(2)
        .map(|pair| distance_m(&pair[0].coord, &pair[1].coord))
        .sum();
    let return_leg = distance_m(
        &waypoints[waypoints.len() - 1].coord,
        &waypoints[0].coord,
    );

    legs + return_leg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn route_of(coords: &[(f64, f64)]) -> Vec<Waypoint> {
        coords
            .iter()
            .enumerate()
            .map(|(id, &(lat, lon))| Waypoint::new(id, Coordinate::new(lat, lon)))
            .collect()
    }

    #[test]
    fn two_or_fewer_waypoints_keep_input_order() {
        let mut empty = route_of(&[]);
        optimize(&mut empty);
        assert!(empty.is_empty());

        let mut pair = route_of(&[(0.0, 10.0), (0.0, 0.0)]);
        optimize(&mut pair);
        assert_eq!(pair[0].coord.lon, 10.0);
        assert_eq!(pair[1].coord.lon, 0.0);
    }

    #[test]
    fn nearest_neighbor_picks_closer_point_first() {
        let mut wps = route_of(&[(0.0, 0.0), (0.0, 10.0), (0.0, 1.0)]);
        optimize(&mut wps);

        let lons: Vec<f64> = wps.iter().map(|wp| wp.coord.lon).collect();
        assert_eq!(lons, vec![0.0, 1.0, 10.0]);
    }

    #[test]
    fn output_is_permutation_with_dense_ids() {
        let coords = [
            (39.7238, -75.5703),
            (39.7301, -75.5650),
            (39.7190, -75.5811),
            (39.7266, -75.5744),
            (39.7154, -75.5602),
        ];
        let mut wps = route_of(&coords);
        optimize(&mut wps);

        assert_eq!(wps.len(), coords.len());
        for (idx, wp) in wps.iter().enumerate() {
            assert_eq!(wp.id, idx);
        }

        let mut seen: Vec<(f64, f64)> = wps.iter().map(|wp| (wp.coord.lat, wp.coord.lon)).collect();
        let mut expected: Vec<(f64, f64)> = coords.to_vec();
        seen.sort_by(|a, b| a.partial_cmp(b).expect("finite coords"));
        expected.sort_by(|a, b| a.partial_cmp(b).expect("finite coords"));
        assert_eq!(seen, expected);
    }

    #[test]
    fn anchor_waypoint_stays_first() {
        let mut wps = route_of(&[(0.0, 5.0), (0.0, 0.0), (0.0, 4.9)]);
        optimize(&mut wps);
        assert_eq!(wps[0].coord.lon, 5.0);
    }

    #[test]
    fn tour_length_includes_return_leg() {
        let wps = route_of(&[(0.0, 0.0), (0.0, 1.0)]);
        let one_leg = distance_m(&wps[0].coord, &wps[1].coord);
        assert!((tour_length(&wps) - 2.0 * one_leg).abs() < 1e-6);

        assert_eq!(tour_length(&wps[..1]), 0.0);
    }
}
