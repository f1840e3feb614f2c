use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    algorithms::exact::weighted_fill,
    error::{HoleFillError, Result},
    traits::{FillingAlgorithm, WeightFunction},
    types::{Coord, DIRECTIONS, PixelGrid, PixelSample, ProcessedImage},
};

/// Synthetic boundary pixel standing in for a cluster of real ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApproxBoundaryPoint {
    /// Averaged position and intensity of the cluster
    pub sample: PixelSample,
    /// Number of boundary pixels folded into this point
    pub members: usize,
}

#[derive(Debug, Default)]
struct ClusterAccumulator {
    row_sum: usize,
    col_sum: usize,
    intensity_sum: f64,
    count: usize,
}

impl ClusterAccumulator {
    fn push(&mut self, sample: &PixelSample) {
        self.row_sum += sample.row();
        self.col_sum += sample.col();
        self.intensity_sum += sample.intensity() as f64;
        self.count += 1;
    }

    /// Emit the running average and reset, or `None` if nothing was accumulated.
    fn take(&mut self) -> Option<ApproxBoundaryPoint> {
        if self.count == 0 {
            return None;
        }
        let acc = std::mem::take(self);
        // Round to the nearest pixel so the point stays on the grid lattice.
        let mean = |sum: usize| (sum + acc.count / 2) / acc.count;
        Some(ApproxBoundaryPoint {
            sample: PixelSample::new(
                mean(acc.row_sum),
                mean(acc.col_sum),
                (acc.intensity_sum / acc.count as f64) as f32,
            ),
            members: acc.count,
        })
    }
}

/// Compress `boundary` into at most `clusters` averaged points.
///
/// Walks boundary adjacency (always all eight directions) from the smallest
/// remaining coordinate, folding visited pixels into groups of
/// `|boundary| / clusters` (at least one). A dead end flushes the partial group
/// and restarts from the smallest coordinate not yet visited, which also covers
/// boundaries made of several disjoint contours. The walk stops once every
/// pixel is visited or `clusters` points exist; pixels not reached by then are
/// dropped.
pub fn compress_boundary(
    grid: &PixelGrid,
    boundary: &BTreeSet<Coord>,
    clusters: usize,
) -> Result<Vec<ApproxBoundaryPoint>> {
    if clusters == 0 {
        return Err(HoleFillError::InvalidClusterTarget(clusters));
    }

    let cluster_size = (boundary.len() / clusters).max(1);
    let mut remaining = boundary.clone();
    let mut points = Vec::with_capacity(clusters.min(boundary.len()));
    let mut acc = ClusterAccumulator::default();
    let mut current: Option<Coord> = None;
    let mut restarts = 0usize;

    while points.len() < clusters {
        let step = current.and_then(|coord| next_unvisited(coord, &remaining, grid));
        let next = match step {
            Some(neighbor) => neighbor,
            None => {
                points.extend(acc.take());
                if points.len() >= clusters {
                    break;
                }
                match remaining.first() {
                    Some(&seed) => {
                        restarts += 1;
                        seed
                    }
                    None => break,
                }
            }
        };

        remaining.remove(&next);
        current = Some(next);
        if let Some(sample) = grid.get(next) {
            acc.push(sample);
        }
        if acc.count >= cluster_size {
            points.extend(acc.take());
        }
    }
    points.extend(acc.take());

    debug!(
        boundary = boundary.len(),
        clusters,
        cluster_size,
        emitted = points.len(),
        unvisited = remaining.len(),
        restarts,
        "compressed boundary"
    );

    Ok(points)
}

fn next_unvisited(from: Coord, remaining: &BTreeSet<Coord>, grid: &PixelGrid) -> Option<Coord> {
    DIRECTIONS
        .iter()
        .filter_map(|&dir| from.offset(dir, grid.height(), grid.width()))
        .find(|neighbor| remaining.contains(neighbor))
}

/// Weighted average over a compressed boundary of roughly `clusters` points.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateFiller {
    pub clusters: usize,
}

impl ApproximateFiller {
    pub const NAME: &'static str = "Approximate";

    pub fn new(clusters: usize) -> Self {
        Self { clusters }
    }
}

impl FillingAlgorithm for ApproximateFiller {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn fill(&self, image: ProcessedImage, weight: &dyn WeightFunction) -> Result<PixelGrid> {
        let points = compress_boundary(image.grid(), image.boundary(), self.clusters)?;
        let sources: Vec<PixelSample> = points.iter().map(|point| point.sample).collect();
        let (mut grid, holes, _) = image.into_parts();
        weighted_fill(&mut grid, &holes, &sources, weight);
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithms::{DistanceWeight, Preprocessor},
        types::{Connectivity, GrayF32Image},
    };
    use image::Luma;

    fn line_grid(values: &[f32]) -> (PixelGrid, BTreeSet<Coord>) {
        let grid = PixelGrid::from_fn(values.len(), 1, |c| values[c.col]);
        let boundary = (0..values.len()).map(|col| Coord::new(0, col)).collect();
        (grid, boundary)
    }

    /// 12x12 image with two separate 2x2 holes far apart.
    fn two_holes() -> ProcessedImage {
        let image = GrayF32Image::from_fn(12, 12, |x, y| Luma([((x + y) % 7) as f32 / 7.0]));
        let mask = GrayF32Image::from_fn(12, 12, |x, y| {
            let in_first = (2..4).contains(&x) && (2..4).contains(&y);
            let in_second = (8..10).contains(&x) && (8..10).contains(&y);
            Luma([if in_first || in_second { 0.0 } else { 1.0 }])
        });
        Preprocessor::new(Connectivity::Eight)
            .process_gray(&image, &mask)
            .unwrap()
    }

    #[test]
    fn test_zero_clusters_rejected() {
        let (grid, boundary) = line_grid(&[0.1, 0.2]);
        assert!(matches!(
            compress_boundary(&grid, &boundary, 0),
            Err(HoleFillError::InvalidClusterTarget(0))
        ));
    }

    #[test]
    fn test_walk_groups_adjacent_pixels() {
        let (grid, boundary) = line_grid(&[0.2, 0.4, 0.6, 0.8]);
        let points = compress_boundary(&grid, &boundary, 2).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].members, 2);
        assert_eq!(points[0].sample.key(), Coord::new(0, 1));
        assert!((points[0].sample.intensity() - 0.3).abs() < 1e-6);
        assert_eq!(points[1].sample.key(), Coord::new(0, 3));
        assert!((points[1].sample.intensity() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_dead_end_flushes_partial_cluster() {
        let values = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8];
        let grid = PixelGrid::from_fn(values.len(), 1, |c| values[c.col]);
        let boundary: BTreeSet<Coord> = [0, 1, 2, 5, 6, 7]
            .into_iter()
            .map(|col| Coord::new(0, col))
            .collect();

        let points = compress_boundary(&grid, &boundary, 3).unwrap();
        let members: Vec<usize> = points.iter().map(|p| p.members).collect();
        assert_eq!(members, vec![2, 1, 2]);
        assert_eq!(points[1].sample.key(), Coord::new(0, 2));
        assert_eq!(points[2].sample.key(), Coord::new(0, 6));
        assert!((points[2].sample.intensity() - 0.65).abs() < 1e-6);
    }

    #[test]
    fn test_large_target_keeps_every_pixel_once() {
        let processed = two_holes();
        let boundary = processed.boundary().clone();
        let points = compress_boundary(processed.grid(), &boundary, boundary.len() + 5).unwrap();

        assert_eq!(points.len(), boundary.len());
        assert!(points.iter().all(|p| p.members == 1));
        let emitted: BTreeSet<Coord> = points.iter().map(|p| p.sample.key()).collect();
        assert_eq!(emitted, boundary);
        for point in &points {
            assert_eq!(
                Some(point.sample.intensity()),
                processed.grid().intensity(point.sample.key())
            );
        }
    }

    #[test]
    fn test_disjoint_contours_are_all_reached() {
        let processed = two_holes();
        let boundary = processed.boundary();
        // Each 2x2 hole has a 12 pixel ring around it.
        assert_eq!(boundary.len(), 24);

        let points = compress_boundary(processed.grid(), boundary, 4).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points.iter().map(|p| p.members).sum::<usize>(), 24);
        assert!(points.iter().any(|p| p.sample.row() < 6));
        assert!(points.iter().any(|p| p.sample.row() > 6));
    }

    #[test]
    fn test_fill_stays_within_boundary_range() {
        let processed = two_holes();
        let samples = processed.boundary_samples();
        let min = samples.iter().map(|s| s.intensity()).fold(f32::INFINITY, f32::min);
        let max = samples.iter().map(|s| s.intensity()).fold(f32::NEG_INFINITY, f32::max);
        let holes = processed.holes().clone();

        let grid = ApproximateFiller::new(8)
            .fill(processed, &DistanceWeight::new(3.0, 0.01).unwrap())
            .unwrap();
        for coord in holes {
            let value = grid.intensity(coord).unwrap();
            assert!(value >= min - 1e-6 && value <= max + 1e-6, "{value} outside [{min}, {max}]");
        }
        assert!(grid.hole_coords().is_empty());
    }

    #[test]
    fn test_approximate_fill_is_reproducible() {
        let weight = DistanceWeight::new(2.0, 0.01).unwrap();
        let first = ApproximateFiller::new(5).fill(two_holes(), &weight).unwrap();
        let second = ApproximateFiller::new(5).fill(two_holes(), &weight).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_compression_matches_exact() {
        let weight = DistanceWeight::new(2.0, 0.01).unwrap();
        let processed = two_holes();
        let clusters = processed.boundary().len();
        let approx = ApproximateFiller::new(clusters).fill(processed, &weight).unwrap();
        let exact = crate::algorithms::ExactFiller.fill(two_holes(), &weight).unwrap();

        for (a, e) in approx.iter().zip(exact.iter()) {
            assert!((a.intensity() - e.intensity()).abs() < 1e-5);
        }
    }
}
