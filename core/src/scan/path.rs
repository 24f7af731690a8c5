use crate::prelude::{ScanGrid, SkyPoint};
use serde::{Deserialize, Serialize};

/// A planned pointing tagged with its position in the visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanPoint {
    pub index: usize,
    pub point: SkyPoint,
}

/// Maps integer cell coordinates onto the sky lattice around a center.
///
/// Even axis lengths shift the center down by half a cell and add it back as
/// an offset, keeping the lattice symmetric about the requested center.
struct Lattice {
    width: usize,
    height: usize,
    spacing: f64,
    adj_ra: f64,
    adj_dec: f64,
    ra_offset: f64,
    dec_offset: f64,
}

impl Lattice {
    fn new(center: SkyPoint, grid: &ScanGrid) -> Self {
        let half = 0.5 * grid.spacing_deg;
        let (adj_ra, ra_offset) = if grid.width % 2 == 0 {
            (center.ra - half, half)
        } else {
            (center.ra, 0.0)
        };
        let (adj_dec, dec_offset) = if grid.height % 2 == 0 {
            (center.dec - half, half)
        } else {
            (center.dec, 0.0)
        };
        Self {
            width: grid.width,
            height: grid.height,
            spacing: grid.spacing_deg,
            adj_ra,
            adj_dec,
            ra_offset,
            dec_offset,
        }
    }

    fn point(&self, x: usize, y: usize) -> SkyPoint {
        let ra = self.adj_ra
            + self.ra_offset
            + (x as f64 - (self.width as f64 - 1.0) / 2.0) * self.spacing;
        let dec = self.adj_dec
            + self.dec_offset
            + (y as f64 - (self.height as f64 - 1.0) / 2.0) * self.spacing;
        SkyPoint::new(ra, dec)
    }
}

/// Cell coordinates of a `width x height` grid in ring order: concentric
/// rectangular perimeters from the outside in, each walked top row
/// left-to-right, right column downward, bottom row right-to-left, left
/// column upward.
pub fn ring_order(width: usize, height: usize) -> Vec<(usize, usize)> {
    let mut cells = Vec::with_capacity(width * height);
    if width == 0 || height == 0 {
        return cells;
    }

    let (mut x_min, mut x_max) = (0usize, width - 1);
    let (mut y_min, mut y_max) = (0usize, height - 1);

    loop {
        for x in x_min..=x_max {
            cells.push((x, y_min));
        }
        for y in y_min + 1..=y_max {
            cells.push((x_max, y));
        }
        if y_min != y_max {
            for x in (x_min..x_max).rev() {
                cells.push((x, y_max));
            }
        }
        if x_min != x_max {
            for y in (y_min + 1..y_max).rev() {
                cells.push((x_min, y));
            }
        }

        // usize bounds: stop before the contraction would cross or underflow.
        if x_max - x_min < 2 || y_max - y_min < 2 {
            break;
        }
        x_min += 1;
        x_max -= 1;
        y_min += 1;
        y_max -= 1;
    }

    cells
}

/// Every grid cell around `center`, in ring order, as sky coordinates.
pub fn generate(center: SkyPoint, grid: &ScanGrid) -> Vec<ScanPoint> {
    let lattice = Lattice::new(center, grid);
    ring_order(grid.width, grid.height)
        .into_iter()
        .enumerate()
        .map(|(index, (x, y))| ScanPoint {
            index,
            point: lattice.point(x, y),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_cell_is_visited_once() {
        for width in 1..=7 {
            for height in 1..=7 {
                let cells = ring_order(width, height);
                assert_eq!(cells.len(), width * height, "{width}x{height}");
                let unique: HashSet<_> = cells.iter().copied().collect();
                assert_eq!(unique.len(), width * height, "{width}x{height}");
                assert!(cells.iter().all(|&(x, y)| x < width && y < height));
            }
        }
    }

    #[test]
    fn three_by_three_walks_the_outer_ring_first() {
        assert_eq!(
            ring_order(3, 3),
            vec![
                (0, 0),
                (1, 0),
                (2, 0),
                (2, 1),
                (2, 2),
                (1, 2),
                (0, 2),
                (0, 1),
                (1, 1)
            ]
        );
    }

    #[test]
    fn single_row_and_column_degenerate() {
        assert_eq!(ring_order(4, 1), vec![(0, 0), (1, 0), (2, 0), (3, 0)]);
        assert_eq!(ring_order(1, 3), vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn two_by_one_example() {
        let points = generate(SkyPoint::new(10.0, 20.0), &ScanGrid::new(2, 1, 2.0));
        let coords: Vec<_> = points.iter().map(|p| (p.point.ra, p.point.dec)).collect();
        assert_eq!(coords, vec![(9.0, 20.0), (11.0, 20.0)]);
        assert_eq!(points[1].index, 1);
    }

    #[test]
    fn single_cell_is_the_center() {
        let center = SkyPoint::new(83.6, 22.0);
        let points = generate(center, &ScanGrid::new(1, 1, 3.0));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].point, center);
    }

    #[test]
    fn even_width_straddles_the_center() {
        let center = SkyPoint::new(100.0, 0.0);
        let spacing = 1.5;
        let points = generate(center, &ScanGrid::new(4, 3, spacing));
        let mut ras: Vec<f64> = points.iter().map(|p| p.point.ra - center.ra).collect();
        ras.sort_by(f64::total_cmp);
        ras.dedup();
        assert_eq!(ras, vec![-2.25, -0.75, 0.75, 2.25]);
        for (low, high) in ras.iter().zip(ras.iter().rev()) {
            assert!((low + high).abs() < 1e-9);
        }
        // odd height keeps a row on the center declination
        assert!(points.iter().any(|p| p.point.dec == center.dec));
    }

    #[test]
    fn generation_is_deterministic() {
        let grid = ScanGrid::new(5, 4, 0.7);
        let center = SkyPoint::new(12.5, -30.0);
        assert_eq!(generate(center, &grid), generate(center, &grid));
    }
}
