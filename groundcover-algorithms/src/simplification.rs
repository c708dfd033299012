use std::collections::HashMap;

use groundcover_core::{cloud::PointCloud, nalgebra::Vector3, state::PointFlag, Error, Result};
use log::debug;

type Cell = (i64, i64, i64);

/// Largest cell coordinate magnitude. Cells grow beyond the minimum distance where needed to stay below it
const MAX_CELL_COORDINATE: f64 = 4_294_967_296.0;
/// Relative enlargement of the cells that absorbs the rounding of `position / cell_size`
const CELL_MARGIN: f64 = 1e-5;

/// Edge length of the grid cells for thinning `positions` to `min_distance`. Never smaller than `min_distance`, so
/// close points always end up in neighbouring cells
fn cell_size_for<'a, I: Iterator<Item = &'a Vector3<f64>>>(positions: I, min_distance: f64) -> f64 {
    let largest_coordinate = positions
        .map(|position| position.amax())
        .filter(|coordinate| coordinate.is_finite())
        .fold(0.0, f64::max);
    min_distance.max(largest_coordinate / MAX_CELL_COORDINATE) * (1.0 + CELL_MARGIN)
}

fn cell_of(position: &Vector3<f64>, cell_size: f64) -> Cell {
    (
        (position.x / cell_size).floor() as i64,
        (position.y / cell_size).floor() as i64,
        (position.z / cell_size).floor() as i64,
    )
}

/// Kept points, bucketed by cubic cells with an edge length of at least the minimum distance. Every point closer than
/// the minimum distance to a query lies in the cell of the query or in one of its 26 neighbours.
struct KeptPoints {
    cell_size: f64,
    cells: HashMap<Cell, Vec<Vector3<f64>>>,
}

impl KeptPoints {
    fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
        }
    }

    fn has_point_closer_than(&self, position: &Vector3<f64>, distance: f64) -> bool {
        let (cx, cy, cz) = cell_of(position, self.cell_size);
        let squared_distance = distance * distance;
        for x in cx.saturating_sub(1)..=cx.saturating_add(1) {
            for y in cy.saturating_sub(1)..=cy.saturating_add(1) {
                for z in cz.saturating_sub(1)..=cz.saturating_add(1) {
                    if let Some(points) = self.cells.get(&(x, y, z)) {
                        if points
                            .iter()
                            .any(|kept| (kept - position).norm_squared() < squared_distance)
                        {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    fn insert(&mut self, position: Vector3<f64>) {
        self.cells
            .entry(cell_of(&position, self.cell_size))
            .or_default()
            .push(position);
    }
}

/// Thins `cloud` out to a quasi-uniform spacing: points are visited in order and a point is kept only if no
/// previously kept point is closer than `min_distance`. Removed points are not deleted, their `Visible` flag is
/// cleared instead. Points that are already hidden stay hidden and do not block other points.
///
/// Returns the number of points that remain visible.
///
/// # Examples
///
/// ```
/// # use groundcover_core::{cloud::PointCloud, nalgebra::Vector3, state::PointFlag};
/// # use groundcover_algorithms::simplification::simplify_homogeneous;
/// let mut cloud = PointCloud::from_points(
///     "scan",
///     vec![
///         Vector3::new(0.0, 0.0, 0.0),
///         Vector3::new(0.01, 0.0, 0.0),
///         Vector3::new(1.0, 0.0, 0.0),
///     ],
///     vec![Vector3::new(0, 0, 0); 3],
/// )
/// .unwrap();
/// assert_eq!(simplify_homogeneous(&mut cloud, 0.1).unwrap(), 2);
/// assert_eq!(cloud.indices_with_flag(PointFlag::Visible), vec![0, 2]);
/// ```
pub fn simplify_homogeneous(cloud: &mut PointCloud, min_distance: f64) -> Result<usize> {
    if min_distance <= 0.0 || !min_distance.is_finite() {
        return Err(Error::configuration(format!(
            "Minimal distance must be a positive number, got {}",
            min_distance
        )));
    }

    let mut states = cloud.states().to_vec();
    let visible_positions = cloud
        .positions()
        .iter()
        .zip(&states)
        .filter(|(_, state)| state.visible())
        .map(|(position, _)| position);
    let mut kept = KeptPoints::new(cell_size_for(visible_positions, min_distance));
    let mut visible_count = 0;
    for (state, position) in states.iter_mut().zip(cloud.positions()) {
        if !state.visible() {
            continue;
        }
        if kept.has_point_closer_than(position, min_distance) {
            state.remove(PointFlag::Visible);
        } else {
            kept.insert(*position);
            visible_count += 1;
        }
    }
    cloud.set_states(&states)?;

    debug!(
        "Simplified '{}' with minimal distance {}: {} of {} points remain visible",
        cloud.name(),
        min_distance,
        visible_count,
        cloud.len()
    );
    Ok(visible_count)
}
