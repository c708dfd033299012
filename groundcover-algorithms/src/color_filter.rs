use groundcover_core::{cloud::PointCloud, nalgebra::Vector3, state::PointFlag};
use log::info;

/// Open interval of accepted values of one color channel. A value `v` matches if `min < v < max`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelRange {
    pub min: u8,
    pub max: u8,
}

impl ChannelRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn matches(&self, value: u8) -> bool {
        value > self.min && value < self.max
    }
}

impl Default for ChannelRange {
    fn default() -> Self {
        Self { min: 0, max: 255 }
    }
}

/// Accepted ranges for the red, green and blue channels
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorRange {
    pub red: ChannelRange,
    pub green: ChannelRange,
    pub blue: ChannelRange,
}

impl ColorRange {
    /// Returns `true` if all three channels of `color` lie strictly inside their ranges
    pub fn matches(&self, color: &Vector3<u8>) -> bool {
        self.red.matches(color.x) && self.green.matches(color.y) && self.blue.matches(color.z)
    }
}

/// Selects all points of `cloud` whose color lies within `range` and returns how many were selected. The
/// `Selected` flag of every point is cleared before the point is tested, all other flags are kept. If
/// `delete_points` is set, matched points are additionally marked as deleted.
///
/// # Examples
///
/// ```
/// # use groundcover_core::{cloud::PointCloud, nalgebra::Vector3, state::PointFlag};
/// # use groundcover_algorithms::color_filter::{select_by_color, ChannelRange, ColorRange};
/// let mut cloud = PointCloud::from_points(
///     "scan",
///     vec![Vector3::zeros(), Vector3::new(1.0, 0.0, 0.0)],
///     vec![Vector3::new(200, 30, 30), Vector3::new(30, 200, 30)],
/// )
/// .unwrap();
/// let reddish = ColorRange {
///     red: ChannelRange::new(150, 255),
///     ..Default::default()
/// };
/// assert_eq!(select_by_color(&mut cloud, &reddish, false), 1);
/// assert_eq!(cloud.indices_with_flag(PointFlag::Selected), vec![0]);
/// ```
pub fn select_by_color(cloud: &mut PointCloud, range: &ColorRange, delete_points: bool) -> usize {
    let mut points_found = 0;
    let mut states = cloud.states().to_vec();
    for (state, color) in states.iter_mut().zip(cloud.colors()) {
        state.remove(PointFlag::Selected);
        if range.matches(color) {
            state.insert(PointFlag::Selected);
            if delete_points {
                state.insert(PointFlag::Deleted);
            }
            points_found += 1;
        }
    }
    cloud.states_mut().copy_from_slice(&states);

    info!(
        "{} points within selected range were found in '{}'",
        points_found,
        cloud.name()
    );
    points_found
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundcover_core::state::PointState;

    fn cloud_with_colors(colors: Vec<Vector3<u8>>) -> PointCloud {
        let positions = (0..colors.len())
            .map(|i| Vector3::new(i as f64, 0.0, 0.0))
            .collect();
        PointCloud::from_points("colors", positions, colors).unwrap()
    }

    #[test]
    fn test_full_range_excludes_bounds() {
        let mut cloud = cloud_with_colors(vec![
            Vector3::new(1, 1, 1),
            Vector3::new(128, 64, 254),
            Vector3::new(0, 100, 100),
            Vector3::new(100, 255, 100),
            Vector3::new(100, 100, 0),
        ]);
        let found = select_by_color(&mut cloud, &ColorRange::default(), false);
        assert_eq!(found, 2);
        assert_eq!(cloud.indices_with_flag(PointFlag::Selected), vec![0, 1]);
        assert_eq!(cloud.count_flag(PointFlag::Deleted), 0);
    }

    #[test]
    fn test_delete_points() {
        let mut cloud = cloud_with_colors(vec![Vector3::new(10, 10, 10), Vector3::new(0, 0, 0)]);
        select_by_color(&mut cloud, &ColorRange::default(), true);
        assert!(cloud.states()[0].selected());
        assert!(cloud.states()[0].deleted());
        assert!(!cloud.states()[1].deleted());
    }

    #[test]
    fn test_idempotent() {
        let mut cloud = cloud_with_colors(vec![
            Vector3::new(10, 200, 10),
            Vector3::new(200, 10, 10),
            Vector3::new(50, 150, 60),
        ]);
        let greenish = ColorRange {
            green: ChannelRange::new(100, 255),
            ..Default::default()
        };
        let first = select_by_color(&mut cloud, &greenish, false);
        let selection_once = cloud.indices_with_flag(PointFlag::Selected);
        let second = select_by_color(&mut cloud, &greenish, false);
        assert_eq!(first, second);
        assert_eq!(cloud.indices_with_flag(PointFlag::Selected), selection_once);
    }

    #[test]
    fn test_stale_selection_is_cleared_other_flags_kept() {
        let mut cloud = cloud_with_colors(vec![Vector3::new(0, 0, 0), Vector3::new(20, 20, 20)]);
        let mut stale = PointState::default();
        stale.insert(PointFlag::Selected);
        stale.insert(PointFlag::Vegetation);
        cloud.set_states(&[stale, PointState::default()]).unwrap();

        select_by_color(&mut cloud, &ColorRange::default(), false);
        assert!(!cloud.states()[0].selected());
        assert!(cloud.states()[0].vegetation());
        assert!(cloud.states()[0].visible());
        assert!(cloud.states()[1].selected());
    }

    #[test]
    fn test_empty_range_matches_nothing() {
        let mut cloud = cloud_with_colors(vec![Vector3::new(100, 100, 100)]);
        let empty = ColorRange {
            red: ChannelRange::new(100, 100),
            ..Default::default()
        };
        assert_eq!(select_by_color(&mut cloud, &empty, false), 0);
    }
}
