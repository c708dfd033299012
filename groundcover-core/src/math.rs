use nalgebra::{Point3, Vector3};

/// 3D axis-aligned bounding box of a set of positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl AABB {
    /// The smallest AABB around all `positions`, `None` if there are none
    /// ```
    /// # use groundcover_core::math::AABB;
    /// # use nalgebra::{Point3, Vector3};
    /// let positions = vec![Vector3::new(1.0, -2.0, 0.5), Vector3::new(-1.0, 4.0, 0.0)];
    /// let bounds = AABB::from_positions(positions.iter()).unwrap();
    /// assert_eq!(*bounds.min(), Point3::new(-1.0, -2.0, 0.0));
    /// assert_eq!(bounds.extent(), Vector3::new(2.0, 6.0, 0.5));
    /// ```
    pub fn from_positions<'a, I: IntoIterator<Item = &'a Vector3<f64>>>(positions: I) -> Option<Self> {
        let mut iter = positions.into_iter();
        let first = Point3::from(*iter.next()?);
        Some(iter.fold(
            Self {
                min: first,
                max: first,
            },
            |bounds, position| Self {
                min: bounds.min.inf(&Point3::from(*position)),
                max: bounds.max.sup(&Point3::from(*position)),
            },
        ))
    }

    pub fn min(&self) -> &Point3<f64> {
        &self.min
    }

    pub fn max(&self) -> &Point3<f64> {
        &self.max
    }

    /// Edge lengths along x, y and z
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }
}
