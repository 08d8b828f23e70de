//! Ordered 3D point sets (keypoints, landmarks).

use super::Point;

/// An ordered sequence of 3D points.
///
/// Order is significant: fixed and moving sets are paired by index, so every
/// operation that produces a new set preserves length and ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointSet {
    points: Vec<Point<3>>,
}

impl PointSet {
    pub fn new(points: Vec<Point<3>>) -> Self {
        Self { points }
    }

    /// Build from raw `[x, y, z]` rows.
    pub fn from_rows(rows: &[[f64; 3]]) -> Self {
        rows.iter().map(|row| Point::new(*row)).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point<3>] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point<3>> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<Point<3>> {
        self.points
    }

    /// Map every point through a fallible function, keeping order.
    pub fn try_map<E, F>(&self, f: F) -> Result<Self, E>
    where
        F: FnMut(&Point<3>) -> Result<Point<3>, E>,
    {
        self.points.iter().map(f).collect::<Result<Vec<_>, E>>().map(Self::new)
    }
}

impl FromIterator<Point<3>> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point<3>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point<3>;
    type IntoIter = std::slice::Iter<'a, Point<3>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
