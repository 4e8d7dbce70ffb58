use crate::geom::locate::{IndexedAreaLocator, PointLocator};
use crate::geom::{dimension, envelope_of, Dim, Envelope, Location};
use geo::{Coord, CoordsIter, Geometry};
use std::cell::OnceCell;

/// The two overlay inputs (the second is absent for unary operations) with
/// per-input point-in-area locators built on first use.
pub(crate) struct InputGeometry<'a> {
    geoms: [Option<&'a Geometry<f64>>; 2],
    collapsed: [bool; 2],
    locators: [OnceCell<IndexedAreaLocator>; 2],
}

impl<'a> InputGeometry<'a> {
    pub fn new(a: &'a Geometry<f64>, b: Option<&'a Geometry<f64>>) -> Self {
        Self {
            geoms: [Some(a), b],
            collapsed: [false; 2],
            locators: [OnceCell::new(), OnceCell::new()],
        }
    }

    #[inline]
    pub fn geometry(&self, index: usize) -> Option<&'a Geometry<f64>> {
        self.geoms[index]
    }

    pub fn geometries(&self) -> impl Iterator<Item = &'a Geometry<f64>> + '_ {
        self.geoms.iter().flatten().copied()
    }

    #[inline]
    pub fn is_single(&self) -> bool {
        self.geoms[1].is_none()
    }

    pub fn dimension(&self, index: usize) -> Dim {
        self.geoms[index].map(dimension).unwrap_or(Dim::Empty)
    }

    #[inline]
    pub fn is_area(&self, index: usize) -> bool {
        self.dimension(index) == Dim::Area
    }

    #[inline]
    pub fn is_line(&self, index: usize) -> bool {
        self.dimension(index) == Dim::Line
    }

    pub fn is_all_points(&self) -> bool {
        !self.is_single() && self.dimension(0) == Dim::Point && self.dimension(1) == Dim::Point
    }

    pub fn has_points(&self) -> bool {
        self.dimension(0) == Dim::Point || self.dimension(1) == Dim::Point
    }

    /// Index of an areal input, preferring the first.
    pub fn area_index(&self) -> Option<usize> {
        (0..2).find(|&i| self.is_area(i))
    }

    /// Whether input `index` has any coordinates.
    pub fn has_edges(&self, index: usize) -> bool {
        self.geoms[index].is_some_and(|g| g.coords_iter().next().is_some())
    }

    pub fn envelope(&self, index: usize) -> Option<Envelope> {
        self.geoms[index].and_then(envelope_of)
    }

    /// Marks an input whose linework vanished entirely during noding.
    pub fn set_collapsed(&mut self, index: usize, collapsed: bool) {
        self.collapsed[index] = collapsed;
    }

    /// Location of `p` relative to the area of input `index`. Collapsed and
    /// empty inputs have no interior.
    pub fn locate_point_in_area(&self, index: usize, p: Coord<f64>) -> Location {
        if self.collapsed[index] {
            return Location::Exterior;
        }
        let Some(g) = self.geoms[index] else {
            return Location::Exterior;
        };
        self.locators[index]
            .get_or_init(|| IndexedAreaLocator::new(g))
            .locate(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, point, polygon};

    #[test]
    fn dimensions_and_roles() {
        let area: Geometry<f64> = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0)].into();
        let pt: Geometry<f64> = point!(x: 1.0, y: 1.0).into();
        let input = InputGeometry::new(&pt, Some(&area));
        assert!(input.has_points());
        assert!(!input.is_all_points());
        assert_eq!(input.area_index(), Some(1));
        assert_eq!(input.dimension(1), Dim::Area);

        let unary = InputGeometry::new(&area, None);
        assert!(unary.is_single());
        assert_eq!(unary.dimension(1), Dim::Empty);
        assert!(!unary.has_edges(1));
        assert_eq!(unary.geometries().count(), 1);
    }

    #[test]
    fn collapsed_input_locates_exterior() {
        let area: Geometry<f64> = polygon![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 2.0, y: 2.0), (x: 0.0, y: 2.0)].into();
        let mut input = InputGeometry::new(&area, None);
        let p = coord! { x: 1.0, y: 1.0 };
        assert_eq!(input.locate_point_in_area(0, p), Location::Interior);
        input.set_collapsed(0, true);
        assert_eq!(input.locate_point_in_area(0, p), Location::Exterior);
        assert_eq!(input.locate_point_in_area(1, p), Location::Exterior);
    }
}
