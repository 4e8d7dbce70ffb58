//! Topological labels carried by overlay edges.
//!
//! A label records, for each of the two inputs, how an edge relates to that
//! input:
//! - `NotPart`: the edge does not come from the input;
//! - `Line`: the edge comes from a linear component;
//! - `Boundary`: the edge is part of a polygon ring, with the input's
//!   location on each side;
//! - `Collapse`: the edge comes from ring segments that cancelled each other
//!   during noding.
//!
//! Besides the role, each side keeps the location of the edge itself
//! relative to the input (`line_location`), filled in by the labeller.
//!
//! Labels are plain values. Sides are stated for the forward direction of
//! the edge; `flipped` gives the view from the reverse half-edge.

use crate::geom::Location;

/// Which side of a directed edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Role of an edge relative to one input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    NotPart,
    Line,
    Boundary { left: Location, right: Location },
    Collapse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Part {
    role: Role,
    is_hole: bool,
    line_loc: Option<Location>,
}

impl Part {
    const NOT_PART: Part = Part {
        role: Role::NotPart,
        is_hole: false,
        line_loc: None,
    };

    /// Dimension rank used when merging: area roles dominate lines.
    #[inline]
    fn rank(&self) -> u8 {
        match self.role {
            Role::NotPart => 0,
            Role::Line => 1,
            Role::Boundary { .. } | Role::Collapse => 2,
        }
    }

    #[inline]
    fn is_shell(&self) -> bool {
        self.rank() == 2 && !self.is_hole
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayLabel {
    parts: [Part; 2],
}

impl Default for OverlayLabel {
    fn default() -> Self {
        Self {
            parts: [Part::NOT_PART; 2],
        }
    }
}

impl OverlayLabel {
    fn with_part(mut self, index: usize, part: Part) -> Self {
        self.parts[index] = part;
        self
    }

    /// Edge of a linear component of input `index`.
    pub fn with_line(self, index: usize) -> Self {
        self.with_part(
            index,
            Part {
                role: Role::Line,
                is_hole: false,
                line_loc: None,
            },
        )
    }

    /// Ring edge of input `index` with known side locations.
    pub fn with_boundary(self, index: usize, left: Location, right: Location, is_hole: bool) -> Self {
        self.with_part(
            index,
            Part {
                role: Role::Boundary { left, right },
                is_hole,
                line_loc: Some(Location::Interior),
            },
        )
    }

    /// Ring edge of input `index` whose two sides cancelled.
    pub fn with_collapse(self, index: usize, is_hole: bool) -> Self {
        self.with_part(
            index,
            Part {
                role: Role::Collapse,
                is_hole,
                line_loc: None,
            },
        )
    }

    pub fn with_line_location(mut self, index: usize, loc: Location) -> Self {
        self.parts[index].line_loc = Some(loc);
        self
    }

    /// Set every location of input `index` (sides of a boundary included).
    pub fn with_location_all(mut self, index: usize, loc: Location) -> Self {
        let part = &mut self.parts[index];
        if let Role::Boundary { .. } = part.role {
            part.role = Role::Boundary { left: loc, right: loc };
        }
        part.line_loc = Some(loc);
        self
    }

    /// A collapsed hole lies inside its shell's area; a collapsed shell
    /// encloses nothing.
    pub fn with_collapse_location(self, index: usize) -> Self {
        let loc = if self.parts[index].is_hole {
            Location::Interior
        } else {
            Location::Exterior
        };
        self.with_line_location(index, loc)
    }

    /// View from the opposite direction.
    pub fn flipped(self) -> Self {
        let mut out = self;
        for part in out.parts.iter_mut() {
            if let Role::Boundary { left, right } = part.role {
                part.role = Role::Boundary {
                    left: right,
                    right: left,
                };
            }
        }
        out
    }

    /// Combine with the label of a coincident edge running in the same
    /// direction. Per input the higher dimension wins, and an area edge is a
    /// hole only when neither edge is a shell edge.
    pub fn merged(self, other: &OverlayLabel) -> Self {
        let mut out = self;
        for i in 0..2 {
            let (a, b) = (self.parts[i], other.parts[i]);
            let is_shell = a.is_shell() || b.is_shell();
            let mut part = if b.rank() > a.rank() { b } else { a };
            if part.rank() == 2 {
                part.is_hole = !is_shell;
            }
            out.parts[i] = part;
        }
        out
    }

    #[inline]
    pub fn role(&self, index: usize) -> Role {
        self.parts[index].role
    }

    #[inline]
    pub fn is_hole(&self, index: usize) -> bool {
        self.parts[index].is_hole
    }

    /// Area edge of input `index`, either boundary or collapse.
    #[inline]
    pub fn is_area(&self, index: usize) -> bool {
        self.parts[index].rank() == 2
    }

    #[inline]
    pub fn is_not_part(&self, index: usize) -> bool {
        self.parts[index].role == Role::NotPart
    }

    #[inline]
    pub fn is_line(&self, index: usize) -> bool {
        self.parts[index].role == Role::Line
    }

    #[inline]
    pub fn is_line_either(&self) -> bool {
        self.is_line(0) || self.is_line(1)
    }

    /// Line or collapse: edges whose location propagates along chains.
    #[inline]
    pub fn is_linear(&self, index: usize) -> bool {
        matches!(self.parts[index].role, Role::Line | Role::Collapse)
    }

    #[inline]
    pub fn is_collapse(&self, index: usize) -> bool {
        self.parts[index].role == Role::Collapse
    }

    #[inline]
    pub fn is_boundary(&self, index: usize) -> bool {
        matches!(self.parts[index].role, Role::Boundary { .. })
    }

    #[inline]
    pub fn is_boundary_either(&self) -> bool {
        self.is_boundary(0) || self.is_boundary(1)
    }

    #[inline]
    pub fn is_boundary_both(&self) -> bool {
        self.is_boundary(0) && self.is_boundary(1)
    }

    /// Boundary of exactly one input, the other not involved.
    pub fn is_boundary_singleton(&self) -> bool {
        (self.is_boundary(0) && self.is_not_part(1)) || (self.is_boundary(1) && self.is_not_part(0))
    }

    /// Area edge that is not a boundary of both inputs and not a line.
    pub fn is_boundary_collapse(&self) -> bool {
        if self.is_line_either() {
            return false;
        }
        !self.is_boundary_both()
    }

    /// Boundary of both inputs with the inputs on opposite sides.
    pub fn is_boundary_touch(&self) -> bool {
        self.is_boundary_both() && self.side_location(0, Side::Right) != self.side_location(1, Side::Right)
    }

    pub fn is_interior_collapse(&self) -> bool {
        (0..2).any(|i| self.is_collapse(i) && self.parts[i].line_loc == Some(Location::Interior))
    }

    /// Collapse of one input lying inside the other input's area.
    pub fn is_collapse_and_not_part_interior(&self) -> bool {
        (self.is_collapse(0) && self.is_not_part(1) && self.parts[1].line_loc == Some(Location::Interior))
            || (self.is_collapse(1) && self.is_not_part(0) && self.parts[0].line_loc == Some(Location::Interior))
    }

    #[inline]
    pub fn line_location(&self, index: usize) -> Option<Location> {
        self.parts[index].line_loc
    }

    #[inline]
    pub fn is_line_location_unknown(&self, index: usize) -> bool {
        self.parts[index].line_loc.is_none()
    }

    #[inline]
    pub fn is_line_in_area(&self, index: usize) -> bool {
        self.parts[index].line_loc == Some(Location::Interior)
    }

    /// Location on one side for boundary edges, the edge's own location
    /// otherwise.
    pub fn side_location(&self, index: usize, side: Side) -> Option<Location> {
        match (self.parts[index].role, side) {
            (Role::Boundary { left, .. }, Side::Left) => Some(left),
            (Role::Boundary { right, .. }, Side::Right) => Some(right),
            _ => self.parts[index].line_loc,
        }
    }
}
