#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Boxes are centre-anchored: `position` is the centre of the box and `size`
//! its full extent along each axis, in the document's single linear unit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// One of the three world axes.
///
/// `X` is width (left/right), `Y` is height (bottom/top), `Z` is depth
/// (back/front).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Component index of this axis in a `[x, y, z]` triple.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = ModelError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::X),
            1 => Ok(Self::Y),
            2 => Ok(Self::Z),
            other => Err(ModelError::InvalidAxis {
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<char> for Axis {
    type Error = ModelError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'x' | 'X' => Ok(Self::X),
            'y' | 'Y' => Ok(Self::Y),
            'z' | 'Z' => Ok(Self::Z),
            other => Err(ModelError::InvalidAxis {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        };
        f.write_str(name)
    }
}

/// A point or extent in three dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component along `axis`.
    #[inline]
    pub const fn get(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Copy of this vector with the `axis` component replaced.
    #[inline]
    #[must_use]
    pub const fn with(mut self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
        self
    }

    /// Components as an `[x, y, z]` array.
    #[inline]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Largest component.
    #[inline]
    pub fn max_component(&self) -> f64 {
        self.x.max(self.y).max(self.z)
    }

    /// Component-wise approximate equality.
    pub fn approx_eq(&self, other: &Vec3, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for [f64; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

/// An axis-aligned box described by its centre and full size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Box3 {
    /// Centre of the box.
    pub position: Vec3,
    /// Full extent along each axis.
    pub size: Vec3,
}

impl Box3 {
    /// Create a new box.
    #[inline]
    pub const fn new(position: Vec3, size: Vec3) -> Self {
        Self { position, size }
    }

    /// Box of the given size centred on the origin.
    #[inline]
    pub const fn from_size(size: Vec3) -> Self {
        Self::new(Vec3::ZERO, size)
    }

    /// Minimum corner.
    pub fn min(&self) -> Vec3 {
        Vec3::new(
            self.position.x - self.size.x / 2.0,
            self.position.y - self.size.y / 2.0,
            self.position.z - self.size.z / 2.0,
        )
    }

    /// Maximum corner.
    pub fn max(&self) -> Vec3 {
        Vec3::new(
            self.position.x + self.size.x / 2.0,
            self.position.y + self.size.y / 2.0,
            self.position.z + self.size.z / 2.0,
        )
    }

    /// Volume of the box.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.size.x * self.size.y * self.size.z
    }

    /// Whether `other` lies entirely inside this box, allowing `epsilon` slack.
    pub fn contains_box(&self, other: &Box3, epsilon: f64) -> bool {
        let (outer_min, outer_max) = (self.min(), self.max());
        let (inner_min, inner_max) = (other.min(), other.max());
        Axis::ALL.iter().all(|&axis| {
            inner_min.get(axis) >= outer_min.get(axis) - epsilon
                && inner_max.get(axis) <= outer_max.get(axis) + epsilon
        })
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Box3) -> Box3 {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        Self::from_corners(
            Vec3::new(
                a_min.x.min(b_min.x),
                a_min.y.min(b_min.y),
                a_min.z.min(b_min.z),
            ),
            Vec3::new(
                a_max.x.max(b_max.x),
                a_max.y.max(b_max.y),
                a_max.z.max(b_max.z),
            ),
        )
    }

    /// Build a box from its minimum and maximum corners.
    pub fn from_corners(min: Vec3, max: Vec3) -> Box3 {
        Box3 {
            position: Vec3::new(
                (min.x + max.x) / 2.0,
                (min.y + max.y) / 2.0,
                (min.z + max.z) / 2.0,
            ),
            size: Vec3::new(max.x - min.x, max.y - min.y, max.z - min.z),
        }
    }
}
