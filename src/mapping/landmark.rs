//! Track boundary landmarks (cones)

use serde::{Deserialize, Serialize};

use crate::common::Point2D;

/// Cone color; blue and yellow mark the two sides of the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConeColor {
    Blue,
    Yellow,
    Orange,
    Unknown,
}

/// A perceived boundary marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub color: ConeColor,
}

impl Landmark {
    pub fn new(x: f64, y: f64, color: ConeColor) -> Self {
        Self { x, y, color }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    pub fn distance_to(&self, point: &Point2D) -> f64 {
        ((self.x - point.x).powi(2) + (self.y - point.y).powi(2)).sqrt()
    }
}

/// One immutable generation of the landmark map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkMap {
    landmarks: Vec<Landmark>,
}

impl LandmarkMap {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Landmark> {
        self.landmarks.iter()
    }

    pub fn by_color(&self, color: ConeColor) -> impl Iterator<Item = &Landmark> + '_ {
        self.landmarks.iter().filter(move |l| l.color == color)
    }
}

impl FromIterator<Landmark> for LandmarkMap {
    fn from_iter<I: IntoIterator<Item = Landmark>>(iter: I) -> Self {
        Self { landmarks: iter.into_iter().collect() }
    }
}
