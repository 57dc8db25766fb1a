use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BboxError {
    #[error("Longitude values must be between -180 and 180")]
    Longitude,
    #[error("Latitude values must be between -90 and 90")]
    Latitude,
    #[error("Min values must be <= max values")]
    Order,
    #[error("Bounding box coordinates must be finite")]
    NonFinite,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

/// Corner bounds in the layout web map overlays expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bbox {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self, BboxError> {
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err(BboxError::NonFinite);
        }

        if xmin > xmax || ymin > ymax {
            return Err(BboxError::Order);
        }

        Ok(Bbox {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Same as [`Bbox::new`] but also requires longitude/latitude ranges.
    pub fn geographic(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self, BboxError> {
        if !(-180.0..=180.0).contains(&xmin) || !(-180.0..=180.0).contains(&xmax) {
            return Err(BboxError::Longitude);
        }

        if !(-90.0..=90.0).contains(&ymin) || !(-90.0..=90.0).contains(&ymax) {
            return Err(BboxError::Latitude);
        }

        Self::new(xmin, xmax, ymin, ymax)
    }

    /// Smallest box enclosing all points. Empty input yields a zero box at the origin.
    pub fn enclosing(points: &[(f64, f64)]) -> Self {
        if points.is_empty() {
            return Bbox {
                xmin: 0.0,
                xmax: 0.0,
                ymin: 0.0,
                ymax: 0.0,
            };
        }

        points.iter().fold(
            Bbox {
                xmin: f64::INFINITY,
                xmax: f64::NEG_INFINITY,
                ymin: f64::INFINITY,
                ymax: f64::NEG_INFINITY,
            },
            |acc, &(x, y)| Bbox {
                xmin: acc.xmin.min(x),
                xmax: acc.xmax.max(x),
                ymin: acc.ymin.min(y),
                ymax: acc.ymax.max(y),
            },
        )
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// True when the two boxes share a region of positive area.
    pub fn intersects(&self, other: &Bbox) -> bool {
        self.xmin < other.xmax
            && other.xmin < self.xmax
            && self.ymin < other.ymax
            && other.ymin < self.ymax
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.xmin..=self.xmax).contains(&x) && (self.ymin..=self.ymax).contains(&y)
    }

    pub fn to_bounds(&self) -> Bounds {
        Bounds {
            south: self.ymin,
            west: self.xmin,
            north: self.ymax,
            east: self.xmax,
        }
    }
}
