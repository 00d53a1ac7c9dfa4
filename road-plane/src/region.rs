use crate::DetectorSettings;
use log::debug;
use road_core::{CloudPoint, Pixel, PointCloud};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A rectangular image window given as fractions of the image size.
///
/// `top`/`bottom` are fractions of the height and `left`/`right` fractions of the width.
/// The defaults cut away the sky and horizon band at the top, the bonnet of the vehicle at
/// the bottom, and the left margin that only the left camera sees.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(default))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegionOfInterest {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Default for RegionOfInterest {
    fn default() -> Self {
        Self {
            top: 0.55,
            bottom: 0.72,
            left: 0.13,
            right: 1.0,
        }
    }
}

impl RegionOfInterest {
    /// A region is valid if it is a non-empty window inside the image that leaves at
    /// least part of the image out.
    pub fn is_valid(&self) -> bool {
        let within = |lo: f64, hi: f64| {
            (0.0..=1.0).contains(&lo) && (0.0..=1.0).contains(&hi) && lo < hi
        };
        let whole =
            self.top == 0.0 && self.bottom == 1.0 && self.left == 0.0 && self.right == 1.0;
        within(self.top, self.bottom) && within(self.left, self.right) && !whole
    }

    /// The pixel window this region covers in an image of the given size.
    ///
    /// If the fractions round to the whole image, the top row is left out.
    pub fn window(&self, width: usize, height: usize) -> Window {
        let scale = |fraction: f64, size: usize| {
            ((fraction * size as f64).round().max(0.0) as usize).min(size)
        };
        let mut window = Window {
            top: scale(self.top, height),
            bottom: scale(self.bottom, height),
            left: scale(self.left, width),
            right: scale(self.right, width),
        };
        if window.covers(width, height) {
            window.top = 1;
        }
        window
    }
}

/// A half-open pixel window: rows `top..bottom` and columns `left..right`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Window {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl Window {
    pub fn contains(&self, pixel: Pixel) -> bool {
        (self.top..self.bottom).contains(&pixel.row) && (self.left..self.right).contains(&pixel.col)
    }

    pub fn is_empty(&self) -> bool {
        self.top >= self.bottom || self.left >= self.right
    }

    /// Whether this is every pixel of a `width`×`height` image.
    pub fn covers(&self, width: usize, height: usize) -> bool {
        self.top == 0 && self.left == 0 && self.bottom >= height && self.right >= width
    }
}

/// The part of a point cloud that is believed to be the road in front of the vehicle.
///
/// Every point has a valid depth inside the configured range and lies in `window`,
/// and there are always at least three points.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRegion {
    points: PointCloud,
    window: Window,
}

impl CandidateRegion {
    pub fn points(&self) -> &PointCloud {
        &self.points
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Not enough points were found to define a plane.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InsufficientPoints {
    /// The last window that was searched.
    pub window: Window,
    pub found: usize,
}

/// Chooses the candidate road points from a point cloud.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegionSelector {
    pub region: RegionOfInterest,
    pub min_depth: f64,
    pub max_depth: f64,
    pub sample_step: usize,
    pub adaptive_minimum_points: usize,
    pub adaptive_step: f64,
    pub adaptive_top_limit: f64,
}

impl RegionSelector {
    pub fn from_settings(settings: &DetectorSettings) -> Self {
        Self {
            region: settings.region,
            min_depth: settings.min_depth,
            max_depth: settings.max_depth,
            sample_step: settings.sample_step.max(1),
            adaptive_minimum_points: settings.adaptive_minimum_points,
            adaptive_step: settings.adaptive_step,
            adaptive_top_limit: settings.adaptive_top_limit,
        }
    }

    /// Selects the points of `cloud` (taken from an image of `width`×`height`) that lie in
    /// the region of interest and the depth range.
    ///
    /// When adaptive growth is enabled and the window holds fewer than
    /// `adaptive_minimum_points`, its top edge is raised one step at a time until enough
    /// points are found or the top limit is reached. The result only depends on the cloud.
    ///
    /// Fewer than three points give [`InsufficientPoints`].
    pub fn select(
        &self,
        cloud: &PointCloud,
        width: usize,
        height: usize,
    ) -> Result<CandidateRegion, InsufficientPoints> {
        let mut region = self.region;
        let mut window = region.window(width, height);
        let mut points = self.collect(cloud, window);
        while points.len() < self.adaptive_minimum_points
            && self.adaptive_step > 0.0
            && region.top > self.adaptive_top_limit
        {
            region.top = (region.top - self.adaptive_step).max(self.adaptive_top_limit);
            window = region.window(width, height);
            points = self.collect(cloud, window);
            debug!(
                "grew region of interest to rows {}..{} with {} points",
                window.top,
                window.bottom,
                points.len()
            );
        }

        if points.len() < 3 {
            debug!(
                "only {} candidate points in window {:?}",
                points.len(),
                window
            );
            return Err(InsufficientPoints {
                window,
                found: points.len(),
            });
        }
        debug!("selected {} candidate points in window {:?}", points.len(), window);
        Ok(CandidateRegion { points, window })
    }

    fn collect(&self, cloud: &PointCloud, window: Window) -> PointCloud {
        if window.is_empty() {
            return PointCloud::new();
        }
        cloud
            .iter()
            .filter(|p| self.keeps(p, window))
            .copied()
            .collect()
    }

    fn keeps(&self, p: &CloudPoint, window: Window) -> bool {
        window.contains(p.pixel)
            && (p.pixel.row - window.top) % self.sample_step == 0
            && (p.pixel.col - window.left) % self.sample_step == 0
            && p.point.z.is_finite()
            && (self.min_depth..=self.max_depth).contains(&p.point.z)
    }
}
