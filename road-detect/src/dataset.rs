use crate::{FrameError, RunError};
use log::debug;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Derives the right image name from a left image name.
pub fn right_name(left_name: &str) -> String {
    left_name.replace("_L", "_R")
}

/// A left image and the right image it should pair with.
///
/// The right image is not guaranteed to exist; see [`StereoPair::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StereoPair {
    pub left_name: String,
    pub right_name: String,
    pub left: PathBuf,
    pub right: PathBuf,
}

impl StereoPair {
    /// Ensures the left image is a PNG file and the right image exists.
    pub fn check(&self) -> Result<(), FrameError> {
        let is_png = self
            .left
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));
        if !is_png {
            return Err(FrameError::NotPng(self.left.clone()));
        }
        if !self.right.is_file() {
            return Err(FrameError::MissingRight(self.right.clone()));
        }
        Ok(())
    }
}

/// A dataset of rectified stereo pairs in two sibling directories.
///
/// Left images are named with `_L` and the matching right images with `_R` in the
/// same place, e.g. `1506942475.481834_L.png` and `1506942475.481834_R.png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub left_dir: PathBuf,
    pub right_dir: PathBuf,
}

impl Dataset {
    pub fn new(root: impl AsRef<Path>, left: impl AsRef<Path>, right: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            left_dir: root.join(left),
            right_dir: root.join(right),
        }
    }

    /// Lists the stereo pairs in file name order, which is timestamp order for
    /// timestamped names.
    ///
    /// With `skip_to`, pairs are dropped up to the first left name containing it.
    /// If no name contains it, nothing is listed.
    pub fn pairs(&self, skip_to: Option<&str>) -> Result<Vec<StereoPair>, RunError> {
        let listing_error = |source| RunError::Dataset {
            path: self.left_dir.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.left_dir).map_err(listing_error)? {
            let entry = entry.map_err(listing_error)?;
            if entry.file_type().map_err(listing_error)?.is_dir() {
                continue;
            }
            // Names that are not unicode can not be paired.
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => debug!("ignoring {:?}", name),
            }
        }
        names.sort();

        let start = match skip_to.filter(|pattern| !pattern.is_empty()) {
            Some(pattern) => names
                .iter()
                .position(|name| name.contains(pattern))
                .unwrap_or(names.len()),
            None => 0,
        };
        if start > 0 {
            debug!("skipping {} frames", start);
        }

        Ok(names
            .into_iter()
            .skip(start)
            .map(|left_name| {
                let right_name = right_name(&left_name);
                StereoPair {
                    left: self.left_dir.join(&left_name),
                    right: self.right_dir.join(&right_name),
                    left_name,
                    right_name,
                }
            })
            .collect())
    }
}
