use road_plane::SettingsError;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Reasons a single frame is skipped. The batch carries on with the next frame.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("{0} is not a PNG image")]
    NotPng(PathBuf),
    #[error("right image {0} is missing")]
    MissingRight(PathBuf),
    #[error("unable to read image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("left image is {left:?} pixels but right image is {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },
    #[error("unable to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to save overlay {path}: {source}")]
    Overlay {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Problems that stop the whole run before any frame is processed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("unable to read settings file {path}: {source}")]
    SettingsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed settings file {path}: {source}")]
    SettingsFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("the maximum disparity must be at least one")]
    MaxDisparity,
    #[error("the block size must be odd, got {0}")]
    BlockSize(usize),
    #[error("unable to list dataset directory {path}: {source}")]
    Dataset {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to write report: {0}")]
    Report(#[source] io::Error),
}
