use crate::RunError;
use log::info;
use road_plane::DetectorSettings;
use road_stereo::StereoCamera;
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

/// Everything that configures a batch run, as stored in a JSON settings file.
///
/// Missing fields take their defaults, so `{}` is a valid settings file.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// The stereo calibration of the dataset
    #[serde(default)]
    pub camera: StereoCamera,
    /// Road plane detection settings
    #[serde(default)]
    pub detector: DetectorSettings,
    /// The number of disparities the block matcher searches
    #[serde(default = "default_max_disparity")]
    pub max_disparity: usize,
    /// The side length of the square block matching window (odd)
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            camera: StereoCamera::default(),
            detector: DetectorSettings::default(),
            max_disparity: default_max_disparity(),
            block_size: default_block_size(),
        }
    }
}

impl RunSettings {
    /// Loads the settings from a JSON file, or the defaults if no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, RunError> {
        let path = match path {
            Some(path) => path,
            None => {
                info!("used default settings");
                return Ok(Self::default());
            }
        };
        let file = File::open(path).map_err(|source| RunError::SettingsFile {
            path: path.to_owned(),
            source,
        })?;
        let settings = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            RunError::SettingsFormat {
                path: path.to_owned(),
                source,
            }
        })?;
        info!("loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Checks the whole configuration. Any failure here is fatal for the run.
    pub fn validate(&self) -> Result<(), RunError> {
        self.camera
            .validate()
            .map_err(road_plane::SettingsError::from)?;
        self.detector.validate()?;
        if self.max_disparity == 0 {
            return Err(RunError::MaxDisparity);
        }
        if self.block_size % 2 == 0 {
            return Err(RunError::BlockSize(self.block_size));
        }
        Ok(())
    }
}

fn default_max_disparity() -> usize {
    128
}

fn default_block_size() -> usize {
    5
}
