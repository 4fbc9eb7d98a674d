//! Analysis settings
//!
//! All settings have defaults, so an empty JSON object is a valid
//! configuration.
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::{MC_PARTICLE_COLLECTION, PFO_COLLECTION, TRACK_COLLECTION};
use crate::histogram::Axis;

/// How to treat a collection that is absent from an event
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingCollection {
    /// Abort with an error
    #[default]
    Error,
    /// Treat the collection as empty
    Empty,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name of the Monte Carlo truth collection
    pub truth_collection: String,
    /// Name of the particle-flow collection
    pub reco_collection: String,
    /// Name of the track collection
    pub track_collection: String,
    /// Minimum truth electron transverse momentum in GeV for the η histograms
    pub pt_threshold: f64,
    pub eta_binning: Axis,
    /// Binning of the truth transverse momentum in the resolution histogram
    pub resolution_pt_binning: Axis,
    /// Binning of the reconstructed over truth transverse momentum ratio
    pub resolution_ratio_binning: Axis,
    pub missing_collection: MissingCollection,
    pub track_efficiency: TrackEffConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackEffConfig {
    /// Minimum transverse momentum of truth particles in GeV
    pub truth_min_pt: f64,
    /// Maximum opening angle between a track and its truth particle
    pub max_angle: f64,
    pub eta_binning: Axis,
    /// Number of bins for the opening angle histogram on `[0, max_angle)`
    pub angle_bins: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            truth_collection: MC_PARTICLE_COLLECTION.to_owned(),
            reco_collection: PFO_COLLECTION.to_owned(),
            track_collection: TRACK_COLLECTION.to_owned(),
            pt_threshold: 1.,
            eta_binning: Axis { nbins: 100, min: -5., max: 5. },
            resolution_pt_binning: Axis { nbins: 500, min: 0., max: 50. },
            resolution_ratio_binning: Axis { nbins: 900, min: -4., max: 5. },
            missing_collection: MissingCollection::Error,
            track_efficiency: TrackEffConfig::default(),
        }
    }
}

impl Default for TrackEffConfig {
    fn default() -> Self {
        Self {
            truth_min_pt: 0.5,
            max_angle: 0.01,
            eta_binning: Axis { nbins: 50, min: -5., max: 5. },
            angle_bins: 50,
        }
    }
}

impl TrackEffConfig {
    pub fn angle_binning(&self) -> Axis {
        Axis {
            nbins: self.angle_bins,
            min: 0.,
            max: self.max_angle,
        }
    }
}

impl Config {
    /// Read a JSON configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&bytes)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.eta_binning.validate()?;
        self.resolution_pt_binning.validate()?;
        self.resolution_ratio_binning.validate()?;
        let track_eff = &self.track_efficiency;
        track_eff.eta_binning.validate()?;
        if !(track_eff.max_angle > 0.) {
            return Err(Error::Config(format!(
                "maximum track angle must be positive, got {}",
                track_eff.max_angle
            )));
        }
        track_eff.angle_binning().validate()?;
        for (what, name) in [
            ("truth", &self.truth_collection),
            ("reconstruction", &self.reco_collection),
            ("track", &self.track_collection),
        ] {
            if name.is_empty() {
                return Err(Error::Config(format!("empty {what} collection name")));
            }
        }
        Ok(())
    }
}
