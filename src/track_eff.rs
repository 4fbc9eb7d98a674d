//! Tracking efficiency from angular matching of tracks to truth particles
//!
//! Stable charged truth particles above a transverse momentum threshold are
//! matching candidates. Each track is matched to the remaining candidate with
//! the smallest opening angle, provided that angle is below the configured
//! maximum. A matched candidate is not available to later tracks.
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::{
    config::{Config, MissingCollection},
    error::Result,
    event::Event,
    histogram::Hist1D,
    kinematics::{angle_between, normalize, track_direction, track_eta},
    output::HistogramSet,
    reader::{EventReader, Format},
    util::{with_policy, FINAL_STATE},
};

pub const TRUE_ETA_HIST: &str = "trueEtaHist";
pub const TRACK_ETA_HIST: &str = "trackEtaHist";
pub const MIN_ANGLE_HIST: &str = "minAngleHist";
pub const EFFICIENCY_HIST: &str = "trackEffHist";

/// A track matched to a truth particle
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct TrackMatch {
    /// Index in the track collection
    pub track: usize,
    /// Index in the truth collection
    pub truth: usize,
    /// Opening angle between track and truth particle
    pub angle: f64,
    /// Track pseudorapidity
    pub eta: f64,
}

#[derive(Clone, Debug)]
pub struct TrackEfficiency {
    truth_collection: String,
    track_collection: String,
    truth_min_pt: f64,
    max_angle: f64,
    missing_collection: MissingCollection,
    prefix: String,
    true_eta: Hist1D,
    track_eta: Hist1D,
    min_angle: Hist1D,
    nevents: usize,
}

impl TrackEfficiency {
    /// New pass
    ///
    /// All histogram names start with `prefix`.
    pub fn new(config: &Config, prefix: &str) -> Result<Self> {
        config.validate()?;
        let cfg = &config.track_efficiency;
        let name = |name: &str| format!("{prefix}{name}");
        Ok(Self {
            truth_collection: config.truth_collection.clone(),
            track_collection: config.track_collection.clone(),
            truth_min_pt: cfg.truth_min_pt,
            max_angle: cfg.max_angle,
            missing_collection: config.missing_collection,
            prefix: prefix.to_owned(),
            true_eta: Hist1D::new(
                &name(TRUE_ETA_HIST),
                &format!("MCParticle, P_T > {} GeV; eta; count", cfg.truth_min_pt),
                cfg.eta_binning,
            ),
            track_eta: Hist1D::new(
                &name(TRACK_ETA_HIST),
                &format!("Track, P_T > {} GeV; eta; count", cfg.truth_min_pt),
                cfg.eta_binning,
            ),
            min_angle: Hist1D::new(
                &name(MIN_ANGLE_HIST),
                "Track/MCParticle matching; min. angular deviation; count",
                cfg.angle_binning(),
            ),
            nevents: 0,
        })
    }

    /// Match the tracks of one event and fill the histograms
    pub fn process(&mut self, ev: &Event) -> Result<Vec<TrackMatch>> {
        let policy = self.missing_collection;
        let truth = with_policy(ev.mc_particles(&self.truth_collection), policy)?;
        let tracks = with_policy(ev.tracks(&self.track_collection), policy)?;
        self.nevents += 1;

        let mut candidates = Vec::new();
        for (idx, particle) in truth.iter().enumerate() {
            if particle.generator_status != FINAL_STATE || particle.charge == 0. {
                continue;
            }
            let [px, py, _] = particle.momentum;
            let dir = normalize(particle.momentum);
            if px.hypot(py) > self.truth_min_pt {
                self.true_eta.fill(dir[2].atanh());
                candidates.push((idx, dir));
            }
        }

        let mut matches = Vec::new();
        for (idx, track) in tracks.iter().enumerate() {
            let eta = track_eta(track.tan_lambda);
            let dir = track_direction(track.phi, track.tan_lambda);
            let closest = candidates
                .iter()
                .enumerate()
                .map(|(pos, (_, truth_dir))| (pos, angle_between(&dir, truth_dir)))
                .min_by(|a, b| a.1.total_cmp(&b.1));
            let Some((pos, angle)) = closest else {
                continue;
            };
            if angle < self.max_angle {
                self.track_eta.fill(eta);
                self.min_angle.fill(angle);
                let (truth, _) = candidates.remove(pos);
                matches.push(TrackMatch {
                    track: idx,
                    truth,
                    angle,
                    eta,
                });
            }
        }
        debug!(
            "Event {}: matched {} of {} tracks, {} truth candidates left",
            ev.number,
            matches.len(),
            tracks.len(),
            candidates.len()
        );
        Ok(matches)
    }

    /// Process all events in a file
    pub fn process_file(&mut self, path: &Path, format: Option<Format>) -> Result<()> {
        let reader = EventReader::open(path, format)?;
        for ev in reader {
            self.process(&ev?)?;
        }
        Ok(())
    }

    /// Collect the histograms
    ///
    /// With `normalize` the efficiency histogram is added.
    pub fn finish(self, normalize: bool) -> Result<HistogramSet> {
        let ntrue = self.true_eta.entries();
        let nmatched = self.track_eta.entries();
        info!(
            "{}tracking: {} events, {nmatched} of {ntrue} truth particles matched",
            self.prefix, self.nevents
        );
        let mut res = HistogramSet::new();
        if normalize {
            let eff = Hist1D::ratio(
                &format!("{}{EFFICIENCY_HIST}", self.prefix),
                &format!(
                    "Tracking Efficiency for P_T > {} GeV; eta; efficiency",
                    self.truth_min_pt
                ),
                &self.track_eta,
                &self.true_eta,
            )?;
            res.push(eff);
        }
        res.push(self.true_eta);
        res.push(self.track_eta);
        res.push(self.min_angle);
        Ok(res)
    }
}

/// Run the tracking pass over a set of files
///
/// At most `max_files` files are processed, in the order given.
pub fn run_files(
    config: &Config,
    files: &[PathBuf],
    format: Option<Format>,
    max_files: Option<usize>,
    normalize: bool,
    prefix: &str,
) -> Result<HistogramSet> {
    let nfiles = max_files.map_or(files.len(), |max| max.min(files.len()));
    if nfiles < files.len() {
        info!("Processing only {nfiles} of {} files", files.len());
    }
    let mut pass = TrackEfficiency::new(config, prefix)?;
    for file in &files[..nfiles] {
        pass.process_file(file, format)?;
    }
    pass.finish(normalize)
}

/// All regular files in a directory, sorted by name
pub fn files_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        } else {
            warn!("Skipping {}: not a regular file", entry.path().display());
        }
    }
    files.sort();
    Ok(files)
}
