//! Comparison of truth-level and particle-flow electrons
//!
//! For each event the momenta of all stable truth electrons and of all
//! particle-flow objects identified as electrons are summed. The η
//! distributions of both sums are recorded for events where the truth sum
//! exceeds the transverse momentum threshold. The diagnostics variant also
//! records the transverse momentum response for every event.
use std::fmt::{self, Display};

use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    config::{Config, MissingCollection},
    error::Result,
    event::Event,
    histogram::{Hist1D, Hist2D},
    kinematics::{sum_momenta, Kinematics},
    output::HistogramSet,
    util::{is_electron_like, with_policy, FINAL_STATE},
};

pub const TRUTH_ETA_HIST: &str = "truthElectronEtaHist";
pub const PFO_ETA_HIST: &str = "pfoElectronEtaHist";
pub const RESOLUTION_HIST: &str = "resPT";

/// Which histograms to produce
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Variant {
    /// Truth and reconstructed electron η
    #[default]
    EtaHistos,
    /// Additionally the transverse momentum response
    Diagnostics,
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::EtaHistos => write!(f, "eta-histos"),
            Variant::Diagnostics => write!(f, "diagnostics"),
        }
    }
}

/// Kinematics of the electron sums in one event
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize)]
pub struct ComparisonRecord {
    pub truth: Kinematics,
    pub reco: Kinematics,
    /// Whether the event entered the η histograms
    pub filled_eta: bool,
}

/// Summary of a finished pass
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct PassSummary {
    pub nevents: usize,
    pub neta_filled: usize,
    /// Number of histogram fills with a NaN or infinite coordinate
    pub nnonfinite: usize,
}

/// Truth versus reconstruction electron comparison
#[derive(Clone, Debug)]
pub struct ElectronComparison {
    variant: Variant,
    truth_collection: String,
    reco_collection: String,
    pt_threshold: f64,
    missing_collection: MissingCollection,
    truth_eta: Hist1D,
    pfo_eta: Hist1D,
    res_pt: Option<Hist2D>,
    summary: PassSummary,
}

impl ElectronComparison {
    pub fn new(config: &Config, variant: Variant) -> Result<Self> {
        config.validate()?;
        let truth_eta = Hist1D::new(
            TRUTH_ETA_HIST,
            &format!("Truth Electron, PT > {}; Eta; Count", config.pt_threshold),
            config.eta_binning,
        );
        let pfo_eta = Hist1D::new(
            PFO_ETA_HIST,
            &format!("PFO Electron, PT > {}; Eta; Count", config.pt_threshold),
            config.eta_binning,
        );
        let res_pt = match variant {
            Variant::EtaHistos => None,
            Variant::Diagnostics => Some(Hist2D::new(
                RESOLUTION_HIST,
                "",
                config.resolution_pt_binning,
                config.resolution_ratio_binning,
            )),
        };
        Ok(Self {
            variant,
            truth_collection: config.truth_collection.clone(),
            reco_collection: config.reco_collection.clone(),
            pt_threshold: config.pt_threshold,
            missing_collection: config.missing_collection,
            truth_eta,
            pfo_eta,
            res_pt,
            summary: Default::default(),
        })
    }

    pub fn summary(&self) -> PassSummary {
        self.summary
    }

    /// Sum the electron momenta of one event and fill the histograms
    pub fn process(&mut self, ev: &Event) -> Result<ComparisonRecord> {
        let policy = self.missing_collection;
        let truth = with_policy(ev.mc_particles(&self.truth_collection), policy)?;
        let pfos = with_policy(
            ev.reconstructed_particles(&self.reco_collection),
            policy,
        )?;

        let truth_electrons = truth
            .iter()
            .filter(|p| p.generator_status == FINAL_STATE && is_electron_like(p.id()))
            .map(|p| &p.momentum);
        let truth = Kinematics::from(sum_momenta(truth_electrons));

        let pfo_electrons = pfos
            .iter()
            .filter(|p| is_electron_like(p.id()))
            .map(|p| &p.momentum);
        let reco = Kinematics::from(sum_momenta(pfo_electrons));

        self.summary.nevents += 1;
        let filled_eta = truth.pt > self.pt_threshold;
        if filled_eta {
            self.truth_eta.fill(truth.eta);
            self.pfo_eta.fill(reco.eta);
            self.summary.neta_filled += 1;
            let nonfinite = [truth.eta, reco.eta].iter().filter(|x| !x.is_finite()).count();
            self.summary.nnonfinite += nonfinite;
        }
        if let Some(res_pt) = &mut self.res_pt {
            let ratio = reco.pt / truth.pt;
            res_pt.fill(truth.pt, ratio);
            if !ratio.is_finite() {
                self.summary.nnonfinite += 1;
            }
        }
        debug!(
            "Event {}: truth pT {:.3} η {:.3}, PFO pT {:.3} η {:.3}{}",
            ev.number,
            truth.pt,
            truth.eta,
            reco.pt,
            reco.eta,
            if filled_eta { "" } else { " (below threshold)" }
        );
        Ok(ComparisonRecord {
            truth,
            reco,
            filled_eta,
        })
    }

    /// Process all events of a stream and return the filled histograms
    ///
    /// The first error aborts the pass.
    pub fn run<I>(mut self, events: I) -> Result<HistogramSet>
    where
        I: IntoIterator<Item = Result<Event>>,
    {
        for ev in events {
            self.process(&ev?)?;
        }
        Ok(self.finish())
    }

    pub fn finish(self) -> HistogramSet {
        let PassSummary {
            nevents,
            neta_filled,
            nnonfinite,
        } = self.summary;
        info!(
            "{}: {nevents} events, {neta_filled} with truth electron pT > {}",
            self.variant, self.pt_threshold
        );
        if nnonfinite > 0 {
            warn!("{nnonfinite} histogram fills had a non-finite coordinate and went to the overflow bins");
        }
        let mut res = HistogramSet::new();
        res.push(self.truth_eta);
        res.push(self.pfo_eta);
        if let Some(res_pt) = self.res_pt {
            res.push(res_pt);
        }
        res
    }
}
