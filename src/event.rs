use std::collections::BTreeMap;
use std::fmt::{self, Display};

use itertools::Itertools;
use particle_id::ParticleID;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default name of the Monte Carlo truth collection
pub const MC_PARTICLE_COLLECTION: &str = "MCParticle";
/// Default name of the particle-flow collection
pub const PFO_COLLECTION: &str = "PandoraPFOCollection";
/// Default name of the track collection
pub const TRACK_COLLECTION: &str = "Tracks";

/// Reconstructed collision event
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Event {
    /// Run number
    #[serde(default)]
    pub run: i32,
    /// Event number
    #[serde(default)]
    pub number: i32,
    /// Named collections of particle records
    #[serde(default)]
    pub collections: BTreeMap<String, Collection>,
}

/// A named event collection
///
/// All elements of a collection share one type.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", content = "elements")]
pub enum Collection {
    /// Monte Carlo truth particles
    #[serde(rename = "MCParticle")]
    McParticle(Vec<McParticle>),
    /// Reconstructed particle candidates, e.g. particle-flow objects
    ReconstructedParticle(Vec<ReconstructedParticle>),
    /// Reconstructed tracks
    Track(Vec<Track>),
}

/// Monte Carlo truth particle
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct McParticle {
    /// PDG particle code
    pub pdg: i32,
    /// Generator status, 1 for stable final-state particles
    #[serde(default)]
    pub generator_status: i32,
    /// Three-momentum in GeV
    pub momentum: [f64; 3],
    /// Mass in GeV
    #[serde(default)]
    pub mass: f64,
    /// Charge in units of the elementary charge
    #[serde(default)]
    pub charge: f32,
}

/// Reconstructed particle
#[derive(Clone, Debug, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct ReconstructedParticle {
    /// Particle type hypothesis as a PDG code
    #[serde(rename = "type")]
    pub kind: i32,
    /// Three-momentum in GeV
    pub momentum: [f64; 3],
    /// Energy in GeV
    #[serde(default)]
    pub energy: f64,
    /// Mass in GeV
    #[serde(default)]
    pub mass: f64,
    /// Charge in units of the elementary charge
    #[serde(default)]
    pub charge: f32,
}

/// Reconstructed track in the perigee parametrisation
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Track {
    /// Impact parameter in the transverse plane
    #[serde(default)]
    pub d0: f64,
    /// Azimuthal angle of the momentum at the point of closest approach
    pub phi: f64,
    /// Signed curvature
    #[serde(default)]
    pub omega: f64,
    /// Longitudinal impact parameter
    #[serde(default)]
    pub z0: f64,
    /// Dip angle tangent
    pub tan_lambda: f64,
}

impl McParticle {
    pub fn id(&self) -> ParticleID {
        ParticleID::new(self.pdg)
    }
}

impl ReconstructedParticle {
    pub fn id(&self) -> ParticleID {
        ParticleID::new(self.kind)
    }
}

impl Collection {
    /// Name of the element type
    pub fn type_name(&self) -> &'static str {
        match self {
            Collection::McParticle(_) => "MCParticle",
            Collection::ReconstructedParticle(_) => "ReconstructedParticle",
            Collection::Track(_) => "Track",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Collection::McParticle(c) => c.len(),
            Collection::ReconstructedParticle(c) => c.len(),
            Collection::Track(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Event {
    /// Look up a collection by name
    pub fn collection(&self, name: &str) -> Result<&Collection> {
        self.collections
            .get(name)
            .ok_or_else(|| Error::MissingCollection {
                event: self.number,
                name: name.to_owned(),
            })
    }

    /// Look up a collection of Monte Carlo particles
    pub fn mc_particles(&self, name: &str) -> Result<&[McParticle]> {
        match self.collection(name)? {
            Collection::McParticle(c) => Ok(c),
            other => Err(self.type_mismatch(name, other, "MCParticle")),
        }
    }

    /// Look up a collection of reconstructed particles
    pub fn reconstructed_particles(
        &self,
        name: &str,
    ) -> Result<&[ReconstructedParticle]> {
        match self.collection(name)? {
            Collection::ReconstructedParticle(c) => Ok(c),
            other => {
                Err(self.type_mismatch(name, other, "ReconstructedParticle"))
            }
        }
    }

    /// Look up a collection of tracks
    pub fn tracks(&self, name: &str) -> Result<&[Track]> {
        match self.collection(name)? {
            Collection::Track(c) => Ok(c),
            other => Err(self.type_mismatch(name, other, "Track")),
        }
    }

    fn type_mismatch(
        &self,
        name: &str,
        found: &Collection,
        expected: &'static str,
    ) -> Error {
        Error::CollectionType {
            event: self.number,
            name: name.to_owned(),
            found: found.type_name(),
            expected,
        }
    }
}

fn fmt_p(p: &[f64; 3]) -> String {
    format!(
        "({})",
        p.iter().format_with(", ", |c, f| f(&format_args!("{c:+.4e}")))
    )
}

impl Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Event {} (run {})", self.number, self.run)?;
        for (name, coll) in &self.collections {
            writeln!(
                f,
                "  {name}: {} collection with {} elements",
                coll.type_name(),
                coll.len()
            )?;
            match coll {
                Collection::McParticle(c) => {
                    for (n, p) in c.iter().enumerate() {
                        writeln!(
                            f,
                            "    [{n:>4}] pdg {:>10} status {:>3} charge {:>+5.2} m {:.4e} p {}",
                            p.pdg,
                            p.generator_status,
                            p.charge,
                            p.mass,
                            fmt_p(&p.momentum)
                        )?;
                    }
                }
                Collection::ReconstructedParticle(c) => {
                    for (n, p) in c.iter().enumerate() {
                        writeln!(
                            f,
                            "    [{n:>4}] type {:>10} charge {:>+5.2} E {:.4e} m {:.4e} p {}",
                            p.kind,
                            p.charge,
                            p.energy,
                            p.mass,
                            fmt_p(&p.momentum)
                        )?;
                    }
                }
                Collection::Track(c) => {
                    for (n, t) in c.iter().enumerate() {
                        writeln!(
                            f,
                            "    [{n:>4}] d0 {:+.4e} phi {:+.4e} omega {:+.4e} z0 {:+.4e} tanL {:+.4e}",
                            t.d0, t.phi, t.omega, t.z0, t.tan_lambda
                        )?;
                    }
                }
            }
        }
        Ok(())
    }
}
