use std::collections::BTreeMap;

use itertools::izip;
use lhef::HEPEUP;

use crate::event::{Collection, Event, McParticle, MC_PARTICLE_COLLECTION};

impl From<HEPEUP> for Event {
    fn from(source: HEPEUP) -> Self {
        let particles = izip!(source.IDUP, source.ISTUP, source.PUP)
            .map(|(id, status, p)| McParticle {
                pdg: id,
                generator_status: status,
                momentum: [p[0], p[1], p[2]],
                mass: p[4],
                ..Default::default()
            })
            .collect();
        let mut collections = BTreeMap::new();
        collections.insert(
            MC_PARTICLE_COLLECTION.to_owned(),
            Collection::McParticle(particles),
        );
        Self {
            collections,
            ..Default::default()
        }
    }
}
