use std::collections::BTreeMap;

use crate::event::{Collection, Event, McParticle, MC_PARTICLE_COLLECTION};

const HEPMC_INCOMING: i32 = 4;

impl From<hepmc2::Event> for Event {
    fn from(source: hepmc2::Event) -> Self {
        let efact = if source.energy_unit == hepmc2::event::EnergyUnit::MEV {
            1e-3
        } else {
            1.
        };
        let mut particles = Vec::new();
        for vx in source.vertices {
            // non-incoming particles entering a vertex were already
            // counted as outgoing particles of their production vertex
            let incoming = vx
                .particles_in
                .into_iter()
                .filter(|p| p.status == HEPMC_INCOMING);
            for particle in incoming.chain(vx.particles_out) {
                let [_, px, py, pz] = particle.p.0;
                particles.push(McParticle {
                    pdg: particle.id,
                    generator_status: particle.status,
                    momentum: [px, py, pz].map(|p| efact * p),
                    mass: efact * particle.m,
                    ..Default::default()
                });
            }
        }
        let mut collections = BTreeMap::new();
        collections.insert(
            MC_PARTICLE_COLLECTION.to_owned(),
            Collection::McParticle(particles),
        );
        Self {
            number: source.number,
            collections,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hepmc2::event::{FourVector, Particle, PdfInfo, Vertex};

    #[test]
    fn truth_particles() {
        let beam = |pz: f64| Particle {
            id: 11 * pz.signum() as i32,
            p: FourVector([pz.abs(), 0., 0., pz]),
            status: HEPMC_INCOMING,
            end_vtx: -1,
            ..Default::default()
        };
        let out = |id: i32, p: [f64; 3]| Particle {
            id,
            p: FourVector([0., p[0], p[1], p[2]]),
            status: 1,
            ..Default::default()
        };
        let vx = Vertex {
            barcode: -1,
            particles_in: vec![beam(125e3), beam(-125e3)],
            particles_out: vec![out(22, [1e3, 0., 2e3]), out(-11, [-1e3, 0., -2e3])],
            ..Default::default()
        };
        let source = hepmc2::Event {
            number: 42,
            mpi: 0,
            scale: 0.,
            alpha_qcd: 0.,
            alpha_qed: 0.,
            signal_process_id: 0,
            signal_process_vertex: Default::default(),
            random_states: vec![],
            weights: vec![1.],
            weight_names: vec![],
            vertices: vec![vx],
            xs: Default::default(),
            pdf_info: PdfInfo {
                parton_id: [11, -11],
                x: [1., 1.],
                scale: 0.,
                xf: Default::default(),
                pdf_id: [0, 0],
            },
            energy_unit: hepmc2::event::EnergyUnit::MEV,
            length_unit: hepmc2::event::LengthUnit::MM,
            heavy_ion_info: None,
        };
        let ev = Event::from(source);
        assert_eq!(ev.number, 42);
        let mc = ev.mc_particles(MC_PARTICLE_COLLECTION).unwrap();
        assert_eq!(mc.len(), 4);
        assert_eq!(mc[0].generator_status, HEPMC_INCOMING);
        assert_relative_eq!(mc[0].momentum[2], 125.);
        assert_eq!(mc[3].pdg, -11);
        assert_relative_eq!(mc[3].momentum[0], -1.);
        assert_relative_eq!(mc[3].momentum[2], -2.);
    }
}
