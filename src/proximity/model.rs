use rand::Rng;
use rand::rngs::SmallRng;

use crate::common::Contact;
use crate::config::SimulatorConfig;
use crate::signal::clamp01;

/// State of the proximity simulation: a fixed roster of contacts whose
/// signal and distance drift on each tick as a bounded random walk.
///
/// The model is synchronous and owns its RNG, so tests can seed it and
/// assert exact post-tick values; [`super::ProximitySimulator`] drives it
/// on a timer.
pub struct ProximityModel {
    contacts: Vec<Contact>,
    jitter_signal: f64,
    jitter_distance_m: f64,
    rng: SmallRng,
}

impl ProximityModel {
    /// Builds the roster, randomizing each contact's starting distance
    /// (an integer in [5, 100] meters) and signal (in [0, 1]).
    pub fn new(config: &SimulatorConfig, mut rng: SmallRng) -> Self {
        let contacts = config
            .roster
            .iter()
            .enumerate()
            .map(|(i, identity)| Contact {
                id: (i + 1).to_string(),
                name: identity.name.clone(),
                handle: identity.handle.clone(),
                distance_meters: (5.0 + rng.gen_range(0.0_f64..=95.0)).round() as u32,
                signal: rng.gen_range(0.0..=1.0),
            })
            .collect();

        Self {
            contacts,
            jitter_signal: config.jitter_signal,
            jitter_distance_m: config.jitter_distance_m,
            rng,
        }
    }

    /// Perturbs every contact independently with uniform jitter.
    ///
    /// Signal stays in [0, 1] and distance stays >= 1 meter after every tick.
    pub fn tick(&mut self) {
        for contact in &mut self.contacts {
            let signal_step = self.rng.gen_range(-self.jitter_signal..=self.jitter_signal);
            contact.signal = clamp01(contact.signal + signal_step);

            let distance_step = self
                .rng
                .gen_range(-self.jitter_distance_m..=self.jitter_distance_m);
            let next = (f64::from(contact.distance_meters) + distance_step).round();
            contact.distance_meters = next.max(1.0) as u32;
        }
    }

    /// Fresh snapshot of the roster sorted by descending signal.
    ///
    /// Ties keep roster order; the sort is stable and never mutates state.
    pub fn ranked(&self) -> Vec<Contact> {
        let mut ranked = self.contacts.clone();
        ranked.sort_by(|a, b| {
            b.signal
                .partial_cmp(&a.signal)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}
