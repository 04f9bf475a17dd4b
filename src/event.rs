//! Host-facing event model: particles, jets and named jet collections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::jet::{PseudoJet, join};

/// Read-only view of a particle-flow candidate.
pub trait Constituent {
    fn px(&self) -> f64;
    fn py(&self) -> f64;
    fn pz(&self) -> f64;
    fn energy(&self) -> f64;

    fn pt(&self) -> f64 {
        self.px().hypot(self.py())
    }
}

/// Jet-like entity supplied by the host.
pub trait JetLike {
    type Particle: Constituent;

    fn constituents(&self) -> &[Self::Particle];
    fn pt(&self) -> f64;
    fn eta(&self) -> f64;
}

/// Plain particle 4-momentum as delivered in an input collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub energy: f64,
}

impl Particle {
    pub fn new(px: f64, py: f64, pz: f64, energy: f64) -> Self {
        Self { px, py, pz, energy }
    }

    /// Massless particle from transverse momentum, pseudorapidity and azimuth.
    pub fn from_pt_eta_phi(pt: f64, eta: f64, phi: f64) -> Self {
        Self {
            px: pt * phi.cos(),
            py: pt * phi.sin(),
            pz: pt * eta.sinh(),
            energy: pt * eta.cosh(),
        }
    }
}

impl Constituent for Particle {
    fn px(&self) -> f64 {
        self.px
    }

    fn py(&self) -> f64 {
        self.py
    }

    fn pz(&self) -> f64 {
        self.pz
    }

    fn energy(&self) -> f64 {
        self.energy
    }
}

/// Large-radius jet with its constituent list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Jet {
    pub constituents: Vec<Particle>,
}

impl Jet {
    pub fn new(constituents: Vec<Particle>) -> Self {
        Self { constituents }
    }

    fn momentum(&self) -> PseudoJet {
        let parts: Vec<PseudoJet> = self
            .constituents
            .iter()
            .map(|p| PseudoJet::new(p.px, p.py, p.pz, p.energy))
            .collect();
        join(&parts)
    }
}

impl JetLike for Jet {
    type Particle = Particle;

    fn constituents(&self) -> &[Particle] {
        &self.constituents
    }

    fn pt(&self) -> f64 {
        self.momentum().pt()
    }

    fn eta(&self) -> f64 {
        self.momentum().eta()
    }
}

/// One processing unit: run/event identifiers plus named jet collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub run: u64,
    pub event: u64,
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<Jet>>,
}

impl Event {
    pub fn new(run: u64, event: u64) -> Self {
        Self {
            run,
            event,
            collections: BTreeMap::new(),
        }
    }

    /// Attach a named jet collection, replacing any previous one.
    pub fn with_collection(mut self, name: impl Into<String>, jets: Vec<Jet>) -> Self {
        self.collections.insert(name.into(), jets);
        self
    }

    pub fn collection(&self, name: &str) -> Option<&[Jet]> {
        self.collections.get(name).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jet_kinematics_follow_constituent_sum() {
        let jet = Jet::new(vec![
            Particle::from_pt_eta_phi(30.0, 0.5, 0.0),
            Particle::from_pt_eta_phi(30.0, 0.5, 0.0),
        ]);
        assert!((jet.pt() - 60.0).abs() < 1e-9);
        assert!((jet.eta() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn event_deserializes_without_collections() {
        let event: Event = serde_json::from_str(r#"{"run": 1, "event": 7}"#).unwrap();
        assert_eq!(event.event, 7);
        assert!(event.collection("jets").is_none());
    }
}
