//! Generalized energy correlation functions `_o e_n^(β)`.
//!
//! For every `n`-tuple of particles the product of momentum fractions is
//! weighted by the product of the `o` smallest pairwise opening angles, each
//! raised to `β`. Angles are measured in the pseudorapidity-azimuth plane.

use crate::jet::PseudoJet;

/// Angular exponents of the catalogue, addressed by beta-index.
pub const BETA_GRID: [f64; 4] = [0.5, 1.0, 2.0, 4.0];
/// Largest angular order `o`.
pub const MAX_ANGULAR_ORDER: usize = 3;
/// Largest number of particles `n` in a correlator.
pub const MAX_POINTS: usize = 4;

const N_BETA: usize = BETA_GRID.len();

/// Full `(o, n, β)` catalogue for one set of particles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcfCatalog {
    values: [[[f64; N_BETA]; MAX_POINTS]; MAX_ANGULAR_ORDER],
}

impl EcfCatalog {
    /// Catalogue with every entry produced by `f(o, n, beta_idx)`.
    ///
    /// `o` and `n` are 1-based, `beta_idx` is 0-based.
    pub fn from_fn(f: impl Fn(usize, usize, usize) -> f64) -> Self {
        let mut values = [[[0.0; N_BETA]; MAX_POINTS]; MAX_ANGULAR_ORDER];
        for (o, by_n) in values.iter_mut().enumerate() {
            for (n, by_beta) in by_n.iter_mut().enumerate() {
                for (ib, value) in by_beta.iter_mut().enumerate() {
                    *value = f(o + 1, n + 1, ib);
                }
            }
        }
        Self { values }
    }

    /// Entry `(o, n, beta_idx)` with 1-based `o` and `n`.
    ///
    /// Panics when an index is outside the catalogue.
    pub fn get(&self, o: usize, n: usize, beta_idx: usize) -> f64 {
        self.values[o - 1][n - 1][beta_idx]
    }

    /// Compute the catalogue over `particles`.
    ///
    /// Entries whose angular order exceeds the number of pairs in an
    /// `n`-tuple are zero.
    pub fn compute(particles: &[PseudoJet]) -> Self {
        let mut values = [[[0.0; N_BETA]; MAX_POINTS]; MAX_ANGULAR_ORDER];
        let count = particles.len();
        let pt_sum: f64 = particles.iter().map(PseudoJet::pt).sum();
        if count == 0 || pt_sum <= 0.0 {
            return Self { values };
        }
        let z: Vec<f64> = particles.iter().map(|p| p.pt() / pt_sum).collect();
        let eta: Vec<f64> = particles.iter().map(PseudoJet::eta).collect();

        let mut angle = vec![0.0; count * count];
        let mut angle_beta = vec![[0.0; N_BETA]; count * count];
        for i in 0..count {
            for j in 0..i {
                let dphi = particles[i].delta_phi_to(&particles[j]);
                let deta = eta[i] - eta[j];
                let dr = (deta * deta + dphi * dphi).sqrt();
                let powers = BETA_GRID.map(|beta| dr.powf(beta));
                for (a, b) in [(i, j), (j, i)] {
                    angle[a * count + b] = dr;
                    angle_beta[a * count + b] = powers;
                }
            }
        }

        let z_total: f64 = z.iter().sum();
        for by_n in values.iter_mut() {
            by_n[0] = [z_total; N_BETA];
        }

        for i in 0..count {
            for j in (i + 1)..count {
                let zij = z[i] * z[j];
                let ij = i * count + j;
                for ib in 0..N_BETA {
                    values[0][1][ib] += zij * angle_beta[ij][ib];
                }

                for k in (j + 1)..count {
                    let zijk = zij * z[k];
                    let mut pairs = [ij, i * count + k, j * count + k];
                    pairs.sort_unstable_by(|a, b| angle[*a].total_cmp(&angle[*b]));
                    accumulate(&mut values, 2, zijk, &pairs, &angle_beta);

                    for l in (k + 1)..count {
                        let zijkl = zijk * z[l];
                        let mut pairs = [
                            ij,
                            i * count + k,
                            i * count + l,
                            j * count + k,
                            j * count + l,
                            k * count + l,
                        ];
                        pairs.sort_unstable_by(|a, b| angle[*a].total_cmp(&angle[*b]));
                        accumulate(&mut values, 3, zijkl, &pairs, &angle_beta);
                    }
                }
            }
        }
        Self { values }
    }
}

/// Add one tuple's contribution for every angular order and beta.
fn accumulate(
    values: &mut [[[f64; N_BETA]; MAX_POINTS]; MAX_ANGULAR_ORDER],
    n_idx: usize,
    weight: f64,
    sorted_pairs: &[usize],
    angle_beta: &[[f64; N_BETA]],
) {
    for ib in 0..N_BETA {
        let mut product = weight;
        for (o_idx, pair) in sorted_pairs.iter().take(MAX_ANGULAR_ORDER).enumerate() {
            product *= angle_beta[*pair][ib];
            values[o_idx][n_idx][ib] += product;
        }
    }
}
