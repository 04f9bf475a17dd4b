use std::f64::consts::PI;

/// Below this many inputs a single tile (plain N² search) is cheaper.
const MIN_TILED_INPUTS: usize = 64;

/// Rapidity-azimuth tiling with tiles at least `R` wide.
///
/// Any pair closer than `R` lives in the same or in adjacent tiles, so a
/// nearest-neighbour search only needs to visit a tile's neighbourhood.
/// Edge tiles in rapidity absorb everything beyond the initial range.
#[derive(Debug, Clone)]
pub(crate) struct Tiling {
    rap_min: f64,
    rap_width: f64,
    n_rap: usize,
    phi_width: f64,
    n_phi: usize,
    members: Vec<Vec<usize>>,
    neighbourhoods: Vec<Vec<usize>>,
}

impl Tiling {
    pub(crate) fn new(raps: impl Iterator<Item = f64>, n_inputs: usize, radius: f64) -> Self {
        let (rap_min, rap_max) = raps.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), rap| {
            (lo.min(rap), hi.max(rap))
        });
        let tiled = n_inputs > MIN_TILED_INPUTS && rap_min.is_finite() && radius < PI;
        let (n_rap, rap_width, n_phi) = if tiled {
            let span = rap_max - rap_min;
            let n_rap = ((span / radius).floor() as usize).max(1);
            let n_phi = (((2.0 * PI) / radius).floor() as usize).max(1);
            (n_rap, (span / n_rap as f64).max(radius), n_phi)
        } else {
            (1, f64::INFINITY, 1)
        };
        let n_tiles = n_rap * n_phi;
        let mut neighbourhoods = Vec::with_capacity(n_tiles);
        for irap in 0..n_rap {
            for iphi in 0..n_phi {
                let mut around = Vec::with_capacity(9);
                for drap in [-1_i64, 0, 1] {
                    let jrap = irap as i64 + drap;
                    if jrap < 0 || jrap >= n_rap as i64 {
                        continue;
                    }
                    for dphi in [-1_i64, 0, 1] {
                        let jphi = (iphi as i64 + dphi).rem_euclid(n_phi as i64);
                        around.push(jrap as usize * n_phi + jphi as usize);
                    }
                }
                around.sort_unstable();
                around.dedup();
                neighbourhoods.push(around);
            }
        }
        Self {
            rap_min: if rap_min.is_finite() { rap_min } else { 0.0 },
            rap_width,
            n_rap,
            phi_width: 2.0 * PI / n_phi as f64,
            n_phi,
            members: vec![Vec::new(); n_tiles],
            neighbourhoods,
        }
    }

    pub(crate) fn tile_of(&self, rap: f64, phi: f64) -> usize {
        let irap = if self.n_rap == 1 {
            0
        } else {
            let raw = ((rap - self.rap_min) / self.rap_width).floor();
            raw.clamp(0.0, (self.n_rap - 1) as f64) as usize
        };
        let iphi = ((phi / self.phi_width).floor() as usize).min(self.n_phi - 1);
        irap * self.n_phi + iphi
    }

    pub(crate) fn insert(&mut self, tile: usize, jet: usize) {
        self.members[tile].push(jet);
    }

    pub(crate) fn remove(&mut self, tile: usize, jet: usize) {
        let members = &mut self.members[tile];
        if let Some(pos) = members.iter().position(|&m| m == jet) {
            members.swap_remove(pos);
        }
    }

    /// Tiles adjacent to (and including) `tile`.
    pub(crate) fn neighbourhood(&self, tile: usize) -> &[usize] {
        &self.neighbourhoods[tile]
    }

    pub(crate) fn members(&self, tile: usize) -> &[usize] {
        &self.members[tile]
    }
}
