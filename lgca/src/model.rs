// lgca - A lattice gas cellular automaton engine
// Copyright (C) 2026 The lgca developers

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Per-model constants: direction counts, lattice basis vectors, direction
//! permutation maps and the collision/reflection lookup tables

use std::collections::BTreeMap;

/// Maximum number of node slots over all models; also the per-cell bit
/// stride of the packed node arrays.
pub(crate) const MAX_DIR: usize = 8;
/// Bits reserved per cell in the packed node arrays.
pub(crate) const STRIDE: usize = 8;

/// Particle-velocity model of the automaton.
///
/// Directions are numbered counterclockwise starting from east: HPP uses
/// {E, N, W, S} as 0..4 on a square lattice; the FHP models use six vectors
/// at 60 degree spacing as 0..6 on a triangular lattice (stored on a
/// rectangular grid with odd rows shifted half a cell east). FHP-II adds a
/// rest slot at index 6, FHP-III a second rest slot at index 7 together with
/// a saturated collision table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Model {
    /// 4 directions on a square lattice
    Hpp,
    /// 6 directions on a triangular lattice
    FhpI,
    /// FHP-I plus a rest slot
    FhpII,
    /// FHP-II plus a second rest slot and a saturated collision table
    FhpIII,
}

impl Model {
    /// Number of node slots per cell.
    pub fn num_dir(self) -> usize {
        match self {
            Model::Hpp => 4,
            Model::FhpI => 6,
            Model::FhpII => 7,
            Model::FhpIII => 8,
        }
    }

    /// Whether this model lives on the triangular FHP lattice.
    pub fn is_fhp(self) -> bool {
        !matches!(self, Model::Hpp)
    }
}

/// Runtime-resolved record of per-model constants.
///
/// Built once at lattice construction; the stepping kernel reads from it
/// without branching on the model.
pub(crate) struct ModelTables {
    pub(crate) num_dir: usize,
    /// Unit lattice vectors per direction (zero for rest slots)
    pub(crate) basis_x: [f64; MAX_DIR],
    pub(crate) basis_y: [f64; MAX_DIR],
    /// Integer momentum basis used for exact conservation arithmetic. FHP
    /// x components are doubled so that the 60 degree vectors stay integral.
    pub(crate) ibasis_x: [i32; MAX_DIR],
    pub(crate) ibasis_y: [i32; MAX_DIR],
    /// Direction opposite to `d` (rest slots map to themselves)
    pub(crate) inv_dir: [usize; MAX_DIR],
    /// Direction obtained by mirroring `d` across the x axis
    pub(crate) mir_x: [usize; MAX_DIR],
    /// Direction obtained by mirroring `d` across the y axis
    pub(crate) mir_y: [usize; MAX_DIR],
    /// Collision tables over all `2^num_dir` patterns, one per value of the
    /// per-cell tiebreak bit
    pub(crate) collision: [Vec<u8>; 2],
    /// Full reversal at a no-slip wall (permutes bits by `inv_dir`)
    pub(crate) bounce_back: Vec<u8>,
    /// Specular reflection at a wall normal to y (permutes bits by `mir_x`)
    pub(crate) bounce_fwd_x: Vec<u8>,
    /// Specular reflection at a wall normal to x (permutes bits by `mir_y`)
    pub(crate) bounce_fwd_y: Vec<u8>,
}

impl ModelTables {
    pub(crate) fn new(model: Model) -> Self {
        let num_dir = model.num_dir();
        let (basis_x, basis_y, ibasis_x, ibasis_y, inv_dir, mir_x, mir_y) = match model {
            Model::Hpp => hpp_geometry(),
            _ => fhp_geometry(),
        };
        let collision = build_collision(model, num_dir, &ibasis_x, &ibasis_y);
        ModelTables {
            num_dir,
            basis_x,
            basis_y,
            ibasis_x,
            ibasis_y,
            inv_dir,
            mir_x,
            mir_y,
            collision,
            bounce_back: permutation_lut(num_dir, &inv_dir),
            bounce_fwd_x: permutation_lut(num_dir, &mir_x),
            bounce_fwd_y: permutation_lut(num_dir, &mir_y),
        }
    }
}

type Geometry = (
    [f64; MAX_DIR],
    [f64; MAX_DIR],
    [i32; MAX_DIR],
    [i32; MAX_DIR],
    [usize; MAX_DIR],
    [usize; MAX_DIR],
    [usize; MAX_DIR],
);

fn hpp_geometry() -> Geometry {
    (
        [1., 0., -1., 0., 0., 0., 0., 0.],
        [0., 1., 0., -1., 0., 0., 0., 0.],
        [1, 0, -1, 0, 0, 0, 0, 0],
        [0, 1, 0, -1, 0, 0, 0, 0],
        [2, 3, 0, 1, 4, 5, 6, 7],
        [0, 3, 2, 1, 4, 5, 6, 7],
        [2, 1, 0, 3, 4, 5, 6, 7],
    )
}

fn fhp_geometry() -> Geometry {
    // sin(60 degrees); the x components are exactly representable
    let s = 3f64.sqrt() / 2.;
    (
        [1., 0.5, -0.5, -1., -0.5, 0.5, 0., 0.],
        [0., s, s, 0., -s, -s, 0., 0.],
        [2, 1, -1, -2, -1, 1, 0, 0],
        [0, 1, 1, 0, -1, -1, 0, 0],
        [3, 4, 5, 0, 1, 2, 6, 7],
        [0, 5, 4, 3, 2, 1, 6, 7],
        [3, 2, 1, 0, 5, 4, 6, 7],
    )
}

/// Build the LUT equivalent to permuting the pattern bits by `map`.
fn permutation_lut(num_dir: usize, map: &[usize; MAX_DIR]) -> Vec<u8> {
    (0..1usize << num_dir)
        .map(|p| {
            let mut q = 0u8;
            for d in 0..num_dir {
                if p >> d & 1 != 0 {
                    q |= 1 << map[d];
                }
            }
            q
        })
        .collect()
}

/// Build the pair of collision tables of a model.
///
/// Both tables are permutations of the pattern space and preserve particle
/// count and momentum exactly; patterns without a valid transition map to
/// themselves.
fn build_collision(
    model: Model,
    num_dir: usize,
    ibasis_x: &[i32; MAX_DIR],
    ibasis_y: &[i32; MAX_DIR],
) -> [Vec<u8>; 2] {
    let size = 1usize << num_dir;
    let mut lut0: Vec<u8> = (0..size).map(|p| p as u8).collect();
    let mut lut1 = lut0.clone();
    match model {
        Model::Hpp => {
            // The single HPP rule: a head-on pair rotates by 90 degrees.
            // Both outcomes of a further rotation coincide, so the tiebreak
            // bit is ignored.
            lut0[0b0101] = 0b1010;
            lut0[0b1010] = 0b0101;
            lut1[0b0101] = 0b1010;
            lut1[0b1010] = 0b0101;
        }
        Model::FhpI | Model::FhpII => {
            // Head-on pairs rotate by 60 degrees; the three zero-momentum
            // pair patterns form a cycle and the tiebreak bit picks the
            // sense of rotation.
            let pair = |d: usize| (1usize << d) | 1 << (d + 3) % 6;
            for d in 0..3 {
                let p = pair(d);
                let q = pair((d + 1) % 3);
                lut0[p] = q as u8;
                lut1[q] = p as u8;
            }
            // Symmetric three-particle patterns invert
            lut0[0b010101] = 0b101010;
            lut0[0b101010] = 0b010101;
            lut1[0b010101] = 0b101010;
            lut1[0b101010] = 0b010101;
            if model == Model::FhpII {
                // A mover plus the rest particle exchanges with the pair of
                // its two neighboring directions (whose vectors sum to the
                // mover's)
                let rest = 1usize << 6;
                for d in 0..6 {
                    let a = (1usize << d) | rest;
                    let b = (1usize << (d + 1) % 6) | 1 << (d + 5) % 6;
                    lut0[a] = b as u8;
                    lut0[b] = a as u8;
                    lut1[a] = b as u8;
                    lut1[b] = a as u8;
                }
            }
        }
        Model::FhpIII => {
            // Saturated table: group all patterns into classes of equal
            // particle count and exact momentum; every class cycles through
            // its members, the tiebreak bit picks the sense. This subsumes
            // the FHP-I/II rules and adds the spectator and four-particle
            // collisions as well as rest-pair exchange.
            let mut classes: BTreeMap<(u32, i32, i32), Vec<usize>> = BTreeMap::new();
            for p in 0..size {
                let mut px = 0;
                let mut py = 0;
                for d in 0..num_dir {
                    if p >> d & 1 != 0 {
                        px += ibasis_x[d];
                        py += ibasis_y[d];
                    }
                }
                classes
                    .entry((p.count_ones(), px, py))
                    .or_insert_with(Vec::new)
                    .push(p);
            }
            for members in classes.values() {
                let k = members.len();
                if k < 2 {
                    continue;
                }
                for i in 0..k {
                    lut0[members[i]] = members[(i + 1) % k] as u8;
                    lut1[members[i]] = members[(i + k - 1) % k] as u8;
                }
            }
        }
    }
    [lut0, lut1]
}
