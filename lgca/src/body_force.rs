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

//! Stochastic body force: reverses selected particle pairs to inject net
//! momentum along one axis

use rand::Rng;

use crate::lattice::{CellType, Lattice};

/// Axis along which [`Lattice::apply_body_force`] pushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceAxis {
    X,
    Y,
}

/// Move the particle in slot `occupied` to the empty slot `empty`,
/// reporting whether the flip was possible.
fn try_swap(pattern: &mut u8, empty: usize, occupied: usize) -> bool {
    if *pattern & 1 << empty == 0 && *pattern & 1 << occupied != 0 {
        *pattern ^= 1 << empty | 1 << occupied;
        true
    } else {
        false
    }
}

impl Lattice {
    /// Try to reverse up to `forcing` direction pairs on randomly sampled
    /// fluid cells so that the lattice gains momentum along `axis`.
    ///
    /// Sampling stops after `2N` draws even if fewer flips succeeded; a
    /// saturated field is not an error, it simply cannot absorb more
    /// momentum. Returns the number of flips applied.
    ///
    /// This operator is intentionally sequential: it writes single cells
    /// through the shared PRNG and must not overlap with the step kernel.
    pub fn apply_body_force(&mut self, axis: ForceAxis, forcing: usize) -> usize {
        let n = self.num_cells();
        let is_fhp = self.params.model.is_fhp();
        let mut applied = 0;
        let mut sampled = 0;
        while applied < forcing && sampled < 2 * n {
            sampled += 1;
            let c = self.rng.gen_range(0..n);
            if self.cell_type[c] != CellType::Fluid {
                continue;
            }
            let pattern = self.cell_pattern(c);
            let mut out = pattern;
            match (is_fhp, axis) {
                (false, ForceAxis::X) => {
                    // turn a west mover east
                    applied += try_swap(&mut out, 0, 2) as usize;
                }
                (false, ForceAxis::Y) => {
                    applied += try_swap(&mut out, 3, 1) as usize;
                }
                (true, ForceAxis::X) => {
                    applied += try_swap(&mut out, 0, 3) as usize;
                }
                (true, ForceAxis::Y) => {
                    // both diagonal pairs carry y momentum; flip each
                    // independently
                    applied += try_swap(&mut out, 5, 1) as usize;
                    applied += try_swap(&mut out, 4, 2) as usize;
                }
            }
            if out != pattern {
                self.set_cell_pattern(c, out);
            }
        }
        if applied < forcing {
            log::debug!(
                "body force saturated: {} of {} flips after {} samples",
                applied,
                forcing,
                sampled
            );
        }
        applied
    }
}
