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

//! Precomputed signed neighbor offsets with per-edge periodic corrections
//!
//! The stepping kernel never branches on geometry: for each direction it adds
//! the base offset of the cell's row parity plus one correction per grid edge
//! the cell lies on, each scaled by the 0/1 edge membership.

use crate::model::{Model, MAX_DIR};

pub(crate) const EDGE_N: usize = 0;
pub(crate) const EDGE_S: usize = 1;
pub(crate) const EDGE_E: usize = 2;
pub(crate) const EDGE_W: usize = 3;

/// Per-direction linear index offsets from a cell to its neighbors.
///
/// Offsets are split by row parity: on the triangular FHP lattice the odd
/// rows are shifted half a cell east, so the diagonal neighbors of odd rows
/// live one column further east than those of even rows.
pub(crate) struct NeighborTable {
    /// `off[parity][d]`: offset to the neighbor in direction `d` for a cell
    /// away from any grid edge
    pub(crate) off: [[isize; MAX_DIR]; 2],
    /// `corr[edge][parity][d]`: added on top of `off` when the cell lies on
    /// the given grid edge; wraps the linear index periodically
    pub(crate) corr: [[[isize; MAX_DIR]; 2]; 4],
}

impl NeighborTable {
    pub(crate) fn new(model: Model, dim_x: usize, dim_y: usize) -> Self {
        let n = (dim_x * dim_y) as isize;
        let w = dim_x as isize;
        // (dx on even rows, dx on odd rows, dy) per direction
        let steps: [[isize; 3]; MAX_DIR] = match model {
            Model::Hpp => [
                [1, 1, 0],
                [0, 0, 1],
                [-1, -1, 0],
                [0, 0, -1],
                [0, 0, 0],
                [0, 0, 0],
                [0, 0, 0],
                [0, 0, 0],
            ],
            _ => [
                [1, 1, 0],
                [0, 1, 1],
                [-1, 0, 1],
                [-1, -1, 0],
                [-1, 0, -1],
                [0, 1, -1],
                [0, 0, 0],
                [0, 0, 0],
            ],
        };
        let mut off = [[0isize; MAX_DIR]; 2];
        let mut corr = [[[0isize; MAX_DIR]; 2]; 4];
        for d in 0..MAX_DIR {
            let [dx_even, dx_odd, dy] = steps[d];
            for (p, &dx) in [dx_even, dx_odd].iter().enumerate() {
                off[p][d] = dx + dy * w;
                if dy > 0 {
                    corr[EDGE_N][p][d] = -n;
                }
                if dy < 0 {
                    corr[EDGE_S][p][d] = n;
                }
                if dx > 0 {
                    corr[EDGE_E][p][d] = -w;
                }
                if dx < 0 {
                    corr[EDGE_W][p][d] = w;
                }
            }
        }
        NeighborTable { off, corr }
    }

    /// Resolve the neighbor of the cell at `(x, y)` in direction `d`,
    /// applying all edge corrections the way the kernel does.
    #[cfg(test)]
    pub(crate) fn resolve(&self, d: usize, x: usize, y: usize, dim_x: usize, dim_y: usize) -> usize {
        let parity = y & 1;
        let c = (x + y * dim_x) as isize;
        let mut target = c + self.off[parity][d];
        if y == dim_y - 1 {
            target += self.corr[EDGE_N][parity][d];
        }
        if y == 0 {
            target += self.corr[EDGE_S][parity][d];
        }
        if x == dim_x - 1 {
            target += self.corr[EDGE_E][parity][d];
        }
        if x == 0 {
            target += self.corr[EDGE_W][parity][d];
        }
        target as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Wrapped neighbor positions computed directly in (x, y) coordinates
    fn reference(model: Model, d: usize, x: usize, y: usize, dim_x: usize, dim_y: usize) -> usize {
        let (dx, dy): (isize, isize) = match model {
            Model::Hpp => [(1, 0), (0, 1), (-1, 0), (0, -1)][d],
            _ => {
                let odd = y % 2;
                match d {
                    0 => (1, 0),
                    1 => (odd as isize, 1),
                    2 => (odd as isize - 1, 1),
                    3 => (-1, 0),
                    4 => (odd as isize - 1, -1),
                    5 => (odd as isize, -1),
                    _ => (0, 0),
                }
            }
        };
        let tx = (x as isize + dx).rem_euclid(dim_x as isize) as usize;
        let ty = (y as isize + dy).rem_euclid(dim_y as isize) as usize;
        tx + ty * dim_x
    }

    #[test]
    fn offsets_and_corrections_wrap_like_the_torus() {
        for &(model, num_dir) in &[(Model::Hpp, 4), (Model::FhpI, 6)] {
            for &(dim_x, dim_y) in &[(4usize, 4usize), (5, 6), (3, 8)] {
                let table = NeighborTable::new(model, dim_x, dim_y);
                for y in 0..dim_y {
                    for x in 0..dim_x {
                        for d in 0..num_dir {
                            assert_eq!(
                                table.resolve(d, x, y, dim_x, dim_y),
                                reference(model, d, x, y, dim_x, dim_y),
                                "{:?} d={} at ({},{}) on {}x{}",
                                model,
                                d,
                                x,
                                y,
                                dim_x,
                                dim_y
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn rest_slots_stay_in_place() {
        let table = NeighborTable::new(Model::FhpIII, 6, 4);
        for y in 0..4 {
            for x in 0..6 {
                for d in 6..8 {
                    assert_eq!(table.resolve(d, x, y, 6, 4), x + y * 6);
                }
            }
        }
    }
}
