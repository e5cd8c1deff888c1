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

//! The propagate-and-collide step operator

use rand::Rng;

use crate::helpers::ceil_div;
use crate::lattice::{CellType, Lattice};
use crate::model::STRIDE;
use crate::neighbors::{EDGE_E, EDGE_N, EDGE_S, EDGE_W};

/// Cells covered by one backing word of the node buffers; workers are
/// assigned whole words so their output ranges stay disjoint.
const CELLS_PER_WORD: usize = 64 / STRIDE;

impl Lattice {
    /// Advance the automaton by one step.
    ///
    /// Refreshes the random pool, streams every particle to its neighbor
    /// cell, applies the per-cell-type collision rule (collision table for
    /// fluid, bounce-back for no-slip walls, specular reflection for slip
    /// walls on grid edges) and commits the result by swapping the node
    /// buffers. Within the parallel region every worker reads only the
    /// committed buffer and writes only its own words of the scratch buffer.
    pub fn step(&mut self) {
        self.refresh_random_pool();

        let dim_x = self.params.dim_x;
        let dim_y = self.params.dim_y;
        let n = dim_x * dim_y;
        let num_dir = self.tables.num_dir;
        let tables = &self.tables;
        let neighbors = &self.neighbors;
        let cell_type = self.cell_type.as_slice();
        let rand_pool = &self.rand_pool;
        let (first, second) = self.nodes.split_at_mut(1);
        let (src, dst) = if self.cur == 0 {
            (&first[0], &mut second[0])
        } else {
            (&second[0], &mut first[0])
        };

        // Gather the pattern arriving at cell c and apply its collision rule.
        // The particle arriving along d comes from the neighbor in direction
        // inv_dir[d], where it is stored under d as well.
        let step_cell = |c: usize| -> u8 {
            let x = c % dim_x;
            let y = c / dim_x;
            let parity = y & 1;
            let on_n = (y == dim_y - 1) as isize;
            let on_s = (y == 0) as isize;
            let on_e = (x == dim_x - 1) as isize;
            let on_w = (x == 0) as isize;
            let off = &neighbors.off[parity];
            let corr_n = &neighbors.corr[EDGE_N][parity];
            let corr_s = &neighbors.corr[EDGE_S][parity];
            let corr_e = &neighbors.corr[EDGE_E][parity];
            let corr_w = &neighbors.corr[EDGE_W][parity];
            let mut pattern = 0usize;
            for d in 0..num_dir {
                let s = tables.inv_dir[d];
                let source = c as isize
                    + off[s]
                    + on_n * corr_n[s]
                    + on_s * corr_s[s]
                    + on_e * corr_e[s]
                    + on_w * corr_w[s];
                if src.get(source as usize * STRIDE + d) {
                    pattern |= 1 << d;
                }
            }
            match cell_type[c] {
                CellType::Fluid => {
                    let tiebreak = rand_pool.get(c) as usize;
                    tables.collision[tiebreak][pattern]
                }
                CellType::SolidNoSlip => tables.bounce_back[pattern],
                CellType::SolidSlip => {
                    let mut out = pattern as u8;
                    if on_n + on_s != 0 {
                        out = tables.bounce_fwd_x[out as usize];
                    }
                    if on_e + on_w != 0 {
                        out = tables.bounce_fwd_y[out as usize];
                    }
                    out
                }
            }
        };

        // Process a block of output words starting at word index word0
        let process_words = |word0: usize, out: &mut [u64]| {
            for (k, out_word) in out.iter_mut().enumerate() {
                let mut word = 0u64;
                let base = (word0 + k) * CELLS_PER_WORD;
                for j in 0..CELLS_PER_WORD {
                    let c = base + j;
                    if c >= n {
                        break;
                    }
                    word |= (step_cell(c) as u64) << (j * STRIDE);
                }
                *out_word = word;
            }
        };

        let thread_pool = &mut self.thread_pool;
        let num_threads = thread_pool.thread_count() as usize;
        let total_words = dst.words().len();
        if num_threads < 2 {
            process_words(0, dst.words_mut());
        } else {
            let chunk_words = ceil_div(total_words, num_threads);
            thread_pool.scoped(|s| {
                for (i, chunk) in dst.words_mut().chunks_mut(chunk_words).enumerate() {
                    let process_words = &process_words;
                    s.execute(move || process_words(i * chunk_words, chunk));
                }
            });
        }

        self.cur = 1 - self.cur;
    }

    /// One fresh tiebreak bit per cell, drawn word-wise from the owned PRNG
    fn refresh_random_pool(&mut self) {
        let Lattice { rand_pool, rng, .. } = self;
        for word in rand_pool.words_mut() {
            *word = rng.gen();
        }
    }
}
