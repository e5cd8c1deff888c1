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

//! Derived fields: per-cell density and momentum, coarse-grained window
//! averages and the global mean velocity

use itertools::izip;

use crate::helpers::ceil_div;
use crate::lattice::{CellType, Lattice};

/// Cells below this density are left out of the mean velocity reduction.
const DENSITY_EPS: f64 = 1e-6;

impl Lattice {
    /// Derive the per-cell density and momentum fields from the committed
    /// node state, then coarse grain them over `(2r+1)^2` windows.
    ///
    /// Never mutates node state; running it twice without stepping yields
    /// identical fields.
    pub fn post_process(&mut self) {
        self.derive_cell_fields();
        self.coarse_grain();
    }

    fn derive_cell_fields(&mut self) {
        let Lattice {
            params,
            tables,
            nodes,
            cur,
            density,
            momentum_x,
            momentum_y,
            thread_pool,
            ..
        } = self;
        let n = params.dim_x * params.dim_y;
        let num_dir = tables.num_dir;
        let basis_x = &tables.basis_x;
        let basis_y = &tables.basis_y;
        let nodes = &nodes[*cur];

        let process = |c0: usize, density: &mut [f64], mx: &mut [f64], my: &mut [f64]| {
            for (k, (rho, mx, my)) in
                izip!(density.iter_mut(), mx.iter_mut(), my.iter_mut()).enumerate()
            {
                let pattern = nodes.byte(c0 + k);
                *rho = pattern.count_ones() as f64;
                let mut px = 0.;
                let mut py = 0.;
                for d in 0..num_dir {
                    if pattern >> d & 1 != 0 {
                        px += basis_x[d];
                        py += basis_y[d];
                    }
                }
                *mx = px;
                *my = py;
            }
        };

        let num_threads = thread_pool.thread_count() as usize;
        if num_threads < 2 {
            process(0, density, momentum_x, momentum_y);
        } else {
            let chunk_size = ceil_div(n, num_threads);
            thread_pool.scoped(|s| {
                let rho_chunks = density.chunks_mut(chunk_size);
                let mx_chunks = momentum_x.chunks_mut(chunk_size);
                let my_chunks = momentum_y.chunks_mut(chunk_size);
                for (i, rho, mx, my) in izip!(0..num_threads, rho_chunks, mx_chunks, my_chunks) {
                    let process = &process;
                    s.execute(move || process(i * chunk_size, rho, mx, my));
                }
            });
        }
    }

    fn coarse_grain(&mut self) {
        let Lattice {
            params,
            density,
            momentum_x,
            momentum_y,
            mean_density,
            mean_momentum_x,
            mean_momentum_y,
            coarse_x,
            thread_pool,
            ..
        } = self;
        let dim_x = params.dim_x;
        let n = dim_x * params.dim_y;
        let window = 2 * params.coarse_radius + 1;
        let coarse_x = *coarse_x;
        let n_coarse = mean_density.len();
        let density = density.as_slice();
        let momentum_x = momentum_x.as_slice();
        let momentum_y = momentum_y.as_slice();

        // Average the window anchored at the bottom-left fine cell of each
        // coarse cell. Window cells that would wrap past the east edge or
        // fall off the grid are skipped; the divisor counts only the cells
        // that contributed.
        let process = |cc0: usize, mean_rho: &mut [f64], mean_mx: &mut [f64], mean_my: &mut [f64]| {
            for (k, (mean_rho, mean_mx, mean_my)) in
                izip!(mean_rho.iter_mut(), mean_mx.iter_mut(), mean_my.iter_mut()).enumerate()
            {
                let cc = cc0 + k;
                let x0 = cc % coarse_x * window;
                let y0 = cc / coarse_x * window;
                let c0 = x0 + y0 * dim_x;
                let mut count = 0usize;
                let mut rho = 0.;
                let mut mx = 0.;
                let mut my = 0.;
                for wy in 0..window {
                    for wx in 0..window {
                        let c = c0 + wy * dim_x + wx;
                        if x0 + wx >= dim_x || c >= n {
                            continue;
                        }
                        count += 1;
                        rho += density[c];
                        mx += momentum_x[c];
                        my += momentum_y[c];
                    }
                }
                *mean_rho = rho / count as f64;
                *mean_mx = mx / count as f64;
                *mean_my = my / count as f64;
            }
        };

        let num_threads = thread_pool.thread_count() as usize;
        if num_threads < 2 {
            process(0, mean_density, mean_momentum_x, mean_momentum_y);
        } else {
            let chunk_size = ceil_div(n_coarse, num_threads);
            thread_pool.scoped(|s| {
                let rho_chunks = mean_density.chunks_mut(chunk_size);
                let mx_chunks = mean_momentum_x.chunks_mut(chunk_size);
                let my_chunks = mean_momentum_y.chunks_mut(chunk_size);
                for (i, rho, mx, my) in izip!(0..num_threads, rho_chunks, mx_chunks, my_chunks) {
                    let process = &process;
                    s.execute(move || process(i * chunk_size, rho, mx, my));
                }
            });
        }
    }

    /// Velocity `momentum / density` averaged over all fluid cells with
    /// nonvanishing density. Valid after [`post_process`](Lattice::post_process).
    pub fn mean_velocity(&self) -> [f64; 2] {
        let mut vx = 0.;
        let mut vy = 0.;
        let mut count = 0usize;
        for (cell_type, rho, mx, my) in izip!(
            self.cell_type.iter(),
            self.density.iter(),
            self.momentum_x.iter(),
            self.momentum_y.iter()
        ) {
            if *cell_type != CellType::Fluid {
                continue;
            }
            debug_assert!(*rho >= 0., "negative cell density {}", rho);
            if *rho > DENSITY_EPS {
                vx += mx / rho;
                vy += my / rho;
                count += 1;
            }
        }
        if count == 0 {
            [0., 0.]
        } else {
            [vx / count as f64, vy / count as f64]
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use crate::lattice::{CellType, Lattice, LatticeParameters};
    use crate::model::Model;

    fn random_lattice(model: Model, dim_x: usize, dim_y: usize, r: usize) -> Lattice {
        let mut params = LatticeParameters::new(model, dim_x, dim_y);
        params.coarse_radius(r).seed(21).num_threads(2);
        let mut lattice = Lattice::new(params, |_, _| CellType::Fluid).unwrap();
        lattice.seed_random(0.35);
        lattice
    }

    #[test]
    fn density_counts_occupied_slots() {
        let mut lattice = Lattice::new(LatticeParameters::new(Model::FhpI, 4, 4), |_, _| {
            CellType::Fluid
        })
        .unwrap();
        lattice.set_node(1, 2, 0, true);
        lattice.set_node(1, 2, 3, true);
        lattice.set_node(1, 2, 1, true);
        lattice.post_process();
        let c = lattice.cell_index(1, 2);
        assert_approx_eq!(f64, lattice.density()[c], 3.);
        // opposite movers cancel, the diagonal remains
        assert_approx_eq!(f64, lattice.momentum_x()[c], 0.5);
        assert_approx_eq!(f64, lattice.momentum_y()[c], 3f64.sqrt() / 2.);
    }

    #[test]
    fn post_process_is_idempotent() {
        let mut lattice = random_lattice(Model::FhpIII, 24, 18, 1);
        lattice.step();
        lattice.post_process();
        let density = lattice.density().to_vec();
        let momentum_x = lattice.momentum_x().to_vec();
        let mean_density = lattice.mean_density().to_vec();
        let mean_momentum_y = lattice.mean_momentum_y().to_vec();
        lattice.post_process();
        assert_eq!(lattice.density(), density.as_slice());
        assert_eq!(lattice.momentum_x(), momentum_x.as_slice());
        assert_eq!(lattice.mean_density(), mean_density.as_slice());
        assert_eq!(lattice.mean_momentum_y(), mean_momentum_y.as_slice());
    }

    #[test]
    fn zero_radius_coarse_fields_match_fine_fields() {
        let mut lattice = random_lattice(Model::FhpI, 12, 10, 0);
        lattice.post_process();
        assert_eq!(lattice.coarse_dim_x(), 12);
        assert_eq!(lattice.coarse_dim_y(), 10);
        assert_eq!(lattice.mean_density(), lattice.density());
        assert_eq!(lattice.mean_momentum_x(), lattice.momentum_x());
        assert_eq!(lattice.mean_momentum_y(), lattice.momentum_y());
    }

    #[test]
    fn coarse_grained_mass_matches_fine_mass() {
        // 10x8 with radius 2: the last window column and row are truncated
        let mut lattice = random_lattice(Model::FhpII, 10, 8, 2);
        lattice.post_process();
        let window = 5;
        let mut recovered = 0.;
        for cy in 0..lattice.coarse_dim_y() {
            for cx in 0..lattice.coarse_dim_x() {
                let cols = (10 - cx * window).min(window);
                let rows = (8 - cy * window).min(window);
                let cc = cx + cy * lattice.coarse_dim_x();
                recovered += lattice.mean_density()[cc] * (cols * rows) as f64;
            }
        }
        assert_approx_eq!(f64, recovered, lattice.total_mass() as f64, epsilon = 1e-9);
    }

    #[test]
    fn mean_velocity_ignores_solid_and_empty_cells() {
        let mut lattice = Lattice::new(LatticeParameters::new(Model::Hpp, 4, 4), |x, _| {
            if x == 0 {
                CellType::SolidNoSlip
            } else {
                CellType::Fluid
            }
        })
        .unwrap();
        // a lone east mover in an otherwise empty fluid region
        lattice.set_node(2, 1, 0, true);
        lattice.post_process();
        let velocity = lattice.mean_velocity();
        // one contributing cell with velocity (1, 0)
        assert_approx_eq!(f64, velocity[0], 1.);
        assert_approx_eq!(f64, velocity[1], 0.);
    }
}
