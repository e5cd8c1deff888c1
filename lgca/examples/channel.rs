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

//! Forced channel flow between two no-slip walls, printing the mean flow
//! velocity as it builds up

use lgca::{CellType, ForceAxis, Lattice, LatticeParameters, Model};

fn main() {
    env_logger::init();

    let mut params = LatticeParameters::new(Model::FhpI, 256, 64);
    params.coarse_radius(2).seed(1).num_threads(4);
    let dim_y = params.dim_y;
    let mut lattice = Lattice::new(params, move |_, y| {
        if y == 0 || y == dim_y - 1 {
            CellType::SolidNoSlip
        } else {
            CellType::Fluid
        }
    })
    .expect("valid channel configuration");
    lattice.seed_random(0.2);

    for step in 1..=2000 {
        lattice.step();
        lattice.apply_body_force(ForceAxis::X, 60);
        if step % 200 == 0 {
            lattice.post_process();
            let velocity = lattice.mean_velocity();
            println!(
                "step {:5}: mean velocity = ({:+.5}, {:+.5})",
                step, velocity[0], velocity[1]
            );
        }
    }
}
