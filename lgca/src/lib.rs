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

//! This crate simulates two-dimensional fluid flow with lattice gas cellular
//! automata: particles of identical mass hop between the nodes of a regular
//! lattice at unit speed and collide under rules that conserve particle count
//! and momentum. Coarse-grained averages of the resulting momentum field
//! approximate incompressible Navier-Stokes flow.
//!
//! Four particle-velocity models are supported: HPP on a square lattice and
//! FHP-I/II/III on a triangular lattice.
//!
//! Usage
//! -----
//! Basic usage follows the same pattern for all models:
//!
//! ```
//! use lgca::{CellType, ForceAxis, Lattice, LatticeParameters, Model};
//!
//! // Channel with no-slip walls at the top and bottom
//! let mut params = LatticeParameters::new(Model::FhpI, 64, 32);
//! params.seed(42).num_threads(2);
//! let mut lattice = Lattice::new(params, |_, y| {
//!     if y == 0 || y == 31 { CellType::SolidNoSlip } else { CellType::Fluid }
//! }).unwrap();
//! lattice.seed_random(0.3);
//! // Step, force and read back the averaged flow field
//! for _ in 0..10 {
//!     lattice.step();
//!     lattice.apply_body_force(ForceAxis::X, 20);
//! }
//! lattice.post_process();
//! let velocity = lattice.mean_velocity();
//! assert!(velocity[0].is_finite());
//! ```

mod bitset;
mod body_force;
mod error;
mod helpers;
mod lattice;
mod model;
mod neighbors;
mod post_process;
mod step;

pub use body_force::*;
pub use error::*;
pub use lattice::*;
pub use model::Model;
