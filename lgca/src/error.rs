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

//! Configuration errors reported at lattice construction

use thiserror::Error;

/// Error returned when a lattice is constructed from invalid parameters.
///
/// These are fatal by policy: the engine performs no recovery, the driver
/// decides whether to terminate.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("lattice dimensions must be positive (got {dim_x}x{dim_y})")]
    ZeroDimension { dim_x: usize, dim_y: usize },
    /// The half-cell shift of odd rows only closes periodically over an even
    /// number of rows.
    #[error("FHP lattices require an even number of rows (got {dim_y})")]
    OddFhpHeight { dim_y: usize },
}
