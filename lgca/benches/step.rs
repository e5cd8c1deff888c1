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

use criterion::{criterion_group, criterion_main, Criterion};

use lgca::{CellType, Lattice, LatticeParameters, Model};

fn my_benchmark(c: &mut Criterion) {
    const NUM_THREADS: usize = 4;
    let mut params = LatticeParameters::new(Model::FhpIII, 512, 512);
    params.seed(7).num_threads(NUM_THREADS);
    let mut lattice = Lattice::new(params, |_, _| CellType::Fluid).unwrap();
    lattice.seed_random(0.3);

    c.bench_function("step_fhp3_512", |b| {
        b.iter(|| {
            lattice.step();
        })
    });

    c.bench_function("post_process_fhp3_512", |b| {
        b.iter(|| {
            lattice.post_process();
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = my_benchmark
}
criterion_main!(benches);
