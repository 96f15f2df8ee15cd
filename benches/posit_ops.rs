use criterion::{Criterion, criterion_group, criterion_main};
use std::{hint::black_box, sync::Arc};

use posit_env::{Posit, PositEnvironment};

macro_rules! create_benchmark_for_format {
    ($c:expr, $name:expr, $size:expr, $es:expr) => {
        let env = Arc::new(PositEnvironment::new($size, $es).unwrap());
        let a = Posit::from_real(&env, 3.25);
        let b = Posit::from_real(&env, -2.5);

        let mut group = $c.benchmark_group($name);
        group.bench_function("add", |bench| bench.iter(|| black_box(&a) + black_box(&b)));
        group.bench_function("mul", |bench| bench.iter(|| black_box(&a) * black_box(&b)));
        group.bench_function("div", |bench| bench.iter(|| black_box(&a) / black_box(&b)));
        group.bench_function("from_real", |bench| {
            bench.iter(|| Posit::from_real(&env, black_box(4323.143)))
        });
        group.finish();
    };
}

fn benchmark_formats(c: &mut Criterion) {
    create_benchmark_for_format!(c, "posit8_2", 8, 2);
    create_benchmark_for_format!(c, "posit16_1", 16, 1);
    create_benchmark_for_format!(c, "posit32_2", 32, 2);
    create_benchmark_for_format!(c, "posit128_4", 128, 4);
}

criterion_group!(benches, benchmark_formats);
criterion_main!(benches);
