//! Math benchmarks: the core functions against the host's, plus the errno
//! classification the exported symbols add on top.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use wasmlibc_abi::math_abi::wasmlibc_atanh;
use wasmlibc_core::math;

const INPUTS: [f64; 6] = [-0.99, -0.5, 0.0, 0.25, 0.75, 0.999];

fn bench_hyperbolic(c: &mut Criterion) {
    let mut group = c.benchmark_group("hyperbolic");

    let cases: [(&str, fn(f64) -> f64, f64); 3] = [
        ("acosh", math::acosh, 1.0),
        ("asinh", math::asinh, 0.0),
        ("atanh", math::atanh, 0.0),
    ];
    for (name, f, shift) in cases {
        group.bench_with_input(BenchmarkId::new("core", name), &shift, |b, &shift| {
            b.iter(|| {
                for x in INPUTS {
                    black_box(f(black_box(x.abs() + shift)));
                }
            });
        });
    }
    group.bench_function(BenchmarkId::new("host", "atanh"), |b| {
        b.iter(|| {
            for x in INPUTS {
                black_box(black_box(x).atanh());
            }
        });
    });
    group.bench_function(BenchmarkId::new("wasmlibc", "atanh"), |b| {
        b.iter(|| {
            for x in INPUTS {
                // SAFETY: plain value call; errno is thread-local.
                black_box(unsafe { wasmlibc_atanh(black_box(x)) });
            }
        });
    });
    group.finish();
}

fn bench_trunc_sqrt(c: &mut Criterion) {
    c.bench_function("trunc", |b| {
        b.iter(|| {
            for x in INPUTS {
                black_box(math::trunc(black_box(x * 1.0e6)));
            }
        });
    });
    c.bench_function("sqrt_checked", |b| {
        b.iter(|| {
            for x in INPUTS {
                black_box(math::check(math::MathFn::Sqrt, black_box(x)));
                black_box(math::sqrt(black_box(x)));
            }
        });
    });
}

criterion_group!(benches, bench_hyperbolic, bench_trunc_sqrt);
criterion_main!(benches);
