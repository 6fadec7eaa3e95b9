//! `sprintf` benchmarks over the formats SQLite's own printf falls back to.

use std::ffi::{c_char, c_int};

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use wasmlibc_abi::stdio_abi::wasmlibc_sprintf;
use wasmlibc_core::stdio::{FormatArg, format_bytes, parse_format_string};

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_format_string", |b| {
        b.iter(|| black_box(parse_format_string(black_box(b"%s:%d: %.*s (%08.3f) %p"))));
    });
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.bench_function("ints_and_strings", |b| {
        let args = [
            FormatArg::Str(Some(b"main.db")),
            FormatArg::Int(4096),
            FormatArg::Int(-17),
        ];
        b.iter(|| black_box(format_bytes(b"%s page %d rc=%d", black_box(&args))));
    });
    group.bench_function("doubles", |b| {
        let args = [FormatArg::Float(1234.567_89), FormatArg::Float(1.0e-7)];
        b.iter(|| black_box(format_bytes(b"%.15g %e", black_box(&args))));
    });
    group.finish();
}

fn bench_sprintf(c: &mut Criterion) {
    c.bench_function("wasmlibc_sprintf", |b| {
        let mut buf = [0u8; 128];
        let name = c"main.db";
        b.iter(|| {
            // SAFETY: `buf` holds the longest possible output; arguments match
            // the directives.
            black_box(unsafe {
                wasmlibc_sprintf(
                    buf.as_mut_ptr() as *mut c_char,
                    c"%s page %d %.15g".as_ptr(),
                    name.as_ptr(),
                    black_box(4096 as c_int),
                    black_box(0.1f64),
                )
            })
        });
    });
}

criterion_group!(benches, bench_parse, bench_render, bench_sprintf);
criterion_main!(benches);
