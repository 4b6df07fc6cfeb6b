use criterion::{criterion_group, criterion_main, Criterion};
use ember_core::{Poolable, RcBufferPair, RenderCommand};
use std::hint::black_box;

#[derive(Default)]
struct Accumulate(u64);
impl Poolable for Accumulate {}
impl RenderCommand<u64> for Accumulate {
    fn execute(&mut self, total: &mut u64) {
        *total = total.wrapping_add(self.0);
    }
}

fn bench_command_buffers(c: &mut Criterion) {
    let mut group = c.benchmark_group("Render Command Buffers");

    group.bench_function("Record + swap + execute (10k pooled commands)", |b| {
        let mut pair = RcBufferPair::<u64>::new();
        let mut total = 0u64;
        b.iter(|| {
            for i in 0..10_000 {
                let (_, cmd) = pair.back_mut().push::<Accumulate>();
                cmd.0 = i;
            }
            pair.swap();
            pair.execute_front(&mut total);
            black_box(total);
        });
    });

    group.bench_function("Record + swap + execute (10k boxed commands)", |b| {
        let mut pair = RcBufferPair::<u64>::new();
        let mut total = 0u64;
        b.iter(|| {
            for i in 0..10_000u64 {
                pair.back_mut()
                    .push_boxed(Box::new(move |total: &mut u64| *total = total.wrapping_add(i)));
            }
            pair.swap();
            pair.execute_front(&mut total);
            black_box(total);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_command_buffers);
criterion_main!(benches);
