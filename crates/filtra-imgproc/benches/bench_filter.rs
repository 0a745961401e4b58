use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use filtra_array::{Array2, ArraySize};
use filtra_imgproc::filter::kernels::gaussian_kernel_2d;
use filtra_imgproc::filter::{Convolution, ConvolutionParameters};
use filtra_imgproc::padding::BorderType;
use filtra_imgproc::parallel::ExecutionStrategy;

fn bench_gaussian(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian_5x5");

    for size in [256usize, 512] {
        let src = Array2::<f32>::from_size_val(
            ArraySize {
                rows: size,
                cols: size,
            },
            0.5,
        );

        for (name, strategy) in [
            ("serial", ExecutionStrategy::Serial),
            ("parallel", ExecutionStrategy::Parallel),
        ] {
            let conv = Convolution::new(ConvolutionParameters {
                kernel: Some(gaussian_kernel_2d::<f32>(5, 1.2).into()),
                border: BorderType::Mirror,
                strategy,
            });
            group.bench_with_input(
                BenchmarkId::new(name, size),
                &src,
                |b, src| {
                    let mut dst = Array2::default();
                    b.iter(|| conv.apply(src, &mut dst).unwrap())
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_gaussian);
criterion_main!(benches);
