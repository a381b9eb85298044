//! Benchmarks for codeclean sanitization performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the pipeline over synthetic model responses of
//! various sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use codeclean::{SanitizeOptions, ValidatorOptions};

/// Creates a synthetic model response with the given number of functions.
///
/// Each block mixes code, Chinese commentary and invisible characters the way
/// real model output does.
fn create_test_response(function_count: usize) -> String {
    let mut response = String::from("下面是实现代码：\n\n```python\n");

    for i in 0..function_count {
        response.push_str(&format!(
            "def handler_{i}(request):\n\
             \u{200B}    # 处理请求\n\
             \x20   data = request.get(\"payload\", \"默认值\")\n\
             \x20   return {{\"id\": {i}, \"data\": data}}\n\
             \n\
             这个函数负责处理第{i}个请求\n\
             \n",
        ));
    }

    response.push_str("```\n\n建议在生产环境中添加日志记录。\n以上代码可以直接运行。\n\n\n");
    response
}

/// Benchmark the full pipeline at various sizes.
fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");
    let options = SanitizeOptions::default();

    for function_count in [10, 100, 1000].iter() {
        let response = create_test_response(*function_count);

        group.throughput(Throughput::Bytes(response.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("functions", function_count),
            &response,
            |b, response| {
                b.iter(|| codeclean::cleanup::sanitize(black_box(response), &options));
            },
        );
    }

    group.finish();
}

/// Benchmark the minimal preset (no line classifier).
fn bench_sanitize_minimal(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize_minimal");
    let options = SanitizeOptions::minimal();

    for function_count in [10, 100, 1000].iter() {
        let response = create_test_response(*function_count);

        group.throughput(Throughput::Bytes(response.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("functions", function_count),
            &response,
            |b, response| {
                b.iter(|| codeclean::cleanup::sanitize(black_box(response), &options));
            },
        );
    }

    group.finish();
}

/// Benchmark language detection and validation on sanitized code.
fn bench_detect_and_validate(c: &mut Criterion) {
    let code = codeclean::sanitize(&create_test_response(100));

    c.bench_function("detect_language", |b| {
        b.iter(|| codeclean::detect_code_language(black_box(&code)));
    });

    c.bench_function("validate_code", |b| {
        b.iter(|| codeclean::validate_code(black_box(&code)));
    });
}

/// Benchmark parallel batch processing.
fn bench_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_batch");
    let options = SanitizeOptions::default();
    let validator = ValidatorOptions::default();

    for batch_size in [8, 64].iter() {
        let inputs: Vec<String> = (0..*batch_size).map(|_| create_test_response(50)).collect();

        group.bench_with_input(
            BenchmarkId::new("responses", batch_size),
            &inputs,
            |b, inputs| {
                b.iter(|| codeclean::process_batch(black_box(inputs), &options, &validator));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_sanitize,
    bench_sanitize_minimal,
    bench_detect_and_validate,
    bench_batch,
);
criterion_main!(benches);
