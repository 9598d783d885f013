//! Brewery record benchmarks.
//!
//! Covers the per-tick hot path:
//! - decoding a provider response
//! - normalizing a raw record
//! - encoding the SSE frame

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use brewery_stream::brewery::{RawRecord, normalize};
use brewery_stream::session::encode_event;

const CATEGORIES: &[&str] = &[
    "micro", "nano", "regional", "brewpub", "large", "planning", "bar", "contract", "proprietor",
    "closed", "taproom",
];

/// Provider-shaped JSON objects with a mix of missing and present fields.
fn generate_raw_json(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let category = CATEGORIES[i % CATEGORIES.len()];
            let phone = if i % 3 == 0 { "null".to_string() } else { format!("\"555{:07}\"", i) };
            let coords = if i % 4 == 0 {
                r#""latitude": null, "longitude": null"#.to_string()
            } else {
                format!(r#""latitude": "{}.5", "longitude": "-{}.25""#, i % 90, i % 180)
            };
            format!(
                r#"{{"id": "b-{i}", "name": "Brewery {i}", "brewery_type": "{category}", "address_1": "{i} Main St", "city": "Springfield", "state_province": "Oregon", "postal_code": "97477", "country": "United States", "phone": {phone}, "website_url": null, {coords}}}"#
            )
        })
        .collect()
}

fn normalize_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for size in [100, 1000] {
        let lines = generate_raw_json(size);
        let raws: Vec<RawRecord> = lines
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("decode", size), &lines, |b, lines| {
            b.iter(|| {
                lines
                    .iter()
                    .map(|line| serde_json::from_str::<RawRecord>(line).unwrap())
                    .count()
            });
        });

        group.bench_with_input(BenchmarkId::new("normalize", size), &raws, |b, raws| {
            b.iter(|| raws.iter().map(normalize).count());
        });

        group.bench_with_input(BenchmarkId::new("normalize_and_encode", size), &raws, |b, raws| {
            b.iter(|| {
                raws.iter()
                    .map(|raw| encode_event(&normalize(raw)).unwrap().len())
                    .sum::<usize>()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, normalize_benchmarks);
criterion_main!(benches);
