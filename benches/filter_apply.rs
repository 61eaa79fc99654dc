use std::fs::File;
use std::hint::black_box;
use std::path::PathBuf;

use bridge_map::dataset::Dataset;
use bridge_map::engine::{FilterEngine, ViewportSettings};
use bridge_map::filter::{Choice, FilterSpec, Range, Selection, SliderDomains};
use bridge_map::record::{BridgeRecord, RouteType, UNRATED, rating_label};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use encoding_rs::UTF_8;
use tempfile::TempDir;

const STATES: [(&str, &str, u32); 5] = [
    ("NY", "New York", 36),
    ("OH", "Ohio", 39),
    ("UT", "Utah", 49),
    ("TX", "Texas", 48),
    ("CA", "California", 6),
];

fn synthetic_bridges(rows: usize) -> Vec<BridgeRecord> {
    (0..rows)
        .map(|i| {
            let (abbrev, name, state_code) = STATES[i % STATES.len()];
            let rating = if i % 11 == 0 { UNRATED } else { (i % 10) as i8 };
            BridgeRecord {
                region_id: format!("{:05}", state_code * 1000 + (i % 97) as u32),
                state_abbrev: abbrev.to_string(),
                state_name: name.to_string(),
                latitude: 30.0 + (i % 17) as f64,
                longitude: -120.0 + (i % 43) as f64,
                route_type: RouteType::ALL[i % 3],
                route_number: ((i % 89) + 1).to_string(),
                feature_intersect: format!("CREEK {i}"),
                owner: "State Highway Agency".to_string(),
                year_built: 1900 + (i % 120) as i32,
                service_type: "Highway".to_string(),
                bridge_material: "Concrete".to_string(),
                bridge_type: if i % 4 == 0 { "Slab" } else { "Tee Beam" }.to_string(),
                approach_material: "Concrete".to_string(),
                approach_type: "Slab".to_string(),
                num_spans: (i % 12) as u32,
                num_approach_spans: 0,
                max_span_length: 20.0,
                bridge_length: ((i % 500) * 3) as f64,
                bridge_width: 12.0,
                eval_rating: rating,
                eval_rating_verbose: rating_label(rating).unwrap_or("None").to_string(),
                deck_condition: Some(6),
                superstructure_condition: None,
                substructure_condition: Some(5),
            }
        })
        .collect()
}

fn write_dataset(records: &[BridgeRecord]) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let path = temp_dir.path().join("bridges.csv");
    let mut writer = csv::Writer::from_writer(File::create(&path).expect("create csv"));
    for record in records {
        writer.serialize(record).expect("row");
    }
    writer.flush().expect("flush");
    (temp_dir, path)
}

fn bench_filter_apply(c: &mut Criterion) {
    let records = synthetic_bridges(15_000);
    let engine = FilterEngine::new(records.clone()).with_viewport(ViewportSettings::default());
    let unrestricted = FilterSpec::unrestricted(&SliderDomains::default());
    let narrowed = FilterSpec {
        regions: Selection::from_tokens(["Ohio", "Utah"]),
        route_type: Choice::Only(RouteType::Interstate),
        years: Range::new(1950, 2000),
        length: Range::new(1.0, 3.0),
        ..unrestricted.clone()
    };

    let mut group = c.benchmark_group("filter_apply");
    group.bench_function("unrestricted", |b| {
        b.iter(|| black_box(engine.apply(black_box(&unrestricted)).summary));
    });
    group.bench_function("two_states_interstate", |b| {
        b.iter(|| black_box(engine.apply(black_box(&narrowed)).summary));
    });
    group.finish();

    let (temp_dir, path) = write_dataset(&records);
    c.bench_function("dataset_load", |b| {
        b.iter_batched(
            || (),
            |_| Dataset::load(&path, b',', UTF_8).expect("load dataset"),
            BatchSize::SmallInput,
        );
    });
    drop(temp_dir);
}

criterion_group!(benches, bench_filter_apply);
criterion_main!(benches);
