use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use learning_modalities::processing::{filter_by_zip, filter_rows, modality_breakdown, sum_schools};
use learning_modalities::types::{DataSet, Modality, ReportingWeek, Row, StateFilter, ZipCode, STATE_CODES};

const WEEKS: u64 = 40;
const DISTRICTS: u64 = 5_000;

fn synthetic_dataset() -> DataSet {
    let start = NaiveDate::from_ymd_opt(2020, 8, 3).unwrap();
    (0..WEEKS)
        .flat_map(|w| {
            let week = ReportingWeek::from_date(start.checked_add_days(Days::new(w * 7)).unwrap());
            (0..DISTRICTS).map(move |d| Row {
                district_id: d,
                district_name: format!("District {d}"),
                week,
                modality: Modality::ALL[((d + w) % 3) as usize],
                operational_schools: d % 40,
                student_count: (d % 40) * 350,
                city: "City".to_string(),
                state: STATE_CODES[(d % 50) as usize].to_string(),
                zip_code: 10_000 + d as u32,
            })
        })
        .collect()
}

fn bench_queries(c: &mut Criterion) {
    let ds = synthetic_dataset();
    let week = ReportingWeek::from_date(NaiveDate::from_ymd_opt(2020, 8, 3).unwrap());
    let ca = StateFilter::parse("CA").unwrap();
    let zip = ZipCode::new(12_345).unwrap();

    c.bench_function("filter_rows_all_states", |b| {
        b.iter(|| sum_schools(&filter_rows(black_box(&ds), &StateFilter::All, week, None)))
    });
    c.bench_function("modality_breakdown_state", |b| {
        b.iter(|| modality_breakdown(black_box(&ds), &ca, week))
    });
    c.bench_function("filter_by_zip", |b| b.iter(|| filter_by_zip(black_box(&ds), zip, week).len()));
}

criterion_group!(benches, bench_queries);
criterion_main!(benches);
