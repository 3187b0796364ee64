use brc_racer::{ArrayReader, Driver, MeanTable, Measurement};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};

const STATIONS: [&str; 8] = [
    "Abha", "Berlin", "Cairo", "Dakar", "Lima", "Oslo", "Tokyo", "Zürich",
];

fn generate(records: usize) -> String {
    let mut input = String::from("[");

    for idx in 0..records {
        if idx > 0 {
            input.push(',');
        }
        input.push_str(&format!(
            r#"{{"station":"{}","temperature":{}.{}}}"#,
            STATIONS[idx % STATIONS.len()],
            (idx % 90) as i32 - 40,
            idx % 10,
        ));
    }

    input.push(']');
    input
}

fn fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold");
    group.throughput(Throughput::Elements(1));

    group.bench_function("f64", |b| {
        let mut table = MeanTable::<f64>::new();
        let mut idx = 0;

        b.iter(|| {
            table.fold(STATIONS[idx % STATIONS.len()], 12.3);
            idx += 1;
        });
    });

    group.bench_function("f32", |b| {
        let mut table = MeanTable::<f32>::new();
        let mut idx = 0;

        b.iter(|| {
            table.fold(STATIONS[idx % STATIONS.len()], 12.3);
            idx += 1;
        });
    });

    group.finish();
}

fn decode(c: &mut Criterion) {
    let input = generate(10_000);

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("array reader", |b| {
        b.iter(|| {
            let mut reader = ArrayReader::new(input.as_bytes());
            reader.open().unwrap();

            let mut n = 0;
            while reader.has_next().unwrap() {
                let _: Measurement<f64> = reader.decode().unwrap();
                n += 1;
            }
            reader.close().unwrap();

            assert_eq!(10_000, n);
        });
    });

    group.finish();
}

fn aggregate(c: &mut Criterion) {
    let input = generate(100_000);

    let mut group = c.benchmark_group("aggregate");
    group.throughput(Throughput::Elements(100_000));
    group.sample_size(20);

    group.bench_function("100k records (f64)", |b| {
        let driver = Driver::new("bench").progress_interval(0);
        b.iter(|| driver.run::<f64, _>(input.as_bytes()).unwrap());
    });

    group.bench_function("100k records (f32)", |b| {
        let driver = Driver::new("bench").progress_interval(0);
        b.iter(|| driver.run::<f32, _>(input.as_bytes()).unwrap());
    });

    group.finish();
}

criterion_group!(benches, fold, decode, aggregate);
criterion_main!(benches);
