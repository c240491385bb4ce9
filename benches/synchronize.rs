use bcms_settings::Registry;
use bcms_settings::providers::FixedModules;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn installed(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("bcms_module_{i}")).collect()
}

fn bench_synchronize(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let registry = rt.block_on(async {
        let store = bcms_settings::db::spawn("sqlite::memory:")
            .await
            .expect("spawn in-memory store");
        Registry::new(store, FixedModules::default())
    });

    let full = installed(64);
    let half = installed(32);

    c.bench_function("synchronize_noop_64", |b| {
        rt.block_on(registry.synchronize_with(&full)).expect("seed");
        b.to_async(&rt)
            .iter(|| async { black_box(registry.synchronize_with(&full).await.expect("sync")) });
    });

    c.bench_function("synchronize_churn_32", |b| {
        b.to_async(&rt).iter(|| async {
            registry.synchronize_with(&full).await.expect("grow");
            black_box(registry.synchronize_with(&half).await.expect("shrink"))
        });
    });
}

criterion_group!(benches, bench_synchronize);
criterion_main!(benches);
