use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use chrono::Utc;

use certforge_certs::{Category, CategoryBinding, CategoryBindings};
use certforge_infra::automation::JobProcessor;
use certforge_infra::document_store::InMemoryDocumentStore;
use certforge_infra::jobs::{CertificateJob, JobQueue};
use certforge_infra::mailer::InMemoryMailer;
use certforge_infra::properties::InMemoryPropertyStore;
use certforge_infra::renderer::InMemoryRenderer;
use certforge_infra::scheduler::InMemoryTriggerScheduler;

fn bindings() -> CategoryBindings {
    CategoryBindings::new(
        CategoryBinding::new("tpl-basic", "folder-basic"),
        CategoryBinding::new("tpl-intermediate", "folder-intermediate"),
        CategoryBinding::new("tpl-advanced", "folder-advanced"),
    )
}

struct Env {
    props: Arc<InMemoryPropertyStore>,
    store: Arc<InMemoryDocumentStore>,
    renderer: Arc<InMemoryRenderer>,
    mailer: Arc<InMemoryMailer>,
    scheduler: Arc<InMemoryTriggerScheduler>,
}

fn env() -> Env {
    let store = InMemoryDocumentStore::arc();
    let renderer = InMemoryRenderer::arc();
    for (_, binding) in bindings().iter() {
        store.add_container(&binding.container);
        renderer.register_template(&binding.template, "Awarded to <<NAME>> on <<DATE>>.");
    }
    Env {
        props: InMemoryPropertyStore::arc(),
        store,
        renderer,
        mailer: InMemoryMailer::arc(),
        scheduler: InMemoryTriggerScheduler::arc(),
    }
}

fn enqueue_jobs(env: &Env, count: usize) {
    let queue = JobQueue::new(Arc::clone(&env.props));
    let binding = bindings().get(Category::Basic).clone();
    for i in 0..count {
        let job = CertificateJob::new(
            format!("Subject {i}"),
            Category::Basic,
            binding.template.clone(),
            binding.container.clone(),
            "March 4, 2026",
        )
        .with_recipient(format!("subject{i}@example.com"), true);
        queue
            .push(&job, Utc::now() + chrono::Duration::milliseconds(i as i64))
            .unwrap();
    }
}

fn bench_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain");

    for &count in &[10usize, 100] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("fresh_jobs", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let env = env();
                    enqueue_jobs(&env, count);
                    JobProcessor::new(
                        Arc::clone(&env.props),
                        Arc::clone(&env.store),
                        Arc::clone(&env.renderer),
                        Arc::clone(&env.mailer),
                        Arc::clone(&env.scheduler),
                        bindings(),
                    )
                },
                |processor| black_box(processor.run().unwrap()),
                criterion::BatchSize::SmallInput,
            )
        });
    }

    // The reconciliation-only path: every artifact already exists, so the
    // drain is pure snapshot lookups and marker reads.
    group.bench_function("already_reconciled_100", |b| {
        b.iter_batched(
            || {
                let env = env();
                enqueue_jobs(&env, 100);
                let processor = JobProcessor::new(
                    Arc::clone(&env.props),
                    Arc::clone(&env.store),
                    Arc::clone(&env.renderer),
                    Arc::clone(&env.mailer),
                    Arc::clone(&env.scheduler),
                    bindings(),
                );
                processor.run().unwrap();
                enqueue_jobs(&env, 100);
                processor
            },
            |processor| black_box(processor.run().unwrap()),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_drain);
criterion_main!(benches);
