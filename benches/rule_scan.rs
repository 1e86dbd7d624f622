use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use talentmatch::{run_rule_scan, score, Candidate, GroupBy, Job, RemotePolicy, RuleScan, ScoringConfig};

const CITIES: &[&str] = &["Berlin", "Lisbon", "Austin", "Toronto", "Warsaw"];
const TECHS: &[&str] = &[
    "rust", "python", "go", "typescript", "react", "postgres", "kubernetes", "aws", "java", "kafka",
];
const POLICIES: &[RemotePolicy] = &[
    RemotePolicy::RemoteOnly,
    RemotePolicy::Hybrid,
    RemotePolicy::Onsite,
    RemotePolicy::Unspecified,
];

fn pick<T: Copy>(items: &[T], seed: usize, n: usize) -> Vec<T> {
    (0..n).map(|i| items[(seed * 7 + i * 3) % items.len()]).collect()
}

fn candidates(count: usize) -> Vec<Candidate> {
    (0..count)
        .map(|i| {
            Candidate::new(format!("c{i:05}"))
                .with_location(CITIES[i % CITIES.len()])
                .with_remote(POLICIES[i % POLICIES.len()])
                .with_relocation(i % 3 == 0)
                .with_technologies(pick(TECHS, i, 2 + i % 4))
        })
        .collect()
}

fn jobs(count: usize) -> Vec<Job> {
    (0..count)
        .map(|i| {
            Job::new(format!("j{i:05}"))
                .with_location(CITIES[(i + 2) % CITIES.len()])
                .with_remote(POLICIES[(i + 1) % POLICIES.len()])
                .with_technologies(pick(TECHS, i + 11, 3 + i % 3))
        })
        .collect()
}

fn bench_pair_score(c: &mut Criterion) {
    let candidate = &candidates(1)[0];
    let job = &jobs(1)[0];
    let config = ScoringConfig::default();
    c.bench_function("score_pair", |b| {
        b.iter(|| score(black_box(candidate), black_box(job), &config))
    });
}

fn bench_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_scan");
    let config = ScoringConfig::default();

    for size in [100usize, 500, 1000] {
        let candidates = candidates(size);
        let jobs = jobs(size / 2);
        group.throughput(Throughput::Elements((candidates.len() * jobs.len()) as u64));

        for group_by in [GroupBy::Candidate, GroupBy::Job] {
            let scan = RuleScan::new(group_by);
            group.bench_with_input(
                BenchmarkId::new(group_by.to_string(), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        run_rule_scan(black_box(&candidates), black_box(&jobs), &config, &scan)
                            .expect("scan succeeds")
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_pair_score, bench_full_scan);
criterion_main!(benches);
