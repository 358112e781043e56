//! Node selection benchmarks
//!
//! Measures the non-I/O parts of a selection run: filtering a node table,
//! ranking probe outcomes and config parsing. Network calls are excluded.
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use clashpilot::{
    config::Config,
    daemon::{ProxyEntry, ProxyTable},
    nodes::{NodeProbe, ProbeOutcome, best, eligible_nodes, rank},
};
use std::hint::black_box;

/// Table of `size` leaf nodes plus a few groups and info placeholders
fn build_table(size: usize) -> ProxyTable {
    let mut table = ProxyTable::default();
    let mut members = Vec::with_capacity(size);
    for i in 0..size {
        let name = format!("HK {:03}", i);
        members.push(name.clone());
        table.proxies.insert(
            name.clone(),
            ProxyEntry {
                name,
                kind: if i % 2 == 0 { "Vmess" } else { "Trojan" }.to_string(),
                ..Default::default()
            },
        );
    }
    for name in ["剩余流量：100GB", "套餐到期：2026-12-31"] {
        table.proxies.insert(
            name.to_string(),
            ProxyEntry {
                name: name.to_string(),
                kind: "Shadowsocks".to_string(),
                ..Default::default()
            },
        );
    }
    table.proxies.insert(
        "Proxies".to_string(),
        ProxyEntry {
            name: "Proxies".to_string(),
            kind: "Selector".to_string(),
            now: members.first().cloned(),
            all: members,
            ..Default::default()
        },
    );
    table
}

/// Probe results with every fifth node unreachable
fn build_probes(size: usize) -> Vec<NodeProbe> {
    (0..size)
        .map(|i| {
            let outcome = if i % 5 == 0 {
                ProbeOutcome::Unreachable
            } else {
                ProbeOutcome::Reachable {
                    latency_ms: ((i * 7919) % 2000) as u32,
                }
            };
            NodeProbe::new(format!("HK {:03}", i), "Vmess", outcome)
        })
        .collect()
}

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("eligible_nodes");
    for size in [10, 100, 1000] {
        let table = build_table(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &table, |b, table| {
            b.iter(|| eligible_nodes(black_box(table)).len())
        });
    }
    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    for size in [10, 100, 1000] {
        let probes = build_probes(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &probes, |b, probes| {
            b.iter(|| {
                let ranked = rank(black_box(probes.clone()));
                best(&ranked).map(|p| p.name.len())
            })
        });
    }
    group.finish();
}

fn bench_config_parsing(c: &mut Criterion) {
    let toml = r#"
[daemon]
api_url = "http://127.0.0.1:9097"
secret = "s3cret"

[probe]
timeout_ms = 3000
default_group = "Proxies"

[status]
key_groups = ["Proxies", "GLOBAL"]
"#;
    c.bench_function("config_parsing", |b| {
        b.iter(|| black_box(toml).parse::<Config>())
    });
}

criterion_group!(
    benches,
    bench_classification,
    bench_ranking,
    bench_config_parsing
);
criterion_main!(benches);
