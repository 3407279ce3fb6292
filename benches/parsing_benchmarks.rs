use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kube_capacity_auditor::aggregator::aggregate;
use kube_capacity_auditor::parsing::Quantity;
use kube_capacity_auditor::types::{ContainerMemory, NodeCapacity, WorkloadResourceSpec};

fn quantity_parsing_benchmark(c: &mut Criterion) {
    let test_values = vec![
        "1Ki",
        "128Mi",
        "1Gi",
        "2.5Gi",
        "134217728",
        "500M",
        "100m",
        "12e6",
        "0.125Ti",
        "110",
    ];

    c.bench_function("parse_quantity", |b| {
        b.iter(|| {
            for value in &test_values {
                black_box(black_box(value).parse::<Quantity>().ok());
            }
        })
    });
}

fn aggregation_benchmark(c: &mut Criterion) {
    let nodes: Vec<NodeCapacity> = (0..100)
        .map(|i| NodeCapacity {
            name: format!("node-{}", i),
            max_memory: "64Gi".parse().unwrap(),
            max_pods: 110,
        })
        .collect();
    let container = ContainerMemory {
        request: "256Mi".parse().unwrap(),
        limit: "512Mi".parse().unwrap(),
    };
    let workloads: Vec<WorkloadResourceSpec> = (0..5000)
        .map(|i| WorkloadResourceSpec {
            name: format!("pod-{}", i),
            namespace: "default".to_string(),
            node_name: format!("node-{}", i % 100),
            containers: vec![container; 2],
        })
        .collect();

    c.bench_function("aggregate_5000_pods", |b| {
        b.iter(|| black_box(aggregate(black_box(&nodes), black_box(&workloads))))
    });
}

criterion_group!(benches, quantity_parsing_benchmark, aggregation_benchmark);
criterion_main!(benches);
