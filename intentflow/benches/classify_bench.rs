//! Benchmarks for request classification.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use intentflow::classify::{Classifier, TriggerClassifier};
use intentflow::stage::NoOpStage;
use intentflow::workflow::{StageSpec, WorkflowDefinition, WorkflowRegistry};
use std::sync::Arc;

fn registry() -> Arc<WorkflowRegistry> {
    let mut registry = WorkflowRegistry::new();
    let categories: [(&str, &[&str]); 5] = [
        ("git-analysis", &["git", "repository", "repo", "commit"]),
        ("issue-test-generation", &["jira", "ticket", "issue", "story"]),
        ("document-processing", &["pdf", "document", "file"]),
        ("script-generation", &["script", "automation", "automate"]),
        ("test-generation", &["test", "unittest", "pytest"]),
    ];

    for (category, keywords) in categories {
        let definition = WorkflowDefinition::builder(category)
            .keywords(keywords.iter().copied())
            .stage(StageSpec::new("only", Arc::new(NoOpStage::new("only"))))
            .build()
            .expect("valid workflow");
        registry.register(definition).expect("unique category");
    }
    Arc::new(registry)
}

fn classify_benchmark(c: &mut Criterion) {
    let classifier = TriggerClassifier::new(registry(), 1);

    c.bench_function("classify_matched", |b| {
        b.iter(|| {
            black_box(
                classifier.classify("please analyze the git repository and list every commit"),
            )
        })
    });

    c.bench_function("classify_unrecognized", |b| {
        b.iter(|| black_box(classifier.classify("hello there, how are you today")))
    });

    let long_text = "analyze the repository ".repeat(200);
    c.bench_function("classify_long_input", |b| {
        b.iter(|| black_box(classifier.classify(&long_text)))
    });
}

criterion_group!(benches, classify_benchmark);
criterion_main!(benches);
