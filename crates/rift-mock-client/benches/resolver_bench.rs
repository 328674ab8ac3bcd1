use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rift_mock_client::compare::compare;
use rift_mock_client::{
    MockResponse, PatternRegistry, RequestMatcher, RequestOptions, RequestPattern, Resolver,
};
use serde_json::json;

fn create_pattern(id: usize) -> RequestPattern {
    RequestPattern::new()
        .method("GET")
        .uri(&format!("/api/v1/endpoint{id}?page=1"))
        .header("accept", "application/json")
}

fn create_patterns(count: usize) -> Vec<RequestPattern> {
    (0..count).map(create_pattern).collect()
}

fn real_request(id: usize) -> RequestPattern {
    RequestPattern::new()
        .method("GET")
        .uri(&format!("/api/v1/endpoint{id}?page=1"))
        .header("Accept", "application/json")
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    let resolver = Resolver::new();

    for pattern_count in [10, 50, 100, 500].iter() {
        let patterns = create_patterns(*pattern_count);

        // Test matching first pattern (best case)
        let first = real_request(0);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("resolve_first", pattern_count),
            pattern_count,
            |b, _| {
                b.iter(|| resolver.resolve(black_box(&patterns), black_box(&first)));
            },
        );

        // Test matching last pattern; every pattern is scored anyway
        let last = real_request(pattern_count - 1);
        group.bench_with_input(
            BenchmarkId::new("resolve_last", pattern_count),
            pattern_count,
            |b, _| {
                b.iter(|| resolver.resolve(black_box(&patterns), black_box(&last)));
            },
        );

        // Test no match (collects a reason per pattern)
        let none = real_request(usize::MAX);
        group.bench_with_input(
            BenchmarkId::new("resolve_none", pattern_count),
            pattern_count,
            |b, _| {
                b.iter(|| resolver.resolve(black_box(&patterns), black_box(&none)));
            },
        );
    }

    group.finish();
}

fn bench_content_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_matching");
    let matcher = RequestMatcher::new();

    let body = json!({
        "order": {"id": 42, "items": [{"sku": "a", "qty": 1}, {"sku": "b", "qty": 2}]},
        "tags": ["x", "y", "z"]
    });
    let json_expectation = RequestPattern::new().method("POST").json(&body);
    let json_real = RequestPattern::new().method("POST").content(
        r#"{"tags":["z","y","x"],"order":{"items":[{"qty":2,"sku":"b"},{"qty":1,"sku":"a"}],"id":42}}"#,
    );

    let xml_expectation = RequestPattern::new()
        .method("POST")
        .content("<order id=\"42\"><item sku=\"a\"/><item sku=\"b\"/></order>");
    let xml_real = RequestPattern::new()
        .method("POST")
        .content("<order id=\"42\">\n  <item sku=\"a\"/>\n  <item sku=\"b\"/>\n</order>\n");

    let form_expectation = RequestPattern::new()
        .method("POST")
        .request_param("name", "Jane Doe")
        .request_param("city", "Köln");
    let form_real = RequestPattern::new()
        .method("POST")
        .content("city=K%C3%B6ln&name=Jane+Doe");

    group.throughput(Throughput::Elements(1));
    group.bench_function("json", |b| {
        b.iter(|| matcher.matches(black_box(&json_expectation), black_box(&json_real)));
    });
    group.bench_function("xml", |b| {
        b.iter(|| matcher.matches(black_box(&xml_expectation), black_box(&xml_real)));
    });
    group.bench_function("form", |b| {
        b.iter(|| matcher.matches(black_box(&form_expectation), black_box(&form_real)));
    });

    group.finish();
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    for size in [10, 100, 500].iter() {
        let expected = json!((0..*size).collect::<Vec<_>>());
        let actual = json!((0..*size).rev().collect::<Vec<_>>());

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("reversed_array", size), size, |b, _| {
            b.iter(|| compare(black_box(&actual), black_box(&expected)));
        });
    }

    group.finish();
}

fn bench_registry_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");

    let mut registry = PatternRegistry::new();
    for pattern in create_patterns(100) {
        registry.register(
            pattern
                .will_always_respond(MockResponse::new().json(&json!({"ok": true})))
                .unwrap(),
        );
    }
    let options = RequestOptions::new().header("Accept", "application/json");

    group.throughput(Throughput::Elements(1));
    group.bench_function("resolve_and_record", |b| {
        b.iter(|| {
            let response = registry.resolve(
                black_box("GET"),
                black_box("/api/v1/endpoint50?page=1"),
                black_box(&options),
            );
            registry.reset_calls();
            response
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_resolution,
    bench_content_matching,
    bench_compare,
    bench_registry_round_trip
);
criterion_main!(benches);
