use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use chrono::{Duration, Utc};
use formgate_auth::{SignedHeaders, VerifierConfig, canonical_payload, sign, validate_schema_features, verify_at};
use formgate_core::PlanTier;
use serde_json::{Value, json};

fn bench_verify(c: &mut Criterion) {
    let config = VerifierConfig::new("bench-secret", Duration::seconds(300));
    let now = Utc::now();
    let ts = now.timestamp().to_string();
    let signature = sign("bench-secret", &canonical_payload("user_bench", &ts, PlanTier::Pro)).unwrap();

    c.bench_function("verify_signed_headers", |b| {
        b.iter(|| {
            let headers = SignedHeaders {
                user_id: Some("user_bench"),
                timestamp: Some(ts.as_str()),
                signature: Some(signature.as_str()),
                plan_tier: Some("pro"),
            };
            black_box(verify_at(black_box(&headers), &config, now))
        })
    });
}

/// A schema with `width` sibling panels, each nested `depth` levels deep.
fn nested_schema(width: usize, depth: usize) -> Value {
    let components: Vec<Value> = (0..width)
        .map(|_| {
            let mut node = json!({"type": "textfield"});
            for _ in 0..depth {
                node = json!({
                    "type": "columns",
                    "columns": [{"components": [node]}, {"components": [{"type": "email"}]}]
                });
            }
            node
        })
        .collect();
    json!({ "components": components })
}

fn bench_feature_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_schema_features");
    for (width, depth) in [(10, 2), (50, 8), (200, 16)] {
        let schema = nested_schema(width, depth);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{depth}")),
            &schema,
            |b, schema| b.iter(|| black_box(validate_schema_features(schema, PlanTier::Free))),
        );
    }
    group.finish();
}

criterion_group!(benches, bench_verify, bench_feature_gate);
criterion_main!(benches);
