use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::time::Duration;
use vidtube::auth::TokenIssuer;
use vidtube::config::TokenConfig;

fn issuer() -> TokenIssuer {
    TokenIssuer::new(&TokenConfig {
        access_secret: "bench-access-secret".to_string(),
        access_ttl: Duration::from_secs(900),
        refresh_secret: "bench-refresh-secret".to_string(),
        refresh_ttl: Duration::from_secs(864000),
    })
}

fn bench_issue(c: &mut Criterion) {
    let issuer = issuer();

    c.bench_function("issue_access_token", |b| {
        b.iter(|| issuer.issue_access_token(black_box("account-id")))
    });

    c.bench_function("issue_pair", |b| {
        b.iter(|| issuer.issue_pair(black_box("account-id")))
    });
}

fn bench_verify(c: &mut Criterion) {
    let issuer = issuer();
    let access = issuer.issue_access_token("account-id").unwrap();
    let refresh = issuer.issue_refresh_token("account-id").unwrap();

    c.bench_function("verify_access_token", |b| {
        b.iter(|| issuer.verify_access(black_box(&access)))
    });

    c.bench_function("verify_refresh_token", |b| {
        b.iter(|| issuer.verify_refresh(black_box(&refresh)))
    });

    c.bench_function("reject_wrong_kind", |b| {
        b.iter(|| issuer.verify_refresh(black_box(&access)))
    });
}

criterion_group!(benches, bench_issue, bench_verify);
criterion_main!(benches);
