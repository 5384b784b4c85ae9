use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use easyauth::config::loader::{default_config_content, parse_config};
use easyauth::Config;

fn bench_config_creation(c: &mut Criterion) {
    c.bench_function("config_default", |b| b.iter(Config::default));
}

fn bench_config_parse(c: &mut Criterion) {
    let content = default_config_content("salt", "pepper");

    c.bench_function("config_parse_default_file", |b| {
        b.iter(|| parse_config(black_box(&content)))
    });
}

fn bench_config_serialization(c: &mut Criterion) {
    let config = Config::default();

    c.bench_function("config_to_toml", |b| {
        b.iter(|| toml::to_string(&black_box(&config)))
    });

    let toml_str = toml::to_string(&config).unwrap();
    c.bench_function("config_from_toml", |b| {
        b.iter(|| toml::from_str::<Config>(black_box(&toml_str)))
    });
}

fn bench_config_validate(c: &mut Criterion) {
    let mut config = Config::default();
    config.auth.table_columns = ["id", "name", "login_id", "password", "last_login", "login_hash"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    c.bench_function("config_validate", |b| b.iter(|| black_box(&config).validate()));
}

criterion_group!(
    benches,
    bench_config_creation,
    bench_config_parse,
    bench_config_serialization,
    bench_config_validate
);
criterion_main!(benches);
