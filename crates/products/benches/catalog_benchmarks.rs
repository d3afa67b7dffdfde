use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use aesthetica_products::{
    CertificationLevel, DEFAULT_LOW_STOCK_THRESHOLD, ProductFields, ProductStats, SearchTerm,
    slugify,
};

const CATEGORIES: [&str; 5] = ["serums", "peels", "boosters", "devices", "aftercare"];

/// Synthetic catalog shaped like the real one: short names, a handful of tags.
fn catalog(size: usize) -> Vec<ProductFields> {
    (0..size)
        .map(|i| {
            let category = CATEGORIES[i % CATEGORIES.len()];
            let name = format!("{} Formula {i}", category.to_uppercase());
            ProductFields {
                slug: slugify(&name),
                name,
                description: format!("Professional {category} for clinic use, batch {i}"),
                category: category.to_string(),
                sku: format!("SKU-{i:05}"),
                tags: vec![category.to_string(), "professional".to_string()],
                price: 20.0 + (i % 200) as f64,
                stock: (i % 40) as i64 - 2,
                is_active: i % 7 != 0,
                featured: i % 11 == 0,
                best_seller: i % 13 == 0,
                requires_certification: i % 3 == 0,
                certification_level: if i % 3 == 0 {
                    CertificationLevel::Basic
                } else {
                    CertificationLevel::None
                },
                ..ProductFields::default()
            }
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_products");

    for size in [100usize, 1_000, 10_000] {
        let products = catalog(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("hit_in_tags", size), &products, |b, products| {
            let term = SearchTerm::new("Professional");
            b.iter(|| {
                black_box(products.iter().filter(|p| term.matches(p)).count());
            });
        });

        group.bench_with_input(BenchmarkId::new("miss", size), &products, |b, products| {
            let term = SearchTerm::new("exosome");
            b.iter(|| {
                black_box(products.iter().filter(|p| term.matches(p)).count());
            });
        });
    }

    group.finish();
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("product_stats");

    for size in [100usize, 1_000, 10_000] {
        let products = catalog(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &products, |b, products| {
            b.iter(|| {
                black_box(ProductStats::from_products(products, DEFAULT_LOW_STOCK_THRESHOLD));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_search, bench_stats);
criterion_main!(benches);
