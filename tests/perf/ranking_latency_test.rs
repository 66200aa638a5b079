use std::time::Instant;

use crate::model::{Catalog, Category, Engine, OpenMode};
use crate::search::rank_engines;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

#[test]
fn engine_ranking_p95_under_5ms() {
    let categories: Vec<Category> = (0..20)
        .map(|i| Category::new(&format!("cat{i}"), &format!("Category {i:02}"), i))
        .collect();
    let engines: Vec<Engine> = (0..500)
        .map(|i| {
            Engine::single(
                &format!("engine{i}"),
                &format!("Engine {i:03}"),
                "https://search.example.com/?q={searchTerms}",
                OpenMode::NewTab,
            )
            .with_category(&format!("cat{}", i % 25))
        })
        .collect();
    let catalog = Catalog::new(engines, categories);

    for _ in 0..30 {
        let _ = rank_engines(&catalog, "gine 4");
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for filter in ["", "e", "engine 1", "category 0", "zzz"] {
        let mut samples = Vec::with_capacity(60);
        for _ in 0..60 {
            let start = Instant::now();
            let _ = rank_engines(&catalog, filter);
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    assert!(
        median_p95 <= 5.0,
        "median batch p95 too high: {median_p95:.3}ms (budget 5.0ms); batches={batch_p95:?}",
    );
}
