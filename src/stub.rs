use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use crate::types::{GenerationParams, GenerationResult};

const STUB_IMAGES: [&str; 4] = [
    "https://images.unsplash.com/photo-1543349689-9a4d426bee8e?q=80&w=2062&auto=format&fit=crop&ixlib=rb-4.0.3",
    "https://images.unsplash.com/photo-1507608616759-54f48f0af0ee?q=80&w=1974&auto=format&fit=crop&ixlib=rb-4.0.3",
    "https://images.unsplash.com/photo-1516146544193-b54a65682f16?q=80&w=2187&auto=format&fit=crop&ixlib=rb-4.0.3",
    "https://images.unsplash.com/photo-1518531933037-91b2f5f229cc?q=80&w=1827&auto=format&fit=crop&ixlib=rb-4.0.3",
];

static GENERATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Canned output with exactly `batch_size` images. The pool cycles for batches
/// larger than four.
pub(crate) fn generate_stub_result(params: &GenerationParams) -> GenerationResult {
    let created_at = Utc::now();
    let images = STUB_IMAGES
        .iter()
        .cycle()
        .take(params.batch_size as usize)
        .map(|url| url.to_string())
        .collect();
    GenerationResult {
        id: next_generation_id(created_at.timestamp_millis()),
        images,
        params: params.clone(),
        created_at,
    }
}

fn next_generation_id(timestamp_millis: i64) -> String {
    let counter = GENERATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("gen-{}-{}", timestamp_millis, counter)
}
