use std::ops::Range;

/// Splits `quantity` items into consecutive index ranges of at most `batch_size`.
pub fn plan_batches(quantity: u32, batch_size: usize) -> Vec<Range<u32>> {
    let size = u32::try_from(batch_size.max(1)).unwrap_or(u32::MAX);
    let mut batches = Vec::new();
    let mut start = 0u32;
    while start < quantity {
        let end = start.saturating_add(size).min(quantity);
        batches.push(start..end);
        start = end;
    }
    batches
}

/// Batch size for the rendering pipeline: small totals get small batches so the
/// first artifacts land quickly, large totals amortize per-batch overhead.
pub fn adaptive_batch_size(quantity: u32) -> usize {
    match quantity {
        0..=50 => 10,
        51..=500 => 25,
        501..=2000 => 50,
        _ => 100,
    }
}

/// Display name for the n-th (1-based) attendee of a bulk request.
pub fn attendee_display_name(prefix: &str, sequence: u32, total: u32) -> String {
    let width = total.to_string().len().max(3);
    format!("{} {:0width$}", prefix.trim(), sequence, width = width)
}
