use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use rand::Rng;

use backend_domain::{base36_digit, to_base36, TicketNumber};

const RANDOM_SUFFIX_LEN: usize = 4;

/// Allocates `<PREFIX>-<BASE36 MILLIS>-<RAND4>` numbers. The time component is
/// strictly increasing within the process, so numbers minted in the same
/// millisecond by a bulk run still differ before the random suffix is drawn.
#[derive(Debug, Default)]
pub struct TicketNumberAllocator {
    last_millis: AtomicU64,
}

impl TicketNumberAllocator {
    pub fn next(&self, prefix: &str, now: DateTime<Utc>) -> TicketNumber {
        let now_ms = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let mut current = self.last_millis.load(Ordering::Relaxed);
        let stamp = loop {
            let candidate = now_ms.max(current.saturating_add(1));
            match self.last_millis.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break candidate,
                Err(observed) => current = observed,
            }
        };

        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_SUFFIX_LEN)
            .map(|_| base36_digit(rng.gen_range(0..36)))
            .collect();
        TicketNumber(format!(
            "{}-{}-{}",
            prefix.trim().to_uppercase(),
            to_base36(stamp),
            suffix
        ))
    }
}
