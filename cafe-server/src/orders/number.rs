//! Order number generation
//!
//! `ORD-` + the last six digits of a millisecond clock. The clock is made
//! strictly monotonic per process so two calls never yield the same value
//! within a 10^6 ms window; the store's UNIQUE constraint covers the rest.

use shared::util::now_millis;
use std::sync::atomic::{AtomicU64, Ordering};

const MODULUS: u64 = 1_000_000;

static GLOBAL: OrderNumberGenerator = OrderNumberGenerator::new();

/// Next order number from the process-wide generator
pub fn next_order_number() -> String {
    GLOBAL.next()
}

/// Monotonic millisecond counter
#[derive(Debug, Default)]
pub struct OrderNumberGenerator {
    last: AtomicU64,
}

impl OrderNumberGenerator {
    pub const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    /// `max(now_ms, last + 1)`, atomically
    pub fn next_value(&self, now_ms: u64) -> u64 {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = now_ms.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }

    pub fn next(&self) -> String {
        let now = u64::try_from(now_millis()).unwrap_or_default();
        format_order_number(self.next_value(now))
    }
}

pub fn format_order_number(value: u64) -> String {
    format!("ORD-{:06}", value % MODULUS)
}
