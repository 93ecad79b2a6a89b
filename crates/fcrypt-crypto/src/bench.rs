//! Seal throughput harness: repeated sealing into a scratch buffer, no disk I/O

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use fcrypt_core::FcryptResult;

use crate::keys::RecipientKey;
use crate::seal::{seal_into, sealed_len};

/// Wall-clock result of [`run_benchmark`]
#[derive(Debug, Clone, Copy)]
pub struct BenchReport {
    pub iterations: u32,
    pub total: Duration,
    /// Mean time per seal call, never zero
    pub per_call: Duration,
}

/// Seal `plaintext` for `recipient` `iterations` times and time it.
///
/// Every call writes into the same zeroed scratch buffer, which is dropped
/// afterwards; nothing is persisted.
pub fn run_benchmark(
    plaintext: &[u8],
    recipient: &RecipientKey,
    iterations: NonZeroU32,
) -> FcryptResult<BenchReport> {
    let mut scratch = vec![0u8; sealed_len(plaintext.len())];

    let start = Instant::now();
    for _ in 0..iterations.get() {
        seal_into(&mut scratch, plaintext, recipient)?;
    }
    let total = start.elapsed();

    // Clamp to the clock's smallest step so a report is always positive.
    let per_call = (total / iterations.get()).max(Duration::from_nanos(1));

    tracing::debug!(
        iterations = iterations.get(),
        bytes = plaintext.len(),
        total_ms = total.as_millis() as u64,
        "benchmark finished"
    );
    Ok(BenchReport {
        iterations: iterations.get(),
        total,
        per_call,
    })
}
