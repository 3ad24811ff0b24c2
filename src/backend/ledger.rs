//! Daily order-sequence ledger
//!
//! The system-of-record for how many orders exist per calendar day. The
//! source behavior read the day's count and incremented it client-side,
//! which races across concurrent checkouts; the contract here reserves a
//! whole range atomically instead, so two checkouts on the same day can
//! never hand out overlapping sequence numbers.

use async_trait::async_trait;

use super::BackendError;

/// Atomic reservation of daily order sequence numbers.
#[async_trait]
pub trait OrderLedger: Send + Sync {
    /// Reserves `count` consecutive sequence numbers for `date_key`
    /// (ISO `YYYY-MM-DD`) and returns the number of orders already recorded
    /// for that day before this reservation. The caller owns sequences
    /// `start + 1 ..= start + count`.
    async fn reserve(&self, date_key: &str, count: u32) -> Result<u64, BackendError>;
}
