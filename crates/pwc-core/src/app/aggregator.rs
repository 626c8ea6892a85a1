//! Aggregator - 全チャネルを待って合計する（バリア）
//!
//! All channels are awaited concurrently. The first closed channel aborts the
//! aggregation even while others are still pending; nothing partial is
//! returned.

use futures_util::future::try_join_all;
use tracing::trace;

use super::channel::ResultReceiver;
use crate::domain::{PwcError, Totals};

/// Block until every receiver has delivered, summing field-wise.
pub async fn aggregate(receivers: Vec<ResultReceiver>) -> Result<Totals, PwcError> {
    let indices: Vec<usize> = receivers.iter().map(ResultReceiver::index).collect();
    let triples = try_join_all(receivers.into_iter().map(ResultReceiver::recv)).await?;

    let mut totals = Totals::new();
    for (index, triple) in indices.into_iter().zip(triples) {
        trace!(partition = index, ?triple, "partition delivered");
        totals.absorb(triple);
    }
    Ok(totals)
}
