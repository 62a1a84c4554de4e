//! Replays command lines from any async reader into a shared book.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

use crate::metrics::collectors::{LatencyCollector, LatencyMicros};
use crate::metrics::OrderBookMetrics;
use crate::orderbook::SharedOrderBook;
use crate::utils::time::LatencyTimer;

/// Outcome of one replay
#[derive(Debug, Clone, Serialize)]
pub struct FeedSummary {
    pub lines: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub skipped: u64,
    pub latency: LatencyMicros,
}

/// Feed every line of `reader` into `book`. Blank lines are skipped and
/// lines that are not UTF-8 count as rejected; each other line is applied
/// under the book lock and released before the next read. When `metrics` is
/// given, every update is also timed through it.
pub async fn replay<R>(
    book: &SharedOrderBook,
    mut reader: R,
    metrics: Option<&OrderBookMetrics>,
) -> std::io::Result<FeedSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut latencies = LatencyCollector::new();
    let (mut total, mut accepted, mut rejected, mut skipped) = (0u64, 0u64, 0u64, 0u64);

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        total += 1;

        let Ok(line) = std::str::from_utf8(&buf) else {
            warn!("Line {} is not valid UTF-8, rejected", total);
            rejected += 1;
            continue;
        };
        if line.trim().is_empty() {
            skipped += 1;
            continue;
        }

        let timer = LatencyTimer::start();
        let ok = match metrics {
            Some(metrics) => metrics.time_update(|| book.update(line)),
            None => book.update(line),
        };
        latencies.record(timer.stop());

        if ok {
            accepted += 1;
        } else {
            rejected += 1;
            debug!("Line {} rejected", total);
        }
    }

    info!(
        "Replayed {} lines: {} accepted, {} rejected, {} skipped",
        total, accepted, rejected, skipped
    );

    Ok(FeedSummary {
        lines: total,
        accepted,
        rejected,
        skipped,
        latency: latencies.statistics().to_micros(),
    })
}
