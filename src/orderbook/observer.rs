use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::orderbook::command::DELIMITER;
use crate::orderbook::error::{ErrorKind, OrderBookError};
use crate::orderbook::types::MarketEvent;
use crate::utils::time::timestamp_from_header;

/// Receives book diagnostics. Injected into an [`OrderBook`] so the core
/// never reaches for process-wide state on its own.
///
/// [`OrderBook`]: crate::orderbook::OrderBook
pub trait BookObserver: fmt::Debug + Send + Sync {
    /// A command was applied
    fn on_event(&self, _event: &MarketEvent) {}

    /// A command was rejected, for any reason
    fn on_rejected(&self, _line: &str, _error: &OrderBookError) {}

    /// A query found the two indexes disagreeing
    fn on_inconsistency(&self, _error: &OrderBookError) {}
}

/// Default observer, reports through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl BookObserver for TracingObserver {
    fn on_event(&self, event: &MarketEvent) {
        debug!("Applied {:?}", event);
    }

    fn on_rejected(&self, line: &str, err: &OrderBookError) {
        let sent_at = header_time(line);
        match err.kind() {
            ErrorKind::InternalInconsistency => error!(
                "Error! {} while applying order {:?} sent at {:?}",
                err, line, sent_at
            ),
            ErrorKind::MalformedCommand | ErrorKind::LogicalConflict => {
                warn!("Rejected order {:?} sent at {:?}: {}", line, sent_at, err)
            }
        }
    }

    fn on_inconsistency(&self, err: &OrderBookError) {
        warn!("{}", err);
    }
}

/// Header of a raw command line read as Unix seconds. Works on lines that
/// failed to parse, as long as the first field is a number.
fn header_time(line: &str) -> Option<DateTime<Utc>> {
    line.split(DELIMITER).next().and_then(timestamp_from_header)
}

/// Observer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl BookObserver for NullObserver {}

/// Forwards every notification to each inner observer in turn
#[derive(Debug, Default, Clone)]
pub struct FanoutObserver {
    observers: Vec<Arc<dyn BookObserver>>,
}

impl FanoutObserver {
    pub fn new(observers: Vec<Arc<dyn BookObserver>>) -> Self {
        Self { observers }
    }
}

impl BookObserver for FanoutObserver {
    fn on_event(&self, event: &MarketEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    fn on_rejected(&self, line: &str, error: &OrderBookError) {
        for observer in &self.observers {
            observer.on_rejected(line, error);
        }
    }

    fn on_inconsistency(&self, error: &OrderBookError) {
        for observer in &self.observers {
            observer.on_inconsistency(error);
        }
    }
}
