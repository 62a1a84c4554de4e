//! Order Feed
//!
//! Replays a file of pipe-delimited order commands (or stdin) into an order
//! book and prints the best bid and ask for the requested tickers.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{self, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ticker_orderbook::{
    feed,
    metrics::{exporters::install_prometheus, MetricsReporter, OrderBookMetrics},
    orderbook::{BookObserver, FanoutObserver, OrderBook, SharedOrderBook, TracingObserver},
    utils::format_price,
};

/// Order book command replay
#[derive(Parser, Debug)]
#[clap(name = "order_feed")]
#[clap(about = "Apply pipe-delimited order commands and report best bid/ask")]
struct Cli {
    /// Command file, one command per line. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Ticker to report; repeat for several. Reports every ticker when omitted.
    #[clap(long = "ticker", short = 't')]
    tickers: Vec<String>,

    /// Print the full book snapshot as JSON instead of a quote per ticker
    #[clap(long)]
    json: bool,

    /// Log filter used when RUST_LOG is not set
    #[clap(long, default_value = "info")]
    log_level: String,

    /// Serve Prometheus metrics on this address
    #[clap(long)]
    metrics_addr: Option<SocketAddr>,

    /// Seconds between metrics summaries in the log, 0 disables
    #[clap(long, default_value = "0")]
    report_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(addr) = cli.metrics_addr {
        install_prometheus(addr)?;
    }

    let metrics = Arc::new(OrderBookMetrics::new());
    let logging: Arc<dyn BookObserver> = Arc::new(TracingObserver);
    let counting: Arc<dyn BookObserver> = metrics.clone();
    let observer = FanoutObserver::new(vec![logging, counting]);
    let book = SharedOrderBook::new(OrderBook::with_observer(Arc::new(observer)));

    if cli.report_interval_secs > 0 {
        let reporter =
            MetricsReporter::new(metrics.clone(), Duration::from_secs(cli.report_interval_secs));
        tokio::spawn(async move {
            reporter.run().await;
        });
    }

    let timing = Some(metrics.as_ref());
    let summary = match &cli.input {
        Some(path) => {
            info!("Reading orders from {}", path.display());
            let file = File::open(path).await?;
            feed::replay(&book, BufReader::new(file), timing).await?
        }
        None => feed::replay(&book, BufReader::new(io::stdin()), timing).await?,
    };

    info!(
        "Feed done: {} accepted, {} rejected, p99 {:.2}μs",
        summary.accepted, summary.rejected, summary.latency.p99
    );
    MetricsReporter::new(metrics.clone(), Duration::ZERO).report();

    book.with_book(|book| {
        book.log_book();

        if cli.json {
            println!("{}", serde_json::to_string_pretty(&book.snapshot())?);
            return Ok::<(), serde_json::Error>(());
        }

        let tickers: Vec<String> = if cli.tickers.is_empty() {
            book.snapshot().tickers.into_iter().map(|t| t.ticker).collect()
        } else {
            cli.tickers.clone()
        };

        metrics.set_total_orders(book.total_orders() as u64);
        for ticker in tickers {
            let (bid, ask) = metrics.time_query(|| book.best_bid_and_ask(&ticker));
            metrics.set_best_prices(&ticker, bid, ask);
            println!("{} bid={} ask={}", ticker, format_price(bid), format_price(ask));
        }
        Ok(())
    })?;

    Ok(())
}
