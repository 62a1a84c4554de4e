use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use ticker_orderbook::orderbook::{NullObserver, OrderBook};

fn new_order_line(i: usize) -> String {
    let side = if i % 2 == 0 { "B" } else { "S" };
    format!("{}|o{}|a|T{}|{}|{}.{:05}|{}", i, i, i % 8, side, 100 + i % 50, i % 97, 1 + i % 300)
}

fn quiet_book() -> OrderBook {
    OrderBook::with_observer(Arc::new(NullObserver))
}

fn bench_add_orders(c: &mut Criterion) {
    let lines: Vec<String> = (0..10_000).map(new_order_line).collect();

    c.bench_function("add_10k_orders", |b| {
        b.iter(|| {
            let mut book = quiet_book();
            for line in &lines {
                black_box(book.update(line));
            }
            book
        })
    });
}

fn bench_add_cancel_cycle(c: &mut Criterion) {
    c.bench_function("add_update_cancel", |b| {
        let mut book = quiet_book();
        b.iter(|| {
            black_box(book.update("1|cycle|a|AAPL|B|209.00000|100"));
            black_box(book.update("2|cycle|u|50"));
            black_box(book.update("3|cycle|c"));
        })
    });
}

fn bench_best_bid_and_ask(c: &mut Criterion) {
    let mut group = c.benchmark_group("best_bid_and_ask");

    for orders in [10usize, 100, 1_000] {
        let mut book = quiet_book();
        for i in 0..orders {
            let side = if i % 2 == 0 { "B" } else { "S" };
            book.update(&format!("{i}|o{i}|a|AAPL|{side}|{}.00000|10", 100 + i % 40));
        }

        group.bench_with_input(BenchmarkId::from_parameter(orders), &book, |b, book| {
            b.iter(|| black_box(book.best_bid_and_ask("AAPL")))
        });
    }

    group.finish();
}

fn bench_rejected_commands(c: &mut Criterion) {
    let mut book = quiet_book();
    c.bench_function("reject_malformed", |b| {
        b.iter(|| black_box(book.update("1568390201|abbb11|a|AAPL|B|209.0000068|100")))
    });
}

criterion_group!(
    benches,
    bench_add_orders,
    bench_add_cancel_cycle,
    bench_best_bid_and_ask,
    bench_rejected_commands
);
criterion_main!(benches);
