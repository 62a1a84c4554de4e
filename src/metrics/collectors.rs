use serde::Serialize;
use std::time::Duration;

/// Collects latency samples and summarizes them into percentiles
#[derive(Debug, Default)]
pub struct LatencyCollector {
    samples: Vec<Duration>,
}

impl LatencyCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a latency sample
    pub fn record(&mut self, latency: Duration) {
        self.samples.push(latency);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn statistics(&self) -> LatencyStatistics {
        if self.samples.is_empty() {
            return LatencyStatistics::default();
        }

        let mut sorted_samples = self.samples.clone();
        sorted_samples.sort();

        let len = sorted_samples.len();
        let total: Duration = sorted_samples.iter().sum();

        LatencyStatistics {
            count: len as u64,
            min: sorted_samples[0],
            max: sorted_samples[len - 1],
            mean: total / len as u32,
            p50: sorted_samples[len / 2],
            p95: sorted_samples[(len as f64 * 0.95) as usize],
            p99: sorted_samples[(len as f64 * 0.99) as usize],
            p999: sorted_samples[(len as f64 * 0.999) as usize],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatencyStatistics {
    pub count: u64,
    pub min: Duration,
    pub max: Duration,
    pub mean: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub p999: Duration,
}

impl LatencyStatistics {
    pub fn to_micros(&self) -> LatencyMicros {
        let micros = |d: Duration| d.as_secs_f64() * 1_000_000.0;
        LatencyMicros {
            count: self.count,
            min: micros(self.min),
            max: micros(self.max),
            mean: micros(self.mean),
            p50: micros(self.p50),
            p95: micros(self.p95),
            p99: micros(self.p99),
            p999: micros(self.p999),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencyMicros {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub p999: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_collector() {
        let collector = LatencyCollector::new();
        assert!(collector.is_empty());
        assert_eq!(collector.statistics(), LatencyStatistics::default());
    }

    #[test]
    fn test_percentiles() {
        let mut collector = LatencyCollector::new();
        for micros in (1..=100).rev() {
            collector.record(Duration::from_micros(micros));
        }

        let stats = collector.statistics();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.min, Duration::from_micros(1));
        assert_eq!(stats.max, Duration::from_micros(100));
        assert_eq!(stats.p50, Duration::from_micros(51));
        assert_eq!(stats.p95, Duration::from_micros(96));
        assert_eq!(stats.p99, Duration::from_micros(100));

        let micros = stats.to_micros();
        assert!((micros.mean - 50.5).abs() < 1e-6);
    }

    #[test]
    fn test_single_sample() {
        let mut collector = LatencyCollector::new();
        collector.record(Duration::from_nanos(750));

        let stats = collector.statistics();
        assert_eq!(stats.p999, Duration::from_nanos(750));
        assert_eq!(stats.mean, Duration::from_nanos(750));
    }
}
