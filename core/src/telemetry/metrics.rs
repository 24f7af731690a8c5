use std::sync::Mutex;

/// Per-scan counters reported with the finished dataset.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub recorded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_point(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.recorded += 1;
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failed += 1;
        }
    }

    pub fn record_cancellation(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.cancelled += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_point();
        metrics.record_point();
        metrics.record_failure();
        assert_eq!(
            metrics.snapshot(),
            Metrics {
                recorded: 2,
                failed: 1,
                cancelled: 0
            }
        );
    }
}
