//! Bounded worker pool that probes every route exactly once.
//!
//! A dispatcher feeds one task per descriptor into a bounded channel. A fixed
//! set of workers pull tasks, probe, and push outcomes into a results channel.
//! The collector drains results until every worker has exited, then joins the
//! pool. Results arrive in completion order.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, instrument};

use super::probe::Prober;
use super::types::{RouteDescriptor, RouteOutcome};

/// Message recorded for a route whose worker died before reporting.
pub const WORKER_LOST_MESSAGE: &str = "probe worker terminated before reporting an outcome";

/// One unit of work handed to the pool.
struct ProbeTask {
    index: usize,
    descriptor: RouteDescriptor,
}

/// Fans probes out over at most `max_concurrent` workers.
#[derive(Debug)]
pub struct ConcurrentRunner<P> {
    prober: Arc<P>,
    max_concurrent: usize,
    stable_order: bool,
}

impl<P> Clone for ConcurrentRunner<P> {
    fn clone(&self) -> Self {
        Self {
            prober: Arc::clone(&self.prober),
            max_concurrent: self.max_concurrent,
            stable_order: self.stable_order,
        }
    }
}

impl<P: Prober> ConcurrentRunner<P> {
    /// Create a runner. A `max_concurrent` of 0 is treated as 1.
    pub fn new(prober: Arc<P>, max_concurrent: usize) -> Self {
        Self {
            prober,
            max_concurrent: max_concurrent.max(1),
            stable_order: false,
        }
    }

    /// Return results in descriptor order instead of completion order.
    pub fn with_stable_order(mut self, stable_order: bool) -> Self {
        self.stable_order = stable_order;
        self
    }

    /// Get the worker pool bound.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Probe every descriptor against `base_url`.
    ///
    /// Returns exactly one outcome per descriptor once all of them are in.
    #[instrument(skip(self, descriptors), fields(routes = descriptors.len()))]
    pub async fn run(&self, descriptors: &[RouteDescriptor], base_url: &str) -> Vec<RouteOutcome> {
        if descriptors.is_empty() {
            return Vec::new();
        }

        let total = descriptors.len();
        let workers = self.max_concurrent.min(total);
        let base_url: Arc<str> = Arc::from(base_url);

        debug!(workers, total, "Starting probe pool");

        let (task_tx, task_rx) = mpsc::channel::<ProbeTask>(workers);
        let task_rx = Arc::new(Mutex::new(task_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<(usize, RouteOutcome)>(total);

        // Dropping the set aborts anything still running.
        let mut pool = JoinSet::new();

        for worker_id in 0..workers {
            let task_rx = Arc::clone(&task_rx);
            let result_tx = result_tx.clone();
            let prober = Arc::clone(&self.prober);
            let base_url = Arc::clone(&base_url);

            pool.spawn(async move {
                loop {
                    let next = task_rx.lock().await.recv().await;
                    let Some(task) = next else {
                        break;
                    };
                    let outcome = prober.probe(&task.descriptor, &base_url).await;
                    if result_tx.send((task.index, outcome)).await.is_err() {
                        break;
                    }
                }
                debug!(worker_id, "Probe worker finished");
            });
        }
        drop(task_rx);
        drop(result_tx);

        let tasks: Vec<ProbeTask> = descriptors
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, descriptor)| ProbeTask { index, descriptor })
            .collect();

        pool.spawn(async move {
            for task in tasks {
                // Fails only once every worker is gone.
                if task_tx.send(task).await.is_err() {
                    break;
                }
            }
        });

        let mut reported = vec![false; total];
        let mut outcomes = Vec::with_capacity(total);
        while let Some((index, outcome)) = result_rx.recv().await {
            reported[index] = true;
            outcomes.push((index, outcome));
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Probe worker failed");
            }
        }

        for (index, descriptor) in descriptors.iter().enumerate() {
            if !reported[index] {
                error!(route = %descriptor.path, "No outcome reported for route");
                outcomes.push((
                    index,
                    RouteOutcome::failed(
                        &descriptor.path,
                        format!("{}{}", base_url, descriptor.path),
                        WORKER_LOST_MESSAGE,
                        0,
                    ),
                ));
            }
        }

        if self.stable_order {
            outcomes.sort_by_key(|(index, _)| *index);
        }

        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Prober that tracks peak concurrency and answers after a delay.
    #[derive(Default)]
    struct CountingProber {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Prober for CountingProber {
        async fn probe(&self, descriptor: &RouteDescriptor, base_url: &str) -> RouteOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(15)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            let status = if descriptor.path.ends_with("fail") { 500 } else { 200 };
            RouteOutcome::completed(
                &descriptor.path,
                format!("{}{}", base_url, descriptor.path),
                status,
                15,
            )
        }
    }

    /// Prober whose delay shrinks with the route number, reversing completion.
    struct ReversingProber;

    #[async_trait]
    impl Prober for ReversingProber {
        async fn probe(&self, descriptor: &RouteDescriptor, base_url: &str) -> RouteOutcome {
            let n: u64 = descriptor.path.trim_start_matches("/r").parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(60 - n * 10)).await;
            RouteOutcome::completed(&descriptor.path, base_url, 200, 0)
        }
    }

    /// Prober that panics on one route.
    struct PanickingProber;

    #[async_trait]
    impl Prober for PanickingProber {
        async fn probe(&self, descriptor: &RouteDescriptor, base_url: &str) -> RouteOutcome {
            if descriptor.path == "/boom" {
                panic!("probe exploded");
            }
            RouteOutcome::completed(&descriptor.path, base_url, 200, 1)
        }
    }

    fn descriptors(count: usize) -> Vec<RouteDescriptor> {
        (0..count)
            .map(|i| RouteDescriptor::get(format!("/route/{i}")))
            .collect()
    }

    #[tokio::test]
    async fn empty_input_returns_immediately() {
        let prober = Arc::new(CountingProber::default());
        let runner = ConcurrentRunner::new(Arc::clone(&prober), 4);

        let outcomes = runner.run(&[], "http://host").await;

        assert!(outcomes.is_empty());
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn every_descriptor_yields_exactly_one_outcome() {
        let input = descriptors(25);
        let runner = ConcurrentRunner::new(Arc::new(CountingProber::default()), 6);

        let outcomes = runner.run(&input, "http://host").await;

        assert_eq!(outcomes.len(), input.len());
        let routes: HashSet<&str> = outcomes.iter().map(|o| o.route.as_str()).collect();
        let expected: HashSet<&str> = input.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(routes, expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn never_exceeds_max_concurrent() {
        let prober = Arc::new(CountingProber::default());
        let runner = ConcurrentRunner::new(Arc::clone(&prober), 3);

        let outcomes = runner.run(&descriptors(20), "http://host").await;

        assert_eq!(outcomes.len(), 20);
        let peak = prober.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak in-flight was {peak}");
        assert!(peak > 1, "pool never ran probes in parallel");
    }

    #[tokio::test]
    async fn zero_max_concurrent_still_runs() {
        let runner = ConcurrentRunner::new(Arc::new(CountingProber::default()), 0);
        assert_eq!(runner.max_concurrent(), 1);

        let outcomes = runner.run(&descriptors(3), "http://host").await;
        assert_eq!(outcomes.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn results_follow_completion_order_by_default() {
        let input: Vec<_> = (1..=5).map(|i| RouteDescriptor::get(format!("/r{i}"))).collect();
        let runner = ConcurrentRunner::new(Arc::new(ReversingProber), 5);

        let outcomes = runner.run(&input, "http://host").await;
        let routes: Vec<_> = outcomes.iter().map(|o| o.route.as_str()).collect();

        assert_eq!(routes, vec!["/r5", "/r4", "/r3", "/r2", "/r1"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stable_order_restores_input_order() {
        let input: Vec<_> = (1..=5).map(|i| RouteDescriptor::get(format!("/r{i}"))).collect();
        let runner = ConcurrentRunner::new(Arc::new(ReversingProber), 5).with_stable_order(true);

        let outcomes = runner.run(&input, "http://host").await;
        let routes: Vec<_> = outcomes.iter().map(|o| o.route.as_str()).collect();

        assert_eq!(routes, vec!["/r1", "/r2", "/r3", "/r4", "/r5"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn panicking_worker_does_not_lose_routes() {
        let input = vec![
            RouteDescriptor::get("/a"),
            RouteDescriptor::get("/boom"),
            RouteDescriptor::get("/b"),
            RouteDescriptor::get("/c"),
        ];
        let runner = ConcurrentRunner::new(Arc::new(PanickingProber), 2);

        let outcomes = runner.run(&input, "http://host").await;

        assert_eq!(outcomes.len(), 4);
        let boom = outcomes.iter().find(|o| o.route == "/boom").unwrap();
        assert_eq!(boom.status_code, 0);
        assert!(!boom.success);
        assert_eq!(boom.error_message.as_deref(), Some(WORKER_LOST_MESSAGE));
        assert_eq!(outcomes.iter().filter(|o| o.success).count(), 3);
    }
}
