//! Fixed-rate cycle driver
//!
//! The core assumes an external driver invoking it at a bounded period;
//! this is that driver for hosts that do not bring their own. Runs a
//! callback at a fixed rate with overrun accounting and a stoppable spawn
//! handle. The callback receives the iteration count and the measured time
//! since the previous iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Configuration for the cycle driver
#[derive(Debug, Clone)]
pub struct CycleDriverConfig {
    /// Target cycle rate in Hz
    pub rate_hz: f64,
    /// Name for log messages
    pub name: Arc<str>,
    /// Whether to warn when a cycle overruns its period
    pub warn_on_overrun: bool,
}

impl Default for CycleDriverConfig {
    fn default() -> Self {
        Self {
            rate_hz: 100.0,
            name: "control_cycle".into(),
            warn_on_overrun: true,
        }
    }
}

impl CycleDriverConfig {
    /// Create a config with the given rate
    pub fn new(rate_hz: f64) -> Self {
        Self {
            rate_hz,
            ..Default::default()
        }
    }

    /// Set the driver name
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = name.into();
        self
    }

    /// The target cycle period
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_hz)
    }
}

/// Timing statistics for a running driver
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleStats {
    /// Completed cycles
    pub iterations: u64,
    /// Cycles whose execution exceeded the period
    pub overruns: u64,
    /// Execution time of the most recent cycle
    pub last_execution: Duration,
    /// Longest execution time seen
    pub max_execution: Duration,
}

impl CycleStats {
    fn update(&mut self, execution: Duration, period: Duration) {
        self.iterations += 1;
        self.last_execution = execution;
        self.max_execution = self.max_execution.max(execution);
        if execution > period {
            self.overruns += 1;
        }
    }

    /// Fraction of cycles that overran, 0.0 to 1.0
    pub fn overrun_ratio(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.overruns as f64 / self.iterations as f64
        }
    }
}

/// Handle to a spawned cycle driver
pub struct CycleHandle {
    running: Arc<AtomicBool>,
    stats: Arc<Mutex<CycleStats>>,
    thread: Option<JoinHandle<()>>,
}

impl CycleHandle {
    /// Whether the driver is still running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Current timing statistics
    pub fn stats(&self) -> CycleStats {
        *self.stats.lock()
    }

    /// Signal the driver to stop after the current cycle
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Stop and wait for the driver thread to finish
    pub fn join(mut self) {
        self.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// A fixed-rate cycle driver
pub struct CycleDriver;

impl CycleDriver {
    /// Run the driver on the current thread, blocking until the callback
    /// returns false
    ///
    /// The callback receives the iteration count and the time since the
    /// previous iteration.
    pub fn run<F>(config: CycleDriverConfig, mut callback: F) -> CycleStats
    where
        F: FnMut(u64, Duration) -> bool,
    {
        let period = config.period();
        let mut stats = CycleStats::default();
        let mut iteration = 0u64;
        let mut last_start = Instant::now();

        loop {
            let start = Instant::now();
            let dt = start.duration_since(last_start);
            last_start = start;

            let should_continue = callback(iteration, dt);
            let execution = start.elapsed();

            if !should_continue {
                break;
            }
            stats.update(execution, period);

            if let Some(remaining) = period.checked_sub(execution) {
                thread::sleep(remaining);
            } else if config.warn_on_overrun {
                tracing::warn!(
                    "{}: cycle overrun by {:?}",
                    config.name,
                    execution - period
                );
            }
            iteration += 1;
        }

        stats
    }

    /// Run the driver until `duration` elapses or the callback returns false
    pub fn run_for<F>(config: CycleDriverConfig, duration: Duration, mut callback: F) -> CycleStats
    where
        F: FnMut(u64, Duration) -> bool,
    {
        let start = Instant::now();
        Self::run(config, |iteration, dt| {
            if start.elapsed() >= duration {
                return false;
            }
            callback(iteration, dt)
        })
    }

    /// Spawn the driver on its own thread, returning a stop handle
    pub fn spawn<F>(config: CycleDriverConfig, mut callback: F) -> CycleHandle
    where
        F: FnMut(u64, Duration) -> bool + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(Mutex::new(CycleStats::default()));

        let running_thread = running.clone();
        let stats_thread = stats.clone();
        let period = config.period();

        let thread = thread::spawn(move || {
            let mut iteration = 0u64;
            let mut last_start = Instant::now();

            while running_thread.load(Ordering::Relaxed) {
                let start = Instant::now();
                let dt = start.duration_since(last_start);
                last_start = start;

                let should_continue = callback(iteration, dt);
                let execution = start.elapsed();

                if !should_continue {
                    running_thread.store(false, Ordering::Relaxed);
                    break;
                }
                stats_thread.lock().update(execution, period);

                if let Some(remaining) = period.checked_sub(execution) {
                    thread::sleep(remaining);
                } else if config.warn_on_overrun {
                    tracing::warn!(
                        "{}: cycle overrun by {:?}",
                        config.name,
                        execution - period
                    );
                }
                iteration += 1;
            }
        });

        CycleHandle {
            running,
            stats,
            thread: Some(thread),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_counts_iterations() {
        let config = CycleDriverConfig::new(1000.0).with_name("test");
        let stats = CycleDriver::run(config, |iteration, _dt| iteration < 10);
        assert_eq!(stats.iterations, 10);
        assert_eq!(stats.overrun_ratio(), 0.0);
    }

    #[test]
    fn test_run_holds_the_period() {
        let config = CycleDriverConfig::new(100.0); // 10 ms period
        let start = Instant::now();
        let stats = CycleDriver::run(config, |iteration, _dt| iteration < 5);
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(40));
        assert!(elapsed <= Duration::from_millis(200));
        assert_eq!(stats.iterations, 5);
    }

    #[test]
    fn test_spawn_and_stop() {
        let config = CycleDriverConfig::new(200.0);
        let handle = CycleDriver::spawn(config, |_iteration, _dt| true);
        assert!(handle.is_running());

        thread::sleep(Duration::from_millis(50));
        handle.stop();
        assert!(handle.stats().iterations > 0);
        handle.join();
    }

    #[test]
    fn test_run_for_stops_on_deadline() {
        let config = CycleDriverConfig::new(100.0);
        let stats = CycleDriver::run_for(config, Duration::from_millis(100), |_iteration, _dt| {
            true
        });
        assert!(stats.iterations >= 5 && stats.iterations <= 20);
    }
}
