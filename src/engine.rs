use crate::clicker::Clicker;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// How often a waiting worker looks at its stop flag.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Period used when the configured rate is unusable.
pub const FALLBACK_INTERVAL: Duration = Duration::from_millis(100);

pub fn interval_for(clicks_per_sec: f64) -> Duration {
    if !(clicks_per_sec.is_finite() && clicks_per_sec > 0.0) {
        return FALLBACK_INTERVAL;
    }
    // a tiny rate means a huge period, not the fallback
    Duration::try_from_secs_f64(1.0 / clicks_per_sec).unwrap_or(Duration::MAX)
}

// -------------- Click Job --------------
struct ClickJob {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ClickJob {
    fn spawn(
        clicker: Arc<dyn Clicker>,
        clicks: Arc<AtomicU64>,
        interval: Duration,
        delay: Duration,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = Arc::clone(&running);

        let handle = thread::spawn(move || {
            if !delay.is_zero() && !sleep_while_running(&running_clone, delay) {
                debug!("click job cancelled during start delay");
                return;
            }

            let mut next = Instant::now();
            while running_clone.load(Ordering::SeqCst) {
                clicker.left_click();
                clicks.fetch_add(1, Ordering::SeqCst);

                // Schedule against the previous deadline so sleep overshoot
                // doesn't accumulate; if we're already late, don't burst.
                let now = Instant::now();
                let wait = match next.checked_add(interval) {
                    Some(deadline) => {
                        next = deadline.max(now);
                        next - now
                    }
                    // past the clock's range; sleep_while_running polls forever
                    None => interval,
                };
                if !sleep_while_running(&running_clone, wait) { break; }
            }
            debug!("click job exited");
        });

        Self { running, handle: Some(handle) }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn stop(&self) { self.running.store(false, Ordering::SeqCst); }

    fn join(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("click job panicked");
            }
        }
    }
}

/// Sleeps for `total` in slices of at most [`POLL_INTERVAL`]. Returns false
/// as soon as the flag drops.
fn sleep_while_running(running: &AtomicBool, total: Duration) -> bool {
    let deadline = Instant::now().checked_add(total);
    loop {
        if !running.load(Ordering::SeqCst) { return false; }
        let now = Instant::now();
        let step = match deadline {
            Some(d) if now >= d => return true,
            Some(d) => (d - now).min(POLL_INTERVAL),
            None => POLL_INTERVAL,
        };
        thread::sleep(step);
    }
}

// -------------- Click Engine --------------
/// Owns at most one click job and the click counter shared by all of them.
#[derive(Clone)]
pub struct ClickEngine {
    clicker: Arc<dyn Clicker>,
    job: Arc<Mutex<Option<ClickJob>>>,
    clicks: Arc<AtomicU64>,
}

impl ClickEngine {
    pub fn new(clicker: Arc<dyn Clicker>) -> Self {
        Self {
            clicker,
            job: Arc::new(Mutex::new(None)),
            clicks: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns false if a job was already running.
    pub fn start(&self, clicks_per_sec: f64, delay: Duration) -> bool {
        let mut job = self.job.lock();
        if job.as_ref().is_some_and(ClickJob::is_running) { return false; }

        let interval = interval_for(clicks_per_sec);
        info!("clicking at {clicks_per_sec} cps (every {interval:?}) after {delay:?}");
        let clicker = Arc::clone(&self.clicker);
        *job = Some(ClickJob::spawn(clicker, Arc::clone(&self.clicks), interval, delay));
        true
    }

    /// Signals the current job and returns immediately. Returns whether a
    /// job was running.
    pub fn stop(&self) -> bool {
        let Some(job) = self.job.lock().take() else { return false };
        let was_running = job.is_running();
        job.stop();
        if was_running { info!("clicking stopped after {} clicks", self.click_count()); }
        was_running
    }

    /// Stops and waits for the worker thread to exit.
    pub fn shutdown(&self) {
        if let Some(job) = self.job.lock().take() { job.join(); }
    }

    pub fn is_clicking(&self) -> bool {
        self.job.lock().as_ref().is_some_and(ClickJob::is_running)
    }

    pub fn click_count(&self) -> u64 { self.clicks.load(Ordering::SeqCst) }

    pub fn reset_count(&self) { self.clicks.store(0, Ordering::SeqCst); }
}
