use crate::adapter::ActivityAdapter;
use crate::lifecycle::SessionState;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

pub fn install_signal_handler() {
    let _ = ctrlc::set_handler(move || {
        if SHUTDOWN_REQUESTED.load(Ordering::SeqCst) {
            std::process::exit(1);
        }
        SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
        eprintln!("\nshutdown requested, destroying activity...");
    });
}

pub fn shutdown_requested() -> bool {
    SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriverReport {
    pub frames: u64,
    pub delivered: u64,
    pub dropped: u64,
}

/// Fixed-rate frame source standing in for the host's vsync callback.
///
/// Runs on the caller's thread, the same one that delivers lifecycle
/// callbacks, so ticks never race a stop.
#[derive(Debug, Clone, Copy)]
pub struct FrameDriver {
    interval: Duration,
    frame_limit: Option<u64>,
}

impl FrameDriver {
    pub fn new(frame_rate: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / frame_rate.max(1),
            frame_limit: None,
        }
    }

    #[must_use]
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.frame_limit = Some(frames);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Tick `adapter` until the frame limit is hit, a shutdown is requested,
    /// or the session terminates.
    pub fn run(&self, adapter: &mut ActivityAdapter) -> DriverReport {
        let mut report = DriverReport::default();
        info!(
            "frame driver started ({} ms per frame)",
            self.interval.as_millis()
        );

        loop {
            if shutdown_requested() {
                debug!("frame driver stopping: shutdown requested");
                break;
            }
            if adapter.state() == SessionState::Terminated {
                debug!("frame driver stopping: session terminated");
                break;
            }
            if self.frame_limit.is_some_and(|limit| report.frames >= limit) {
                break;
            }

            let frame_start = Instant::now();
            if adapter.tick() {
                report.delivered += 1;
            } else {
                report.dropped += 1;
            }
            report.frames += 1;

            let elapsed = frame_start.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }

        info!(
            "frame driver stopped after {} frames ({} delivered)",
            report.frames, report.delivered
        );
        report
    }
}
