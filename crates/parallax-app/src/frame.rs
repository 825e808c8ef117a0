//! Frame scheduling for the headless host.
//!
//! Nothing repeats on its own: a view asks for the next frame with
//! [`FrameScheduler::request_frame`] from inside every frame callback and
//! cancels the outstanding request when it is torn down. The host loop keeps
//! running only while a request is pending.

use tracing::warn;

/// Maximum elapsed time fed into one frame, in seconds.
///
/// A host that stalls (debugger, suspended tab, slow disk) would otherwise
/// hand the field one huge step and make it jump.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Opaque token for a pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Queue of one-shot frame requests, in the spirit of a display refresh callback.
///
/// Several views may share one scheduler; each holds its own handle.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for one more frame.
    pub fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    /// Cancel `handle` if it is still pending. Stale handles are ignored.
    pub fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|pending| *pending != handle);
    }

    /// Take every pending request for the host to run this frame.
    ///
    /// Requests made while running them belong to the next frame.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Turns frame timestamps into elapsed seconds.
///
/// Elapsed time is always measured from the previous frame's timestamp, so
/// scroll speed stays tied to wall time whatever the frame rate.
#[derive(Debug, Default)]
pub struct FrameClock {
    previous: Option<f64>,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start measuring from `timestamp` (seconds).
    pub fn start(&mut self, timestamp: f64) {
        self.previous = Some(timestamp);
    }

    /// Elapsed seconds since the previous frame, clamped to `[0, MAX_FRAME_TIME]`.
    ///
    /// The first frame after construction yields zero. Timestamps that go
    /// backwards or are not finite also yield zero.
    pub fn tick(&mut self, timestamp: f64) -> f64 {
        self.frame_count += 1;
        if !timestamp.is_finite() {
            return 0.0;
        }
        let Some(previous) = self.previous.replace(timestamp) else {
            return 0.0;
        };

        let elapsed = timestamp - previous;
        if elapsed <= 0.0 {
            return 0.0;
        }
        if elapsed > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                elapsed * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            return MAX_FRAME_TIME;
        }
        elapsed
    }

    /// Frames measured so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_starts_idle() {
        let mut scheduler = FrameScheduler::new();
        assert!(scheduler.is_idle());
        assert!(scheduler.take_due().is_empty());
    }

    #[test]
    fn test_request_is_taken_once() {
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.request_frame();
        assert!(!scheduler.is_idle());
        assert_eq!(scheduler.take_due(), vec![handle]);
        // No automatic repetition.
        assert!(scheduler.take_due().is_empty());
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_cancel_pending_request() {
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.request_frame();
        scheduler.cancel_frame(handle);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn test_cancel_only_affects_own_request() {
        let mut scheduler = FrameScheduler::new();
        let a = scheduler.request_frame();
        let b = scheduler.request_frame();
        assert_ne!(a, b);
        assert_eq!(scheduler.pending_count(), 2);
        scheduler.cancel_frame(a);
        assert_eq!(scheduler.take_due(), vec![b]);
    }

    #[test]
    fn test_stale_cancel_is_ignored() {
        let mut scheduler = FrameScheduler::new();
        let old = scheduler.request_frame();
        scheduler.take_due();
        let new = scheduler.request_frame();
        scheduler.cancel_frame(old);
        assert_eq!(scheduler.take_due(), vec![new]);
    }

    #[test]
    fn test_clock_first_frame_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick(12.5), 0.0);
        assert!((clock.tick(12.516) - 0.016).abs() < 1e-9);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn test_clock_measures_from_previous_frame() {
        let mut clock = FrameClock::new();
        clock.start(0.0);
        let frame_times = [0.017, 0.015, 0.020, 0.016, 0.033];
        let mut now = 0.0;
        let mut total = 0.0;
        for ft in frame_times {
            now += ft;
            let elapsed = clock.tick(now);
            assert!((elapsed - ft).abs() < 1e-9);
            total += elapsed;
        }
        assert!((total - now).abs() < 1e-9);
    }

    #[test]
    fn test_clock_identical_timestamps() {
        let mut clock = FrameClock::new();
        clock.start(1.0);
        assert_eq!(clock.tick(1.0), 0.0);
        assert_eq!(clock.tick(1.0), 0.0);
    }

    #[test]
    fn test_clock_clamps_long_gaps() {
        let mut clock = FrameClock::new();
        clock.start(0.0);
        assert_eq!(clock.tick(5.0), MAX_FRAME_TIME);
    }

    #[test]
    fn test_clock_ignores_backwards_time() {
        let mut clock = FrameClock::new();
        clock.start(10.0);
        assert_eq!(clock.tick(9.0), 0.0);
        assert!((clock.tick(9.1) - 0.1).abs() < 1e-9);
        assert_eq!(clock.tick(f64::NAN), 0.0);
    }
}
