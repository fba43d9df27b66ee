//! Redraw cadence.
//!
//! The host drives ticks (an animation-frame callback in the browser, a
//! timer or test loop elsewhere). The cadence only records whether the grid
//! is attached and which frame request is outstanding, so detaching can
//! cancel it and late ticks are ignored.

/// Handle the host uses to cancel a scheduled frame (a
/// `requestAnimationFrame` id in the browser)
pub type FrameHandle = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CadenceState {
    #[default]
    Detached,
    Attached,
}

#[derive(Debug, Clone, Default)]
pub struct FrameCadence {
    state: CadenceState,
    pending: Option<FrameHandle>,
    ticks: u64,
}

impl FrameCadence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CadenceState {
        self.state
    }

    pub fn is_attached(&self) -> bool {
        self.state == CadenceState::Attached
    }

    /// Ticks accepted since construction
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn attach(&mut self) {
        self.state = CadenceState::Attached;
    }

    /// Stop ticking. Returns the outstanding frame request, if any, for the
    /// host to cancel.
    pub fn detach(&mut self) -> Option<FrameHandle> {
        self.state = CadenceState::Detached;
        self.pending.take()
    }

    /// Record the next frame request. Ignored while detached.
    pub fn schedule(&mut self, handle: FrameHandle) -> bool {
        if self.is_attached() {
            self.pending = Some(handle);
        }
        self.is_attached()
    }

    /// Consume the outstanding request. True when the tick should run.
    pub fn tick(&mut self) -> bool {
        self.pending = None;
        if self.is_attached() {
            self.ticks = self.ticks.saturating_add(1);
        }
        self.is_attached()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_by_default() {
        let mut cadence = FrameCadence::new();
        assert_eq!(cadence.state(), CadenceState::Detached);
        assert!(!cadence.tick());
        assert_eq!(cadence.ticks(), 0);
    }

    #[test]
    fn test_attach_tick_detach() {
        let mut cadence = FrameCadence::new();
        cadence.attach();
        assert!(cadence.schedule(7));
        assert_eq!(cadence.pending(), Some(7));
        assert!(cadence.tick());
        assert_eq!(cadence.pending(), None);

        assert!(cadence.schedule(8));
        assert_eq!(cadence.detach(), Some(8));
        assert!(!cadence.tick());
        assert_eq!(cadence.ticks(), 1);
    }

    #[test]
    fn test_schedule_after_detach_is_dropped() {
        let mut cadence = FrameCadence::new();
        cadence.attach();
        cadence.detach();
        assert!(!cadence.schedule(3));
        assert_eq!(cadence.pending(), None);
        assert_eq!(cadence.detach(), None);
    }
}
