//! Scheduling priority during the timing-critical capture.

/// Best-effort control over the calling thread's scheduling priority.
///
/// Pulse widths are measured by counting polling iterations, so a
/// preemption in the middle of a transmission corrupts the reading. Hosts
/// with a preemptive scheduler can implement this to run the capture at
/// real-time priority. Neither method reports failure; an elevation that
/// did not happen only narrows the timing margin.
pub trait SchedulingPriority {
    /// Requests the highest available real-time priority.
    fn elevate(&mut self);

    /// Returns to the default scheduling policy and priority.
    fn restore(&mut self);
}

impl<T: SchedulingPriority + ?Sized> SchedulingPriority for &mut T {
    fn elevate(&mut self) {
        T::elevate(self)
    }

    fn restore(&mut self) {
        T::restore(self)
    }
}

/// Leaves the priority alone.
///
/// The right choice on bare-metal targets, where nothing preempts the
/// driver except interrupts.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NoPriority;

impl SchedulingPriority for NoPriority {
    fn elevate(&mut self) {}

    fn restore(&mut self) {}
}

/// Elevated priority for as long as the guard lives.
///
/// Restoration happens in `Drop`, so early returns and `?` in the capture
/// path cannot leave the process at real-time priority.
pub struct PriorityGuard<'a, P: SchedulingPriority + ?Sized> {
    priority: &'a mut P,
}

impl<'a, P: SchedulingPriority + ?Sized> PriorityGuard<'a, P> {
    /// Elevates `priority` and returns the guard that will restore it.
    pub fn new(priority: &'a mut P) -> Self {
        priority.elevate();
        Self { priority }
    }
}

impl<P: SchedulingPriority + ?Sized> Drop for PriorityGuard<'_, P> {
    fn drop(&mut self) {
        self.priority.restore();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records calls so tests can check that every elevation is undone.
    #[derive(Debug, Default)]
    pub(crate) struct CountingPriority {
        pub elevated: u32,
        pub restored: u32,
        pub active: bool,
    }

    impl SchedulingPriority for CountingPriority {
        fn elevate(&mut self) {
            self.elevated += 1;
            self.active = true;
        }

        fn restore(&mut self) {
            self.restored += 1;
            self.active = false;
        }
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let mut priority = CountingPriority::default();
        {
            let _guard = PriorityGuard::new(&mut priority);
        }
        assert_eq!(priority.elevated, 1);
        assert_eq!(priority.restored, 1);
        assert!(!priority.active);
    }

    #[test]
    fn test_guard_restores_on_early_return() {
        fn bail(priority: &mut CountingPriority) -> Result<(), ()> {
            let _guard = PriorityGuard::new(priority);
            let capture: Result<(), ()> = Err(());
            capture?;
            Ok(())
        }

        let mut priority = CountingPriority::default();
        assert!(bail(&mut priority).is_err());
        assert_eq!(priority.restored, 1);
        assert!(!priority.active);
    }
}
