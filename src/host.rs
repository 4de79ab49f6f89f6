//! Capabilities for running the driver as a process on a general-purpose
//! OS, e.g. a Raspberry Pi polling the sensor through sysfs or cdev GPIO.
//!
//! The yielding delay is whatever `DelayNs` the GPIO crate already
//! provides (`linux_embedded_hal::Delay` sleeps the thread); only the
//! non-yielding side lives here.

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

#[cfg(target_os = "linux")]
use crate::priority::SchedulingPriority;

/// A delay that burns CPU until the deadline instead of sleeping.
///
/// A thread sleep may overshoot by a whole scheduler tick; this one
/// returns within microseconds of the requested time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpinDelay;

impl SpinDelay {
    fn spin_for(duration: Duration) {
        let start = Instant::now();
        while start.elapsed() < duration {
            core::hint::spin_loop();
        }
    }
}

impl DelayNs for SpinDelay {
    fn delay_ns(&mut self, ns: u32) {
        Self::spin_for(Duration::from_nanos(ns.into()));
    }

    fn delay_us(&mut self, us: u32) {
        Self::spin_for(Duration::from_micros(us.into()));
    }

    fn delay_ms(&mut self, ms: u32) {
        Self::spin_for(Duration::from_millis(ms.into()));
    }
}

/// Switches the process to `SCHED_FIFO` at maximum priority for the
/// capture and back to `SCHED_OTHER` afterwards.
///
/// Needs `CAP_SYS_NICE` (in practice: root). Without it the calls fail, a
/// warning is logged and the read goes ahead at normal priority.
#[cfg(target_os = "linux")]
#[derive(Clone, Copy, Debug, Default)]
pub struct RealtimeScheduler;

#[cfg(target_os = "linux")]
impl RealtimeScheduler {
    fn set_scheduler(policy: libc::c_int, priority: libc::c_int) -> Result<(), i32> {
        // SAFETY: `sched_param` is plain old data, so an all-zero value is
        // valid. pid 0 is the calling process.
        let rc = unsafe {
            let mut param: libc::sched_param = core::mem::zeroed();
            param.sched_priority = priority;
            libc::sched_setscheduler(0, policy, &param)
        };
        if rc == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error()
                .raw_os_error()
                .unwrap_or_default())
        }
    }
}

#[cfg(target_os = "linux")]
impl SchedulingPriority for RealtimeScheduler {
    fn elevate(&mut self) {
        // SAFETY: no pointers involved.
        let max = unsafe { libc::sched_get_priority_max(libc::SCHED_FIFO) };
        if let Err(errno) = Self::set_scheduler(libc::SCHED_FIFO, max) {
            warn!("could not switch to SCHED_FIFO (errno {})", errno);
        }
    }

    fn restore(&mut self) {
        if let Err(errno) = Self::set_scheduler(libc::SCHED_OTHER, 0) {
            warn!("could not restore SCHED_OTHER (errno {})", errno);
        }
    }
}
