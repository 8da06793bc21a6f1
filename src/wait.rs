//! Busy-wait polling

use crate::error::{Errno, Result};

/// How long a driver keeps polling a hardware condition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum WaitPolicy {
    /// Spin until the condition holds. A wedged bus blocks forever.
    #[default]
    Forever,
    /// Give up with [`Errno::Timeout`] after this many unsuccessful polls.
    Spins(u32),
}

/// Poll `ready` until it returns `true` or `policy` runs out.
pub fn spin_until<F>(policy: WaitPolicy, mut ready: F) -> Result<()>
where
    F: FnMut() -> bool,
{
    match policy {
        WaitPolicy::Forever => {
            while !ready() {
                core::hint::spin_loop();
            }
            Ok(())
        }
        WaitPolicy::Spins(limit) => {
            for _ in 0..limit {
                if ready() {
                    return Ok(());
                }
                core::hint::spin_loop();
            }
            // one last look so a limit of 0 still samples the condition
            if ready() {
                Ok(())
            } else {
                Err(Errno::Timeout)
            }
        }
    }
}
