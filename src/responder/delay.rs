// Cosmetic "thinking" delay before template replies

use rand::Rng;
use std::time::Duration;

/// Strategy for how long to pause before sending a template reply
pub trait ThinkingDelay: Send + Sync {
    fn duration(&self) -> Duration;
}

/// No pause; used in tests and for the CLI
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl ThinkingDelay for NoDelay {
    fn duration(&self) -> Duration {
        Duration::ZERO
    }
}

/// Uniformly random pause between `min` and `max`
#[derive(Debug, Clone, Copy)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self::new(Duration::from_millis(800), Duration::from_millis(3300))
    }
}

impl ThinkingDelay for RandomDelay {
    fn duration(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
