use std::time::{Duration, Instant};

/// Scoped timer: logs when it starts and, on drop, how long it ran.
pub struct Stopwatch {
    name: String,
    start: Instant,
}

impl Stopwatch {
    pub fn start(name: impl Into<String>) -> Self {
        let name = name.into();
        log::debug!("Starting timer for {}", name);
        Self {
            name,
            start: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        let millis = self.start.elapsed().as_secs_f64() * 1e3;
        log::info!("Timer for {}: {:.3} ms", self.name, millis);
    }
}
