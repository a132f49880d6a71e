use std::time::Duration;

use tokio::time::Instant;

/// Fixed-delay debounce: every touch pushes the deadline out by `delay`.
#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Debounce {
            delay,
            deadline: None,
        }
    }

    pub fn touch(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_touch_restarts_window() {
        let mut debounce = Debounce::new(Duration::from_millis(1000));
        assert!(debounce.deadline().is_none());

        let start = Instant::now();
        debounce.touch();
        tokio::time::advance(Duration::from_millis(600)).await;
        debounce.touch();
        assert_eq!(debounce.deadline(), Some(start + Duration::from_millis(1600)));

        debounce.cancel();
        assert!(debounce.deadline().is_none());
    }
}
