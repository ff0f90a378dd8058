//! Keep-alive pacing for the broker session.
//!
//! The broker only counts packets the client sends, so inbound commands never
//! postpone the next keep-alive. Every outbound packet does.

/// Millisecond schedule of outbound keep-alive packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAlive {
    interval_ms: u64,
    last_sent_ms: u64,
}

impl KeepAlive {
    /// Sends at half the negotiated keep-alive, leaving the broker's 1.5x grace unused.
    pub fn new(keep_alive_secs: u16, now_ms: u64) -> Self {
        Self {
            interval_ms: u64::from(keep_alive_secs) * 1000 / 2,
            last_sent_ms: now_ms,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Records an outbound packet.
    pub fn sent(&mut self, now_ms: u64) {
        self.last_sent_ms = now_ms;
    }

    pub fn deadline_ms(&self) -> u64 {
        self.last_sent_ms.saturating_add(self.interval_ms)
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms >= self.deadline_ms()
    }

    /// How long the session may wait for inbound traffic, never past the deadline.
    pub fn wait_ms(&self, now_ms: u64, service_ms: u64) -> u64 {
        self.deadline_ms().saturating_sub(now_ms).min(service_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_the_negotiated_interval() {
        let keep_alive = KeepAlive::new(30, 0);
        assert_eq!(keep_alive.interval_ms(), 15_000);
        assert!(!keep_alive.is_due(14_999));
        assert!(keep_alive.is_due(15_000));
    }

    #[test]
    fn inbound_traffic_does_not_postpone() {
        let keep_alive = KeepAlive::new(30, 1_000);

        // a command every second, session never idle
        let mut now = 1_000;
        let mut waits = 0;
        while !keep_alive.is_due(now) {
            let wait = keep_alive.wait_ms(now, 5_000);
            assert!(wait > 0);
            now += wait.min(1_000);
            waits += 1;
        }
        assert_eq!(now, 16_000);
        assert_eq!(waits, 15);
    }

    #[test]
    fn sending_restarts_the_interval() {
        let mut keep_alive = KeepAlive::new(30, 0);
        keep_alive.sent(10_000);
        assert!(!keep_alive.is_due(15_000));
        assert_eq!(keep_alive.deadline_ms(), 25_000);
        assert!(keep_alive.is_due(25_000));
    }

    #[test]
    fn wait_shrinks_to_the_deadline() {
        let keep_alive = KeepAlive::new(30, 0);
        assert_eq!(keep_alive.wait_ms(0, 5_000), 5_000);
        assert_eq!(keep_alive.wait_ms(12_000, 5_000), 3_000);
        assert_eq!(keep_alive.wait_ms(15_000, 5_000), 0);
        assert_eq!(keep_alive.wait_ms(40_000, 5_000), 0);
    }

    #[test]
    fn zero_keep_alive_is_always_due() {
        let keep_alive = KeepAlive::new(0, 500);
        assert!(keep_alive.is_due(500));
        assert_eq!(keep_alive.wait_ms(500, 5_000), 0);
    }
}
