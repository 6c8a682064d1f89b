//! Stream counters

/// Running totals kept by the stream loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamStats {
    /// Envelopes written completely
    pub frames_sent: u32,
    /// Bytes of complete envelopes, delimiters and headers included
    pub bytes_sent: u64,
    /// Empty acquisitions since start
    pub capture_retries: u32,
    /// Empty acquisitions since the last sent frame
    pub consecutive_retries: u32,
    /// Envelopes abandoned on a transport error
    pub transport_failures: u32,
    /// Payload size of the most recent sent frame
    pub last_payload_len: usize,
}

impl StreamStats {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completely written envelope
    pub fn record_sent(&mut self, payload_len: usize, envelope_len: usize) {
        self.frames_sent = self.frames_sent.saturating_add(1);
        self.bytes_sent = self.bytes_sent.saturating_add(envelope_len as u64);
        self.consecutive_retries = 0;
        self.last_payload_len = payload_len;
    }

    /// Record an empty acquisition
    pub fn record_retry(&mut self) {
        self.capture_retries = self.capture_retries.saturating_add(1);
        self.consecutive_retries = self.consecutive_retries.saturating_add(1);
    }

    /// Record an abandoned envelope
    pub fn record_transport_failure(&mut self) {
        self.transport_failures = self.transport_failures.saturating_add(1);
    }

    /// Clear all counters
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
