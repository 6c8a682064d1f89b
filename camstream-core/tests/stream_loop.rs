//! Stream loop behavior against fake collaborators

use camstream_core::config::StreamConfig;
use camstream_core::{Cycle, StreamError, StreamLoop, StreamState};
use camstream_hal::{FrameSource, UartTx};
use camstream_protocol::{Delimiter, DEFAULT_DELIMITER};
use embedded_hal::delay::DelayNs;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceEvent {
    Empty,
    Acquire(usize),
    Release(usize),
}

struct TaggedFrame {
    id: usize,
    data: Vec<u8>,
}

impl AsRef<[u8]> for TaggedFrame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Hands out `frames` in order, after `empty_first` empty acquisitions
struct FakeSource {
    frames: Vec<Vec<u8>>,
    empty_first: usize,
    calls: usize,
    next: usize,
    in_flight: bool,
    log: Vec<SourceEvent>,
}

impl FakeSource {
    fn new(frames: Vec<Vec<u8>>) -> Self {
        Self {
            frames,
            empty_first: 0,
            calls: 0,
            next: 0,
            in_flight: false,
            log: Vec::new(),
        }
    }

    fn empty_first(mut self, count: usize) -> Self {
        self.empty_first = count;
        self
    }

    fn acquired(&self) -> usize {
        self.log
            .iter()
            .filter(|e| matches!(e, SourceEvent::Acquire(_)))
            .count()
    }

    fn released(&self) -> usize {
        self.log
            .iter()
            .filter(|e| matches!(e, SourceEvent::Release(_)))
            .count()
    }
}

impl FrameSource for FakeSource {
    type Frame = TaggedFrame;

    fn acquire(&mut self) -> Option<TaggedFrame> {
        assert!(!self.in_flight, "acquire while a frame is still in flight");
        self.calls += 1;
        if self.calls <= self.empty_first {
            self.log.push(SourceEvent::Empty);
            return None;
        }

        let id = self.next;
        self.next += 1;
        self.in_flight = true;
        self.log.push(SourceEvent::Acquire(id));
        Some(TaggedFrame {
            id,
            data: self.frames[id % self.frames.len()].clone(),
        })
    }

    fn release(&mut self, frame: TaggedFrame) {
        assert!(self.in_flight, "release without an acquired frame");
        self.in_flight = false;
        self.log.push(SourceEvent::Release(frame.id));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TxError;

/// Collects written bytes; write number `fail_on` (1-based) puts half its
/// bytes on the wire and then fails
#[derive(Default)]
struct RecordingTx {
    wire: Vec<u8>,
    writes: usize,
    fail_on: Option<usize>,
    flushes: usize,
}

impl RecordingTx {
    fn failing_on(write: usize) -> Self {
        Self {
            fail_on: Some(write),
            ..Self::default()
        }
    }
}

impl UartTx for RecordingTx {
    type Error = TxError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), TxError> {
        self.writes += 1;
        if self.fail_on == Some(self.writes) {
            self.wire.extend_from_slice(&data[..data.len() / 2]);
            return Err(TxError);
        }
        self.wire.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TxError> {
        self.flushes += 1;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingDelay {
    waits_ms: Vec<u32>,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

fn envelope(delim: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(delim);
    out.extend_from_slice(
        format!(
            "Content-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
            payload.len()
        )
        .as_bytes(),
    );
    out.extend_from_slice(delim);
    out.extend_from_slice(payload);
    out.extend_from_slice(delim);
    out
}

fn new_loop(
    source: FakeSource,
    tx: RecordingTx,
) -> StreamLoop<FakeSource, RecordingTx, RecordingDelay> {
    StreamLoop::new(source, tx, RecordingDelay::default(), &StreamConfig::default())
}

#[test]
fn test_ten_byte_frame_wire_bytes() {
    let mut stream = new_loop(FakeSource::new(vec![vec![0xAA; 10]]), RecordingTx::default());

    assert_eq!(stream.step(), Ok(Cycle::Sent { payload_len: 10 }));

    let mut expected = Vec::new();
    expected.extend_from_slice(DEFAULT_DELIMITER);
    expected.extend_from_slice(b"Content-Type: image/jpeg\r\nContent-Length: 10\r\n\r\n");
    expected.extend_from_slice(DEFAULT_DELIMITER);
    expected.extend_from_slice(&[0xAA; 10]);
    expected.extend_from_slice(DEFAULT_DELIMITER);

    assert_eq!(stream.transport().wire, expected);
    assert_eq!(stream.transport().writes, 3);
    assert_eq!(
        stream.source().log,
        vec![SourceEvent::Acquire(0), SourceEvent::Release(0)]
    );
    assert_eq!(stream.state(), StreamState::Acquiring);
}

#[test]
fn test_retry_liveness() {
    let source = FakeSource::new(vec![vec![7; 32]]).empty_first(3);
    let mut stream = new_loop(source, RecordingTx::default());

    for _ in 0..3 {
        assert_eq!(stream.step(), Ok(Cycle::Retried));
        assert_eq!(stream.state(), StreamState::Acquiring);
        assert!(stream.transport().wire.is_empty());
    }
    assert_eq!(stream.stats().consecutive_retries, 3);

    assert_eq!(stream.step(), Ok(Cycle::Sent { payload_len: 32 }));

    let stats = *stream.stats();
    assert_eq!(stats.capture_retries, 3);
    assert_eq!(stats.consecutive_retries, 0);
    assert_eq!(stats.frames_sent, 1);

    let (source, tx, delay) = stream.into_parts();
    assert_eq!(delay.waits_ms, vec![1000, 1000, 1000]);
    assert_eq!(source.log[..3], [SourceEvent::Empty; 3]);
    assert_eq!(tx.wire, envelope(DEFAULT_DELIMITER, &[7; 32]));
}

#[test]
fn test_run_until_stops_after_retries_and_send() {
    let source = FakeSource::new(vec![vec![1, 2, 3]]).empty_first(5);
    let mut stream = new_loop(source, RecordingTx::default());

    assert_eq!(stream.run_until(|stats| stats.frames_sent == 1), Ok(()));

    let (source, tx, delay) = stream.into_parts();
    assert_eq!(delay.waits_ms.len(), 5);
    assert_eq!(source.acquired(), 1);
    assert_eq!(tx.flushes, 1);
}

#[test]
fn test_two_frames_in_order() {
    let first = vec![0x11; 5];
    let second = vec![0x22; 300];
    let source = FakeSource::new(vec![first.clone(), second.clone()]);
    let mut stream = new_loop(source, RecordingTx::default());

    assert_eq!(stream.run_until(|stats| stats.frames_sent == 2), Ok(()));

    let mut expected = envelope(DEFAULT_DELIMITER, &first);
    expected.extend_from_slice(&envelope(DEFAULT_DELIMITER, &second));
    assert_eq!(stream.transport().wire, expected);
    assert_eq!(stream.stats().bytes_sent, expected.len() as u64);
    assert_eq!(stream.stats().last_payload_len, 300);
}

#[test]
fn test_frame_released_on_transport_failure() {
    let payload = vec![0x5A; 64];
    // write 2 is the payload
    let mut stream = new_loop(
        FakeSource::new(vec![payload.clone()]),
        RecordingTx::failing_on(2),
    );

    assert_eq!(stream.step(), Err(StreamError::Transport(TxError)));
    assert_eq!(stream.state(), StreamState::Acquiring);
    assert_eq!(
        stream.source().log,
        vec![SourceEvent::Acquire(0), SourceEvent::Release(0)]
    );

    // Trailer was never attempted
    assert_eq!(stream.transport().writes, 2);
    let stats = stream.stats();
    assert_eq!(stats.transport_failures, 1);
    assert_eq!(stats.frames_sent, 0);
    assert_eq!(stats.bytes_sent, 0);
}

#[test]
fn test_resume_after_failure_starts_with_delimiter() {
    let payload = vec![0x42; 20];
    let mut stream = new_loop(
        FakeSource::new(vec![payload.clone()]),
        RecordingTx::failing_on(3),
    );

    assert!(stream.step().is_err());
    let truncated = stream.transport().wire.len();

    assert_eq!(stream.step(), Ok(Cycle::Sent { payload_len: 20 }));
    let wire = &stream.transport().wire;
    assert!(wire[truncated..].starts_with(DEFAULT_DELIMITER));
    assert_eq!(wire[truncated..], envelope(DEFAULT_DELIMITER, &payload)[..]);
}

#[test]
fn test_one_release_per_acquire_across_outcomes() {
    let source = FakeSource::new(vec![vec![1; 8], vec![2; 16], vec![3; 24]]).empty_first(2);
    let mut stream = new_loop(source, RecordingTx::failing_on(5));

    for _ in 0..7 {
        let _ = stream.step();
    }

    let source = stream.source();
    assert_eq!(source.acquired(), 5);
    assert_eq!(source.acquired(), source.released());

    let mut held = None;
    for event in &source.log {
        match *event {
            SourceEvent::Acquire(id) => {
                assert_eq!(held, None);
                held = Some(id);
            }
            SourceEvent::Release(id) => {
                assert_eq!(held, Some(id));
                held = None;
            }
            SourceEvent::Empty => assert_eq!(held, None),
        }
    }
    assert_eq!(stream.stats().transport_failures, 1);
    assert_eq!(stream.stats().frames_sent, 4);
}

#[test]
fn test_run_returns_transport_error() {
    let mut stream = new_loop(
        FakeSource::new(vec![vec![9; 4]]),
        RecordingTx::failing_on(7),
    );

    let err = stream.run().unwrap_err();
    assert_eq!(err, StreamError::Transport(TxError));
    // Two complete envelopes, then the failure on the first write of the third
    assert_eq!(stream.stats().frames_sent, 2);
    assert_eq!(stream.source().released(), 3);
}

#[test]
fn test_stop_before_first_cycle() {
    let mut stream = new_loop(FakeSource::new(vec![vec![1]]), RecordingTx::default());

    assert_eq!(stream.run_until(|_| true), Ok(()));
    assert!(stream.source().log.is_empty());
    assert_eq!(stream.transport().flushes, 1);
}

#[test]
fn test_empty_payload_skips_empty_write() {
    let mut stream = new_loop(FakeSource::new(vec![Vec::new()]), RecordingTx::default());

    assert_eq!(stream.step(), Ok(Cycle::Sent { payload_len: 0 }));
    assert_eq!(stream.transport().writes, 2);
    assert_eq!(stream.transport().wire, envelope(DEFAULT_DELIMITER, &[]));
}

#[test]
fn test_config_delimiter_and_retry_delay() {
    let mut config = StreamConfig::default();
    config.retry_delay_ms = 250;
    config.delimiter = Delimiter::new(b"\r\n--frame--\r\n").unwrap();

    let mut source = FakeSource::new(vec![vec![0xFF, 0xD8, 0xFF, 0xD9]]).empty_first(1);
    let mut tx = RecordingTx::default();
    let mut delay = RecordingDelay::default();

    {
        let mut stream = StreamLoop::new(&mut source, &mut tx, &mut delay, &config);
        assert_eq!(stream.framer().delimiter(), &config.delimiter);
        assert_eq!(stream.step(), Ok(Cycle::Retried));
        assert_eq!(stream.step(), Ok(Cycle::Sent { payload_len: 4 }));
    }

    assert_eq!(delay.waits_ms, vec![250]);
    assert_eq!(
        tx.wire,
        envelope(b"\r\n--frame--\r\n", &[0xFF, 0xD8, 0xFF, 0xD9])
    );
    assert_eq!(source.released(), 1);
}

#[test]
fn test_reset_stats() {
    let mut stream = new_loop(FakeSource::new(vec![vec![0; 3]]), RecordingTx::default());
    stream.step().unwrap();
    assert_eq!(stream.stats().frames_sent, 1);

    stream.reset_stats();
    assert_eq!(stream.stats().frames_sent, 0);
    assert_eq!(stream.stats().bytes_sent, 0);
}

proptest! {
    #[test]
    fn prop_wire_is_envelopes_in_order(
        payloads in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 1..6),
        empties in 0usize..4,
    ) {
        let count = payloads.len() as u32;
        let source = FakeSource::new(payloads.clone()).empty_first(empties);
        let mut stream = new_loop(source, RecordingTx::default());

        prop_assert_eq!(stream.run_until(|stats| stats.frames_sent == count), Ok(()));

        let mut expected = Vec::new();
        for payload in &payloads {
            expected.extend_from_slice(&envelope(DEFAULT_DELIMITER, payload));
        }
        prop_assert_eq!(&stream.transport().wire, &expected);
        prop_assert_eq!(stream.source().acquired(), payloads.len());
        prop_assert_eq!(stream.source().released(), payloads.len());
        prop_assert_eq!(stream.stats().capture_retries as usize, empties);
    }
}
