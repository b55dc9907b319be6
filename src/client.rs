//! Main [`EventLogger`] client implementation.
//!
//! This module provides the high-level [`EventLogger`] session that combines
//! the transport, the line framer, and the record parser into a unified
//! interface. The session is single-task and poll-driven: no background
//! tasks, all reads bounded by the transport's read timeout.

use std::time::{Duration, SystemTime};

use crate::error::{Error, Result};
use crate::protocol::{Command, LineFramer, MAX_ADC_VALUE, Record, parse_record};
use crate::transport::{SerialTransport, Transport, serial::SerialConfig};

/// Longest click the driver will simulate. Holding the switch output closed
/// for longer risks damaging whatever it drives.
pub const MAX_CLICK_DURATION_MS: u64 = 100;

/// Substring identifying the firmware version line in an info reply.
pub const FIRMWARE_ID: &str = "Hardware Event Logger";

/// How long to give the device to answer an info request.
const INFO_REPLY_DELAY: Duration = Duration::from_millis(50);

/// Samples collected over one wall-clock window, as two parallel sequences
/// preserving arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleWindow {
    /// Device timestamps in seconds.
    pub timestamps: Vec<f64>,
    /// ADC sample values, in arrival order.
    pub values: Vec<i32>,
}

impl SampleWindow {
    fn push(&mut self, timestamp: f64, value: i32) {
        self.timestamps.push(timestamp);
        self.values.push(value);
    }

    /// Number of samples collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no samples were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean of the sample values, or `None` for an empty window.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let sum: f64 = self.values.iter().map(|&v| f64::from(v)).sum();
        Some(sum / self.values.len() as f64)
    }
}

/// Client session for a Hardware Event Logger device.
///
/// Owns the transport handle and the pending line buffer exclusively;
/// records are produced one batch at a time and handed straight to the
/// caller, with no retained history.
pub struct EventLogger<T> {
    transport: T,
    framer: LineFramer,
}

impl EventLogger<SerialTransport> {
    /// Creates a new session for a serial port with default settings.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyUSB0")
    #[must_use]
    pub fn serial(port: impl Into<String>) -> Self {
        Self::with_serial_config(SerialConfig::new(port))
    }

    /// Creates a new session with custom serial configuration.
    #[must_use]
    pub fn with_serial_config(config: SerialConfig) -> Self {
        Self::new(SerialTransport::new(config))
    }
}

impl<T: Transport> EventLogger<T> {
    /// Creates a new session over the given transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            framer: LineFramer::new(),
        }
    }

    /// Connects to the device.
    pub async fn connect(&mut self) -> Result<()> {
        self.transport.connect().await?;
        self.framer.clear();
        Ok(())
    }

    /// Disconnects from the device.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.transport.disconnect().await
    }

    /// Returns true if connected.
    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    /// Discards any input waiting in the OS buffer along with the pending
    /// partial line, so the next read starts on fresh data.
    pub async fn flush_input(&mut self) -> Result<()> {
        self.transport.flush_input().await?;
        self.framer.clear();
        Ok(())
    }

    /// Toggles the DTR line as an out-of-band "t=0" marker and returns the
    /// wall-clock instant of the toggle.
    pub async fn sync(&mut self) -> Result<SystemTime> {
        self.transport.sync().await
    }

    /// Drains all records currently available on the link.
    ///
    /// Reads whatever bytes have arrived and runs them through the line
    /// framer; an incomplete trailing line is carried over to the next call.
    /// An empty vec means no complete records this tick.
    pub async fn poll_records(&mut self) -> Result<Vec<Record>> {
        let chunk = self.transport.read_available().await?;
        Ok(self.framer.feed(&chunk))
    }

    /// Reads and parses a single line, waiting at most one read timeout.
    ///
    /// This path frames on the transport's own line delivery and does not
    /// touch the pending buffer used by [`poll_records`](Self::poll_records).
    pub async fn read_record(&mut self) -> Result<Option<Record>> {
        let Some(line) = self.transport.read_line().await? else {
            return Ok(None);
        };
        Ok(parse_record(&line))
    }

    async fn send_command(&mut self, command: Command) -> Result<()> {
        tracing::debug!("sending command: {}", command.token());
        self.transport.send(command.encode()).await
    }

    /// Turns ADC value reporting on or off.
    pub async fn set_adc_reporting(&mut self, report: bool) -> Result<()> {
        let command = if report { Command::AdcOn } else { Command::AdcOff };
        self.send_command(command).await
    }

    /// Engages or releases the autoclick output.
    pub async fn set_autoclick(&mut self, active: bool) -> Result<()> {
        let command = if active {
            Command::AutoclickOn
        } else {
            Command::AutoclickOff
        };
        self.send_command(command).await
    }

    /// Presses the simulated mouse button.
    pub async fn mouse_down(&mut self) -> Result<()> {
        self.set_autoclick(true).await
    }

    /// Releases the simulated mouse button.
    pub async fn mouse_up(&mut self) -> Result<()> {
        self.set_autoclick(false).await
    }

    /// Simulates a click: engage, hold for `duration_ms`, release.
    ///
    /// Fails with [`Error::ClickTooLong`] before any I/O if `duration_ms`
    /// exceeds [`MAX_CLICK_DURATION_MS`].
    pub async fn click(&mut self, duration_ms: u64) -> Result<()> {
        if duration_ms > MAX_CLICK_DURATION_MS {
            return Err(Error::ClickTooLong {
                requested_ms: duration_ms,
                max_ms: MAX_CLICK_DURATION_MS,
            });
        }
        self.mouse_down().await?;
        tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        self.mouse_up().await
    }

    /// Queries the device for its firmware version string.
    ///
    /// Sends the info command, waits briefly, then scans the reply for the
    /// line identifying the firmware. Returns `None` if no such line shows
    /// up, which usually means the device is still streaming or absent.
    pub async fn query_firmware_version(&mut self) -> Result<Option<String>> {
        // Drain anything already in flight so the reply scan starts clean.
        let stale = self.transport.read_available().await?;
        if !stale.is_empty() {
            let dropped = self.framer.feed(&stale);
            if !dropped.is_empty() {
                tracing::debug!("discarded {} records queued before info request", dropped.len());
            }
        }

        self.send_command(Command::Info).await?;
        tokio::time::sleep(INFO_REPLY_DELAY).await;

        let reply = self.transport.read_available().await?;
        let text = String::from_utf8_lossy(&reply);
        for line in text.lines() {
            let line = line.trim();
            if line.contains(FIRMWARE_ID) {
                return Ok(Some(line.to_owned()));
            }
        }
        Ok(None)
    }

    /// Collects ADC samples for `window` of wall-clock time.
    ///
    /// Repeatedly reads single lines until the window closes. Event records
    /// are skipped, as are sample values outside `[0, MAX_ADC_VALUE)` — range
    /// policy lives here rather than in the parser so that
    /// [`poll_records`](Self::poll_records) consumers still see every record
    /// the device sent.
    pub async fn sample_window(&mut self, window: Duration, flush: bool) -> Result<SampleWindow> {
        if flush {
            self.flush_input().await?;
        }

        let deadline = tokio::time::Instant::now() + window;
        let mut samples = SampleWindow::default();

        while tokio::time::Instant::now() < deadline {
            let Some(record) = self.read_record().await? else {
                continue;
            };
            if let Record::Sample { timestamp, value } = record {
                if value >= MAX_ADC_VALUE {
                    continue;
                }
                samples.push(timestamp, value);
            }
        }

        tracing::debug!("collected {} samples in {:?}", samples.len(), window);
        Ok(samples)
    }

    /// Average ADC value over a `window` of wall-clock time.
    ///
    /// Flushes stale input first, then fails with [`Error::EmptyWindow`] if
    /// the window closed without a single sample.
    pub async fn average(&mut self, window: Duration) -> Result<f64> {
        let samples = self.sample_window(window, true).await?;
        samples.mean().ok_or(Error::EmptyWindow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::EventKind;

    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;

    use bytes::Bytes;

    /// Delay charged to every mock read so paused-clock windows advance.
    const MOCK_READ_DELAY: Duration = Duration::from_millis(10);

    #[derive(Default)]
    struct MockTransport {
        connected: bool,
        sent: Vec<Bytes>,
        lines: VecDeque<String>,
        chunks: VecDeque<Bytes>,
        flushes: usize,
    }

    impl MockTransport {
        fn with_lines(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|&l| l.to_owned()).collect(),
                ..Self::default()
            }
        }

        fn with_chunks(chunks: &[&'static [u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|&c| Bytes::from_static(c)).collect(),
                ..Self::default()
            }
        }
    }

    impl Transport for MockTransport {
        fn connect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            Box::pin(async move {
                self.connected = true;
                Ok(())
            })
        }

        fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            Box::pin(async move {
                self.connected = false;
                Ok(())
            })
        }

        fn send(&mut self, data: Bytes) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            Box::pin(async move {
                self.sent.push(data);
                Ok(())
            })
        }

        fn read_available(&mut self) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
            Box::pin(async move {
                tokio::time::sleep(MOCK_READ_DELAY).await;
                Ok(self.chunks.pop_front().unwrap_or_default())
            })
        }

        fn read_line(
            &mut self,
        ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + '_>> {
            Box::pin(async move {
                tokio::time::sleep(MOCK_READ_DELAY).await;
                Ok(self.lines.pop_front())
            })
        }

        fn flush_input(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
            Box::pin(async move {
                self.flushes += 1;
                Ok(())
            })
        }

        fn sync(&mut self) -> Pin<Box<dyn Future<Output = Result<SystemTime>> + Send + '_>> {
            Box::pin(async move { Ok(SystemTime::now()) })
        }

        fn is_connected(&self) -> bool {
            self.connected
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_sends_engage_then_release() {
        let mut logger = EventLogger::new(MockTransport::default());

        let before = tokio::time::Instant::now();
        logger.click(80).await.unwrap();

        assert_eq!(before.elapsed(), Duration::from_millis(80));
        assert_eq!(
            logger.transport.sent,
            vec![Bytes::from_static(b"con\n"), Bytes::from_static(b"coff\n")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_too_long_fails_before_io() {
        let mut logger = EventLogger::new(MockTransport::default());

        let err = logger.click(101).await.unwrap_err();
        assert!(matches!(
            err,
            Error::ClickTooLong {
                requested_ms: 101,
                max_ms: MAX_CLICK_DURATION_MS,
            }
        ));
        assert!(logger.transport.sent.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_adc_and_autoclick_command_tokens() {
        let mut logger = EventLogger::new(MockTransport::default());

        logger.set_adc_reporting(true).await.unwrap();
        logger.set_adc_reporting(false).await.unwrap();
        logger.mouse_down().await.unwrap();
        logger.mouse_up().await.unwrap();

        assert_eq!(
            logger.transport.sent,
            vec![
                Bytes::from_static(b"aon\n"),
                Bytes::from_static(b"aoff\n"),
                Bytes::from_static(b"con\n"),
                Bytes::from_static(b"coff\n"),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_window_filters_events_and_range() {
        let transport = MockTransport::with_lines(&[
            "1000:M1",   // event, skipped
            "2000:513",  // kept
            "3000:1024", // at the ADC limit, skipped
            "garbage",   // malformed, skipped
            "4000:100",  // kept
            "5000:2000", // over range, skipped
        ]);
        let mut logger = EventLogger::new(transport);

        let samples = logger
            .sample_window(Duration::from_millis(100), false)
            .await
            .unwrap();

        assert_eq!(samples.timestamps, vec![0.002, 0.004]);
        assert_eq!(samples.values, vec![513, 100]);
        assert_eq!(logger.transport.flushes, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sample_window_flushes_when_asked() {
        let mut logger = EventLogger::new(MockTransport::default());

        let samples = logger
            .sample_window(Duration::from_millis(50), true)
            .await
            .unwrap();

        assert!(samples.is_empty());
        assert_eq!(logger.transport.flushes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_average_over_window() {
        let transport = MockTransport::with_lines(&["0:10", "100:20", "200:30"]);
        let mut logger = EventLogger::new(transport);

        let mean = logger.average(Duration::from_millis(100)).await.unwrap();
        assert!((mean - 20.0).abs() < f64::EPSILON);
        assert_eq!(logger.transport.flushes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_average_of_empty_window_fails() {
        let mut logger = EventLogger::new(MockTransport::default());

        let err = logger.average(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, Error::EmptyWindow));
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_firmware_version_found() {
        let transport = MockTransport::with_chunks(&[
            b"123:45\n", // stale stream data drained before the request
            b"1000:7\nHardware Event Logger v0.4\n",
        ]);
        let mut logger = EventLogger::new(transport);

        let version = logger.query_firmware_version().await.unwrap();
        assert_eq!(version.as_deref(), Some("Hardware Event Logger v0.4"));
        assert_eq!(
            logger.transport.sent,
            vec![Bytes::from_static(b"i\n")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_firmware_version_missing() {
        let mut logger = EventLogger::new(MockTransport::default());

        let version = logger.query_firmware_version().await.unwrap();
        assert_eq!(version, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_records_carries_partial_lines() {
        let transport = MockTransport::with_chunks(&[b"1000:M1\n2000:5", b"00\n"]);
        let mut logger = EventLogger::new(transport);

        let first = logger.poll_records().await.unwrap();
        assert_eq!(
            first,
            vec![Record::Event {
                timestamp: 0.001,
                kind: EventKind::Mouse1,
            }]
        );

        let second = logger.poll_records().await.unwrap();
        assert_eq!(
            second,
            vec![Record::Sample {
                timestamp: 0.002,
                value: 500,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_record_single_line() {
        let transport = MockTransport::with_lines(&["1000:PD"]);
        let mut logger = EventLogger::new(transport);

        let record = logger.read_record().await.unwrap();
        assert_eq!(
            record,
            Some(Record::Event {
                timestamp: 0.001,
                kind: EventKind::Photodiode,
            })
        );

        // Queue exhausted: no data this tick.
        assert_eq!(logger.read_record().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_lifecycle() {
        let mut logger = EventLogger::new(MockTransport::default());
        assert!(!logger.is_connected());

        logger.connect().await.unwrap();
        assert!(logger.is_connected());

        logger.disconnect().await.unwrap();
        assert!(!logger.is_connected());
    }

    #[test]
    fn test_sample_window_mean() {
        let mut window = SampleWindow::default();
        assert!(window.is_empty());
        assert_eq!(window.mean(), None);

        window.push(0.1, 10);
        window.push(0.2, 11);
        assert_eq!(window.len(), 2);
        assert_eq!(window.mean(), Some(10.5));
    }
}
