//! Speaker toggle circuit.
//!
//! The TK2000 has no sound chip; like the Apple II it has a toggle
//! circuit on $C030 that flips the speaker cone on every access. The
//! emulation turns each toggle into a constant-amplitude square-wave
//! segment whose length is the CPU-cycle delta since the previous
//! toggle, resampled to 16 kHz.

/// Host sample rate for the 1-bit speaker capture.
pub const SAMPLE_RATE: u32 = 16_000;

/// Nominal CPU tick length in seconds (1 MHz).
const TICK_SECONDS: f32 = 1.0 / 1_000_000.0;

/// Segments longer than this are dropped. A cold start can leave the
/// line idle for minutes; writing that much silence would stall the
/// sink for no audible gain.
const MAX_SEGMENT: usize = 16_000;

/// Output level while the line is high (signed 8-bit PCM).
const AMPLITUDE_HIGH: u8 = 120;

/// Destination for speaker samples: mono, 8-bit signed PCM, 16 kHz.
pub trait AudioSink {
    fn push(&mut self, samples: &[u8]);
}

/// The speaker toggle line.
///
/// With no sink installed the speaker is a no-op; the host can inspect
/// `is_available()`/`last_error()` to see why.
pub struct Speaker {
    sink: Option<Box<dyn AudioSink>>,
    error: Option<String>,
    enabled: bool,
    /// Current line level.
    high: bool,
    /// Clock at the previous toggle; 0 = line not yet armed.
    last_cycle: u64,
    /// Scratch segment buffer.
    segment: Vec<u8>,
}

impl Speaker {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sink: None,
            error: None,
            enabled: true,
            high: false,
            last_cycle: 0,
            segment: Vec::with_capacity(MAX_SEGMENT),
        }
    }

    /// Install the host audio sink.
    pub fn set_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.sink = Some(sink);
        self.error = None;
    }

    /// Record why the host audio device is unavailable.
    pub fn set_error(&mut self, error: String) {
        self.sink = None;
        self.error = Some(error);
    }

    /// Whether a host sink is installed.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.sink.is_some()
    }

    /// The host-device error, if opening one failed.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Mute or unmute without detaching the sink.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Flip the line at the given CPU clock, emitting the elapsed
    /// square-wave segment.
    pub fn toggle(&mut self, clock: u64) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if !self.enabled {
            return;
        }

        if self.last_cycle == 0 {
            self.last_cycle = clock;
            self.high = true;
            return;
        }

        let duration = clock - self.last_cycle;
        self.last_cycle = clock;

        let amplitude = if self.high { AMPLITUDE_HIGH } else { 0 };
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let samples = (duration as f32 * TICK_SECONDS * SAMPLE_RATE as f32) as usize;

        if samples <= MAX_SEGMENT {
            self.segment.clear();
            self.segment.resize(samples, amplitude);
            sink.push(&self.segment);
        }

        self.high = !self.high;
    }
}

impl Default for Speaker {
    fn default() -> Self {
        Self::new()
    }
}
