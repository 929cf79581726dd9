//! Cassette deck: transport state and CASIN playback.
//!
//! The tape input line is a 1-bit zero-crossing detector at $C010. The
//! loader polls it in a tight loop and measures the CPU cycles between
//! edges; playback therefore runs off the CPU clock, not wall time.
//!
//! On each poll while playing:
//! 1. If no half-cycle is armed, arm the first one: latch the clock,
//!    drive CASIN high, load the duration.
//! 2. If the armed duration has elapsed, toggle CASIN, advance the
//!    playhead and re-latch. Running off the end stops the deck.
//! 3. Each edge may also click the speaker so the load is audible; the
//!    bus performs that read, the deck only reports it.

use crate::ct2::Ct2File;

/// CASIN line level when driven high.
const CASIN_HIGH: u8 = 0x80;

/// Virtual cassette deck holding one expanded tape.
pub struct TapeDeck {
    /// Per-half-cycle durations in CPU cycles.
    wave: Vec<u32>,
    /// Playhead into `wave`.
    half_cycle: usize,
    /// Clock value at the start of the armed half-cycle; 0 = not armed.
    start_cycle: u64,
    /// Armed half-cycle duration.
    needed: u32,
    /// Current CASIN level, $00 or $80.
    casin: u8,
    playing: bool,
    /// Click the speaker on edges so the load is audible.
    sound: bool,
    /// The playhead ran off the end since the last check.
    finished: bool,
}

impl TapeDeck {
    /// An empty deck: no tape inserted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            wave: Vec::new(),
            half_cycle: 0,
            start_cycle: 0,
            needed: 0,
            casin: 0,
            playing: false,
            sound: true,
            finished: false,
        }
    }

    /// Insert a tape, stopping any current playback.
    pub fn insert(&mut self, tape: &Ct2File) {
        self.stop();
        self.wave = tape.expand_wave();
    }

    /// Whether a tape is inserted.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.wave.is_empty()
    }

    /// Press Play: rewind and start feeding CASIN.
    pub fn play(&mut self) {
        if self.wave.is_empty() {
            return;
        }
        self.start_cycle = 0;
        self.half_cycle = 0;
        self.playing = true;
    }

    /// Press Stop.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Whether the deck is currently playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Enable or mute the speaker click on tape edges.
    pub fn set_sound(&mut self, on: bool) {
        self.sound = on;
    }

    /// True once when the tape has run off the end.
    pub fn take_finished(&mut self) -> bool {
        std::mem::replace(&mut self.finished, false)
    }

    /// Poll CASIN at the given CPU clock.
    ///
    /// Returns the line level and whether this poll produced an edge
    /// the speaker should click for.
    pub fn read_casin(&mut self, clock: u64) -> (u8, bool) {
        if !self.playing {
            return (0, false);
        }

        if self.start_cycle == 0 {
            self.start_cycle = clock;
            self.casin = CASIN_HIGH;
            self.needed = self.wave[self.half_cycle];
            return (self.casin, self.sound);
        }

        let elapsed = clock - self.start_cycle;
        if elapsed > u64::from(self.needed) {
            let click = self.sound;
            self.start_cycle = clock;
            self.casin ^= CASIN_HIGH;
            self.half_cycle += 1;

            if self.half_cycle < self.wave.len() {
                self.needed = self.wave[self.half_cycle];
            } else {
                self.playing = false;
                self.finished = true;
            }
            return (self.casin, click);
        }

        (self.casin, false)
    }
}

impl Default for TapeDeck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ct2::Chunk;

    fn deck_with_wave(durations: &[u32]) -> TapeDeck {
        let mut deck = TapeDeck::new();
        deck.wave = durations.to_vec();
        deck
    }

    #[test]
    fn stopped_deck_reads_zero() {
        let mut deck = TapeDeck::new();
        assert_eq!(deck.read_casin(1000), (0, false));
    }

    #[test]
    fn first_poll_arms_and_drives_high() {
        let mut deck = deck_with_wave(&[100, 100]);
        deck.play();
        let (level, click) = deck.read_casin(5000);
        assert_eq!(level, CASIN_HIGH);
        assert!(click, "arming clicks when tape sound is on");
    }

    #[test]
    fn edges_follow_the_armed_durations() {
        let mut deck = deck_with_wave(&[100, 200]);
        deck.play();
        deck.read_casin(1000); // arm at clock 1000, high for 100 cycles

        assert_eq!(deck.read_casin(1100).0, CASIN_HIGH, "not elapsed yet");
        let (level, click) = deck.read_casin(1101);
        assert_eq!(level, 0, "toggled low after the first half-cycle");
        assert!(click);

        // Second half-cycle: 200 cycles from the edge at 1101
        assert_eq!(deck.read_casin(1301).0, 0);
        let (level, _) = deck.read_casin(1302);
        assert_eq!(level, CASIN_HIGH, "end of tape toggles once more");
        assert!(!deck.is_playing(), "deck stops at the end");
        assert!(deck.take_finished());
        assert!(!deck.take_finished(), "finished flag is one-shot");
    }

    #[test]
    fn muting_suppresses_clicks() {
        let mut deck = deck_with_wave(&[10, 10]);
        deck.set_sound(false);
        deck.play();
        assert!(!deck.read_casin(100).1);
        assert!(!deck.read_casin(200).1);
    }

    #[test]
    fn insert_replaces_wave_and_stops() {
        let mut deck = deck_with_wave(&[10]);
        deck.play();
        let tape = Ct2File {
            chunks: vec![Chunk::Data(vec![0xFF])],
        };
        deck.insert(&tape);
        assert!(!deck.is_playing());
        assert!(deck.is_loaded());
        assert_eq!(deck.wave.len(), 16);
    }
}
