//! Top-level TK2000 system.
//!
//! Wires the device graph to the bus, owns the CPU, and batches
//! execution: one `run_batch()` simulates 100,000 cycles (100 ms at the
//! nominal 1 MHz), applies due input events, and refreshes the video at
//! the resulting ~10 Hz display rate. The host paces batches against
//! wall time; nothing in here sleeps.

use std::collections::VecDeque;

use emu_6502::Mos6502;
use emu_core::{Bus, MasterClock};

use crate::bus::{AttachMode, DeviceId, Tk2000Bus};
use crate::config::Tk2000Config;
use crate::ct2::Ct2File;
use crate::input::{InputQueue, KeyStroke};
use crate::memory::Rom;
use crate::video::ColorMode;

/// Nominal CPU crystal.
const MASTER_CLOCK: MasterClock = MasterClock::new(1_000_000);

/// Display refresh rate, and therefore the batch rate.
const REFRESH_HZ: u64 = 10;

/// Cycles simulated per batch.
pub const BATCH_CYCLES: u64 = MASTER_CLOCK.ticks_per_frame(REFRESH_HZ).get();

/// Wall-clock duration of one batch.
pub const BATCH_MILLIS: u64 = 1000 / REFRESH_HZ;

/// Machine-level events for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineEvent {
    PoweredOn,
    PoweredOff,
    /// The tape ran off the end of its wave buffer.
    TapeEnded,
}

/// The TK2000 II system.
pub struct Tk2000 {
    cpu: Mos6502,
    bus: Tk2000Bus,
    powered: bool,
    /// Completed batch counter; input events are timed against it.
    batch_count: u64,
    input_queue: InputQueue,
    events: VecDeque<MachineEvent>,
}

impl Tk2000 {
    /// Build the machine and wire the memory map. The machine starts
    /// powered off; call [`Tk2000::power_on`].
    pub fn new(config: &Tk2000Config) -> Result<Self, String> {
        let rom = Rom::new(&config.rom)?;
        let mut bus = Tk2000Bus::new(rom);

        // Memory map
        bus.attach(0x0000..=0xBFFF, DeviceId::Ram, AttachMode::Replace);
        bus.attach(0xC000..=0xC01F, DeviceId::Keyboard, AttachMode::Replace);
        bus.attach(0xC010..=0xC010, DeviceId::Tape, AttachMode::Add);
        bus.attach(0xC020..=0xC02F, DeviceId::Tape, AttachMode::Replace);
        bus.attach(0xC030..=0xC03F, DeviceId::Sound, AttachMode::Replace);
        bus.attach(0xC050..=0xC051, DeviceId::Video, AttachMode::Replace);
        bus.attach(0xC052..=0xC053, DeviceId::Tape, AttachMode::Replace);
        bus.attach(0xC054..=0xC055, DeviceId::Video, AttachMode::Replace);
        bus.attach(0xC056..=0xC057, DeviceId::Tape, AttachMode::Replace);
        bus.attach(0xC05A..=0xC05B, DeviceId::BankSwitch, AttachMode::Replace);
        bus.attach(0xC05E..=0xC05F, DeviceId::Keyboard, AttachMode::Replace);
        bus.attach(0xC070..=0xC071, DeviceId::Tape, AttachMode::Replace);
        bus.attach(0xC080..=0xC08B, DeviceId::BankSwitch, AttachMode::Replace);
        bus.attach(0xC100..=0xFFFF, DeviceId::Rom, AttachMode::Replace);

        Ok(Self {
            cpu: Mos6502::new(),
            bus,
            powered: false,
            batch_count: 0,
            input_queue: InputQueue::new(),
            events: VecDeque::new(),
        })
    }

    /// Power the machine on: paint the boot pattern, reset, run.
    pub fn power_on(&mut self) {
        if self.powered {
            return;
        }
        self.paint_video_memory();
        self.reset();
        self.powered = true;
        self.events.push_back(MachineEvent::PoweredOn);
    }

    /// Power off: stop executing and clear RAM. Device wiring stays.
    pub fn power_off(&mut self) {
        if !self.powered {
            return;
        }
        self.powered = false;
        self.bus.ram.clear();
        self.events.push_back(MachineEvent::PoweredOff);
    }

    #[must_use]
    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Reset: ROM bank, video page 1, mono, CPU reset.
    pub fn reset(&mut self) {
        let _ = self.bus.read(0xC05A);
        let _ = self.bus.read(0xC054);
        self.bus.video.set_color_mode(ColorMode::Mono);
        self.cpu.assert_reset();
    }

    /// The white-stripe pattern the machine shows at power-on.
    fn paint_video_memory(&mut self) {
        for offset in 0..0x1000 {
            self.bus.write(0x2000 + offset, 0xFF);
            self.bus.write(0xA000 + offset, 0xFF);
        }
    }

    /// Run one batch: apply due input, simulate [`BATCH_CYCLES`],
    /// refresh the display. Returns the cycles executed (0 when off).
    pub fn run_batch(&mut self) -> u64 {
        if !self.powered {
            return 0;
        }

        self.input_queue
            .process(self.batch_count, &mut self.bus.keyboard);
        self.batch_count += 1;

        let start = self.cpu.cycles();
        while self.cpu.cycles() - start < BATCH_CYCLES {
            self.step();
        }

        if self.bus.tape.take_finished() {
            self.events.push_back(MachineEvent::TapeEnded);
        }
        self.bus.render_video();

        self.cpu.cycles() - start
    }

    /// Execute a single instruction and publish the clock to the bus.
    pub fn step(&mut self) -> u64 {
        let cycles = self.cpu.step(&mut self.bus);
        self.bus.clock = self.cpu.cycles();
        cycles
    }

    /// Next machine event, if any.
    pub fn poll_event(&mut self) -> Option<MachineEvent> {
        self.events.pop_front()
    }

    // ------------------------------------------------------------------
    // Tape transport
    // ------------------------------------------------------------------

    /// Insert a parsed tape into the deck.
    pub fn insert_tape(&mut self, tape: &Ct2File) {
        self.bus.tape.insert(tape);
    }

    pub fn play_tape(&mut self) {
        self.bus.tape.play();
    }

    pub fn stop_tape(&mut self) {
        self.bus.tape.stop();
    }

    // ------------------------------------------------------------------
    // Toggles
    // ------------------------------------------------------------------

    pub fn set_color_mode(&mut self, color: bool) {
        self.bus.video.set_color_mode(if color {
            ColorMode::Color
        } else {
            ColorMode::Mono
        });
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.bus.speaker.set_enabled(enabled);
    }

    pub fn set_tape_sound_enabled(&mut self, enabled: bool) {
        self.bus.tape.set_sound(enabled);
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Press a key immediately.
    pub fn press_key(&mut self, stroke: KeyStroke) {
        self.bus.keyboard.press(stroke);
    }

    /// Release the held key.
    pub fn release_key(&mut self) {
        self.bus.keyboard.release();
    }

    /// Timed input queue for scripted key sequences.
    pub fn input_queue(&mut self) -> &mut InputQueue {
        &mut self.input_queue
    }

    // ------------------------------------------------------------------
    // Host surfaces
    // ------------------------------------------------------------------

    /// The rendered frame, 0x00RRGGBB per pixel.
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        self.bus.video.framebuffer()
    }

    #[must_use]
    pub fn framebuffer_width(&self) -> u32 {
        self.bus.video.framebuffer_width()
    }

    #[must_use]
    pub fn framebuffer_height(&self) -> u32 {
        self.bus.video.framebuffer_height()
    }

    /// Whether the framebuffer changed since the last call.
    pub fn take_damage(&mut self) -> bool {
        self.bus.video.take_damage()
    }

    /// Reference to the CPU.
    #[must_use]
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    /// Reference to the bus and its devices.
    #[must_use]
    pub fn bus(&self) -> &Tk2000Bus {
        &self.bus
    }

    /// Mutable reference to the bus and its devices.
    pub fn bus_mut(&mut self) -> &mut Tk2000Bus {
        &mut self.bus
    }
}
