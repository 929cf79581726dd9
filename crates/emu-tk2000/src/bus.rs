//! The TK2000 system bus.
//!
//! A 64 Ki-entry table maps each address to zero or more devices. Open
//! reads return $FF; a multi-device cell returns the bitwise OR of its
//! members' reads (wired-OR, and used deliberately: $C010 serves both
//! the keyboard strobe and the tape input in one read). Writes fan out
//! to every member.
//!
//! The bus owns every device and dispatches by identity, which keeps
//! the bank switch's cartridge probe (is $C101 currently RAM or ROM?)
//! a plain slot comparison, and lets devices trigger further bus reads
//! (tape clicks route through $C030 like the real loader does).

use std::ops::RangeInclusive;

use emu_core::Bus;

use crate::bank::{BankSwitch, MemBank};
use crate::keyboard::Keyboard;
use crate::memory::{Ram, Rom};
use crate::sound::Speaker;
use crate::tape::TapeDeck;
use crate::video::Video;

/// Identity of a bus device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceId {
    Ram,
    Rom,
    Keyboard,
    Tape,
    Sound,
    Video,
    BankSwitch,
}

/// How `attach` treats existing bindings in the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachMode {
    /// Append to the per-address device list.
    Add,
    /// Drop any prior bindings first.
    Replace,
}

/// One address cell: nothing, one device, or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Empty,
    One(DeviceId),
    Many(Vec<DeviceId>),
}

/// The system bus with its attached devices.
pub struct Tk2000Bus {
    slots: Vec<Slot>,
    pub ram: Ram,
    pub rom: Rom,
    pub keyboard: Keyboard,
    pub tape: TapeDeck,
    pub speaker: Speaker,
    pub video: Video,
    bank: BankSwitch,
    /// CPU clock snapshot, refreshed by the machine each instruction.
    /// Tape and speaker timing sample this.
    pub clock: u64,
}

impl Tk2000Bus {
    /// A bus with nothing attached; the machine wires the memory map.
    #[must_use]
    pub fn new(rom: Rom) -> Self {
        Self {
            slots: vec![Slot::Empty; 0x10000],
            ram: Ram::new(),
            rom,
            keyboard: Keyboard::new(),
            tape: TapeDeck::new(),
            speaker: Speaker::new(),
            video: Video::new(),
            bank: BankSwitch::new(),
            clock: 0,
        }
    }

    /// Attach a device to an inclusive address range.
    pub fn attach(&mut self, range: RangeInclusive<u16>, device: DeviceId, mode: AttachMode) {
        for addr in range {
            let slot = &mut self.slots[addr as usize];
            match mode {
                AttachMode::Replace => *slot = Slot::One(device),
                AttachMode::Add => match slot {
                    Slot::Empty => *slot = Slot::One(device),
                    Slot::One(existing) => *slot = Slot::Many(vec![*existing, device]),
                    Slot::Many(devices) => devices.push(device),
                },
            }
        }
    }

    /// Currently selected memory bank.
    #[must_use]
    pub fn bank(&self) -> MemBank {
        self.bank.mode()
    }

    /// Rasterize the selected video page from RAM.
    pub fn render_video(&mut self) {
        self.video.render(&self.ram);
    }

    fn device_read(&mut self, device: DeviceId, addr: u16) -> u8 {
        match device {
            DeviceId::Ram => self.ram.read(addr),
            DeviceId::Rom => self.rom.read(addr),
            DeviceId::Keyboard => self.keyboard.read(),
            DeviceId::Tape => self.tape_read(addr),
            DeviceId::Sound => {
                self.speaker.toggle(self.clock);
                0xFF
            }
            DeviceId::Video => self.video.softswitch(addr),
            DeviceId::BankSwitch => {
                self.bank_access(addr);
                0xFF
            }
        }
    }

    fn device_write(&mut self, device: DeviceId, addr: u16, value: u8) {
        match device {
            DeviceId::Ram => self.ram.write(addr, value),
            DeviceId::Rom => {} // ROM writes are dropped
            DeviceId::Keyboard => self.keyboard.write(addr, value),
            DeviceId::Tape => {} // the cassette ports are read-driven
            DeviceId::Sound => self.speaker.toggle(self.clock),
            DeviceId::Video => {
                self.video.softswitch(addr);
            }
            DeviceId::BankSwitch => self.bank_access(addr),
        }
    }

    /// Tape port read: CASOUT at $C020 routes to the speaker toggle,
    /// CASIN at $C010 advances playback (clicking the speaker on edges
    /// when tape sound is on). Everything else on the deck reads 0.
    fn tape_read(&mut self, addr: u16) -> u8 {
        if addr == 0xC020 {
            let _ = self.read(0xC030);
            return 0;
        }
        if addr != 0xC010 {
            return 0;
        }

        let (level, click) = self.tape.read_casin(self.clock);
        if click {
            let _ = self.read(0xC030);
        }
        level
    }

    /// Bank softswitch access: remap the high window when the selected
    /// bank changes. Probing $C101 decides the window start: a slot
    /// still holding the other bank's memory means no cartridge, so the
    /// full $C100 window swaps; otherwise a cartridge owns $C100-$C1FF
    /// and only $C200 up swaps.
    fn bank_access(&mut self, addr: u16) {
        let Some(bank) = self.bank.select(addr) else {
            return;
        };

        let (device, other) = match bank {
            MemBank::Rom => (DeviceId::Rom, DeviceId::Ram),
            MemBank::Ram => (DeviceId::Ram, DeviceId::Rom),
        };
        let start = if self.slots[0xC101] == Slot::One(other) {
            0xC100
        } else {
            0xC200
        };
        self.attach(start..=0xFFFF, device, AttachMode::Replace);
    }
}

impl Bus for Tk2000Bus {
    fn read(&mut self, addr: u16) -> u8 {
        match &self.slots[addr as usize] {
            Slot::Empty => 0xFF,
            Slot::One(device) => {
                let device = *device;
                self.device_read(device, addr)
            }
            Slot::Many(devices) => {
                let devices = devices.clone();
                devices
                    .iter()
                    .fold(0, |value, &device| value | self.device_read(device, addr))
            }
        }
    }

    fn write(&mut self, addr: u16, value: u8) {
        match &self.slots[addr as usize] {
            Slot::Empty => {}
            Slot::One(device) => {
                let device = *device;
                self.device_write(device, addr, value);
            }
            Slot::Many(devices) => {
                let devices = devices.clone();
                for device in devices {
                    self.device_write(device, addr, value);
                }
            }
        }
    }
}
