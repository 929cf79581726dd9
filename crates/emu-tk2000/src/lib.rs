//! TK2000 II Color Computer emulator.
//!
//! An Apple II-class home computer: 6502/65C02 CPU at a nominal 1 MHz,
//! 64 KiB RAM with a ROM/RAM bank switch over $C100-$FFFF, an 8x8
//! keyboard matrix, a cassette tape input, a 1-bit speaker, and the
//! Apple II hi-res screen with NTSC artifact color.
//!
//! The machine is event-loop driven: [`Tk2000::run_batch`] simulates
//! 100 ms of machine time and refreshes the display; the host paces
//! batches against wall time and presents the framebuffer.

mod bank;
mod bus;
pub mod capture;
mod config;
pub mod ct2;
pub mod input;
mod keyboard;
pub mod keyboard_map;
mod memory;
mod palette;
mod sound;
mod tape;
mod tk2000;
pub mod video;

pub use bank::MemBank;
pub use bus::{AttachMode, DeviceId, Tk2000Bus};
pub use config::Tk2000Config;
pub use ct2::Ct2File;
pub use input::{InputQueue, KeyStroke, Tk2000Key};
pub use keyboard::Keyboard;
pub use memory::{Ram, Rom};
pub use sound::{AudioSink, Speaker, SAMPLE_RATE};
pub use tape::TapeDeck;
pub use tk2000::{MachineEvent, Tk2000, BATCH_CYCLES, BATCH_MILLIS};
pub use video::Video;
