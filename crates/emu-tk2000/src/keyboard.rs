//! TK2000 keyboard matrix scanner.
//!
//! The keyboard is an 8x8 matrix. The ROM scans it by writing a one-hot
//! row selector to KBIN ($C000-$C01F) and reading KBOUT from the same
//! range: a pressed key in the selected row answers with its one-hot
//! column. Two extra lines sit outside the matrix:
//!
//! - SHIFT is wired to column 0 of KBIN: with KBIN = $01 and SHIFT held,
//!   KBOUT reads 1.
//! - CTRL is queried by writing $C05F first; the following read returns
//!   1 while CTRL is held.
//!
//! This is the direct variant: one active key at a time, modifiers
//! tracked as levels, no hold window.

use crate::input::KeyStroke;

/// Direct-mapped keyboard state.
pub struct Keyboard {
    row: u8,
    column: u8,
    shift: bool,
    ctrl: bool,
    /// No key is down.
    clear: bool,
    /// Latched row selector.
    kbin: u8,
    /// The next read answers the CTRL line instead of the matrix.
    ctrl_query: bool,
}

impl Keyboard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            row: 0,
            column: 0,
            shift: false,
            ctrl: false,
            clear: true,
            kbin: 0,
            ctrl_query: false,
        }
    }

    /// Scan result for the latched KBIN value.
    #[must_use]
    pub fn read(&self) -> u8 {
        if self.clear {
            return 0;
        }
        if self.ctrl_query && self.ctrl {
            return 1;
        }
        if self.kbin == 1 && self.shift {
            return 1;
        }
        if self.kbin == 1 << self.row {
            return 1 << self.column;
        }
        0
    }

    /// Latch KBIN, or arm the CTRL-line query when $C05F is written.
    pub fn write(&mut self, addr: u16, value: u8) {
        self.ctrl_query = false;
        if addr == 0xC05F {
            self.ctrl_query = true;
            return;
        }
        self.kbin = value;
    }

    /// Press a key with its modifiers. Replaces any held key.
    pub fn press(&mut self, stroke: KeyStroke) {
        let (row, column) = stroke.key.matrix();
        self.row = row;
        self.column = column;
        self.shift = stroke.shift;
        self.ctrl = stroke.ctrl;
        self.clear = false;
    }

    /// Release the held key.
    pub fn release(&mut self) {
        self.clear = true;
    }
}

impl Default for Keyboard {
    fn default() -> Self {
        Self::new()
    }
}
