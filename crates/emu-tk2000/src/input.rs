//! Input handling for the TK2000.
//!
//! Three layers:
//! 1. [`Tk2000Key`] — logical keys mapped to the 8x8 matrix.
//! 2. Immediate `press_key`/`release_key` methods on the machine.
//! 3. [`InputQueue`] — timed key events for scripted sequences.
//!
//! Matrix layout (KBOUT row x KBIN column):
//!
//! | Row | Col0  | Col1 | Col2 | Col3 | Col4 | Col5 |
//! |-----|-------|------|------|------|------|------|
//! | 0   |       | B    | V    | C    | X    | Z    |
//! | 1   |       | G    | F    | D    | S    | A    |
//! | 2   | SPACE | T    | R    | E    | W    | Q    |
//! | 3   | LEFT  | 5    | 4    | 3    | 2    | 1    |
//! | 4   | RIGHT | 6    | 7    | 8    | 9    | 0    |
//! | 5   | DOWN  | Y    | U    | I    | O    | P    |
//! | 6   | UP    | H    | J    | K    | L    | :    |
//! | 7   | ENTER | N    | M    | ,    | .    | ?    |

use std::collections::VecDeque;

use crate::keyboard::Keyboard;

/// Logical key on the TK2000 keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tk2000Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    N0,
    N1,
    N2,
    N3,
    N4,
    N5,
    N6,
    N7,
    N8,
    N9,
    Comma,
    Period,
    Colon,
    Question,
    Space,
    Enter,
    Up,
    Down,
    Left,
    Right,
}

impl Tk2000Key {
    /// Every key, for exhaustive table tests.
    pub const ALL: [Self; 46] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::I,
        Self::J,
        Self::K,
        Self::L,
        Self::M,
        Self::N,
        Self::O,
        Self::P,
        Self::Q,
        Self::R,
        Self::S,
        Self::T,
        Self::U,
        Self::V,
        Self::W,
        Self::X,
        Self::Y,
        Self::Z,
        Self::N0,
        Self::N1,
        Self::N2,
        Self::N3,
        Self::N4,
        Self::N5,
        Self::N6,
        Self::N7,
        Self::N8,
        Self::N9,
        Self::Comma,
        Self::Period,
        Self::Colon,
        Self::Question,
        Self::Space,
        Self::Enter,
        Self::Up,
        Self::Down,
        Self::Left,
        Self::Right,
    ];

    /// The (row, column) cell of this key in the matrix.
    #[must_use]
    pub const fn matrix(self) -> (u8, u8) {
        match self {
            // Row 0
            Self::B => (0, 1),
            Self::V => (0, 2),
            Self::C => (0, 3),
            Self::X => (0, 4),
            Self::Z => (0, 5),
            // Row 1
            Self::G => (1, 1),
            Self::F => (1, 2),
            Self::D => (1, 3),
            Self::S => (1, 4),
            Self::A => (1, 5),
            // Row 2
            Self::Space => (2, 0),
            Self::T => (2, 1),
            Self::R => (2, 2),
            Self::E => (2, 3),
            Self::W => (2, 4),
            Self::Q => (2, 5),
            // Row 3
            Self::Left => (3, 0),
            Self::N5 => (3, 1),
            Self::N4 => (3, 2),
            Self::N3 => (3, 3),
            Self::N2 => (3, 4),
            Self::N1 => (3, 5),
            // Row 4
            Self::Right => (4, 0),
            Self::N6 => (4, 1),
            Self::N7 => (4, 2),
            Self::N8 => (4, 3),
            Self::N9 => (4, 4),
            Self::N0 => (4, 5),
            // Row 5
            Self::Down => (5, 0),
            Self::Y => (5, 1),
            Self::U => (5, 2),
            Self::I => (5, 3),
            Self::O => (5, 4),
            Self::P => (5, 5),
            // Row 6
            Self::Up => (6, 0),
            Self::H => (6, 1),
            Self::J => (6, 2),
            Self::K => (6, 3),
            Self::L => (6, 4),
            Self::Colon => (6, 5),
            // Row 7
            Self::Enter => (7, 0),
            Self::N => (7, 1),
            Self::M => (7, 2),
            Self::Comma => (7, 3),
            Self::Period => (7, 4),
            Self::Question => (7, 5),
        }
    }
}

/// A key press with its modifier lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: Tk2000Key,
    pub shift: bool,
    pub ctrl: bool,
}

impl KeyStroke {
    #[must_use]
    pub const fn plain(key: Tk2000Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
        }
    }

    #[must_use]
    pub const fn shifted(key: Tk2000Key) -> Self {
        Self {
            key,
            shift: true,
            ctrl: false,
        }
    }
}

/// Map a character to the stroke that types it.
///
/// Letters map case-insensitively; the TK2000 symbol set maps to
/// SHIFT plus a digit or letter cell. Returns `None` for characters the
/// machine cannot type.
#[must_use]
pub fn char_to_stroke(c: char) -> Option<KeyStroke> {
    use Tk2000Key::*;

    let key = match c.to_ascii_uppercase() {
        'A' => A,
        'B' => B,
        'C' => C,
        'D' => D,
        'E' => E,
        'F' => F,
        'G' => G,
        'H' => H,
        'I' => I,
        'J' => J,
        'K' => K,
        'L' => L,
        'M' => M,
        'N' => N,
        'O' => O,
        'P' => P,
        'Q' => Q,
        'R' => R,
        'S' => S,
        'T' => T,
        'U' => U,
        'V' => V,
        'W' => W,
        'X' => X,
        'Y' => Y,
        'Z' => Z,
        '0' => N0,
        '1' => N1,
        '2' => N2,
        '3' => N3,
        '4' => N4,
        '5' => N5,
        '6' => N6,
        '7' => N7,
        '8' => N8,
        '9' => N9,
        ',' => Comma,
        '.' => Period,
        ':' => Colon,
        '?' => Question,
        ' ' => Space,
        '\n' => Enter,
        // Shifted symbols
        '!' => return Some(KeyStroke::shifted(N1)),
        '"' => return Some(KeyStroke::shifted(N2)),
        '#' => return Some(KeyStroke::shifted(N3)),
        '$' => return Some(KeyStroke::shifted(N4)),
        '%' => return Some(KeyStroke::shifted(N5)),
        '&' => return Some(KeyStroke::shifted(N6)),
        '/' => return Some(KeyStroke::shifted(N7)),
        '(' => return Some(KeyStroke::shifted(N8)),
        ')' => return Some(KeyStroke::shifted(N9)),
        '*' => return Some(KeyStroke::shifted(N0)),
        '=' => return Some(KeyStroke::shifted(O)),
        '-' => return Some(KeyStroke::shifted(I)),
        '+' => return Some(KeyStroke::shifted(P)),
        '^' => return Some(KeyStroke::shifted(K)),
        '@' => return Some(KeyStroke::shifted(L)),
        _ => return None,
    };
    Some(KeyStroke::plain(key))
}

/// Action carried by a timed input event.
#[derive(Debug, Clone, Copy)]
pub enum InputAction {
    Press(KeyStroke),
    Release,
}

/// A timed keyboard event.
#[derive(Debug, Clone, Copy)]
pub struct InputEvent {
    /// Batch number at which this event fires.
    pub batch: u64,
    pub action: InputAction,
}

/// Timed input queue for scripted key sequences.
///
/// Events are kept sorted by batch number and applied at the start of
/// each batch. The direct keyboard holds one key at a time, so typing is
/// press-then-release pairs with a gap in between.
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
        }
    }

    /// Enqueue a raw event, keeping the queue sorted.
    pub fn push(&mut self, event: InputEvent) {
        let pos = self
            .events
            .iter()
            .position(|e| e.batch > event.batch)
            .unwrap_or(self.events.len());
        self.events.insert(pos, event);
    }

    /// Enqueue a press-and-release of one stroke.
    pub fn enqueue_stroke(&mut self, stroke: KeyStroke, at_batch: u64, hold_batches: u64) {
        self.push(InputEvent {
            batch: at_batch,
            action: InputAction::Press(stroke),
        });
        self.push(InputEvent {
            batch: at_batch + hold_batches,
            action: InputAction::Release,
        });
    }

    /// Enqueue typing a string, one stroke every three batches.
    ///
    /// Returns the next free batch after the text.
    pub fn enqueue_text(&mut self, text: &str, start_batch: u64) -> u64 {
        let hold = 2;
        let gap = 1;
        let mut batch = start_batch;

        for c in text.chars() {
            if let Some(stroke) = char_to_stroke(c) {
                self.enqueue_stroke(stroke, batch, hold);
                batch += hold + gap;
            }
        }
        batch
    }

    /// Apply all events due at `batch` to the keyboard.
    pub fn process(&mut self, batch: u64, keyboard: &mut Keyboard) {
        while let Some(event) = self.events.front() {
            if event.batch > batch {
                break;
            }
            let event = self.events.pop_front().expect("front was Some");
            match event.action {
                InputAction::Press(stroke) => keyboard.press(stroke),
                InputAction::Release => keyboard.release(),
            }
        }
    }

    /// Number of pending events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
