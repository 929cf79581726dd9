//! Host keyboard -> TK2000 key mapping.
//!
//! Maps winit `KeyCode` values to [`Tk2000Key`] for the windowed
//! binary. Modifier state (shift/ctrl) is tracked by the window layer
//! and composed into the stroke; host shift+digit therefore lands on
//! the same matrix cell with the SHIFT line asserted, which is exactly
//! how the TK2000 types its symbols.

use winit::keyboard::KeyCode;

use crate::input::Tk2000Key;

/// Map a host key to a TK2000 key.
///
/// Returns `None` for unmapped keys. Backspace lands on LEFT, which is
/// what the machine's ROM expects for rubout.
#[must_use]
pub fn map_keycode(key: KeyCode) -> Option<Tk2000Key> {
    match key {
        // Letters
        KeyCode::KeyA => Some(Tk2000Key::A),
        KeyCode::KeyB => Some(Tk2000Key::B),
        KeyCode::KeyC => Some(Tk2000Key::C),
        KeyCode::KeyD => Some(Tk2000Key::D),
        KeyCode::KeyE => Some(Tk2000Key::E),
        KeyCode::KeyF => Some(Tk2000Key::F),
        KeyCode::KeyG => Some(Tk2000Key::G),
        KeyCode::KeyH => Some(Tk2000Key::H),
        KeyCode::KeyI => Some(Tk2000Key::I),
        KeyCode::KeyJ => Some(Tk2000Key::J),
        KeyCode::KeyK => Some(Tk2000Key::K),
        KeyCode::KeyL => Some(Tk2000Key::L),
        KeyCode::KeyM => Some(Tk2000Key::M),
        KeyCode::KeyN => Some(Tk2000Key::N),
        KeyCode::KeyO => Some(Tk2000Key::O),
        KeyCode::KeyP => Some(Tk2000Key::P),
        KeyCode::KeyQ => Some(Tk2000Key::Q),
        KeyCode::KeyR => Some(Tk2000Key::R),
        KeyCode::KeyS => Some(Tk2000Key::S),
        KeyCode::KeyT => Some(Tk2000Key::T),
        KeyCode::KeyU => Some(Tk2000Key::U),
        KeyCode::KeyV => Some(Tk2000Key::V),
        KeyCode::KeyW => Some(Tk2000Key::W),
        KeyCode::KeyX => Some(Tk2000Key::X),
        KeyCode::KeyY => Some(Tk2000Key::Y),
        KeyCode::KeyZ => Some(Tk2000Key::Z),

        // Digits
        KeyCode::Digit0 => Some(Tk2000Key::N0),
        KeyCode::Digit1 => Some(Tk2000Key::N1),
        KeyCode::Digit2 => Some(Tk2000Key::N2),
        KeyCode::Digit3 => Some(Tk2000Key::N3),
        KeyCode::Digit4 => Some(Tk2000Key::N4),
        KeyCode::Digit5 => Some(Tk2000Key::N5),
        KeyCode::Digit6 => Some(Tk2000Key::N6),
        KeyCode::Digit7 => Some(Tk2000Key::N7),
        KeyCode::Digit8 => Some(Tk2000Key::N8),
        KeyCode::Digit9 => Some(Tk2000Key::N9),

        // Punctuation
        KeyCode::Comma => Some(Tk2000Key::Comma),
        KeyCode::Period => Some(Tk2000Key::Period),
        KeyCode::Semicolon => Some(Tk2000Key::Colon),
        KeyCode::Slash => Some(Tk2000Key::Question),

        // Special keys
        KeyCode::Enter => Some(Tk2000Key::Enter),
        KeyCode::Space => Some(Tk2000Key::Space),
        KeyCode::Backspace => Some(Tk2000Key::Left),

        // Cursor keys
        KeyCode::ArrowUp => Some(Tk2000Key::Up),
        KeyCode::ArrowDown => Some(Tk2000Key::Down),
        KeyCode::ArrowLeft => Some(Tk2000Key::Left),
        KeyCode::ArrowRight => Some(Tk2000Key::Right),

        _ => None,
    }
}
