//! TK2000 configuration: the ROM image.

/// Configuration for constructing a TK2000 instance.
pub struct Tk2000Config {
    /// System ROM image (16,384 bytes, mapped from $C000).
    pub rom: Vec<u8>,
}
