//! Display palettes.
//!
//! Two fixed 16-entry tables as 0x00RRGGBB. The artifact decoder emits
//! 4-bit color indexes into whichever table is active.

/// Composite color palette: the six Apple II hi-res colors plus the
/// blended intermediates the artifact decoder can produce.
pub const COLOR_PALETTE: [u32; 16] = [
    0x00_0000, // 0: black
    0xDD_0033, // 1: magenta
    0x00_0099, // 2: dark blue
    0xDD_22DD, // 3: purple
    0x00_7722, // 4: dark green
    0x55_5555, // 5: gray 1
    0x22_22FF, // 6: medium blue
    0x66_AAFF, // 7: light blue
    0x88_5500, // 8: brown
    0xFF_6600, // 9: orange
    0xAA_AAAA, // 10: gray 2
    0xFF_9988, // 11: pink
    0x11_DD00, // 12: green
    0xFF_FF00, // 13: yellow
    0x44_FF99, // 14: aqua
    0xFF_FFFF, // 15: white
];

/// Green-phosphor monitor approximation for mono mode.
pub const MONO_PALETTE: [u32; 16] = [
    0x00_0000, //  0
    0x0E_470E, //  1
    0x04_1204, //  2
    0x16_6E16, //  3
    0x0F_4A0F, //  4
    0x11_5411, //  5
    0x0C_3B0C, //  6
    0x1F_9E1F, //  7
    0x12_5C12, //  8
    0x1B_8A1B, //  9
    0x22_AB22, // 10
    0x24_B524, // 11
    0x1A_871A, // 12
    0x2D_E32D, // 13
    0x25_BD25, // 14
    0xFF_FFFF, // 15
];
