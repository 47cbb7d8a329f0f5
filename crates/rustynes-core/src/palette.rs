//! NES master palette (2C02 PPU, NTSC values).
//!
//! The PPU produces 6-bit palette indices (`$00`-`$3F`); this table maps
//! each index to the sRGB triple a host should draw. Indices `$0D`, `$1D`,
//! `$2D`, and `$3D` are "blacker than black" / unused sync entries and are
//! clamped to pure black here rather than reproduced as out-of-gamut video
//! levels.

/// 64-entry NES master palette, indexed by PPU palette index.
#[rustfmt::skip]
pub const NES_PALETTE: [(u8, u8, u8); 64] = [
    (0x62, 0x62, 0x62), (0x00, 0x1F, 0xB2), (0x24, 0x04, 0xC8), (0x52, 0x00, 0xB2),
    (0x73, 0x00, 0x76), (0x80, 0x00, 0x24), (0x73, 0x0B, 0x00), (0x52, 0x28, 0x00),
    (0x24, 0x44, 0x00), (0x00, 0x57, 0x00), (0x00, 0x5C, 0x00), (0x00, 0x53, 0x24),
    (0x00, 0x3C, 0x76), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00),
    (0xAB, 0xAB, 0xAB), (0x0D, 0x57, 0xFF), (0x53, 0x30, 0xFF), (0x94, 0x0F, 0xFF),
    (0xC0, 0x00, 0xC7), (0xD2, 0x00, 0x5C), (0xC0, 0x23, 0x00), (0x94, 0x4B, 0x00),
    (0x53, 0x6B, 0x00), (0x0D, 0x84, 0x00), (0x00, 0x8C, 0x00), (0x00, 0x82, 0x4B),
    (0x00, 0x66, 0xB6), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00),
    (0xFF, 0xFF, 0xFF), (0x5D, 0x9F, 0xFF), (0xA0, 0x78, 0xFF), (0xE6, 0x58, 0xFF),
    (0xFF, 0x45, 0xF3), (0xFF, 0x49, 0x9C), (0xFF, 0x6D, 0x4E), (0xE6, 0x95, 0x1D),
    (0xA0, 0xBE, 0x0A), (0x5D, 0xD8, 0x1D), (0x25, 0xE1, 0x4E), (0x0B, 0xDA, 0x9C),
    (0x0B, 0xC0, 0xF3), (0x2D, 0x2D, 0x2D), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00),
    (0xFF, 0xFF, 0xFF), (0xC2, 0xE0, 0xFF), (0xDC, 0xD2, 0xFF), (0xF5, 0xC7, 0xFF),
    (0xFF, 0xC1, 0xFB), (0xFF, 0xC3, 0xDD), (0xFF, 0xD1, 0xC2), (0xF5, 0xDE, 0xAE),
    (0xDC, 0xEB, 0xA6), (0xC2, 0xF3, 0xAE), (0xAA, 0xF5, 0xC2), (0x9F, 0xF2, 0xDD),
    (0x9F, 0xE8, 0xFB), (0xAB, 0xAB, 0xAB), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00),
];

/// Converts a 6-bit PPU palette index to an sRGB triple.
///
/// Only the low 6 bits of `index` are significant; callers that pass the
/// raw palette RAM byte (which may carry an emphasis or mirror bit) should
/// mask with `& 0x3F` first.
pub fn palette_to_rgb(index: u8) -> (u8, u8, u8) {
    NES_PALETTE[(index & 0x3F) as usize]
}
