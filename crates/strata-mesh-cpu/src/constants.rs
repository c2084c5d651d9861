pub const OPAQUE_ALPHA: u8 = 255;
pub const TRANSPARENT_ALPHA: u8 = 160;
/// Visual-only lighting floor to avoid pitch-black faces in darkness.
/// Does not affect logical light propagation.
pub const VISUAL_LIGHT_MIN: u8 = 18; // ~7% brightness floor
