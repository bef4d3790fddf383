/// Number of entries in the indexed-colour palette.
pub const PALETTE_SIZE: usize = 16;

/// RGB values of the sixteen palette indices.
pub const PALETTE: [[u8; 3]; PALETTE_SIZE] = [
    [0x00, 0x00, 0x00],
    [0x2b, 0x33, 0x5f],
    [0x7e, 0x20, 0x72],
    [0x19, 0x95, 0x9c],
    [0x8b, 0x48, 0x52],
    [0x39, 0x5c, 0x98],
    [0xa9, 0xc1, 0xff],
    [0xee, 0xee, 0xee],
    [0xd4, 0x18, 0x6c],
    [0xd3, 0x84, 0x41],
    [0xe9, 0xc3, 0x5b],
    [0x70, 0xc6, 0xa9],
    [0x76, 0x96, 0xde],
    [0xa3, 0xa3, 0xa3],
    [0xff, 0x97, 0x98],
    [0xed, 0xc7, 0xb0],
];

/// Looks up the RGB triple for a palette index, wrapping out-of-range values.
pub fn rgb(index: u8) -> [u8; 3] {
    PALETTE[usize::from(index) % PALETTE_SIZE]
}

/// Rotating base index shared by every effect so colour pulses stay in step
/// when the active effect changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorCycler {
    offset: u8,
}

impl ColorCycler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }

    pub fn advance(&mut self) {
        self.offset = ((usize::from(self.offset) + 1) % PALETTE_SIZE) as u8;
    }

    /// Palette index for an effect-local colour slot.
    pub fn color(&self, local: usize) -> u8 {
        color_for(local, self.offset)
    }
}

/// `(local + offset) mod 16`.
pub fn color_for(local: usize, offset: u8) -> u8 {
    ((local % PALETTE_SIZE + usize::from(offset)) % PALETTE_SIZE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_wraps_after_sixteen_steps() {
        let mut cycler = ColorCycler::new();
        for expected in 1..PALETTE_SIZE {
            cycler.advance();
            assert_eq!(usize::from(cycler.offset()), expected);
        }
        assert_eq!(cycler.color(1), 0);
        cycler.advance();
        assert_eq!(cycler.offset(), 0);
        assert_eq!(cycler.color(1), 1);
    }

    #[test]
    fn colours_rotate_with_offset() {
        assert_eq!(color_for(3, 0), 3);
        assert_eq!(color_for(3, 14), 1);
        assert_eq!(color_for(40, 15), 7);
        assert!((0..100).all(|i| usize::from(color_for(i, 9)) < PALETTE_SIZE));
    }

    #[test]
    fn rgb_lookup_wraps() {
        assert_eq!(rgb(0), [0, 0, 0]);
        assert_eq!(rgb(23), PALETTE[7]);
    }
}
