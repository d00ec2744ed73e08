#![forbid(unsafe_code)]

/// Rotation used by TCF v1 payloads.
pub const SHIFT_BITS: u32 = 2;

/// Keyless bit-rotation transform applied to payload bytes.
///
/// This is obfuscation only: anyone can invert it. Both directions are
/// precomputed lookup tables so the hot loops are a single index per byte.
#[derive(Clone)]
pub struct Cipher {
    forward: [u8; 256],
    inverse: [u8; 256],
}

impl Cipher {
    /// The transform every TCF v1 archive uses.
    pub const TCF: Cipher = Cipher::with_shift(SHIFT_BITS);

    pub const fn with_shift(shift: u32) -> Self {
        let mut forward = [0u8; 256];
        let mut inverse = [0u8; 256];
        let mut i = 0;
        while i < 256 {
            let b = i as u8;
            forward[i] = b.rotate_left(shift);
            inverse[i] = b.rotate_right(shift);
            i += 1;
        }
        Cipher { forward, inverse }
    }

    #[inline]
    pub fn forward(&self, b: u8) -> u8 {
        self.forward[b as usize]
    }

    #[inline]
    pub fn inverse(&self, b: u8) -> u8 {
        self.inverse[b as usize]
    }

    pub fn encode_in_place(&self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b = self.forward[*b as usize];
        }
    }

    pub fn decode_in_place(&self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b = self.inverse[*b as usize];
        }
    }

    /// Decodes `src` into the front of `dst`. `dst` must be at least as long as `src`.
    pub fn decode_into(&self, src: &[u8], dst: &mut [u8]) {
        for (d, s) in dst.iter_mut().zip(src) {
            *d = self.inverse[*s as usize];
        }
    }
}

impl Default for Cipher {
    fn default() -> Self {
        Cipher::TCF
    }
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // forward[1] == 1 << shift for every rotation amount
        f.debug_struct("Cipher")
            .field("shift", &self.forward[1].trailing_zeros())
            .finish()
    }
}
