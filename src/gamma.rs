// Table lookups for gamma-correct compositing of the stroke's soft edges.
// Visual: anti-aliased scratch edges blend into the card without dark fringes.

#[derive(Clone)]
pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1) as f32
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255) via 4096-step quantization
    // (index = (linear * 4095).round())
    linear_to_srgb: [u8; 4096],
}

impl GammaLut {
    /// Build both tables once at startup.
    pub fn new() -> Self {
        // sRGB -> linear
        let mut s2l = [0.0f32; 256];
        for v in 0..=255 {
            let c = v as f32 / 255.0;
            s2l[v] = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        // linear -> sRGB (quantized to 4096 steps)
        let mut l2s = [0u8; 4096];
        for i in 0..4096 {
            let l = (i as f32) / 4095.0; // 0..1
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            let v = (s * 255.0).round().clamp(0.0, 255.0) as u8;
            l2s[i] = v;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    /// Mix two sRGB bytes in linear light: `a` of `src`, the rest `dst`.
    #[inline]
    pub fn mix_u8(&self, dst: u8, src: u8, a: f32) -> u8 {
        let l = a * self.srgb_u8_to_linear(src) + (1.0 - a) * self.srgb_u8_to_linear(dst);
        self.linear_to_srgb_u8(l)
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        // Quantize to 0..4095 index
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_round_trip_endpoints() {
        let lut = GammaLut::new();
        assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(0)), 0);
        assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(255)), 255);
        assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(128)), 128);
    }

    #[test]
    fn test_half_mix_is_brighter_than_naive_average() {
        let lut = GammaLut::new();
        // Linear-light midpoint of black and white sits around sRGB 188, not 128.
        let m = lut.mix_u8(0, 255, 0.5);
        assert!(m > 170 && m < 200, "got {m}");
        assert_eq!(lut.mix_u8(10, 240, 1.0), 240);
        assert_eq!(lut.mix_u8(10, 240, 0.0), 10);
    }
}
