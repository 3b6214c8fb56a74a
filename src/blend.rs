// Composite the reveal layer over the placeholder.
// Visual: where the stroke is opaque you see the photo; on its soft edge a linear-light mix; elsewhere the card.
use crate::error::Error;
use crate::gamma::GammaLut;
use crate::types::FrameBuffer;
use tiny_skia::Pixmap;

/// Source-over of a premultiplied RGBA layer onto a 0x00RRGGBB buffer, same size.
pub fn composite_over(dst: &mut FrameBuffer, layer: &Pixmap, lut: &GammaLut) -> Result<(), Error> {
    if dst.width != layer.width() as usize || dst.height != layer.height() as usize {
        return Err(Error::Raster(format!(
            "composite: {}x{} layer onto {}x{} frame",
            layer.width(),
            layer.height(),
            dst.width,
            dst.height
        )));
    }

    for (out, px) in dst.pixels.iter_mut().zip(layer.pixels()) {
        let a8 = px.alpha();
        if a8 == 0 { continue; }             // visual: card untouched
        if a8 == 255 {                       // visual: photo fully revealed here
            *out = pack(px.red(), px.green(), px.blue());
            continue;
        }

        // Soft edge: straight color, then mix in linear light like the brush edge
        let c = px.demultiply();
        let a = a8 as f32 / 255.0;
        let old = *out;
        let r = lut.mix_u8(((old >> 16) & 0xFF) as u8, c.red(), a);
        let g = lut.mix_u8(((old >> 8) & 0xFF) as u8, c.green(), a);
        let b = lut.mix_u8((old & 0xFF) as u8, c.blue(), a);
        *out = pack(r, g, b);
    }
    Ok(())
}

#[inline]
pub fn pack(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::{Color, Paint, Rect, Transform};

    #[test]
    fn test_transparent_layer_keeps_destination() {
        let mut fb = FrameBuffer::filled(3, 3, 0x00_80_80_80);
        let layer = Pixmap::new(3, 3).unwrap();
        composite_over(&mut fb, &layer, &GammaLut::new()).unwrap();
        assert!(fb.pixels.iter().all(|&p| p == 0x00_80_80_80));
    }

    #[test]
    fn test_opaque_pixels_replace_destination() {
        let mut fb = FrameBuffer::filled(4, 4, 0x00_80_80_80);
        let mut layer = Pixmap::new(4, 4).unwrap();
        let mut paint = Paint::default();
        paint.set_color(Color::from_rgba8(0, 200, 0, 255));
        layer.fill_rect(Rect::from_xywh(0.0, 0.0, 2.0, 4.0).unwrap(), &paint, Transform::identity(), None);
        composite_over(&mut fb, &layer, &GammaLut::new()).unwrap();
        assert_eq!(fb.get(0, 0), Some(0x00_00_C8_00));
        assert_eq!(fb.get(3, 3), Some(0x00_80_80_80));
    }

    #[test]
    fn test_size_mismatch_is_an_error() {
        let mut fb = FrameBuffer::filled(2, 2, 0);
        let layer = Pixmap::new(3, 3).unwrap();
        assert!(composite_over(&mut fb, &layer, &GammaLut::new()).is_err());
    }
}
