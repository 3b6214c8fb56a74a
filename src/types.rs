// Core value types shared by every module.

#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A buffer filled with one color.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }

    #[cfg(test)]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height { return None; }
        Some(self.pixels[y * self.width + x])
    }

    /// Copy `src` into self with its top-left at (ox, oy), clipped to bounds.
    pub fn blit(&mut self, src: &FrameBuffer, ox: usize, oy: usize) {
        if ox >= self.width || oy >= self.height { return; }
        let w = src.width.min(self.width - ox);
        let h = src.height.min(self.height - oy);
        for y in 0..h {
            let d = (oy + y) * self.width + ox;
            let s = y * src.width;
            self.pixels[d..d + w].copy_from_slice(&src.pixels[s..s + w]);
        }
    }
}

/// A pointer position in the drawing surface's local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self { Self { x, y } }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Side length of the measured square, handed to the uri/placeholder policies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SizeConfig {
    pub size: f32,
}

impl SizeConfig {
    /// Side in whole pixels (floor).
    pub fn pixels(self) -> u32 {
        self.size.max(0.0).floor() as u32
    }
}
