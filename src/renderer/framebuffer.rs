//! Software framebuffer
//!
//! Executes a draw list into RGBA pixels with alpha-over blending.

use bytemuck::{Pod, Zeroable};
use glam::IVec2;

use super::draw::DrawCommand;
use crate::assets::{Assets, Image};

/// One RGBA8 pixel
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }

    /// Blend `src` over `self`
    fn over(self, src: Rgba) -> Rgba {
        match src.a {
            0 => self,
            255 => src,
            a => {
                let a = a as u16;
                let mix = |s: u8, d: u8| ((s as u16 * a + d as u16 * (255 - a) + 127) / 255) as u8;
                Rgba::new(
                    mix(src.r, self.r),
                    mix(src.g, self.g),
                    mix(src.b, self.b),
                    self.a.max(src.a),
                )
            }
        }
    }
}

/// Frame being composed for presentation
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: i32,
    height: i32,
    pixels: Vec<Rgba>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            pixels: vec![Rgba::default(); width as usize * height as usize],
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        self.pixels.fill(Rgba::from_array(color));
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Draw `image` with its top-left at `pos`, clipped to the frame
    pub fn blit(&mut self, image: &Image, pos: IVec2, flip_x: bool) {
        let x0 = pos.x.max(0);
        let y0 = pos.y.max(0);
        let x1 = (pos.x + image.width()).min(self.width);
        let y1 = (pos.y + image.height()).min(self.height);

        for y in y0..y1 {
            let row = (y * self.width) as usize;
            for x in x0..x1 {
                let src = Rgba::from_array(image.pixel(x - pos.x, y - pos.y, flip_x));
                let dst = &mut self.pixels[row + x as usize];
                *dst = dst.over(src);
            }
        }
    }

    /// Run a draw list in order; commands with unknown images are skipped
    pub fn execute(&mut self, commands: &[DrawCommand], assets: &Assets) {
        for cmd in commands {
            if let Some(image) = assets.get(cmd.image) {
                self.blit(image, cmd.pos, cmd.flip_x);
            }
        }
    }
}
