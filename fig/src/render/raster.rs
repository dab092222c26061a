use std::io::Cursor;
use std::num::NonZeroU32;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use itertools::Itertools as _;
use log::{debug, info, warn};
use unifont_bitmap::Unifont;

use super::{Rasterizer, RenderError};
use crate::config::Canvas;

const GLYPH_HEIGHT: u32 = 16;
const NARROW_WIDTH: u32 = 8;
const WIDE_WIDTH: u32 = 16;

/// What to do with the unused parts of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropMode {
    /// Keep the full canvas.
    None,
    /// Crop to the drawn text plus the padding, never growing beyond the canvas.
    #[default]
    Content,
}

/// [`Rasterizer`] that draws each character of the art with its GNU Unifont glyph
///
/// Glyphs are 8 pixels wide (16 for wide characters) and 16 pixels tall, multiplied by the
/// scale. The art starts `padding` pixels from the top left corner of the canvas. Art larger than
/// the canvas minus the padding is shrunk to fit, keeping its aspect ratio.
#[must_use]
#[derive(Debug, Clone, Copy)]
pub struct UnifontRasterizer {
    scale: NonZeroU32,
    padding: u32,
    line_gap: u32,
    crop: CropMode,
}

impl UnifontRasterizer {
    /// Scale 1, 20 pixels of padding, no gap between lines, cropped to content.
    pub const fn new() -> Self {
        Self {
            scale: NonZeroU32::MIN,
            padding: 20,
            line_gap: 0,
            crop: CropMode::Content,
        }
    }

    /// Sets the integer scale factor for glyphs.
    pub const fn scale(mut self, scale: NonZeroU32) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the space around the art, in pixels.
    pub const fn padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Sets extra space between lines, in pixels.
    pub const fn line_gap(mut self, line_gap: u32) -> Self {
        self.line_gap = line_gap;
        self
    }

    /// Sets the crop mode.
    pub const fn crop(mut self, crop: CropMode) -> Self {
        self.crop = crop;
        self
    }

    fn draw(&self, art: &str, canvas: &Canvas) -> RgbaImage {
        let mut image = RgbaImage::new(canvas.width.get(), canvas.height.get());
        let available = (
            image.width().saturating_sub(self.padding.saturating_mul(2)),
            image.height().saturating_sub(self.padding.saturating_mul(2)),
        );
        if available.0 == 0 || available.1 == 0 {
            warn!("no room for the art inside a padding of {} pixels", self.padding);
            return image;
        }
        let ink = Rgba(canvas.color.to_rgba());
        let mut art = self.draw_natural(art, ink);
        if art.width() > available.0 || art.height() > available.1 {
            let (width, height) = fit(art.dimensions(), available);
            info!(
                "shrinking {}x{} pixels of art to {width}x{height} to fit the canvas",
                art.width(),
                art.height()
            );
            art = imageops::resize(&art, width, height, FilterType::Triangle);
            for pixel in art.pixels_mut().filter(|pixel| pixel[3] > 0) {
                pixel.0[..3].copy_from_slice(&ink.0[..3]);
            }
        }
        let offset = i64::from(self.padding);
        imageops::overlay(&mut image, &art, offset, offset);
        image
    }

    /// Draws `art` on a canvas of exactly its own size.
    fn draw_natural(&self, art: &str, ink: Rgba<u8>) -> RgbaImage {
        let scale = self.scale.get();
        let line_height = GLYPH_HEIGHT.saturating_mul(scale).saturating_add(self.line_gap);
        let mut unifont = Unifont::open();

        let lines: Vec<&str> = art.lines().collect();
        let width = lines
            .iter()
            .map(|line| {
                line.chars()
                    .map(|c| glyph_width(&mut unifont, c))
                    .fold(0u32, u32::saturating_add)
            })
            .max()
            .unwrap_or(0)
            .saturating_mul(scale);
        let height = u32::try_from(lines.len())
            .unwrap_or(u32::MAX)
            .saturating_mul(line_height)
            .saturating_sub(self.line_gap);
        let mut image = RgbaImage::new(width.max(1), height.max(1));

        for (line, row) in lines.into_iter().zip(0u32..) {
            let top = row.saturating_mul(line_height);
            let mut left = 0u32;
            for c in line.chars() {
                let width = glyph_width(&mut unifont, c);
                if !c.is_whitespace() {
                    let bytes = unifont.load_bitmap(u32::from(c)).get_bytes();
                    let pitch = width / 8;
                    for (y, x) in (0..GLYPH_HEIGHT).cartesian_product(0..width) {
                        let byte = bytes.get((y * pitch + x / 8) as usize).copied();
                        if byte.is_some_and(|byte| byte & (0x80 >> (x % 8)) != 0) {
                            let x = left.saturating_add(x.saturating_mul(scale));
                            let y = top.saturating_add(y.saturating_mul(scale));
                            self.plot(&mut image, x, y, ink);
                        }
                    }
                }
                left = left.saturating_add(width.saturating_mul(scale));
            }
        }
        image
    }

    fn plot(&self, image: &mut RgbaImage, x: u32, y: u32, ink: Rgba<u8>) {
        let scale = self.scale.get();
        for (dy, dx) in (0..scale).cartesian_product(0..scale) {
            let (x, y) = (x.saturating_add(dx), y.saturating_add(dy));
            if let Some(pixel) = image.get_pixel_mut_checked(x, y) {
                *pixel = ink;
            }
        }
    }

    fn crop_to_content(&self, image: RgbaImage) -> RgbaImage {
        let bounds = image
            .enumerate_pixels()
            .filter(|(_, _, pixel)| pixel[3] > 0)
            .fold(None, |bounds, (x, y, _)| match bounds {
                None => Some((x, y, x, y)),
                Some((left, top, right, bottom)) => {
                    Some((x.min(left), y.min(top), x.max(right), y.max(bottom)))
                }
            });
        let Some((left, top, right, bottom)) = bounds else {
            return image;
        };
        let left = left.saturating_sub(self.padding);
        let top = top.saturating_sub(self.padding);
        let right = (right + 1).saturating_add(self.padding).min(image.width());
        let bottom = (bottom + 1).saturating_add(self.padding).min(image.height());
        imageops::crop_imm(&image, left, top, right - left, bottom - top).to_image()
    }
}

fn glyph_width(unifont: &mut Unifont, c: char) -> u32 {
    if unifont.load_bitmap(u32::from(c)).is_wide() {
        WIDE_WIDTH
    } else {
        NARROW_WIDTH
    }
}

/// The largest size with the aspect ratio of `size` that fits inside `available`.
fn fit(size: (u32, u32), available: (u32, u32)) -> (u32, u32) {
    let (width, height) = (u64::from(size.0), u64::from(size.1));
    let (max_width, max_height) = (u64::from(available.0), u64::from(available.1));
    let (width, height) = if width * max_height <= height * max_width {
        (width * max_height / height, max_height)
    } else {
        (max_width, height * max_width / width)
    };
    (
        u32::try_from(width).unwrap_or(u32::MAX).max(1),
        u32::try_from(height).unwrap_or(u32::MAX).max(1),
    )
}

impl Default for UnifontRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for UnifontRasterizer {
    fn rasterize(&self, art: &str, canvas: &Canvas) -> Result<Vec<u8>, RenderError> {
        let mut image = self.draw(art, canvas);
        if self.crop == CropMode::Content {
            image = self.crop_to_content(image);
        }
        debug!("rasterized art to {}x{}", image.width(), image.height());
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;
        Ok(png.into_inner())
    }
}
