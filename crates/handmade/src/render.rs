//! # Software Back Buffer
//!
//! The game draws into plain memory; the platform decides how to show it.

/// Bytes per XRGB pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A CPU-side XRGB8888 frame, row-major, top row first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffscreenBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl OffscreenBuffer {
    /// A black buffer of `width` × `height`.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let mut buffer = Self::default();
        buffer.resize(width, height);
        buffer
    }

    /// Reallocates to `width` × `height` and clears to black.
    ///
    /// A zero dimension yields an empty buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize, 0);
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    #[must_use]
    pub const fn pitch(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Pixels, row-major.
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Returns the pixel at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Raw bytes for upload, native endian.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
}

/// Fills the buffer with the scrolling blue/green test pattern.
pub fn render_weird_gradient(buffer: &mut OffscreenBuffer, blue_offset: i32, green_offset: i32) {
    let width = buffer.width as usize;
    if width == 0 {
        return;
    }

    for (y, row) in buffer.pixels.chunks_exact_mut(width).enumerate() {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let green = (y as i32).wrapping_add(green_offset) as u32 & 0xFF;
        for (x, pixel) in row.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let blue = (x as i32).wrapping_add(blue_offset) as u32 & 0xFF;
            *pixel = (green << 8) | blue;
        }
    }
}

/// Encodes the buffer as a binary PPM (P6) image.
#[must_use]
pub fn encode_ppm(buffer: &OffscreenBuffer) -> Vec<u8> {
    let mut out = Vec::with_capacity(32 + buffer.pixels.len() * 3);
    out.extend_from_slice(format!("P6\n{} {}\n255\n", buffer.width, buffer.height).as_bytes());

    for &pixel in &buffer.pixels {
        let [_, r, g, b] = pixel.to_be_bytes();
        out.extend_from_slice(&[r, g, b]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_and_pitch() {
        let mut buffer = OffscreenBuffer::new(8, 4);
        assert_eq!(buffer.pixels().len(), 32);
        assert_eq!(buffer.pitch(), 32);
        assert_eq!(buffer.as_bytes().len(), 128);

        buffer.resize(0, 10);
        assert!(buffer.pixels().is_empty());
        assert_eq!(buffer.pitch(), 0);
    }

    #[test]
    fn test_gradient_pattern() {
        let mut buffer = OffscreenBuffer::new(300, 300);
        render_weird_gradient(&mut buffer, 0, 0);
        assert_eq!(buffer.pixel(0, 0), Some(0));
        assert_eq!(buffer.pixel(5, 3), Some(0x0305));
        assert_eq!(buffer.pixel(256, 0), Some(0), "blue wraps at 256");

        render_weird_gradient(&mut buffer, 10, -1);
        assert_eq!(buffer.pixel(0, 0), Some(0xFF0A));
        assert_eq!(buffer.pixel(1, 1), Some(0x000B));
    }

    #[test]
    fn test_gradient_on_empty_buffer() {
        let mut buffer = OffscreenBuffer::new(0, 0);
        render_weird_gradient(&mut buffer, 1, 1);
        assert!(buffer.pixels().is_empty());
    }

    #[test]
    fn test_ppm_layout() {
        let mut buffer = OffscreenBuffer::new(2, 1);
        buffer.pixels_mut().copy_from_slice(&[0x00AA_BBCC, 0x0011_2233]);

        let ppm = encode_ppm(&buffer);
        let header = b"P6\n2 1\n255\n";
        assert_eq!(&ppm[..header.len()], header);
        assert_eq!(&ppm[header.len()..], &[0xAA, 0xBB, 0xCC, 0x11, 0x22, 0x33]);
    }
}
