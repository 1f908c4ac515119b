//! Decoder for the uncompressed 32-bit Targa-style texture container.
//!
//! Layout (little-endian):
//!
//! | offset | size | field                         |
//! |--------|------|-------------------------------|
//! | 0      | 12   | reserved                      |
//! | 12     | 2    | width                         |
//! | 14     | 2    | height                        |
//! | 16     | 1    | bits per pixel (must be 32)   |
//! | 17     | 1    | reserved                      |
//! | 18     | w·h·4| pixels, bottom row first, BGRA|
//!
//! Decoding normalizes the pixels into top row first, RGBA order.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{RenderError, RenderResult};

/// Size of the fixed container header in bytes.
pub const HEADER_LEN: usize = 18;

/// Bytes per pixel of both the source container and the decoded image.
pub const BYTES_PER_PIXEL: usize = 4;

const SUPPORTED_BITS_PER_PIXEL: u8 = 32;

/// Fields of the container header the decoder cares about.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TargaHeader {
    pub width: u16,
    pub height: u16,
    pub bits_per_pixel: u8,
}

impl TargaHeader {
    pub fn parse(bytes: &[u8; HEADER_LEN]) -> Self {
        Self {
            width: u16::from_le_bytes([bytes[12], bytes[13]]),
            height: u16::from_le_bytes([bytes[14], bytes[15]]),
            bits_per_pixel: bytes[16],
        }
    }

    /// Number of pixel bytes that must follow the header.
    pub fn pixel_data_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    fn row_len(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }
}

/// A decoded image: RGBA8, row-major, top row first.
///
/// Owned transiently by the texture upload; it is consumed by value so that it
/// cannot outlive the GPU copy.
#[derive(Debug)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tightly packed RGBA bytes, `width * height * 4` long.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes of row `y`, counted from the top.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let row_len = self.width as usize * BYTES_PER_PIXEL;
        let start = y as usize * row_len;
        self.pixels.get(start..start + row_len)
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * BYTES_PER_PIXEL as u32
    }
}

/// Opens and decodes the container at `path`.
pub fn decode_file(path: impl AsRef<Path>) -> RenderResult<DecodedImage> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| RenderError::io(path, e))?;
    decode_reader(BufReader::new(file), path)
}

/// Decodes a container from `reader`; `path` is only used for error reporting.
pub fn decode_reader<R: Read>(mut reader: R, path: &Path) -> RenderResult<DecodedImage> {
    let mut header_bytes = [0u8; HEADER_LEN];
    reader
        .read_exact(&mut header_bytes)
        .map_err(|e| RenderError::io(path, e))?;

    let header = TargaHeader::parse(&header_bytes);

    if header.bits_per_pixel != SUPPORTED_BITS_PER_PIXEL {
        return Err(RenderError::Format {
            path: path.to_path_buf(),
            detail: format!(
                "{} bits per pixel, only {SUPPORTED_BITS_PER_PIXEL} is supported",
                header.bits_per_pixel
            ),
        });
    }

    if header.width == 0 || header.height == 0 {
        return Err(RenderError::Format {
            path: path.to_path_buf(),
            detail: format!("empty image ({}x{})", header.width, header.height),
        });
    }

    // The buffer grows with the bytes actually present, never with what the
    // header claims. Trailing bytes (footers, extension areas) are ignored.
    let expected = header.pixel_data_len();
    let mut source = Vec::new();
    reader
        .by_ref()
        .take(expected as u64)
        .read_to_end(&mut source)
        .map_err(|e| RenderError::io(path, e))?;
    if source.len() != expected {
        return Err(RenderError::io(
            path,
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} of {expected} pixel bytes present", source.len()),
            ),
        ));
    }

    let pixels = flip_rows_and_swizzle(&header, &source);

    log::debug!(
        "decoded {} ({}x{})",
        path.display(),
        header.width,
        header.height
    );

    Ok(DecodedImage {
        width: u32::from(header.width),
        height: u32::from(header.height),
        pixels,
    })
}

/// Writes destination rows top first while walking the source from its last row
/// upwards, swapping blue and red in every pixel.
fn flip_rows_and_swizzle(header: &TargaHeader, source: &[u8]) -> Vec<u8> {
    let row_len = header.row_len();
    let mut pixels = vec![0u8; source.len()];

    let dst_rows = pixels.chunks_exact_mut(row_len);
    let src_rows = source.chunks_exact(row_len).rev();

    for (dst_row, src_row) in dst_rows.zip(src_rows) {
        let dst_px = dst_row.chunks_exact_mut(BYTES_PER_PIXEL);
        let src_px = src_row.chunks_exact(BYTES_PER_PIXEL);
        for (dst, src) in dst_px.zip(src_px) {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
            dst[3] = src[3];
        }
    }

    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, ErrorKind};

    fn container(width: u16, height: u16, bpp: u8, pixels: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; 12];
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        bytes.push(bpp);
        bytes.push(0);
        bytes.extend_from_slice(pixels);
        bytes
    }

    /// BGRA source pixels where every byte encodes (row, column, channel).
    fn source_pixels(width: u16, height: u16) -> Vec<u8> {
        let mut pixels = Vec::new();
        for row in 0..height as u8 {
            for col in 0..width as u8 {
                pixels.extend_from_slice(&[
                    row * 16 + col,          // blue
                    0x80 | (row * 16 + col), // green
                    0x40 | (row * 16 + col), // red
                    0xC0 | (row * 16 + col), // alpha
                ]);
            }
        }
        pixels
    }

    fn swizzled(src_row: &[u8]) -> Vec<u8> {
        src_row
            .chunks_exact(4)
            .flat_map(|p| [p[2], p[1], p[0], p[3]])
            .collect()
    }

    fn decode(bytes: Vec<u8>) -> RenderResult<DecodedImage> {
        decode_reader(Cursor::new(bytes), Path::new("test.tga"))
    }

    #[test]
    fn header_fields_are_little_endian() {
        let bytes = container(0x0102, 0x0304, 32, &[]);
        let header_bytes: [u8; HEADER_LEN] = bytes[..HEADER_LEN].try_into().unwrap();
        let header = TargaHeader::parse(&header_bytes);
        assert_eq!(header.width, 0x0102);
        assert_eq!(header.height, 0x0304);
        assert_eq!(header.bits_per_pixel, 32);
        assert_eq!(header.pixel_data_len(), 0x0102 * 0x0304 * 4);
    }

    #[test]
    fn rows_are_inverted_and_red_blue_swapped() {
        let (w, h) = (3u16, 4u16);
        let src = source_pixels(w, h);
        let image = decode(container(w, h, 32, &src)).unwrap();

        assert_eq!(image.width(), 3);
        assert_eq!(image.height(), 4);
        assert_eq!(image.pixels().len(), 3 * 4 * 4);

        let row_len = w as usize * 4;
        let src_rows: Vec<&[u8]> = src.chunks_exact(row_len).collect();

        // Decoded top row is the source's last row.
        assert_eq!(image.row(0).unwrap(), swizzled(src_rows[3]).as_slice());
        // Decoded bottom row is the source's first row.
        assert_eq!(image.row(3).unwrap(), swizzled(src_rows[0]).as_slice());
        for y in 0..h as usize {
            assert_eq!(
                image.row(y as u32).unwrap(),
                swizzled(src_rows[h as usize - 1 - y]).as_slice()
            );
        }
        assert!(image.row(4).is_none());
    }

    #[test]
    fn single_pixel_channels_become_rgba() {
        let image = decode(container(1, 1, 32, &[10, 20, 30, 40])).unwrap();
        assert_eq!(image.pixels(), &[30, 20, 10, 40]);
        assert_eq!(image.bytes_per_row(), 4);
    }

    #[test]
    fn non_32_bit_sources_are_format_errors() {
        for bpp in [8u8, 16, 24, 0, 64] {
            let err = decode(container(2, 2, bpp, &[0; 16])).unwrap_err();
            assert!(
                matches!(err, RenderError::Format { .. }),
                "bpp {bpp} gave {err:?}"
            );
        }
    }

    #[test]
    fn empty_images_are_format_errors() {
        let err = decode(container(0, 4, 32, &[])).unwrap_err();
        assert!(matches!(err, RenderError::Format { .. }));
    }

    #[test]
    fn truncated_pixel_data_is_an_io_error() {
        let err = decode(container(2, 2, 32, &[0; 15])).unwrap_err();
        match err {
            RenderError::Io { source, .. } => assert_eq!(source.kind(), ErrorKind::UnexpectedEof),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn huge_declared_size_with_little_data_is_an_io_error() {
        let err = decode(container(u16::MAX, u16::MAX, 32, &[0; 16])).unwrap_err();
        match err {
            RenderError::Io { source, .. } => assert_eq!(source.kind(), ErrorKind::UnexpectedEof),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn short_header_is_an_io_error() {
        let err = decode(vec![0u8; HEADER_LEN - 1]).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut pixels = vec![1, 2, 3, 4];
        pixels.extend_from_slice(b"TRUEVISION-XFILE.\0");
        let image = decode(container(1, 1, 32, &pixels)).unwrap();
        assert_eq!(image.pixels(), &[3, 2, 1, 4]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("tessel-definitely-missing-texture.tga");
        let err = decode_file(&path).unwrap_err();
        match err {
            RenderError::Io { source, path: p } => {
                assert_eq!(source.kind(), ErrorKind::NotFound);
                assert_eq!(p, path);
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
