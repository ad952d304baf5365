#![allow(dead_code)]

use image::{DynamicImage, ImageOutputFormat, RgbImage};
use std::io::Cursor;

pub fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Jpeg(90))
        .unwrap();
    out
}

/// Little-endian TIFF block with a single `DateTime` entry in IFD0.
pub fn tiff_with_datetime(stamp: &str) -> Vec<u8> {
    let mut out = b"II*\0".to_vec();
    out.extend_from_slice(&8u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&0x0132u16.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&(stamp.len() as u32 + 1).to_le_bytes());
    out.extend_from_slice(&(8u32 + 2 + 12 + 4).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(stamp.as_bytes());
    out.push(0);
    out
}

/// A JPEG photo carrying an EXIF capture time such as `2020:01:01 10:00:00`.
pub fn jpeg_with_capture_time(width: u32, height: u32, stamp: &str) -> Vec<u8> {
    let jpeg = encode_jpeg(width, height);
    let tiff = tiff_with_datetime(stamp);
    let segment_len = (2 + 6 + tiff.len()) as u16;

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&segment_len.to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

/// A JPEG with a valid header whose scan data is cut off halfway.
pub fn truncated_jpeg() -> Vec<u8> {
    let img = RgbImage::from_fn(256, 256, |x, y| {
        image::Rgb([(x ^ y) as u8, (x * 3) as u8, (y * 7) as u8])
    });
    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut jpeg), ImageOutputFormat::Jpeg(90))
        .unwrap();
    jpeg.truncate(jpeg.len() / 2);
    jpeg
}
