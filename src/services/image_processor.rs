//! Upload validation and photo normalization.
//!
//! Every accepted photo goes through the same pipeline: EXIF orientation
//! applied, downscaled to at most [`MAX_WIDTH`] pixels wide, transparency
//! flattened onto white, re-encoded as JPEG. The classifier and the
//! preview both consume the normalized output, never the original bytes.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbImage};

use crate::error::ValidationError;
use crate::models::image_types::PreparedImage;

pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const MAX_WIDTH: u32 = 640;
const JPEG_QUALITY: u8 = 90;

const ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// Checks size and declared type before any pixel work happens.
/// The size ceiling is checked first, so an oversized GIF reports
/// the size problem.
pub fn validate_upload(size: u64, mime: &str) -> Result<(), ValidationError> {
    if size > MAX_FILE_SIZE {
        return Err(ValidationError::Oversize {
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    let lower = mime.to_ascii_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&lower.as_str()) {
        return Err(ValidationError::WrongType {
            mime: mime.to_string(),
        });
    }
    Ok(())
}

/// Declared MIME type for an upload path, derived from the extension.
pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") => "image/jpg".to_string(),
        Some("jpeg") => "image/jpeg".to_string(),
        Some("png") => "image/png".to_string(),
        Some(other) => format!("image/{other}"),
        None => "application/octet-stream".to_string(),
    }
}

/// Decodes an upload and normalizes it for classification.
///
/// Orientation comes from EXIF metadata (missing or broken EXIF means
/// "leave as-is"); resizing preserves aspect ratio against the oriented
/// dimensions; alpha is composited onto white before the JPEG encode.
pub fn prepare_image(bytes: &[u8]) -> Result<PreparedImage, ValidationError> {
    let orientation = exif_orientation(bytes);

    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ValidationError::Generic(e.to_string()))?
        .decode()
        .map_err(|e| ValidationError::Generic(e.to_string()))?;

    let mut img = apply_orientation(decoded, orientation);

    if img.width() > MAX_WIDTH {
        let scale = f64::from(MAX_WIDTH) / f64::from(img.width());
        let height = (f64::from(img.height()) * scale).floor().max(1.0) as u32;
        img = img.resize_exact(MAX_WIDTH, height, FilterType::Triangle);
    }

    let flattened = flatten_onto_white(&img);
    let (width, height) = flattened.dimensions();
    let jpeg = encode_jpeg(&flattened)?;

    Ok(PreparedImage {
        jpeg,
        width,
        height,
    })
}

/// Read the EXIF orientation tag from raw upload bytes.
/// Defaults to 1 if not found.
fn exif_orientation(bytes: &[u8]) -> u32 {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(e) => e,
        Err(_) => return 1,
    };

    if let Some(field) = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        match field.value {
            exif::Value::Short(ref v) => *v.first().unwrap_or(&1) as u32,
            exif::Value::Long(ref v) => *v.first().unwrap_or(&1),
            _ => 1,
        }
    } else {
        1
    }
}

/// Apply EXIF orientation to the image.
fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate270(),
        6 => img.rotate90(),
        7 => img.fliph().rotate90(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Composite the image onto an opaque white background.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let alpha = u32::from(src[3]);
        for c in 0..3 {
            let blended = u32::from(src[c]) * alpha + 255 * (255 - alpha);
            dst[c] = ((blended + 127) / 255) as u8;
        }
    }
    out
}

fn encode_jpeg(img: &RgbImage) -> Result<Vec<u8>, ValidationError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
    img.write_with_encoder(encoder)
        .map_err(|e| ValidationError::Generic(format!("failed to encode photo: {e}")))?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, Rgba, RgbaImage};

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(img.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn solid_rgba(width: u32, height: u32, pixel: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, pixel)
    }

    #[test]
    fn oversize_uploads_are_rejected() {
        let err = validate_upload(MAX_FILE_SIZE + 1, "image/jpeg").unwrap_err();
        assert!(matches!(err, ValidationError::Oversize { .. }));
        assert_eq!(err.kind(), "oversize");
    }

    #[test]
    fn exact_limit_is_accepted() {
        assert!(validate_upload(MAX_FILE_SIZE, "image/png").is_ok());
    }

    #[test]
    fn unsupported_types_are_rejected() {
        for mime in ["image/gif", "image/webp", "application/pdf", "text/plain"] {
            let err = validate_upload(1024, mime).unwrap_err();
            assert!(matches!(err, ValidationError::WrongType { .. }), "{mime}");
        }
    }

    #[test]
    fn allowed_types_pass() {
        for mime in ["image/jpeg", "image/jpg", "image/png", "IMAGE/JPEG"] {
            assert!(validate_upload(1024, mime).is_ok(), "{mime}");
        }
    }

    #[test]
    fn oversize_wins_over_wrong_type() {
        let err = validate_upload(MAX_FILE_SIZE + 1, "image/gif").unwrap_err();
        assert_eq!(err.kind(), "oversize");
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for_path(Path::new("face.JPG")), "image/jpg");
        assert_eq!(mime_for_path(Path::new("face.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("face.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("face.gif")), "image/gif");
        assert_eq!(mime_for_path(Path::new("face")), "application/octet-stream");
    }

    #[test]
    fn wide_images_shrink_to_max_width() {
        let src = solid_rgba(800, 600, Rgba([120, 90, 60, 255]));
        let prepared = prepare_image(&png_bytes(&src)).unwrap();
        assert_eq!(prepared.width, 640);
        assert_eq!(prepared.height, 480);
    }

    #[test]
    fn non_integer_scale_floors_the_height() {
        // 1000x333 scaled by 0.64 gives 213.12, which floors to 213.
        let src = solid_rgba(1000, 333, Rgba([10, 20, 30, 255]));
        let prepared = prepare_image(&png_bytes(&src)).unwrap();
        assert_eq!(prepared.width, 640);
        assert_eq!(prepared.height, 213);
    }

    #[test]
    fn small_images_keep_their_dimensions() {
        let src = solid_rgba(320, 240, Rgba([200, 200, 200, 255]));
        let prepared = prepare_image(&png_bytes(&src)).unwrap();
        assert_eq!(prepared.width, 320);
        assert_eq!(prepared.height, 240);
    }

    #[test]
    fn output_is_jpeg() {
        let src = solid_rgba(16, 16, Rgba([1, 2, 3, 255]));
        let prepared = prepare_image(&png_bytes(&src)).unwrap();
        assert_eq!(&prepared.jpeg[..2], &[0xFF, 0xD8]);
        assert!(prepared.to_data_url().starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn transparent_pixels_flatten_to_white() {
        let src = solid_rgba(32, 32, Rgba([255, 0, 0, 0]));
        let prepared = prepare_image(&png_bytes(&src)).unwrap();
        let decoded = image::load_from_memory(&prepared.jpeg).unwrap().to_rgb8();
        let Rgb([r, g, b]) = *decoded.get_pixel(16, 16);
        for channel in [r, g, b] {
            assert!(channel > 245, "expected near-white, got {r},{g},{b}");
        }
    }

    #[test]
    fn semi_transparent_pixels_blend_with_white() {
        let src = solid_rgba(32, 32, Rgba([0, 0, 0, 128]));
        let prepared = prepare_image(&png_bytes(&src)).unwrap();
        let decoded = image::load_from_memory(&prepared.jpeg).unwrap().to_rgb8();
        let Rgb([r, _, _]) = *decoded.get_pixel(16, 16);
        // Black at ~50% over white lands near mid-gray.
        assert!((110..=145).contains(&r), "expected mid-gray, got {r}");
    }

    #[test]
    fn orientation_cases_transform_as_exif_defines() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let src = DynamicImage::ImageRgba8(img);

        // 90° clockwise swaps the axes and moves the left pixel to the top.
        let rotated = apply_orientation(src.clone(), 6);
        assert_eq!((rotated.width(), rotated.height()), (1, 2));
        assert_eq!(rotated.to_rgba8().get_pixel(0, 0), &Rgba([255, 0, 0, 255]));

        // Mirror keeps dimensions and swaps the pixels.
        let mirrored = apply_orientation(src.clone(), 2);
        assert_eq!((mirrored.width(), mirrored.height()), (2, 1));
        assert_eq!(mirrored.to_rgba8().get_pixel(0, 0), &Rgba([0, 0, 255, 255]));

        // Transpose (5) mirrors across the main diagonal: left pixel on top.
        let transposed = apply_orientation(src.clone(), 5);
        assert_eq!((transposed.width(), transposed.height()), (1, 2));
        assert_eq!(transposed.to_rgba8().get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(transposed.to_rgba8().get_pixel(0, 1), &Rgba([0, 0, 255, 255]));

        // Transverse (7) mirrors across the anti-diagonal: right pixel on top.
        let transverse = apply_orientation(src.clone(), 7);
        assert_eq!((transverse.width(), transverse.height()), (1, 2));
        assert_eq!(transverse.to_rgba8().get_pixel(0, 0), &Rgba([0, 0, 255, 255]));
        assert_eq!(transverse.to_rgba8().get_pixel(0, 1), &Rgba([255, 0, 0, 255]));

        // Unknown values leave the image alone.
        let untouched = apply_orientation(src, 9);
        assert_eq!(untouched.to_rgba8().get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn undecodable_bytes_are_a_generic_error() {
        let err = prepare_image(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), "generic");
    }

    #[test]
    fn photos_without_exif_default_to_upright() {
        let src = solid_rgba(4, 4, Rgba([9, 9, 9, 255]));
        assert_eq!(exif_orientation(&png_bytes(&src)), 1);
    }
}
