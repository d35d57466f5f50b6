use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageFormat, ImageReader};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufWriter, Cursor};
use std::path::Path;

/// Extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Longest side, in pixels, of any stored image.
pub const MAX_DIMENSION: u32 = 1920;

/// JPEG and WebP encode quality.
const QUALITY: u8 = 85;

/// Lowercased extension of `filename` if it is on the allow-list.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_lowercase();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Some(ext)
    } else {
        None
    }
}

/// Decode, orient, downscale and re-encode an upload into `dir` under a
/// random name. Returns the stored filename.
pub fn process_upload(dir: &Path, file_bytes: &[u8], original_filename: &str) -> Result<String, String> {
    let ext = allowed_extension(original_filename)
        .ok_or_else(|| format!("Unsupported image type: {}", original_filename))?;

    let img = decode_oriented(file_bytes)?;
    let img = fit_within(img, MAX_DIMENSION);

    fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    let unique_name = format!("{}.{}", uuid::Uuid::new_v4().simple(), ext);
    let dest = dir.join(&unique_name);

    if let Err(e) = encode(&img, &ext, &dest) {
        let _ = fs::remove_file(&dest);
        return Err(e);
    }

    Ok(unique_name)
}

/// Decode and apply the EXIF orientation, if the format carries one.
fn decode_oriented(file_bytes: &[u8]) -> Result<DynamicImage, String> {
    let mut decoder = ImageReader::new(Cursor::new(file_bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .into_decoder()
        .map_err(|e| format!("Could not decode image: {}", e))?;

    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| format!("Could not decode image: {}", e))?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Downscale so the longest side is at most `max`, keeping the aspect ratio.
pub fn fit_within(img: DynamicImage, max: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w.max(h) > max {
        img.resize(max, max, FilterType::Lanczos3)
    } else {
        img
    }
}

fn encode(img: &DynamicImage, ext: &str, dest: &Path) -> Result<(), String> {
    match ext {
        "jpg" | "jpeg" => {
            let mut out = BufWriter::new(File::create(dest).map_err(|e| e.to_string())?);
            let encoder = JpegEncoder::new_with_quality(&mut out, QUALITY);
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(|e| e.to_string())
        }
        "png" => {
            let mut out = BufWriter::new(File::create(dest).map_err(|e| e.to_string())?);
            let encoder =
                PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder).map_err(|e| e.to_string())
        }
        "webp" => {
            let (w, h) = img.dimensions();
            let rgba = img.to_rgba8();
            let encoder = webp::Encoder::from_rgba(&rgba, w, h);
            let webp_data = encoder.encode(QUALITY as f32);
            fs::write(dest, &*webp_data).map_err(|e| e.to_string())
        }
        "gif" => img
            .save_with_format(dest, ImageFormat::Gif)
            .map_err(|e| e.to_string()),
        other => Err(format!("Unsupported image type: {}", other)),
    }
}

/// Remove a stored image. Missing files are not an error.
pub fn delete_image(dir: &Path, filename: &str) {
    if !is_bare_filename(filename) {
        log::warn!("Refusing to delete image outside uploads: {}", filename);
        return;
    }
    let path = dir.join(filename);
    if path.exists() {
        if let Err(e) = fs::remove_file(&path) {
            log::warn!("Could not delete image {}: {}", path.display(), e);
        }
    }
}

/// A single path component with no separators of either platform.
fn is_bare_filename(filename: &str) -> bool {
    !filename.contains('\\') && Path::new(filename).file_name() == Some(OsStr::new(filename))
}
