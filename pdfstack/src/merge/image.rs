//! Raster decoding and image XObject construction.
//!
//! JPEG data with one or three components is embedded untouched behind a
//! DCTDecode filter. Everything else (PNG, CMYK JPEG) is decoded to 8-bit
//! samples and Flate-compressed; a PNG alpha channel becomes a soft mask.

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::{DynamicImage, GenericImageView};
use lopdf::{Dictionary, Object, Stream, dictionary};
use std::io::Write;

use crate::validation::ImageFormat;

/// A decoded image ready to be placed on a page.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Intrinsic width in pixels.
    pub width: u32,
    /// Intrinsic height in pixels.
    pub height: u32,
    /// The image XObject stream.
    pub xobject: Stream,
    /// Soft mask stream for images with an alpha channel.
    pub soft_mask: Option<Stream>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorSpace {
    DeviceGray,
    DeviceRgb,
}

impl ColorSpace {
    fn pdf_name(self) -> &'static str {
        match self {
            Self::DeviceGray => "DeviceGray",
            Self::DeviceRgb => "DeviceRGB",
        }
    }
}

/// Decode `bytes` as `format` and build the XObject that draws it.
///
/// # Errors
///
/// Returns the decoder's message if the data is not a readable image of the
/// declared format.
pub fn decode(bytes: &[u8], format: ImageFormat) -> Result<DecodedImage, String> {
    let decoded = image::load_from_memory_with_format(bytes, to_image_format(format))
        .map_err(|e| e.to_string())?;

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(format!("image has no pixels ({width}x{height})"));
    }

    if format == ImageFormat::Jpeg
        && let Some(color_space) = jpeg_passthrough_color_space(bytes)
    {
        let dict = image_dict(width, height, color_space, "DCTDecode");
        return Ok(DecodedImage {
            width,
            height,
            xobject: Stream::new(dict, bytes.to_vec()).with_compression(false),
            soft_mask: None,
        });
    }

    encode_samples(&decoded)
}

fn to_image_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Png => image::ImageFormat::Png,
    }
}

fn image_dict(width: u32, height: u32, color_space: ColorSpace, filter: &str) -> Dictionary {
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => Object::Integer(i64::from(width)),
        "Height" => Object::Integer(i64::from(height)),
        "ColorSpace" => color_space.pdf_name(),
        "BitsPerComponent" => 8,
        "Filter" => filter,
    }
}

/// Re-encode decoded pixels as Flate-compressed 8-bit samples.
fn encode_samples(decoded: &DynamicImage) -> Result<DecodedImage, String> {
    let (width, height) = decoded.dimensions();
    let has_alpha = decoded.color().has_alpha();
    let is_gray = !decoded.color().has_color();

    let (color_space, samples, alpha) = match (is_gray, has_alpha) {
        (true, false) => (ColorSpace::DeviceGray, decoded.to_luma8().into_raw(), None),
        (true, true) => {
            let gray_alpha = decoded.to_luma_alpha8();
            let mut gray = Vec::with_capacity(gray_alpha.len() / 2);
            let mut alpha = Vec::with_capacity(gray_alpha.len() / 2);
            for pixel in gray_alpha.pixels() {
                gray.push(pixel.0[0]);
                alpha.push(pixel.0[1]);
            }
            (ColorSpace::DeviceGray, gray, Some(alpha))
        }
        (false, false) => (ColorSpace::DeviceRgb, decoded.to_rgb8().into_raw(), None),
        (false, true) => {
            let rgba = decoded.to_rgba8();
            let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
            let mut alpha = Vec::with_capacity(rgba.len() / 4);
            for pixel in rgba.pixels() {
                rgb.extend_from_slice(&pixel.0[..3]);
                alpha.push(pixel.0[3]);
            }
            (ColorSpace::DeviceRgb, rgb, Some(alpha))
        }
    };

    let xobject = Stream::new(
        image_dict(width, height, color_space, "FlateDecode"),
        deflate(&samples)?,
    )
    .with_compression(false);

    let soft_mask = alpha
        .map(|alpha| {
            deflate(&alpha).map(|data| {
                Stream::new(
                    image_dict(width, height, ColorSpace::DeviceGray, "FlateDecode"),
                    data,
                )
                .with_compression(false)
            })
        })
        .transpose()?;

    Ok(DecodedImage {
        width,
        height,
        xobject,
        soft_mask,
    })
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).map_err(|e| e.to_string())?;
    encoder.finish().map_err(|e| e.to_string())
}

/// Color space for embedding a JPEG as-is, or `None` if it must be transcoded.
///
/// Reads the component count from the first start-of-frame marker. Only
/// grayscale and YCbCr/RGB data pass through; CMYK/YCCK would need an
/// inverted Decode array depending on the encoder, so it is re-encoded.
fn jpeg_passthrough_color_space(data: &[u8]) -> Option<ColorSpace> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }

        let marker = data[pos + 1];
        pos += 2;

        // Fill bytes and standalone markers carry no length.
        if marker == 0xFF || marker == 0x01 || (0xD0..=0xD8).contains(&marker) {
            continue;
        }

        let is_start_of_frame = matches!(
            marker,
            0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF
        );
        if is_start_of_frame {
            // length(2) precision(1) height(2) width(2) components(1)
            let components = *data.get(pos + 7)?;
            return match components {
                1 => Some(ColorSpace::DeviceGray),
                3 => Some(ColorSpace::DeviceRgb),
                _ => None,
            };
        }

        if pos + 1 >= data.len() {
            return None;
        }
        let length = usize::from(u16::from_be_bytes([data[pos], data[pos + 1]]));
        pos += length;
    }

    None
}
