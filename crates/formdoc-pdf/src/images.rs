//! Image XObjects
//!
//! JPEG files are embedded as-is with `DCTDecode`. PNG files are decoded,
//! their alpha channel split into a soft mask and both planes re-compressed
//! with Flate.

use std::collections::HashMap;
use std::io::Cursor;

use formdoc_model::element::Image;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::error::GenerateError;
use crate::stream::flate_stream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn from_mime(mime: &str) -> Result<Self, GenerateError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpg" | "image/jpeg" => Ok(ImageFormat::Jpeg),
            "image/png" => Ok(ImageFormat::Png),
            _ => Err(GenerateError::UnsupportedMimeType(mime.to_string())),
        }
    }
}

/// An image written to the output document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmbeddedImage {
    pub id: ObjectId,
    pub width: u32,
    pub height: u32,
}

impl EmbeddedImage {
    /// Scale factor that fits the image inside `width` x `height`
    pub fn fit_scale(&self, width: f64, height: f64) -> f64 {
        if self.width == 0 || self.height == 0 {
            return 1.0;
        }
        (width / self.width as f64).min(height / self.height as f64)
    }
}

/// Images embedded during one run, keyed by content fingerprint
#[derive(Default)]
pub struct ImageCache {
    embedded: HashMap<String, EmbeddedImage>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn embed(&mut self, doc: &mut Document, image: &Image) -> Result<EmbeddedImage, GenerateError> {
        let src = match &image.src {
            Some(src) if !src.is_empty() => src,
            _ => return Err(GenerateError::EmptyImageSource),
        };
        let mime = if image.mime_type.trim().is_empty() {
            src.data_uri_mime().unwrap_or_default()
        } else {
            image.mime_type.as_str()
        };
        let format = ImageFormat::from_mime(mime)?;

        let key = src.fingerprint();
        if let Some(hit) = self.embedded.get(&key) {
            return Ok(*hit);
        }

        let bytes = src
            .decode()
            .map_err(|e| GenerateError::InvalidImage(e.to_string()))?;
        let embedded = match format {
            ImageFormat::Jpeg => embed_jpeg(doc, bytes)?,
            ImageFormat::Png => embed_png(doc, &bytes)?,
        };
        tracing::debug!(
            width = embedded.width,
            height = embedded.height,
            ?format,
            "Embedded image"
        );
        self.embedded.insert(key, embedded);
        Ok(embedded)
    }
}

struct JpegHeader {
    width: u32,
    height: u32,
    components: u8,
}

fn parse_jpeg_header(data: &[u8]) -> Result<JpegHeader, GenerateError> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(GenerateError::InvalidImage("not a JPEG file".into()));
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        pos += 2;
        if marker == 0xFF || marker == 0x00 || (0xD0..=0xD7).contains(&marker) {
            continue;
        }

        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            if pos + 8 > data.len() {
                return Err(GenerateError::InvalidImage("truncated JPEG frame header".into()));
            }
            return Ok(JpegHeader {
                height: u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as u32,
                width: u16::from_be_bytes([data[pos + 5], data[pos + 6]]) as u32,
                components: data[pos + 7],
            });
        }

        if pos + 2 > data.len() {
            break;
        }
        pos += u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
    }

    Err(GenerateError::InvalidImage("JPEG frame header not found".into()))
}

fn embed_jpeg(doc: &mut Document, data: Vec<u8>) -> Result<EmbeddedImage, GenerateError> {
    let header = parse_jpeg_header(&data)?;

    let mut dict = image_dict(header.width, header.height);
    let color_space: &[u8] = match header.components {
        1 => b"DeviceGray",
        4 => b"DeviceCMYK",
        _ => b"DeviceRGB",
    };
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));
    if header.components == 4 {
        // Adobe writes CMYK JPEGs inverted
        dict.set(
            "Decode",
            Object::Array([1, 0, 1, 0, 1, 0, 1, 0].into_iter().map(Object::Integer).collect()),
        );
    }
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));

    let mut stream = Stream::new(dict, data);
    stream.allows_compression = false;
    Ok(EmbeddedImage {
        id: doc.add_object(stream),
        width: header.width,
        height: header.height,
    })
}

fn embed_png(doc: &mut Document, data: &[u8]) -> Result<EmbeddedImage, GenerateError> {
    let invalid = |e: png::DecodingError| GenerateError::InvalidImage(e.to_string());

    let mut decoder = png::Decoder::new(Cursor::new(data));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(invalid)?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(invalid)?;
    buf.truncate(info.buffer_size());

    let (channels, gray) = match info.color_type {
        png::ColorType::Grayscale => (1, true),
        png::ColorType::GrayscaleAlpha => (2, true),
        png::ColorType::Rgb => (3, false),
        png::ColorType::Rgba => (4, false),
        png::ColorType::Indexed => {
            return Err(GenerateError::InvalidImage("unexpanded palette image".into()))
        }
    };
    let has_alpha = channels == 2 || channels == 4;
    let color_channels = if gray { 1 } else { 3 };

    let (pixels, alpha) = if has_alpha {
        let mut pixels = Vec::with_capacity(buf.len() / channels * color_channels);
        let mut alpha = Vec::with_capacity(buf.len() / channels);
        for px in buf.chunks_exact(channels) {
            pixels.extend_from_slice(&px[..color_channels]);
            alpha.push(px[color_channels]);
        }
        (pixels, Some(alpha))
    } else {
        (buf, None)
    };

    let mut dict = image_dict(info.width, info.height);
    let color_space: &[u8] = if gray { b"DeviceGray" } else { b"DeviceRGB" };
    dict.set("ColorSpace", Object::Name(color_space.to_vec()));

    if let Some(alpha) = alpha {
        let mut mask = image_dict(info.width, info.height);
        mask.set("ColorSpace", Object::Name(b"DeviceGray".to_vec()));
        let mask_id = doc.add_object(flate_stream(mask, &alpha)?);
        dict.set("SMask", Object::Reference(mask_id));
    }

    Ok(EmbeddedImage {
        id: doc.add_object(flate_stream(dict, &pixels)?),
        width: info.width,
        height: info.height,
    })
}

fn image_dict(width: u32, height: u32) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict
}
