//! Bulk-Embed converter and the lossless image embedding routine.
//!
//! Encoded image data is placed into the PDF without decoding where the PDF
//! format allows it:
//!
//! * JPEG files are stored verbatim behind `DCTDecode`.
//! * Non-interlaced PNG files keep their zlib `IDAT` data; the PNG row filters
//!   are declared through `DecodeParms` (`Predictor 15`), palettes become an
//!   `Indexed` color space and an embedded ICC profile becomes `ICCBased`.
//! * Everything else is decoded and stored as zlib-compressed raw samples,
//!   which is still lossless.
//!
//! Alpha channels are refused, as are ICC profiles combined with a palette.

use crate::error::{ConvertError, EmbedError, Result};
use crate::pdf::{self, image_dict, PageImage, PdfBuilder};
use crate::{Archive, ConversionReport, ConvertOptions, Converter};
use image::ImageFormat;
use lopdf::{Dictionary, Object, Stream, StringFormat};
use std::io::{Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info};

/// Reads every entry into memory and embeds all of them in one pass.
///
/// Unlike [`crate::PageDrawConverter`], a single entry that cannot be embedded
/// fails the whole archive, and an archive without entries is refused.
#[derive(Debug, Clone, Default)]
pub struct BulkEmbedConverter {
    options: ConvertOptions,
}

impl BulkEmbedConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }
}

impl Converter for BulkEmbedConverter {
    fn name(&self) -> &'static str {
        "embed"
    }

    fn convert_to_writer<R: Read + Seek, W: Write>(
        &self,
        archive: &mut Archive<R>,
        target: &mut W,
        destination: &Path,
    ) -> Result<ConversionReport> {
        info!(
            "Process zip '{}' in bulk using lossless embedding",
            archive.path().display()
        );

        let names = archive.names().to_vec();
        let mut buffers = Vec::with_capacity(names.len());
        for name in names {
            let bytes = archive.read(&name)?;
            buffers.push((name, bytes));
        }
        if buffers.is_empty() {
            return Err(ConvertError::EmptyArchive {
                path: archive.path().to_path_buf(),
            });
        }

        let builder = embed_images(&buffers)?;
        let pages = builder.page_count();
        builder
            .write_to(target, self.options.compress_streams)
            .map_err(|reason| ConvertError::OutputWrite {
                path: destination.to_path_buf(),
                reason,
            })?;

        Ok(ConversionReport {
            archive: archive.path().to_path_buf(),
            output: destination.to_path_buf(),
            total_entries: buffers.len(),
            pages,
            skipped_entries: Vec::new(),
        })
    }
}

/// Embed an ordered list of `(name, encoded bytes)` buffers, one page each.
pub fn embed_images(buffers: &[(String, Vec<u8>)]) -> Result<PdfBuilder> {
    let mut builder = PdfBuilder::new();
    for (name, bytes) in buffers {
        let image = embed_image(bytes).map_err(|source| ConvertError::Embed {
            entry: name.clone(),
            source,
        })?;
        debug!("'{}' embedded as {}x{}", name, image.width, image.height);
        builder.add_image_page(image);
    }
    Ok(builder)
}

/// Turn one encoded image into a page image without re-encoding it.
pub fn embed_image(bytes: &[u8]) -> std::result::Result<PageImage, EmbedError> {
    match image::guess_format(bytes)? {
        ImageFormat::Jpeg => embed_jpeg(bytes),
        ImageFormat::Png => embed_png(bytes),
        format => embed_decoded(bytes, format),
    }
}

/// Frame information read from a JPEG header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegFrame {
    width: u32,
    height: u32,
    precision: u8,
    components: u8,
    /// An Adobe APP14 segment was present (CMYK data is stored inverted).
    adobe: bool,
}

fn jpeg_malformed(reason: &str) -> EmbedError {
    EmbedError::Malformed {
        format: "JPEG",
        reason: reason.to_string(),
    }
}

fn read_u16(bytes: &[u8], pos: usize) -> Option<u16> {
    Some(u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]))
}

fn read_u32(bytes: &[u8], pos: usize) -> Option<u32> {
    let raw = bytes.get(pos..pos + 4)?;
    Some(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

/// Walk the marker segments up to the first start-of-frame.
fn scan_jpeg(bytes: &[u8]) -> std::result::Result<JpegFrame, EmbedError> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return Err(jpeg_malformed("missing start of image"));
    }

    let mut pos = 2;
    let mut adobe = false;
    loop {
        if bytes.get(pos) != Some(&0xFF) {
            return Err(jpeg_malformed("expected marker"));
        }
        while bytes.get(pos) == Some(&0xFF) {
            pos += 1;
        }
        let marker = *bytes
            .get(pos)
            .ok_or_else(|| jpeg_malformed("truncated marker"))?;
        pos += 1;

        match marker {
            // standalone markers carry no length
            0x01 | 0xD0..=0xD8 => continue,
            0xD9 | 0xDA => return Err(jpeg_malformed("no frame header before image data")),
            _ => {}
        }

        let length = read_u16(bytes, pos).ok_or_else(|| jpeg_malformed("truncated segment"))? as usize;
        if length < 2 || pos + length > bytes.len() {
            return Err(jpeg_malformed("bad segment length"));
        }
        let segment = &bytes[pos + 2..pos + length];

        match marker {
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                if segment.len() < 6 {
                    return Err(jpeg_malformed("short frame header"));
                }
                return Ok(JpegFrame {
                    precision: segment[0],
                    height: u16::from_be_bytes([segment[1], segment[2]]) as u32,
                    width: u16::from_be_bytes([segment[3], segment[4]]) as u32,
                    components: segment[5],
                    adobe,
                });
            }
            0xEE if segment.starts_with(b"Adobe") => adobe = true,
            _ => {}
        }
        pos += length;
    }
}

fn embed_jpeg(bytes: &[u8]) -> std::result::Result<PageImage, EmbedError> {
    let frame = scan_jpeg(bytes)?;
    if frame.width == 0 || frame.height == 0 {
        return Err(EmbedError::Unsupported(
            "JPEG without explicit dimensions".to_string(),
        ));
    }
    if frame.precision != 8 {
        return Err(EmbedError::Unsupported(format!(
            "{}-bit JPEG",
            frame.precision
        )));
    }

    let color_space: &[u8] = match frame.components {
        1 => b"DeviceGray",
        3 => b"DeviceRGB",
        4 => b"DeviceCMYK",
        n => {
            return Err(EmbedError::Unsupported(format!(
                "JPEG with {} color components",
                n
            )))
        }
    };

    let mut dict = image_dict(
        frame.width,
        frame.height,
        Object::Name(color_space.to_vec()),
        8,
        false,
    );
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    if frame.components == 4 && frame.adobe {
        dict.set(
            "Decode",
            Object::Array([1, 0, 1, 0, 1, 0, 1, 0].into_iter().map(Object::Integer).collect()),
        );
    }

    Ok(PageImage::new(
        Stream::new(dict, bytes.to_vec()),
        frame.width,
        frame.height,
    ))
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// The parts of a PNG file needed to embed it.
#[derive(Debug, Default)]
struct PngParts<'a> {
    header: Option<PngHeader>,
    palette: Option<&'a [u8]>,
    /// zlib-compressed profile from `iCCP`
    icc_profile: Option<&'a [u8]>,
    data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PngHeader {
    width: u32,
    height: u32,
    bit_depth: u8,
    color_type: u8,
    interlaced: bool,
}

fn png_malformed(reason: &str) -> EmbedError {
    EmbedError::Malformed {
        format: "PNG",
        reason: reason.to_string(),
    }
}

fn split_png(bytes: &[u8]) -> std::result::Result<PngParts<'_>, EmbedError> {
    if !bytes.starts_with(&PNG_SIGNATURE) {
        return Err(png_malformed("missing signature"));
    }

    let mut parts = PngParts::default();
    let mut pos = PNG_SIGNATURE.len();
    while pos < bytes.len() {
        let length = read_u32(bytes, pos).ok_or_else(|| png_malformed("truncated chunk"))? as usize;
        let kind = bytes
            .get(pos + 4..pos + 8)
            .ok_or_else(|| png_malformed("truncated chunk"))?;
        let data = bytes
            .get(pos + 8..pos + 8 + length)
            .ok_or_else(|| png_malformed("chunk runs past end of file"))?;

        match kind {
            b"IHDR" => {
                if data.len() != 13 {
                    return Err(png_malformed("bad IHDR length"));
                }
                parts.header = Some(PngHeader {
                    width: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
                    height: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
                    bit_depth: data[8],
                    color_type: data[9],
                    interlaced: data[12] != 0,
                });
            }
            b"PLTE" => parts.palette = Some(data),
            b"iCCP" => {
                // profile name, NUL, compression method, compressed profile
                let nul = data
                    .iter()
                    .position(|&b| b == 0)
                    .ok_or_else(|| png_malformed("bad iCCP chunk"))?;
                let profile = data
                    .get(nul + 2..)
                    .ok_or_else(|| png_malformed("bad iCCP chunk"))?;
                parts.icc_profile = Some(profile);
            }
            b"IDAT" => parts.data.extend_from_slice(data),
            b"IEND" => break,
            _ => {}
        }
        // length, type, data, CRC
        pos += 12 + length;
    }

    Ok(parts)
}

fn embed_png(bytes: &[u8]) -> std::result::Result<PageImage, EmbedError> {
    let parts = split_png(bytes)?;
    let header = parts.header.ok_or_else(|| png_malformed("missing IHDR"))?;

    let colors = match header.color_type {
        0 => 1,
        2 => 3,
        3 => 1,
        4 | 6 => {
            return Err(EmbedError::Unsupported(
                "PNG with an alpha channel".to_string(),
            ))
        }
        other => return Err(png_malformed(&format!("unknown color type {}", other))),
    };
    if header.color_type == 3 && parts.icc_profile.is_some() {
        return Err(EmbedError::Unsupported(
            "PNG with an ICC profile and a palette".to_string(),
        ));
    }
    if header.interlaced {
        // interlaced rows cannot be described with predictors
        return embed_decoded(bytes, ImageFormat::Png);
    }
    if parts.data.is_empty() {
        return Err(png_malformed("no image data"));
    }

    let color_space = match header.color_type {
        0 => Object::Name(b"DeviceGray".to_vec()),
        2 => Object::Name(b"DeviceRGB".to_vec()),
        _ => {
            let palette = parts
                .palette
                .filter(|p| !p.is_empty() && p.len() % 3 == 0)
                .ok_or_else(|| png_malformed("palette image without a valid PLTE chunk"))?;
            Object::Array(vec![
                Object::Name(b"Indexed".to_vec()),
                Object::Name(b"DeviceRGB".to_vec()),
                Object::Integer((palette.len() / 3 - 1) as i64),
                Object::String(palette.to_vec(), StringFormat::Hexadecimal),
            ])
        }
    };

    let mut parms = Dictionary::new();
    parms.set("Predictor", Object::Integer(15));
    parms.set("Colors", Object::Integer(colors));
    parms.set("BitsPerComponent", Object::Integer(header.bit_depth as i64));
    parms.set("Columns", Object::Integer(header.width as i64));

    let mut dict = image_dict(header.width, header.height, color_space, header.bit_depth, true);
    dict.set("DecodeParms", Object::Dictionary(parms));

    let mut page_image = PageImage::new(Stream::new(dict, parts.data), header.width, header.height);
    if let Some(profile) = parts.icc_profile {
        let mut profile_dict = Dictionary::new();
        profile_dict.set("N", Object::Integer(colors));
        profile_dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
        page_image.icc_profile = Some(Stream::new(profile_dict, profile.to_vec()));
    }
    Ok(page_image)
}

/// Formats PDF cannot carry natively: decode and store raw samples.
fn embed_decoded(bytes: &[u8], format: ImageFormat) -> std::result::Result<PageImage, EmbedError> {
    let img = image::load_from_memory_with_format(bytes, format)?;
    if pdf::has_alpha(&img) {
        return Err(EmbedError::Unsupported(format!(
            "{:?} image with transparency",
            format
        )));
    }
    Ok(PageImage::from_dynamic(&img)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{encoded_image, zip_bytes};
    use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};
    use flate2::Crc;
    use lopdf::Document;
    use std::io::Cursor;

    fn png_chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut crc = Crc::new();
        crc.update(kind);
        crc.update(data);

        let mut chunk = (data.len() as u32).to_be_bytes().to_vec();
        chunk.extend_from_slice(kind);
        chunk.extend_from_slice(data);
        chunk.extend_from_slice(&crc.sum().to_be_bytes());
        chunk
    }

    /// Assemble a PNG from its header fields, extra chunks placed before the
    /// image data, and the unfiltered-row bytes (filter byte per row).
    fn png(
        size: (u32, u32),
        bit_depth: u8,
        color_type: u8,
        interlaced: bool,
        chunks: &[(&[u8; 4], Vec<u8>)],
        rows: &[u8],
    ) -> Vec<u8> {
        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&size.0.to_be_bytes());
        ihdr.extend_from_slice(&size.1.to_be_bytes());
        ihdr.extend_from_slice(&[bit_depth, color_type, 0, 0, interlaced as u8]);

        let mut png = PNG_SIGNATURE.to_vec();
        png.extend(png_chunk(b"IHDR", &ihdr));
        for (kind, data) in chunks {
            png.extend(png_chunk(kind, data));
        }
        png.extend(png_chunk(b"IDAT", &pdf::zlib_compress(rows).unwrap()));
        png.extend(png_chunk(b"IEND", &[]));
        png
    }

    fn iccp_chunk() -> Vec<u8> {
        let mut iccp = b"sRGB\0\0".to_vec();
        iccp.extend(pdf::zlib_compress(b"fake profile").unwrap());
        iccp
    }

    /// A 2x2 palette PNG, optionally carrying an iCCP chunk.
    fn palette_png(with_icc: bool) -> Vec<u8> {
        let mut chunks: Vec<(&[u8; 4], Vec<u8>)> = Vec::new();
        if with_icc {
            chunks.push((b"iCCP", iccp_chunk()));
        }
        chunks.push((b"PLTE", vec![255, 0, 0, 0, 0, 255]));
        png((2, 2), 8, 3, false, &chunks, &[0, 0, 1, 0, 1, 0])
    }

    /// A JPEG header up to the frame: SOI, an optional Adobe APP14 segment,
    /// then a baseline SOF with `components` components.
    fn jpeg_header(components: u8, adobe: bool) -> Vec<u8> {
        let mut jpeg = vec![0xFF, 0xD8];
        if adobe {
            jpeg.extend_from_slice(&[0xFF, 0xEE, 0x00, 0x0E]);
            jpeg.extend_from_slice(b"Adobe");
            jpeg.extend_from_slice(&[0x00, 0x64, 0x00, 0x00, 0x00, 0x00, 0x02]);
        }
        let length = 8 + 3 * components as u16;
        jpeg.extend_from_slice(&[0xFF, 0xC0]);
        jpeg.extend_from_slice(&length.to_be_bytes());
        jpeg.extend_from_slice(&[8, 0, 2, 0, 3, components]);
        for id in 1..=components {
            jpeg.extend_from_slice(&[id, 0x11, 0]);
        }
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn jpeg_is_embedded_verbatim() {
        let jpeg = encoded_image(16, 9, ImageFormat::Jpeg);
        let page_image = embed_image(&jpeg).unwrap();
        assert_eq!((page_image.width, page_image.height), (16, 9));
        assert_eq!(page_image.stream.content, jpeg);
        let dict = &page_image.stream.dict;
        assert_eq!(dict.get(b"Filter").unwrap().as_name().unwrap(), b"DCTDecode");
        assert_eq!(dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceRGB");
    }

    #[test]
    fn grayscale_jpeg_keeps_one_component() {
        let jpeg = encode(
            DynamicImage::ImageLuma8(GrayImage::from_pixel(5, 5, Luma([77]))),
            ImageFormat::Jpeg,
        );
        let page_image = embed_image(&jpeg).unwrap();
        assert_eq!(
            page_image.stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceGray"
        );
    }

    #[test]
    fn truncated_jpeg_is_malformed() {
        let err = embed_image(&[0xFF, 0xD8, 0xFF]).unwrap_err();
        assert!(matches!(err, EmbedError::Malformed { format: "JPEG", .. }));
    }

    #[test]
    fn rgb_png_keeps_compressed_rows() {
        let png = encoded_image(7, 3, ImageFormat::Png);
        let page_image = embed_image(&png).unwrap();
        let dict = &page_image.stream.dict;
        assert_eq!(dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");
        let parms = dict.get(b"DecodeParms").unwrap().as_dict().unwrap();
        assert_eq!(parms.get(b"Predictor").unwrap().as_i64().unwrap(), 15);
        assert_eq!(parms.get(b"Colors").unwrap().as_i64().unwrap(), 3);
        assert_eq!(parms.get(b"Columns").unwrap().as_i64().unwrap(), 7);
    }

    #[test]
    fn palette_png_uses_indexed_color_space() {
        let page_image = embed_image(&palette_png(false)).unwrap();
        let color_space = page_image.stream.dict.get(b"ColorSpace").unwrap().as_array().unwrap();
        assert_eq!(color_space[0].as_name().unwrap(), b"Indexed");
        assert_eq!(color_space[2].as_i64().unwrap(), 1);
        assert!(page_image.icc_profile.is_none());
    }

    #[test]
    fn palette_png_with_icc_profile_is_refused() {
        let err = embed_image(&palette_png(true)).unwrap_err();
        assert!(matches!(err, EmbedError::Unsupported(_)));
    }

    #[test]
    fn png_with_alpha_is_refused() {
        let png = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 10]))),
            ImageFormat::Png,
        );
        let err = embed_image(&png).unwrap_err();
        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn other_formats_are_stored_as_raw_samples() {
        let bmp = encoded_image(3, 2, ImageFormat::Bmp);
        let page_image = embed_image(&bmp).unwrap();
        assert_eq!((page_image.width, page_image.height), (3, 2));
        assert_eq!(
            page_image.stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"FlateDecode"
        );
    }

    #[test]
    fn unrecognised_data_is_refused() {
        let err = embed_image(b"just some text").unwrap_err();
        assert!(matches!(err, EmbedError::Decode(_)));
    }

    #[test]
    fn one_bad_entry_fails_the_archive() {
        let bytes = zip_bytes(&[
            ("a.png", encoded_image(4, 4, ImageFormat::Png)),
            ("b.txt", b"not an image".to_vec()),
        ]);
        let mut archive = Archive::from_reader(Cursor::new(bytes), "mixed.zip").unwrap();
        let mut pdf = Vec::new();
        let err = BulkEmbedConverter::default()
            .convert_to_writer(&mut archive, &mut pdf, Path::new("mixed.pdf"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Embed { ref entry, .. } if entry == "b.txt"));
        assert!(pdf.is_empty());
    }

    #[test]
    fn every_entry_becomes_a_page() {
        let bytes = zip_bytes(&[
            ("1.jpg", encoded_image(10, 20, ImageFormat::Jpeg)),
            ("2.png", encoded_image(20, 10, ImageFormat::Png)),
            ("3.png", palette_png(false)),
        ]);
        let mut archive = Archive::from_reader(Cursor::new(bytes), "ok.zip").unwrap();
        let mut pdf = Vec::new();
        let report = BulkEmbedConverter::default()
            .convert_to_writer(&mut archive, &mut pdf, Path::new("ok.pdf"))
            .unwrap();
        assert_eq!(report.pages, 3);
        assert_eq!(Document::load_mem(&pdf).unwrap().get_pages().len(), 3);
    }

    #[test]
    fn png_icc_profile_becomes_icc_based_color_space() {
        let rgb = png((2, 1), 8, 2, false, &[(b"iCCP", iccp_chunk())], &[0, 9, 9, 9, 8, 8, 8]);
        let page_image = embed_image(&rgb).unwrap();
        let profile = page_image.icc_profile.as_ref().unwrap();
        assert_eq!(profile.dict.get(b"N").unwrap().as_i64().unwrap(), 3);

        let mut builder = PdfBuilder::new();
        builder.add_image_page(page_image);
        let doc = builder.finish(false);
        let page_id = *doc.get_pages().values().next().unwrap();
        let page = doc.get_dictionary(page_id).unwrap();
        let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
        let image_ref = resources
            .get(b"XObject")
            .unwrap()
            .as_dict()
            .unwrap()
            .get(b"Im0")
            .unwrap()
            .as_reference()
            .unwrap();
        let image = doc.get_object(image_ref).unwrap().as_stream().unwrap();
        let color_space = image.dict.get(b"ColorSpace").unwrap().as_array().unwrap();
        assert_eq!(color_space.len(), 2);
        assert_eq!(color_space[0].as_name().unwrap(), b"ICCBased");
        let profile = doc
            .get_object(color_space[1].as_reference().unwrap())
            .unwrap()
            .as_stream()
            .unwrap();
        assert_eq!(profile.dict.get(b"N").unwrap().as_i64().unwrap(), 3);

        let gray = png((1, 1), 8, 0, false, &[(b"iCCP", iccp_chunk())], &[0, 128]);
        let profile = embed_image(&gray).unwrap().icc_profile.unwrap();
        assert_eq!(profile.dict.get(b"N").unwrap().as_i64().unwrap(), 1);
    }

    #[test]
    fn adobe_cmyk_jpeg_gets_inverted_decode() {
        let page_image = embed_image(&jpeg_header(4, true)).unwrap();
        let dict = &page_image.stream.dict;
        assert_eq!(dict.get(b"ColorSpace").unwrap().as_name().unwrap(), b"DeviceCMYK");
        let decode: Vec<i64> = dict
            .get(b"Decode")
            .unwrap()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_i64().unwrap())
            .collect();
        assert_eq!(decode, vec![1, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!((page_image.width, page_image.height), (3, 2));
    }

    #[test]
    fn plain_cmyk_jpeg_has_no_decode() {
        let page_image = embed_image(&jpeg_header(4, false)).unwrap();
        assert!(page_image.stream.dict.get(b"Decode").is_err());
        assert_eq!(page_image.stream.content, jpeg_header(4, false));
    }

    #[test]
    fn interlaced_png_is_decoded_to_raw_samples() {
        let interlaced = png((1, 1), 8, 2, true, &[], &[0, 200, 10, 10]);
        let page_image = embed_image(&interlaced).unwrap();
        let dict = &page_image.stream.dict;
        assert_eq!((page_image.width, page_image.height), (1, 1));
        assert_eq!(dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");
        assert!(dict.get(b"DecodeParms").is_err());
        assert_ne!(page_image.stream.content, interlaced);
    }

    #[test]
    fn png_bit_depth_is_carried_to_both_dictionaries() {
        for (bit_depth, rows) in [(16u8, vec![0u8, 0x12, 0x34]), (1, vec![0, 0b1010_0000])] {
            let gray = png((1, 1), bit_depth, 0, false, &[], &rows);
            let page_image = embed_image(&gray).unwrap();
            let dict = &page_image.stream.dict;
            assert_eq!(
                dict.get(b"BitsPerComponent").unwrap().as_i64().unwrap(),
                bit_depth as i64
            );
            let parms = dict.get(b"DecodeParms").unwrap().as_dict().unwrap();
            assert_eq!(
                parms.get(b"BitsPerComponent").unwrap().as_i64().unwrap(),
                bit_depth as i64
            );
            assert_eq!(parms.get(b"Colors").unwrap().as_i64().unwrap(), 1);
        }
    }

    #[test]
    fn empty_archive_has_nothing_to_embed() {
        let bytes = zip_bytes(&[]);
        let mut archive = Archive::from_reader(Cursor::new(bytes), "empty.zip").unwrap();
        let mut pdf = Vec::new();
        let err = BulkEmbedConverter::default()
            .convert_to_writer(&mut archive, &mut pdf, Path::new("empty.pdf"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::EmptyArchive { .. }));
        assert!(pdf.is_empty());
    }
}
