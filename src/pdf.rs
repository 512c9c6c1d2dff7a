//! PDF assembly shared by both converters.
//!
//! Every page is an A4 portrait page holding exactly one image XObject,
//! scaled uniformly to fit the page and centered on the letterboxed axis.

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::DynamicImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Write;

/// A4 width in points (210 mm).
pub const A4_WIDTH: f32 = 595.2756;
/// A4 height in points (297 mm).
pub const A4_HEIGHT: f32 = 841.8898;

/// Resource name of the page image inside each page's XObject dictionary.
const IMAGE_NAME: &str = "Im0";

/// Where an image lands on the page, in points from the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scale a `pixel_width` x `pixel_height` image uniformly so it fits the A4
/// box, centering it on the axis with leftover space.
pub fn fit_to_page(pixel_width: u32, pixel_height: u32) -> Placement {
    if pixel_width == 0 || pixel_height == 0 {
        return Placement {
            x: 0.0,
            y: 0.0,
            width: A4_WIDTH,
            height: A4_HEIGHT,
        };
    }

    let scale = (A4_WIDTH / pixel_width as f32).min(A4_HEIGHT / pixel_height as f32);
    let width = pixel_width as f32 * scale;
    let height = pixel_height as f32 * scale;

    Placement {
        x: (A4_WIDTH - width) / 2.0,
        y: (A4_HEIGHT - height) / 2.0,
        width,
        height,
    }
}

/// An image XObject ready to be placed on its own page.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub stream: Stream,
    /// Soft mask (alpha channel) referenced from the image as `/SMask`.
    pub smask: Option<Stream>,
    /// ICC profile stream; when present the image color space becomes
    /// `[/ICCBased <profile>]`.
    pub icc_profile: Option<Stream>,
    pub width: u32,
    pub height: u32,
}

impl PageImage {
    pub fn new(stream: Stream, width: u32, height: u32) -> Self {
        PageImage {
            stream,
            smask: None,
            icc_profile: None,
            width,
            height,
        }
    }

    /// Store a decoded image as zlib-compressed raw samples.
    ///
    /// Grayscale stays grayscale, 16-bit samples keep their depth, and a
    /// meaningful alpha channel becomes a grayscale soft mask. Anything else
    /// is stored as 8-bit RGB.
    pub fn from_dynamic(img: &DynamicImage) -> std::io::Result<Self> {
        let (width, height) = (img.width(), img.height());

        match img {
            DynamicImage::ImageLuma8(gray) => {
                let data = zlib_compress(gray.as_raw())?;
                let dict = image_dict(width, height, Object::Name(b"DeviceGray".to_vec()), 8, true);
                Ok(PageImage::new(Stream::new(dict, data), width, height))
            }
            DynamicImage::ImageLuma16(gray) => {
                let data = zlib_compress(&big_endian_samples(gray.as_raw()))?;
                let dict = image_dict(width, height, Object::Name(b"DeviceGray".to_vec()), 16, true);
                Ok(PageImage::new(Stream::new(dict, data), width, height))
            }
            DynamicImage::ImageRgb16(rgb) => {
                let data = zlib_compress(&big_endian_samples(rgb.as_raw()))?;
                let dict = image_dict(width, height, Object::Name(b"DeviceRGB".to_vec()), 16, true);
                Ok(PageImage::new(Stream::new(dict, data), width, height))
            }
            _ if has_alpha(img) => encode_with_alpha(img),
            _ => {
                let rgb = img.to_rgb8();
                let data = zlib_compress(rgb.as_raw())?;
                let dict = image_dict(width, height, Object::Name(b"DeviceRGB".to_vec()), 8, true);
                Ok(PageImage::new(Stream::new(dict, data), width, height))
            }
        }
    }
}

/// Build an image XObject dictionary. `flate` marks the data as zlib
/// compressed.
pub fn image_dict(
    width: u32,
    height: u32,
    color_space: Object,
    bits_per_component: u8,
    flate: bool,
) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(width as i64));
    dict.set("Height", Object::Integer(height as i64));
    dict.set("ColorSpace", color_space);
    dict.set("BitsPerComponent", Object::Integer(bits_per_component as i64));
    if flate {
        dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
    }
    dict
}

pub fn zlib_compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

fn big_endian_samples(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_be_bytes()).collect()
}

/// Check if an image has a channel with any non-opaque pixel.
pub(crate) fn has_alpha(img: &DynamicImage) -> bool {
    if !img.color().has_alpha() {
        return false;
    }
    img.to_rgba8().pixels().any(|p| p.0[3] < 255)
}

/// Split RGBA into an RGB image plus a grayscale soft mask.
fn encode_with_alpha(img: &DynamicImage) -> std::io::Result<PageImage> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
    let mut alpha_data = Vec::with_capacity((width * height) as usize);
    for chunk in rgba.as_raw().chunks(4) {
        rgb_data.extend_from_slice(&chunk[..3]);
        alpha_data.push(chunk[3]);
    }

    let rgb_dict = image_dict(width, height, Object::Name(b"DeviceRGB".to_vec()), 8, true);
    let mask_dict = image_dict(width, height, Object::Name(b"DeviceGray".to_vec()), 8, true);

    let mut page_image = PageImage::new(
        Stream::new(rgb_dict, zlib_compress(&rgb_data)?),
        width,
        height,
    );
    page_image.smask = Some(Stream::new(mask_dict, zlib_compress(&alpha_data)?));
    Ok(page_image)
}

/// Accumulates one-image pages and serializes them as a single document.
pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        PdfBuilder {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append a page showing `image` fitted to the A4 box.
    pub fn add_image_page(&mut self, image: PageImage) {
        let PageImage {
            mut stream,
            smask,
            icc_profile,
            width,
            height,
        } = image;

        if let Some(smask) = smask {
            let smask_id = self.doc.add_object(smask);
            stream.dict.set("SMask", Object::Reference(smask_id));
        }
        if let Some(profile) = icc_profile {
            let profile_id = self.doc.add_object(profile);
            stream.dict.set(
                "ColorSpace",
                Object::Array(vec![
                    Object::Name(b"ICCBased".to_vec()),
                    Object::Reference(profile_id),
                ]),
            );
        }
        let image_id = self.doc.add_object(stream);

        let placement = fit_to_page(width, height);
        let content = format!(
            "q\n{:.4} 0 0 {:.4} {:.4} {:.4} cm\n/{} Do\nQ\n",
            placement.width, placement.height, placement.x, placement.y, IMAGE_NAME
        );
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut xobjects = Dictionary::new();
        xobjects.set(IMAGE_NAME, Object::Reference(image_id));
        let mut resources = Dictionary::new();
        resources.set("XObject", Object::Dictionary(xobjects));

        let mut page = Dictionary::new();
        page.set("Type", Object::Name(b"Page".to_vec()));
        page.set("Parent", Object::Reference(self.pages_id));
        page.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                A4_WIDTH.into(),
                A4_HEIGHT.into(),
            ]),
        );
        page.set("Resources", Object::Dictionary(resources));
        page.set("Contents", Object::Reference(content_id));

        let page_id = self.doc.add_object(page);
        self.kids.push(page_id);
    }

    /// Close the page tree and return the finished document. A builder with
    /// no pages still yields a valid, empty document.
    pub fn finish(mut self, compress_streams: bool) -> Document {
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name(b"Pages".to_vec()));
        pages.set(
            "Kids",
            Object::Array(self.kids.iter().map(|id| Object::Reference(*id)).collect()),
        );
        pages.set("Count", Object::Integer(self.kids.len() as i64));
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.doc.add_object(catalog);
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        if compress_streams {
            self.doc.compress();
        }
        self.doc
    }

    /// Finish the document and serialize it into `target`.
    pub fn write_to<W: Write>(self, target: &mut W, compress_streams: bool) -> Result<(), String> {
        let mut doc = self.finish(compress_streams);
        doc.save_to(target).map_err(|e| e.to_string())
    }
}
