//! Page-Draw converter: decode each entry and redraw it on its own page.

use crate::error::{ConvertError, Result};
use crate::pdf::{PageImage, PdfBuilder};
use crate::{Archive, ConversionReport, ConvertOptions, Converter};
use image::DynamicImage;
use std::io::{Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Decodes every entry as an image and draws it onto a fresh A4 page.
///
/// Entries that do not decode are reported and skipped; they never abort the
/// archive. An archive with no decodable entries still yields a valid PDF with
/// zero pages.
#[derive(Debug, Clone, Default)]
pub struct PageDrawConverter {
    options: ConvertOptions,
}

impl PageDrawConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }
}

impl Converter for PageDrawConverter {
    fn name(&self) -> &'static str {
        "draw"
    }

    fn convert_to_writer<R: Read + Seek, W: Write>(
        &self,
        archive: &mut Archive<R>,
        target: &mut W,
        destination: &Path,
    ) -> Result<ConversionReport> {
        let zip_label = archive.path().display().to_string();
        info!("Process zip '{}' by drawing pages", zip_label);

        let names = archive.names().to_vec();
        let mut builder = PdfBuilder::new();
        let mut skipped_entries = Vec::new();

        for name in &names {
            info!("Process image '{}' for zip '{}'", name, zip_label);
            let bytes = archive.read(name)?;

            let img = match decode_entry(name, &bytes) {
                Ok(img) => img,
                Err(err) => {
                    warn!("{} in zip '{}'; entry is skipped", err, zip_label);
                    skipped_entries.push(name.clone());
                    continue;
                }
            };
            debug!(
                "'{}' decoded as {}x{} {:?}",
                name,
                img.width(),
                img.height(),
                img.color()
            );

            let page_image =
                PageImage::from_dynamic(&img).map_err(|source| ConvertError::PixelCompress {
                    entry: name.clone(),
                    source,
                })?;
            builder.add_image_page(page_image);
        }

        let pages = builder.page_count();
        info!("Try to save as '{}' ({} pages)", destination.display(), pages);
        builder
            .write_to(target, self.options.compress_streams)
            .map_err(|reason| ConvertError::OutputWrite {
                path: destination.to_path_buf(),
                reason,
            })?;

        Ok(ConversionReport {
            archive: archive.path().to_path_buf(),
            output: destination.to_path_buf(),
            total_entries: names.len(),
            pages,
            skipped_entries,
        })
    }
}

fn decode_entry(name: &str, bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|source| ConvertError::ImageDecode {
        entry: name.to_string(),
        source,
    })
}
