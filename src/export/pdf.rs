//! Assembling rasterized pages into a PDF
//!
//! Each image becomes one A4 page. Transparent pixels are flattened onto
//! white, and the image is scaled to fit the page and centred on it.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::debug;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::constants::{PAGE_HEIGHT_PT, PAGE_WIDTH_PT};
use crate::errors::{config_parsing_error, file_operation_error, generic_error, Result};

/// Writes a PDF at `output` with one page per image, in the given order
///
/// # Errors
/// * Returns an error if `images` is empty
/// * Returns an error if an image cannot be decoded or the file written
pub fn assemble_pdf(images: &[PathBuf], output: &Path) -> Result<()> {
    if images.is_empty() {
        return Err(generic_error(&format!(
            "No rasterized pages to assemble into {}",
            output.display()
        )));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(images.len());

    for (index, image_path) in images.iter().enumerate() {
        let decoded = image::open(image_path)
            .map_err(|e| {
                config_parsing_error(e, &format!("Failed to decode {}", image_path.display()))
            })?
            .to_rgba8();
        let (width, height) = decoded.dimensions();
        debug!("Adding {} ({width}x{height}) as page {index}", image_path.display());

        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            flatten_on_white(&decoded),
        );
        let image_id = doc.add_object(image_stream);

        let (x, y, w, h) = fit_to_page(width, height);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
                ),
                Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content
            .encode()
            .map_err(|e| generic_error(&format!("Failed to encode page content: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    "Im0" => image_id,
                },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    let media_box: Vec<Object> = vec![
        0.into(),
        0.into(),
        PAGE_WIDTH_PT.into(),
        PAGE_HEIGHT_PT.into(),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => media_box,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(output).map_err(|e| {
        file_operation_error(
            std::io::Error::other(e.to_string()),
            output.to_path_buf(),
            "write",
        )
    })?;
    Ok(())
}

/// Position and size, in points, of an image scaled to fit an A4 page
pub fn fit_to_page(width: u32, height: u32) -> (i64, i64, i64, i64) {
    let page_w = PAGE_WIDTH_PT as f64;
    let page_h = PAGE_HEIGHT_PT as f64;
    let scale = (page_w / width.max(1) as f64).min(page_h / height.max(1) as f64);

    let w = (width as f64 * scale).round() as i64;
    let h = (height as f64 * scale).round() as i64;
    ((PAGE_WIDTH_PT - w) / 2, (PAGE_HEIGHT_PT - h) / 2, w, h)
}

/// Composites RGBA pixels over white and returns packed RGB bytes
fn flatten_on_white(image: &RgbaImage) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(image.width() as usize * image.height() as usize * 3);
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as u16;
        for channel in [r, g, b] {
            let blended = (channel as u16 * alpha + 255 * (255 - alpha)) / 255;
            rgb.push(blended as u8);
        }
    }
    rgb
}
