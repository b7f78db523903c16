//! Resource resolution: logos, certification icons, the shipping-mark
//! image, and typefaces.
//!
//! Every successful decode is memoized by `(kind, key)` for the life
//! of the engine. A missing or undecodable image is an absent
//! decoration, never an error: callers get `None` and the observer
//! gets a warning.

pub mod fonts;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{DynamicImage, Rgb, RgbImage, Rgba};

use crate::config::{Config, IMAGE_EXTENSIONS};
use crate::observer::{BatchObserver, Level};

/// Which directory a cached image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Logo,
    Certificate,
    MarkImage,
}

/// Certification-icon filename stems probed per recognized token
/// family. Cyrillic and Latin spellings are reconciled here; extend
/// this table when fixture data grows new spellings.
const CERT_FAMILIES: &[(&[&str], &[&str])] = &[
    (&["рст", "rct", "rst"], &["рст", "rst", "rct"]),
    (&["eac", "еас"], &["eac", "еас"]),
];

const CERT_EXTENSIONS: &[&str] = &["png", "jpg"];

/// Engine-owned image cache. Entries are immutable once decoded and
/// shared across rows within a batch; parallel batches construct
/// separate caches.
pub struct ResourceCache {
    logos_dir: PathBuf,
    certificates_dir: PathBuf,
    mark_images_dir: PathBuf,
    images: RefCell<HashMap<(ResourceKind, String), Option<Arc<RgbImage>>>>,
}

impl ResourceCache {
    pub fn new(config: &Config) -> Self {
        Self {
            logos_dir: config.logos_dir(),
            certificates_dir: config.certificates_dir(),
            mark_images_dir: config.mark_images_dir(),
            images: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a logo by row identifier: trimmed, lowercased, probed
    /// as `{name}.{png|jpg|jpeg|bmp}` under the logos directory.
    pub fn logo(&self, name: &str, observer: &dyn BatchObserver) -> Option<Arc<RgbImage>> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.resolve(ResourceKind::Logo, &key, observer, |key| {
            probe_stem(&self.logos_dir, key, IMAGE_EXTENSIONS)
        })
    }

    /// Resolve a certification icon by type token (РСТ/EAC family,
    /// Cyrillic or Latin spelling).
    pub fn certification_icon(
        &self,
        token: &str,
        observer: &dyn BatchObserver,
    ) -> Option<Arc<RgbImage>> {
        let key = token.trim().to_lowercase();
        let stems = CERT_FAMILIES
            .iter()
            .find(|(tokens, _)| tokens.contains(&key.as_str()))
            .map(|(_, stems)| *stems)?;

        self.resolve(ResourceKind::Certificate, &key, observer, |_| {
            stems
                .iter()
                .find_map(|stem| probe_stem(&self.certificates_dir, stem, CERT_EXTENSIONS))
        })
    }

    /// Resolve the single conventional shipping-mark image.
    pub fn mark_image(&self, observer: &dyn BatchObserver) -> Option<Arc<RgbImage>> {
        self.resolve(ResourceKind::MarkImage, "mark_images", observer, |key| {
            probe_stem(&self.mark_images_dir, key, IMAGE_EXTENSIONS)
        })
    }

    fn resolve(
        &self,
        kind: ResourceKind,
        key: &str,
        observer: &dyn BatchObserver,
        locate: impl Fn(&str) -> Option<PathBuf>,
    ) -> Option<Arc<RgbImage>> {
        let cache_key = (kind, key.to_string());
        if let Some(cached) = self.images.borrow().get(&cache_key) {
            return cached.clone();
        }

        let loaded = match locate(key) {
            Some(path) => match load_opaque(&path) {
                Ok(img) => Some(Arc::new(img)),
                Err(message) => {
                    observer.record(Level::Warning, &message);
                    None
                }
            },
            None => None,
        };

        self.images.borrow_mut().insert(cache_key, loaded.clone());
        loaded
    }
}

/// Probe `{dir}/{stem}.{ext}` across the extension list, first hit wins.
fn probe_stem(dir: &Path, stem: &str, extensions: &[&str]) -> Option<PathBuf> {
    extensions
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.exists())
}

/// Decode an image and flatten any alpha/palette channel onto an
/// opaque white background, so callers always paste fully-opaque RGB.
fn load_opaque(path: &Path) -> Result<RgbImage, String> {
    let decoded = image::open(path)
        .map_err(|e| format!("image load error {}: {e}", path.display()))?;
    Ok(flatten_onto_white(&decoded))
}

/// Composite RGBA pixels against white.
pub fn flatten_onto_white(source: &DynamicImage) -> RgbImage {
    let rgba = source.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut flat = RgbImage::new(width, height);
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let Rgba([r, g, b, a]) = *pixel;
        let alpha = a as f32 / 255.0;
        let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)) as u8;
        flat.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    flat
}

/// Shrink to fit within `max_edge` on both axes, preserving aspect
/// ratio; images already small enough are returned as-is.
pub fn thumbnail(image: &RgbImage, max_edge: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    if w <= max_edge && h <= max_edge {
        return image.clone();
    }
    DynamicImage::ImageRgb8(image.clone())
        .thumbnail(max_edge, max_edge)
        .to_rgb8()
}

/// Scale to an exact target width, preserving aspect ratio.
pub fn scale_to_width(image: &RgbImage, target_width: u32) -> RgbImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return image.clone();
    }
    let target_height = ((target_width as f32) * (h as f32) / (w as f32)).round().max(1.0) as u32;
    DynamicImage::ImageRgb8(image.clone())
        .resize_exact(target_width, target_height, image::imageops::FilterType::Lanczos3)
        .to_rgb8()
}
