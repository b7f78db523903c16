//! Engine configuration and fixed page geometry.
//!
//! The page is a physical 40x40mm label. Layout happens in a fixed
//! 472x472 pixel space (40mm at 300 DPI); the PDF backend converts
//! pixel coordinates to millimetres at emission time.

use std::path::{Path, PathBuf};

/// Physical page edge in millimetres.
pub const PAGE_MM: f32 = 40.0;

/// Working pixel space edge (40mm at 300 DPI).
pub const PAGE_PX: f32 = 472.0;

/// Render resolution of the working space.
pub const DPI: u32 = 300;

/// Millimetres per working-space pixel.
pub const MM_PER_PX: f32 = PAGE_MM / PAGE_PX;

/// Image file extensions probed by the resource resolver, in priority order.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Engine configuration: where resources live and what gets emitted.
///
/// Everything is explicit; the engine holds no ambient global state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root containing the conventional `img/` tree.
    pub base_dir: PathBuf,
    /// Destination for the `labels/` and `marks/` output directories.
    pub output_dir: PathBuf,
    /// Also write a 472x472 PNG preview next to each PDF.
    pub raster_previews: bool,
    /// Explicit font files tried before the system probe list.
    /// `[regular, bold]`; either may be absent.
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
}

impl Config {
    pub fn new(base_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            output_dir: output_dir.into(),
            raster_previews: false,
            font_regular: None,
            font_bold: None,
        }
    }

    pub fn logos_dir(&self) -> PathBuf {
        self.base_dir.join("img").join("logos")
    }

    pub fn certificates_dir(&self) -> PathBuf {
        self.base_dir.join("img").join("certificates")
    }

    pub fn mark_images_dir(&self) -> PathBuf {
        self.base_dir.join("img").join("mark_images")
    }

    pub fn labels_dir(&self) -> PathBuf {
        self.output_dir.join("labels")
    }

    pub fn marks_dir(&self) -> PathBuf {
        self.output_dir.join("marks")
    }
}

/// Candidate system font paths, probed in order when no explicit font
/// is configured. Regular/bold pairs; missing files are skipped.
pub fn system_font_candidates() -> Vec<(PathBuf, PathBuf)> {
    let pairs: &[(&str, &str)] = &[
        (
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        ),
        (
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        ),
        (
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
        ),
        (
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        ),
        (
            "/Library/Fonts/Arial Unicode.ttf",
            "/Library/Fonts/Arial Unicode.ttf",
        ),
    ];

    let mut candidates: Vec<(PathBuf, PathBuf)> = pairs
        .iter()
        .map(|(r, b)| (PathBuf::from(r), PathBuf::from(b)))
        .collect();

    // Windows keeps Arial under %WINDIR%\Fonts
    if let Ok(windir) = std::env::var("WINDIR") {
        let fonts = Path::new(&windir).join("Fonts");
        candidates.push((fonts.join("arial.ttf"), fonts.join("arialbd.ttf")));
    }

    candidates
}
