/// Wallpaper composition
///
/// Turns the selection into the output artifact: a single photo saved
/// as it was downloaded, or up to nine photos resized into the cells of
/// a 3x3 canvas. Writing the output file is the last step of a cycle,
/// so a failed cycle never leaves a partial artifact behind.

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::imageops::FilterType;
use image::{DynamicImage, ImageBuffer, Rgb, RgbImage};
use thiserror::Error;
use tokio::task;

use crate::fetch::{self, FetchError};
use crate::gallery::data::PhotoRef;

/// Collage canvas resolution
pub const CANVAS_WIDTH: u32 = 1920;
pub const CANVAS_HEIGHT: u32 = 1080;

/// Collage layout: three columns by three rows
pub const GRID_COLUMNS: u32 = 3;
pub const GRID_ROWS: u32 = 3;

/// Cell size: one ninth of the canvas
pub const CELL_WIDTH: u32 = CANVAS_WIDTH / GRID_COLUMNS;
pub const CELL_HEIGHT: u32 = CANVAS_HEIGHT / GRID_ROWS;

/// At most nine photos fit the collage
pub const MAX_COLLAGE_PHOTOS: usize = 9;

/// Full-resolution downloads get a longer leash than thumbnails
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Output filename for single-photo mode
const SINGLE_FILENAME: &str = "current_wallpaper.jpg";

/// Output filename for collage mode
const COLLAGE_FILENAME: &str = "wallpaper_collage.jpg";

/// Failure of the composing half of a generation cycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposeError {
    /// A photo download failed
    #[error("download failed for {url}: {detail}")]
    Transport { url: String, detail: String },

    /// A downloaded photo could not be decoded
    #[error("unreadable image data from {url}")]
    DataFormat { url: String },

    /// The artifact could not be written
    #[error("could not write the wallpaper file: {detail}")]
    Io { detail: String },

    /// Generation was requested with nothing selected
    #[error("no photos selected")]
    EmptySelection,
}

impl From<FetchError> for ComposeError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Transport { url, detail } => ComposeError::Transport { url, detail },
            FetchError::DataFormat { url } => ComposeError::DataFormat { url },
        }
    }
}

/// Directory holding the output artifacts.
///
/// ~/.local/share/picwall on Linux, the platform equivalent elsewhere.
/// A missing data dir falls back to home. Only names the directory;
/// nothing is created until a write is about to land in it.
fn artifact_dir() -> Result<PathBuf, ComposeError> {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| ComposeError::Io {
            detail: "no usable data directory".to_string(),
        })?;

    path.push("picwall");
    Ok(path)
}

/// Create the artifact directory right before a write lands in it
fn create_output_dir(path: &Path) -> Result<(), ComposeError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ComposeError::Io {
            detail: e.to_string(),
        })?;
    }

    Ok(())
}

/// Where single-photo wallpapers are written
pub fn single_output_path() -> Result<PathBuf, ComposeError> {
    Ok(artifact_dir()?.join(SINGLE_FILENAME))
}

/// Where collage wallpapers are written
pub fn collage_output_path() -> Result<PathBuf, ComposeError> {
    Ok(artifact_dir()?.join(COLLAGE_FILENAME))
}

/// Download one photo at full resolution and store it as the wallpaper.
///
/// The bytes are written exactly as they arrived; decoding is only used
/// to verify that the download really is an image.
pub async fn render_single(
    client: reqwest::Client,
    photo: PhotoRef,
) -> Result<PathBuf, ComposeError> {
    let url = photo.url().to_string();
    println!("📥 Downloading wallpaper photo: {}", url);

    let bytes = fetch::download_bytes(&client, &url, DOWNLOAD_TIMEOUT).await?;
    let path = single_output_path()?;

    task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map_err(|_| ComposeError::DataFormat { url })?;

        create_output_dir(&path)?;
        std::fs::write(&path, &bytes).map_err(|e| ComposeError::Io {
            detail: e.to_string(),
        })?;

        println!("✅ Wallpaper written: {}", path.display());
        Ok(path)
    })
    .await
    .map_err(|e| ComposeError::Io {
        detail: format!("task join error: {}", e),
    })?
}

/// Compose up to the first nine photos into the 3x3 collage and store it.
///
/// Photos land in their row-major cells in selection order; any download
/// or decode failure aborts the whole cycle before anything is written.
pub async fn render_collage(
    client: reqwest::Client,
    photos: Vec<PhotoRef>,
) -> Result<PathBuf, ComposeError> {
    let wanted = photos.len().min(MAX_COLLAGE_PHOTOS);
    let mut cells: Vec<DynamicImage> = Vec::with_capacity(wanted);

    for photo in photos.iter().take(MAX_COLLAGE_PHOTOS) {
        let url = photo.url().to_string();
        let bytes = fetch::download_bytes(&client, &url, DOWNLOAD_TIMEOUT).await?;

        let decoded = task::spawn_blocking(move || {
            image::load_from_memory(&bytes).map_err(|_| ComposeError::DataFormat { url })
        })
        .await
        .map_err(|e| ComposeError::Io {
            detail: format!("task join error: {}", e),
        })??;

        cells.push(decoded);
        println!("📥 Collage photo {}/{} ready", cells.len(), wanted);
    }

    let path = collage_output_path()?;

    task::spawn_blocking(move || {
        let canvas = compose_collage(&cells);
        println!(
            "🎨 Composed {} photos onto the {}x{} canvas",
            cells.len(),
            CANVAS_WIDTH,
            CANVAS_HEIGHT
        );

        create_output_dir(&path)?;
        DynamicImage::ImageRgb8(canvas)
            .save_with_format(&path, image::ImageFormat::Jpeg)
            .map_err(|e| ComposeError::Io {
                detail: e.to_string(),
            })?;

        println!("✅ Collage written: {}", path.display());
        Ok(path)
    })
    .await
    .map_err(|e| ComposeError::Io {
        detail: format!("task join error: {}", e),
    })?
}

/// Paste photos into their row-major cells on a blank canvas.
///
/// Each photo is scaled crop-to-fill so its 640x360 cell is covered
/// edge to edge. Cells without a photo stay black. Anything past the
/// ninth photo is ignored.
pub fn compose_collage(photos: &[DynamicImage]) -> RgbImage {
    let mut canvas: RgbImage =
        ImageBuffer::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, Rgb([0, 0, 0]));

    for (index, photo) in photos.iter().take(MAX_COLLAGE_PHOTOS).enumerate() {
        let cell = photo
            .resize_to_fill(CELL_WIDTH, CELL_HEIGHT, FilterType::Lanczos3)
            .into_rgb8();

        let (x, y) = cell_origin(index);
        image::imageops::replace(&mut canvas, &cell, x as i64, y as i64);
    }

    canvas
}

/// Top-left corner of cell `index` (row-major, three per row)
pub fn cell_origin(index: usize) -> (u32, u32) {
    let column = (index as u32) % GRID_COLUMNS;
    let row = (index as u32) / GRID_COLUMNS;
    (column * CELL_WIDTH, row * CELL_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(rgb)))
    }

    /// Center of cell `index`, for sampling composed pixels
    fn cell_center(index: usize) -> (u32, u32) {
        let (x, y) = cell_origin(index);
        (x + CELL_WIDTH / 2, y + CELL_HEIGHT / 2)
    }

    #[test]
    fn test_cell_origins_are_row_major() {
        assert_eq!(cell_origin(0), (0, 0));
        assert_eq!(cell_origin(1), (640, 0));
        assert_eq!(cell_origin(2), (1280, 0));
        assert_eq!(cell_origin(3), (0, 360));
        assert_eq!(cell_origin(4), (640, 360));
        assert_eq!(cell_origin(8), (1280, 720));
    }

    #[test]
    fn test_three_photos_fill_the_top_row_only() {
        let photos = vec![
            solid(800, 600, [200, 0, 0]),
            solid(100, 700, [0, 200, 0]),
            solid(640, 360, [0, 0, 200]),
        ];

        let canvas = compose_collage(&photos);

        assert_eq!(canvas.width(), CANVAS_WIDTH);
        assert_eq!(canvas.height(), CANVAS_HEIGHT);

        // Top-row cells carry their photo's dominant channel
        let (x, y) = cell_center(0);
        assert!(canvas.get_pixel(x, y)[0] > 150);
        let (x, y) = cell_center(1);
        assert!(canvas.get_pixel(x, y)[1] > 150);
        let (x, y) = cell_center(2);
        assert!(canvas.get_pixel(x, y)[2] > 150);

        // The six remaining cells stay untouched canvas black
        for index in 3..MAX_COLLAGE_PHOTOS {
            let (x, y) = cell_center(index);
            assert_eq!(canvas.get_pixel(x, y), &Rgb([0, 0, 0]));
        }
    }

    #[test]
    fn test_only_the_first_nine_photos_are_used() {
        let mut photos: Vec<DynamicImage> = (0..9)
            .map(|n| solid(320, 180, [20 * n as u8, 10, 10]))
            .collect();

        let nine_canvas = compose_collage(&photos);

        // A tenth, glaringly white photo must change nothing
        photos.push(solid(320, 180, [255, 255, 255]));
        let ten_canvas = compose_collage(&photos);

        assert_eq!(nine_canvas, ten_canvas);
    }

    #[test]
    fn test_single_photo_makes_a_degenerate_collage() {
        let photos = vec![solid(1000, 1000, [200, 200, 0])];

        let canvas = compose_collage(&photos);

        assert_eq!(canvas.width(), CANVAS_WIDTH);
        assert_eq!(canvas.height(), CANVAS_HEIGHT);

        let (x, y) = cell_center(0);
        assert!(canvas.get_pixel(x, y)[0] > 150);

        // Every other cell is blank
        let (x, y) = cell_center(1);
        assert_eq!(canvas.get_pixel(x, y), &Rgb([0, 0, 0]));
        let (x, y) = cell_center(4);
        assert_eq!(canvas.get_pixel(x, y), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_cells_are_covered_edge_to_edge() {
        let photos = vec![solid(3000, 500, [180, 40, 40])];

        let canvas = compose_collage(&photos);

        // Crop-to-fill leaves no letterbox bars inside the cell
        let (x0, y0) = cell_origin(0);
        assert!(canvas.get_pixel(x0, y0)[0] > 100);
        assert!(canvas.get_pixel(x0 + CELL_WIDTH - 1, y0 + CELL_HEIGHT - 1)[0] > 100);

        // But the neighboring cell is untouched
        assert_eq!(canvas.get_pixel(x0 + CELL_WIDTH, y0), &Rgb([0, 0, 0]));
    }

    // Path helpers only name locations; asking where the artifacts go
    // must not touch the filesystem
    #[test]
    fn test_output_paths_use_distinct_fixed_filenames() {
        let single = single_output_path().unwrap();
        let collage = collage_output_path().unwrap();

        assert_eq!(single.file_name().unwrap(), "current_wallpaper.jpg");
        assert_eq!(collage.file_name().unwrap(), "wallpaper_collage.jpg");
        assert_eq!(single.parent(), collage.parent());
    }

    #[test]
    fn test_missing_output_dir_is_created_for_the_write() {
        let dir = std::env::temp_dir().join("picwall_composer_test");
        let _ = std::fs::remove_dir_all(&dir);
        let target = dir.join("artifacts").join("wallpaper_collage.jpg");

        create_output_dir(&target).unwrap();
        assert!(target.parent().unwrap().is_dir());

        // Creating it again is harmless
        create_output_dir(&target).unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }
}
