use std::time::Duration;

use iced::widget::image::Handle;
use image::imageops::FilterType;
use image::RgbaImage;
use tokio::task;

use super::FetchError;

/// Edge length of grid thumbnails (square)
pub const THUMBNAIL_SIZE: u32 = 200;

/// How long a thumbnail download may take
const THUMBNAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Download and decode one grid thumbnail.
///
/// Transport failures (network, timeout, non-2xx) and undecodable bytes
/// report as distinct error kinds through the same channel as success.
pub async fn fetch_thumbnail(client: reqwest::Client, url: String) -> Result<Handle, FetchError> {
    let bytes = super::download_bytes(&client, &url, THUMBNAIL_TIMEOUT).await?;

    // Decoding and resizing are CPU-bound, keep them off the async threads
    let decode_url = url.clone();
    let pixels = task::spawn_blocking(move || decode_thumbnail(&bytes, &decode_url))
        .await
        .map_err(|e| FetchError::Transport {
            url: url.clone(),
            detail: format!("task join error: {}", e),
        })??;

    Ok(Handle::from_rgba(
        pixels.width(),
        pixels.height(),
        pixels.into_raw(),
    ))
}

/// Decode photo bytes and scale them to the square grid cell.
///
/// Crop-to-fill: the shorter edge sets the scale and the excess of the
/// longer edge is trimmed, so the cell is covered without letterboxing.
pub fn decode_thumbnail(bytes: &[u8], url: &str) -> Result<RgbaImage, FetchError> {
    let img = image::load_from_memory(bytes).map_err(|_| FetchError::DataFormat {
        url: url.to_string(),
    })?;

    let thumb = img.resize_to_fill(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);

    Ok(thumb.into_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            width,
            height,
            Rgb([120, 160, 200]),
        ));

        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_rejects_garbage_bytes() {
        let result = decode_thumbnail(b"definitely not an image", "test://photo");

        assert_eq!(
            result.unwrap_err(),
            FetchError::DataFormat {
                url: "test://photo".to_string()
            }
        );
    }

    #[test]
    fn test_decode_crops_landscape_to_square() {
        let bytes = encoded_png(400, 100);

        let thumb = decode_thumbnail(&bytes, "test://photo").unwrap();

        assert_eq!(thumb.width(), THUMBNAIL_SIZE);
        assert_eq!(thumb.height(), THUMBNAIL_SIZE);
    }

    #[test]
    fn test_decode_crops_portrait_to_square() {
        let bytes = encoded_png(100, 400);

        let thumb = decode_thumbnail(&bytes, "test://photo").unwrap();

        assert_eq!(thumb.width(), THUMBNAIL_SIZE);
        assert_eq!(thumb.height(), THUMBNAIL_SIZE);
    }

    #[tokio::test]
    async fn test_fetch_reports_transport_error_for_unreachable_host() {
        // Nothing listens on the discard port, so the connect fails fast
        let result = fetch_thumbnail(
            reqwest::Client::new(),
            "http://127.0.0.1:9/photo.jpg".to_string(),
        )
        .await;

        assert!(matches!(
            result,
            Err(FetchError::Transport { url, .. }) if url == "http://127.0.0.1:9/photo.jpg"
        ));
    }
}
