/// Desktop background integration
///
/// One operation: point the OS at a wallpaper file. Each OS family has
/// its own mechanism; anything unrecognized reports UnsupportedPlatform
/// instead of pretending it worked.

use std::path::Path;

use thiserror::Error;

/// Failure to hand the wallpaper to the OS
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    /// The platform mechanism exists but reported failure
    #[error("could not set the desktop background: {detail}")]
    CommandFailed { detail: String },

    /// No wallpaper mechanism is known for this platform
    #[error("setting the desktop background is not supported on this platform")]
    UnsupportedPlatform,
}

/// Set the desktop background to the given image file
#[allow(unreachable_code)] // the fallback tail is compiled on every target
pub fn set_desktop_background(path: &Path) -> Result<(), ApplyError> {
    #[cfg(target_os = "linux")]
    return set_gnome_background(path);

    #[cfg(target_os = "windows")]
    return set_windows_background(path);

    #[cfg(target_os = "macos")]
    return set_macos_background(path);

    let _ = path;
    Err(ApplyError::UnsupportedPlatform)
}

/// GNOME: write the background keys through gsettings
#[cfg(target_os = "linux")]
fn set_gnome_background(path: &Path) -> Result<(), ApplyError> {
    let uri = file_uri(path);

    run_gsettings("picture-uri", &uri)?;

    // Dark-mode sessions read a separate key; failing to write it only
    // costs the dark variant
    if run_gsettings("picture-uri-dark", &uri).is_err() {
        eprintln!("⚠️  Could not set the dark-mode wallpaper variant");
    }

    Ok(())
}

#[cfg(target_os = "linux")]
fn run_gsettings(key: &str, uri: &str) -> Result<(), ApplyError> {
    let status = std::process::Command::new("gsettings")
        .args(["set", "org.gnome.desktop.background", key, uri])
        .status()
        .map_err(|e| ApplyError::CommandFailed {
            detail: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(ApplyError::CommandFailed {
            detail: format!("gsettings {} exited with {}", key, status),
        })
    }
}

/// file:// URI for an absolute path, as the GNOME keys expect
#[cfg(target_os = "linux")]
fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Windows: SystemParametersInfoW with the wide-encoded path
#[cfg(target_os = "windows")]
fn set_windows_background(path: &Path) -> Result<(), ApplyError> {
    use std::os::windows::ffi::OsStrExt;
    use windows::Win32::UI::WindowsAndMessaging::{
        SystemParametersInfoW, SPIF_SENDCHANGE, SPIF_UPDATEINIFILE, SPI_SETDESKWALLPAPER,
    };

    let mut wide: Vec<u16> = path
        .as_os_str()
        .encode_wide()
        .chain(std::iter::once(0))
        .collect();

    unsafe {
        SystemParametersInfoW(
            SPI_SETDESKWALLPAPER,
            0,
            Some(wide.as_mut_ptr() as *mut _),
            SPIF_UPDATEINIFILE | SPIF_SENDCHANGE,
        )
    }
    .map_err(|e| ApplyError::CommandFailed {
        detail: e.to_string(),
    })
}

/// macOS: ask Finder through osascript
#[cfg(target_os = "macos")]
fn set_macos_background(path: &Path) -> Result<(), ApplyError> {
    let status = std::process::Command::new("osascript")
        .arg("-e")
        .arg(finder_script(path))
        .status()
        .map_err(|e| ApplyError::CommandFailed {
            detail: e.to_string(),
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(ApplyError::CommandFailed {
            detail: format!("osascript exited with {}", status),
        })
    }
}

/// AppleScript line that points Finder at the file
#[cfg(target_os = "macos")]
fn finder_script(path: &Path) -> String {
    format!(
        "tell application \"Finder\" to set desktop picture to POSIX file \"{}\"",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_error_names_the_problem() {
        let message = ApplyError::UnsupportedPlatform.to_string();

        assert!(message.contains("not supported on this platform"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_file_uri_has_the_scheme_prefix() {
        let uri = file_uri(Path::new("/home/user/.local/share/picwall/wallpaper_collage.jpg"));

        assert_eq!(
            uri,
            "file:///home/user/.local/share/picwall/wallpaper_collage.jpg"
        );
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_finder_script_embeds_the_posix_path() {
        let script = finder_script(Path::new("/Users/user/pic.jpg"));

        assert_eq!(
            script,
            "tell application \"Finder\" to set desktop picture to POSIX file \"/Users/user/pic.jpg\""
        );
    }
}
