//! Reading images from disk, in any format the `image` crate understands, normalized to RGBA8.

use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ImageLoadError {
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decoding {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} has no pixels")]
    Empty { path: PathBuf },
}

pub struct LoadedImage {
    pub pixels: image::RgbaImage,
    /// Final path component, for display.
    pub file_name: String,
}

/// Load and decode the image at `path`.
pub fn load_image(path: impl AsRef<Path>) -> Result<LoadedImage, ImageLoadError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ImageLoadError::Io {
        path: path.to_owned(),
        source,
    })?;
    // Sniff the format from content rather than trusting the extension.
    let pixels = image::load_from_memory(&bytes)
        .map_err(|source| ImageLoadError::Decode {
            path: path.to_owned(),
            source,
        })?
        .into_rgba8();
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(ImageLoadError::Empty {
            path: path.to_owned(),
        });
    }
    let file_name = path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    log::info!(
        "loaded {} ({}x{})",
        path.display(),
        pixels.width(),
        pixels.height()
    );
    Ok(LoadedImage { pixels, file_name })
}


#[cfg(test)]
mod test {
    use super::{load_image, testing, ImageLoadError};
    #[test]
    fn loads_png() {
        let path = testing::write_png("four.png", 4, 3);
        let loaded = load_image(&path).unwrap();
        assert_eq!(loaded.pixels.dimensions(), (4, 3));
        assert_eq!(loaded.pixels.get_pixel(2, 1).0, [2, 1, 0x80, 0xFF]);
        assert!(loaded.file_name.ends_with("four.png"));
        assert!(!loaded.file_name.contains(std::path::MAIN_SEPARATOR));
        std::fs::remove_file(path).unwrap();
    }
    #[test]
    fn missing_file() {
        let path = testing::scratch_path("missing.png");
        assert!(matches!(load_image(&path), Err(ImageLoadError::Io { .. })));
    }
    #[test]
    fn garbage_file() {
        let path = testing::scratch_path("garbage.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(matches!(
            load_image(&path),
            Err(ImageLoadError::Decode { .. })
        ));
        std::fs::remove_file(path).unwrap();
    }
}
