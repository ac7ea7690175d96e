//! Resize command construction and image bound checks.

use std::path::Path;

use contracts::{CommandSpec, LONGEST_EDGE_LIMIT};
use tracing::debug;

/// `convert <source> -resize <geometry> <target>`
pub fn resize_command(convert: &str, source: &Path, geometry: &str, target: &Path) -> CommandSpec {
    CommandSpec::new(convert)
        .arg(source)
        .arg("-resize")
        .arg(geometry)
        .arg(target)
}

/// Whether the image's longest edge is at most [`LONGEST_EDGE_LIMIT`]
///
/// Only the header is read. `None` when the format is not recognised.
pub fn within_long_edge(path: &Path) -> Option<bool> {
    match image::image_dimensions(path) {
        Ok((width, height)) => Some(width.max(height) <= LONGEST_EDGE_LIMIT),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "could not read image dimensions");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_resize_command_shape() {
        let cmd = resize_command(
            "convert",
            Path::new("/ws/images_original/a.jpg"),
            "12.5%",
            Path::new("/ws/images/a.jpg"),
        );
        assert_eq!(
            cmd.display(),
            "convert /ws/images_original/a.jpg -resize 12.5% /ws/images/a.jpg"
        );
    }

    #[test]
    fn test_within_long_edge() {
        let dir = tempfile::tempdir().unwrap();

        let small = dir.path().join("small.png");
        RgbImage::new(40, 30).save(&small).unwrap();
        assert_eq!(within_long_edge(&small), Some(true));

        let wide = dir.path().join("wide.png");
        RgbImage::new(1601, 2).save(&wide).unwrap();
        assert_eq!(within_long_edge(&wide), Some(false));

        let junk = dir.path().join("junk.jpg");
        std::fs::write(&junk, b"not an image").unwrap();
        assert_eq!(within_long_edge(&junk), None);
    }
}
