//! Workspace - fixed on-disk layout shared with COLMAP.

use std::path::{Path, PathBuf};

use serde::Serialize;

pub const IMAGES_DIR: &str = "images";
pub const IMAGES_BACKUP_DIR: &str = "images_original";
pub const DATABASE_FILE: &str = "database.db";
pub const SPARSE_DIR: &str = "sparse";
/// Model directory COLMAP's mapper writes first
pub const RESULT_SUBDIR: &str = "0";
pub const ARTIFACT_FILES: [&str; 3] = ["cameras.bin", "images.bin", "points3D.bin"];
pub const LOCK_FILE: &str = ".colmap-runner.lock";

/// Extensions the pre-scaler will hand to the resize tool (lowercase)
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "tif", "tiff", "bmp", "gif"];

/// Root directory of one reconstruction run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// The root is made absolute against the current directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn images_backup_dir(&self) -> PathBuf {
        self.root.join(IMAGES_BACKUP_DIR)
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }

    pub fn sparse_dir(&self) -> PathBuf {
        self.root.join(SPARSE_DIR)
    }

    pub fn result_dir(&self) -> PathBuf {
        self.sparse_dir().join(RESULT_SUBDIR)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    pub fn artifact_paths(&self) -> Vec<PathBuf> {
        let result_dir = self.result_dir();
        ARTIFACT_FILES.iter().map(|name| result_dir.join(name)).collect()
    }

    pub fn has_images_dir(&self) -> bool {
        self.images_dir().is_dir()
    }

    /// Existence of every artifact file, in [`ARTIFACT_FILES`] order
    pub fn artifact_status(&self) -> Vec<ArtifactStatus> {
        self.artifact_paths()
            .into_iter()
            .map(|path| ArtifactStatus {
                found: path.is_file(),
                path,
            })
            .collect()
    }
}

/// One expected output file and whether it exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactStatus {
    pub path: PathBuf,
    pub found: bool,
}

/// Case-insensitive extension check against [`SUPPORTED_IMAGE_EXTENSIONS`]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let ws = Workspace::new("/data/ws");
        assert_eq!(ws.images_dir(), Path::new("/data/ws/images"));
        assert_eq!(ws.images_backup_dir(), Path::new("/data/ws/images_original"));
        assert_eq!(ws.database_path(), Path::new("/data/ws/database.db"));
        assert_eq!(ws.result_dir(), Path::new("/data/ws/sparse/0"));
        assert_eq!(
            ws.artifact_paths(),
            vec![
                PathBuf::from("/data/ws/sparse/0/cameras.bin"),
                PathBuf::from("/data/ws/sparse/0/images.bin"),
                PathBuf::from("/data/ws/sparse/0/points3D.bin"),
            ]
        );
    }

    #[test]
    fn relative_root_is_made_absolute() {
        let ws = Workspace::new("some/relative/ws");
        assert!(ws.root().is_absolute());
        assert!(ws.root().ends_with("some/relative/ws"));
    }

    #[test]
    fn supported_extensions() {
        assert!(is_supported_image(Path::new("a.jpg")));
        assert!(is_supported_image(Path::new("b.JPEG")));
        assert!(is_supported_image(Path::new("c.TiF")));
        assert!(!is_supported_image(Path::new("d.svg")));
        assert!(!is_supported_image(Path::new("noext")));
    }

    #[test]
    fn artifact_status_reports_each_file() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        std::fs::create_dir_all(ws.result_dir()).unwrap();
        std::fs::write(ws.result_dir().join("cameras.bin"), b"x").unwrap();

        let status = ws.artifact_status();
        assert_eq!(status.len(), 3);
        assert!(status[0].found);
        assert!(!status[1].found);
        assert!(!status[2].found);
    }
}
