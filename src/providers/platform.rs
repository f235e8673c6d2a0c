//! Desktop stand-ins for the permission prompts and the gallery picker

use crate::capability::{CameraPermission, ImagePicker, PermissionStatus};
use crate::error::ScanError;
use crate::models::{ImageHandle, PickedImage};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Camera permission with a scripted prompt answer
#[derive(Debug)]
pub struct ScriptedCameraPermission {
    status: Mutex<Option<PermissionStatus>>,
    answer: PermissionStatus,
}

impl ScriptedCameraPermission {
    /// Undetermined until prompted; the prompt answers `answer`
    pub fn undetermined(answer: PermissionStatus) -> Self {
        Self {
            status: Mutex::new(None),
            answer,
        }
    }

    /// Already granted
    pub fn granted() -> Self {
        Self {
            status: Mutex::new(Some(PermissionStatus::Granted)),
            answer: PermissionStatus::Granted,
        }
    }

    /// Already denied, and denied again when prompted
    pub fn denied() -> Self {
        Self {
            status: Mutex::new(Some(PermissionStatus::Denied)),
            answer: PermissionStatus::Denied,
        }
    }
}

#[async_trait]
impl CameraPermission for ScriptedCameraPermission {
    fn status(&self) -> Option<PermissionStatus> {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn request_permission(&self) -> Result<PermissionStatus, ScanError> {
        debug!(answer = ?self.answer, "camera permission prompt");
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = Some(self.answer);
        Ok(self.answer)
    }
}

/// Picker that "selects" a file given up front.
///
/// Desktop has no media-library gate, so the permission is always granted.
/// No path means the user cancelled.
#[derive(Debug, Clone, Default)]
pub struct PathPicker {
    path: Option<PathBuf>,
}

impl PathPicker {
    /// Picker returning `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Picker that always cancels
    pub fn cancelled() -> Self {
        Self { path: None }
    }
}

#[async_trait]
impl ImagePicker for PathPicker {
    async fn request_media_permission(&self) -> Result<PermissionStatus, ScanError> {
        Ok(PermissionStatus::Granted)
    }

    async fn pick_image(&self) -> Result<Option<PickedImage>, ScanError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(ScanError::provider(format!(
                "not an image file: {}",
                path.display()
            )));
        }
        Ok(Some(PickedImage::new(ImageHandle::from_path(path.clone()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_undetermined_until_prompted() {
        let camera = ScriptedCameraPermission::undetermined(PermissionStatus::Granted);
        assert_eq!(camera.status(), None);
        assert_eq!(
            camera.request_permission().await.unwrap(),
            PermissionStatus::Granted
        );
        assert_eq!(camera.status(), Some(PermissionStatus::Granted));
    }

    #[tokio::test]
    async fn test_granted_without_prompt() {
        let camera = ScriptedCameraPermission::granted();
        assert_eq!(camera.status(), Some(PermissionStatus::Granted));
    }

    #[tokio::test]
    async fn test_denied_stays_denied() {
        let camera = ScriptedCameraPermission::denied();
        assert_eq!(
            camera.request_permission().await.unwrap(),
            PermissionStatus::Denied
        );
        assert_eq!(camera.status(), Some(PermissionStatus::Denied));
    }

    #[tokio::test]
    async fn test_picker_outcomes() {
        assert!(PathPicker::cancelled().pick_image().await.unwrap().is_none());

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("code.png");
        std::fs::write(&file, b"png").unwrap();
        let picked = PathPicker::new(&file).pick_image().await.unwrap().unwrap();
        assert_eq!(picked.handle().path(), Some(file.as_path()));

        assert!(PathPicker::new(dir.path()).pick_image().await.is_err());
        assert!(PathPicker::new(dir.path().join("missing.png"))
            .pick_image()
            .await
            .is_err());
    }
}
