use crate::error::ScanError;
use crate::tools::dataset_iter;
use image::DynamicImage;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Camera stand-in: yields frames until exhausted
pub trait FrameSource: Send {
    /// Next frame, or `None` when the stream has ended
    fn next_frame(&mut self) -> Option<Result<DynamicImage, ScanError>>;
}

/// Frames read from the image files of a directory, in path order
#[derive(Debug)]
pub struct DirectoryFrames {
    pending: VecDeque<PathBuf>,
}

impl DirectoryFrames {
    /// Collect every image below `root`
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, ScanError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ScanError::provider(format!(
                "frame directory not found: {}",
                root.display()
            )));
        }
        Ok(Self::from_paths(dataset_iter(root, None)))
    }

    /// Frames from an explicit list of files
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            pending: paths.into_iter().collect(),
        }
    }

    /// Frames not yet delivered
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl FrameSource for DirectoryFrames {
    fn next_frame(&mut self) -> Option<Result<DynamicImage, ScanError>> {
        let path = self.pending.pop_front()?;
        Some(image::open(&path).map_err(ScanError::from))
    }
}

/// Frames already decoded in memory
#[derive(Debug, Default)]
pub struct MemoryFrames {
    pending: VecDeque<DynamicImage>,
}

impl MemoryFrames {
    /// Wrap a frame list
    pub fn new(frames: impl IntoIterator<Item = DynamicImage>) -> Self {
        Self {
            pending: frames.into_iter().collect(),
        }
    }
}

impl FrameSource for MemoryFrames {
    fn next_frame(&mut self) -> Option<Result<DynamicImage, ScanError>> {
        self.pending.pop_front().map(Ok)
    }
}
