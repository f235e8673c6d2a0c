//! Dataset helpers for the `qrscan` CLI and benches

use crate::models::RawSymbol;
use crate::providers::decoder::decode_image;
use image::{DynamicImage, GenericImageView};
use rayon::prelude::*;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

fn max_dim_from_env() -> Option<u32> {
    match env::var("QRSCAN_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Open an image, downscaled to `QRSCAN_MAX_DIM` on its longest side when set.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage, image::ImageError> {
    let img = image::open(path)?;
    if let Some(max_dim) = max_dim_from_env() {
        let (w, h) = img.dimensions();
        if w.max(h) > max_dim {
            return Ok(img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle));
        }
    }
    Ok(img)
}

/// Default dataset root from environment variables.
pub fn dataset_root_from_env() -> PathBuf {
    env::var("QRSCAN_DATASET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("benches/images"))
}

/// Dataset limit from `QRSCAN_BENCH_LIMIT`; `None` (all images) when unset or `0`.
pub fn bench_limit_from_env() -> Option<usize> {
    match env::var("QRSCAN_BENCH_LIMIT") {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|v| if v == 0 { None } else { Some(v) }),
        Err(_) => None,
    }
}

/// Image paths under `root`, recursive and sorted, truncated to `limit`.
pub fn dataset_iter<P: AsRef<Path>>(root: P, limit: Option<usize>) -> impl Iterator<Item = PathBuf> {
    let mut images = collect_images(root.as_ref());
    images.sort();
    if let Some(limit) = limit {
        images.truncate(limit);
    }
    images.into_iter()
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                    images.push(path);
                }
            }
        }
    }

    images
}

/// Expected payload for an image, read from its sibling `.txt` label.
///
/// Trailing newlines are stripped. Returns `None` when there is no label or
/// it is empty.
pub fn expected_payload<P: AsRef<Path>>(image_path: P) -> Option<String> {
    let content = fs::read_to_string(image_path.as_ref().with_extension("txt")).ok()?;
    let payload = content.trim_end_matches(['\r', '\n']);
    if payload.is_empty() {
        None
    } else {
        Some(payload.to_string())
    }
}

/// Outcome of decoding one dataset image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// At least one symbol decoded; payloads in detection order
    Decoded(Vec<String>),
    /// Image loaded but nothing decoded
    NoSymbol,
    /// Image could not be loaded
    LoadFailed(String),
}

/// One image's batch result
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// Image path
    pub path: PathBuf,
    /// What the decoder produced
    pub outcome: BatchOutcome,
    /// Load plus decode time
    pub elapsed: Duration,
}

impl BatchEntry {
    /// True if the label (when present) was decoded, or anything decoded without a label
    pub fn is_hit(&self) -> bool {
        match (&self.outcome, expected_payload(&self.path)) {
            (BatchOutcome::Decoded(payloads), Some(expected)) => payloads.contains(&expected),
            (BatchOutcome::Decoded(payloads), None) => !payloads.is_empty(),
            _ => false,
        }
    }
}

/// Decode every path in parallel on the rayon pool.
///
/// Results keep the input order.
pub fn batch_decode(paths: &[PathBuf]) -> Vec<BatchEntry> {
    paths
        .par_iter()
        .map(|path| {
            let start = Instant::now();
            let outcome = match load_image(path) {
                Ok(img) => {
                    let payloads: Vec<String> = decode_image(&img)
                        .into_iter()
                        .map(|RawSymbol { payload, .. }| payload)
                        .filter(|payload| !payload.is_empty())
                        .collect();
                    if payloads.is_empty() {
                        BatchOutcome::NoSymbol
                    } else {
                        BatchOutcome::Decoded(payloads)
                    }
                }
                Err(err) => BatchOutcome::LoadFailed(err.to_string()),
            };
            BatchEntry {
                path: path.clone(),
                outcome,
                elapsed: start.elapsed(),
            }
        })
        .collect()
}

/// Hits over total for a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadingRate {
    /// Images whose payload was read
    pub hits: usize,
    /// Images attempted
    pub total: usize,
}

impl ReadingRate {
    /// Tally a batch
    pub fn from_entries(entries: &[BatchEntry]) -> Self {
        Self {
            hits: entries.iter().filter(|e| e.is_hit()).count(),
            total: entries.len(),
        }
    }

    /// Percentage in `0.0..=100.0`
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.hits as f64 / self.total as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::QrRenderer;
    use crate::providers::QrCodeRenderer;

    fn write_symbol(dir: &Path, name: &str, text: &str) -> PathBuf {
        let symbol = QrCodeRenderer::new().render(text, 200).unwrap();
        let path = dir.join(format!("{name}.png"));
        fs::write(&path, symbol.to_png().unwrap()).unwrap();
        path
    }

    #[test]
    fn test_dataset_iter_sorted_and_limited() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("b.png"), b"x").unwrap();
        fs::write(nested.join("a.JPG"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let all: Vec<PathBuf> = dataset_iter(dir.path(), None).collect();
        assert_eq!(all.len(), 2);
        assert!(all.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(dataset_iter(dir.path(), Some(1)).count(), 1);
    }

    #[test]
    fn test_expected_payload() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("code.png");
        assert_eq!(expected_payload(&image), None);

        fs::write(dir.path().join("code.txt"), "abc123\n").unwrap();
        assert_eq!(expected_payload(&image).as_deref(), Some("abc123"));

        fs::write(dir.path().join("code.txt"), "\n").unwrap();
        assert_eq!(expected_payload(&image), None);
    }

    #[test]
    fn test_batch_decode_reading_rate() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_symbol(dir.path(), "good", "abc123");
        fs::write(dir.path().join("good.txt"), "abc123").unwrap();
        let mislabeled = write_symbol(dir.path(), "mislabeled", "hello");
        fs::write(dir.path().join("mislabeled.txt"), "other").unwrap();
        let broken = dir.path().join("broken.png");
        fs::write(&broken, b"not an image").unwrap();

        let entries = batch_decode(&[good.clone(), mislabeled, broken]);
        assert_eq!(entries[0].path, good);
        assert_eq!(entries[0].outcome, BatchOutcome::Decoded(vec!["abc123".into()]));
        assert!(matches!(entries[2].outcome, BatchOutcome::LoadFailed(_)));

        let rate = ReadingRate::from_entries(&entries);
        assert_eq!(rate, ReadingRate { hits: 1, total: 3 });
        assert!((rate.percent() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_rate() {
        assert_eq!(ReadingRate::default().percent(), 0.0);
    }
}
