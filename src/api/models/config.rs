use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::dataset::DatasetConfig;
use crate::core::error::DatasetError;
use crate::core::inference::EvaluationConfig;
use crate::core::labels::IndexFilter;

/// 评估配置文件（JSON5）
///
/// ```text
/// {
///   video_folder: "data/videos",
///   labels_path: "data/WLASL.json",
///   checkpoint: "archived/asl2000/FINAL_nslt_2000_iters=5104_top1=32.48_top5=57.31_top10=66.31.pt",
///   split: "test",
///   num_classes: 2000,
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub video_folder: PathBuf,
    pub labels_path: PathBuf,
    #[serde(default = "default_extension")]
    pub video_extension: String,
    #[serde(default)]
    pub checkpoint: Option<PathBuf>,
    #[serde(default)]
    pub split: Option<String>,
    /// Restrict to the first N glosses (WLASL100, WLASL300, ...).
    #[serde(default)]
    pub num_classes: Option<usize>,
    #[serde(default)]
    pub max_frames: Option<usize>,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

fn default_extension() -> String {
    "mp4".to_string()
}

impl HarnessConfig {
    pub fn new(video_folder: impl Into<PathBuf>, labels_path: impl Into<PathBuf>) -> Self {
        Self {
            video_folder: video_folder.into(),
            labels_path: labels_path.into(),
            video_extension: default_extension(),
            checkpoint: None,
            split: None,
            num_classes: None,
            max_frames: None,
            workers: None,
            limit: None,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| DatasetError::Config(format!("cannot read {:?}: {}", path, e)))?;
        Self::from_json5(&text)
    }

    pub fn from_json5(text: &str) -> Result<Self, DatasetError> {
        let config: Self = json5::from_str(text)
            .map_err(|e| DatasetError::Config(format!("invalid harness config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.video_extension.is_empty() || self.video_extension.starts_with('.') {
            return Err(DatasetError::Config(format!(
                "video_extension must be a bare extension, got {:?}",
                self.video_extension
            )));
        }
        if self.num_classes == Some(0) {
            return Err(DatasetError::Config("num_classes must be positive".to_string()));
        }
        if self.workers == Some(0) {
            return Err(DatasetError::Config("workers must be positive".to_string()));
        }
        Ok(())
    }

    pub fn dataset_config(&self) -> DatasetConfig {
        let mut config = DatasetConfig::new(&self.video_folder, &self.labels_path)
            .with_extension(self.video_extension.clone())
            .with_filter(IndexFilter {
                split: self.split.clone(),
                max_glosses: self.num_classes,
            });
        config.max_frames = self.max_frames;
        config
    }

    pub fn evaluation_config(&self) -> EvaluationConfig {
        EvaluationConfig {
            limit: self.limit,
            workers: self.workers,
            ..Default::default()
        }
    }
}
