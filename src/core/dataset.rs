//! WLASL 数据集：标签索引 + 帧提取

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};

use crate::core::error::DatasetError;
use crate::core::labels::{IndexFilter, InstanceRecord, LabelIndex};
use crate::core::video::{
    Extraction, ExtractorConfig, FrameExtractor, ResizePolicy, VideoBackend,
};

/// 数据集配置
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    pub video_folder: PathBuf,
    pub labels_path: PathBuf,
    pub video_extension: String,
    /// Cap on frames per item, `None` decodes to the end of the clip.
    pub max_frames: Option<usize>,
    pub resize: ResizePolicy,
    pub filter: IndexFilter,
}

impl DatasetConfig {
    pub fn new(video_folder: impl Into<PathBuf>, labels_path: impl Into<PathBuf>) -> Self {
        Self {
            video_folder: video_folder.into(),
            labels_path: labels_path.into(),
            video_extension: "mp4".to_string(),
            max_frames: None,
            resize: ResizePolicy::default(),
            filter: IndexFilter::default(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.video_extension = extension.into();
        self
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }

    pub fn with_resize(mut self, resize: ResizePolicy) -> Self {
        self.resize = resize;
        self
    }

    pub fn with_filter(mut self, filter: IndexFilter) -> Self {
        self.filter = filter;
        self
    }

    fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            video_folder: self.video_folder.clone(),
            extension: self.video_extension.clone(),
            resize: self.resize,
        }
    }
}

/// 单个样本：视频 id、标签下标与解码结果
#[derive(Debug, Clone)]
pub struct DatasetItem {
    pub video_id: String,
    pub gloss_index: usize,
    pub extraction: Extraction,
}

/// 按位置取样本的 WLASL 数据集
///
/// The index is immutable after construction, so a single instance can be
/// shared across threads and items fetched concurrently.
#[derive(Clone)]
pub struct WlaslDataset {
    labels: Arc<LabelIndex>,
    extractor: FrameExtractor,
    max_frames: Option<usize>,
}

impl WlaslDataset {
    pub fn new(config: DatasetConfig, backend: Arc<dyn VideoBackend>) -> Result<Self, DatasetError> {
        let labels = LabelIndex::from_path(&config.labels_path)?;
        Ok(Self::from_labels(config, labels, backend))
    }

    pub fn from_labels(
        config: DatasetConfig,
        labels: LabelIndex,
        backend: Arc<dyn VideoBackend>,
    ) -> Self {
        let labels = labels.filtered(&config.filter);
        info!(
            "📚 WLASL dataset: {} items, {} glosses, videos in {:?}",
            labels.len(),
            labels.num_classes(),
            config.video_folder
        );

        Self {
            labels: Arc::new(labels),
            extractor: FrameExtractor::new(config.extractor_config(), backend),
            max_frames: config.max_frames,
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }

    pub fn extractor(&self) -> &FrameExtractor {
        &self.extractor
    }

    pub fn record(&self, index: usize) -> Result<&InstanceRecord, DatasetError> {
        self.labels.get(index)
    }

    pub fn gloss_word(&self, gloss_index: usize) -> Result<&str, DatasetError> {
        self.labels.gloss_word(gloss_index)
    }

    pub fn item_at(&self, index: usize) -> Result<DatasetItem, DatasetError> {
        let record = self.labels.get(index)?;
        debug!(
            "Item {}: video {} from frame {} (gloss {})",
            index, record.video_id, record.frame_start, record.gloss_index
        );

        let extraction = self
            .extractor
            .extract(&record.video_id, record.frame_start, self.max_frames)?;

        Ok(DatasetItem {
            video_id: record.video_id.clone(),
            gloss_index: record.gloss_index,
            extraction,
        })
    }
}
