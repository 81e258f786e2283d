//! I3D / WLASL 评估入口
//!
//! ```no_run
//! use wlasl_lib::api::{EvaluationHarness, HarnessConfig};
//!
//! let config = HarnessConfig::from_file("harness.json5")?;
//! let harness = EvaluationHarness::create(config)?;
//! println!("{} items", harness.dataset().len());
//! # Ok::<(), wlasl_lib::core::DatasetError>(())
//! ```

use std::sync::Arc;

use log::{info, warn};

use crate::api::models::config::HarnessConfig;
use crate::core::dataset::WlaslDataset;
use crate::core::error::DatasetError;
use crate::core::inference::{CheckpointInfo, EvalReport, Evaluator, GlossClassifier};
use crate::core::video::{self, VideoBackend};

/// 评估入口：数据集 + 权重信息
pub struct EvaluationHarness {
    config: HarnessConfig,
    dataset: WlaslDataset,
    checkpoint: Option<CheckpointInfo>,
}

impl EvaluationHarness {
    /// 创建评估器（使用默认的 FFmpeg 解码后端）
    pub fn create(config: HarnessConfig) -> Result<Self, DatasetError> {
        let backend = video::default_backend()?;
        Self::with_backend(config, backend)
    }

    /// 使用指定的解码后端创建评估器
    pub fn with_backend(
        config: HarnessConfig,
        backend: Arc<dyn VideoBackend>,
    ) -> Result<Self, DatasetError> {
        crate::init_logging();
        config.validate()?;
        info!(
            "🎬 EvaluationHarness: labels {:?}, videos {:?}",
            config.labels_path, config.video_folder
        );

        let dataset = WlaslDataset::new(config.dataset_config(), backend)?;

        let checkpoint = config.checkpoint.as_ref().map(CheckpointInfo::from_path);
        if let Some(info) = &checkpoint {
            info!("📦 Checkpoint {:?}: {:?} classes", info.path, info.num_classes);
            if let Some(classes) = info.num_classes {
                if classes != dataset.labels().num_classes() {
                    warn!(
                        "⚠️ Checkpoint has {} classes but the label index has {} glosses",
                        classes,
                        dataset.labels().num_classes()
                    );
                }
            }
        }

        Ok(Self {
            config,
            dataset,
            checkpoint,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn dataset(&self) -> &WlaslDataset {
        &self.dataset
    }

    pub fn checkpoint(&self) -> Option<&CheckpointInfo> {
        self.checkpoint.as_ref()
    }

    pub fn evaluate(&self, classifier: &dyn GlossClassifier) -> Result<EvalReport, DatasetError> {
        let classes = self.dataset.labels().num_classes();
        if classifier.num_classes() < classes {
            return Err(DatasetError::Config(format!(
                "classifier predicts {} classes but the dataset has {} glosses",
                classifier.num_classes(),
                classes
            )));
        }

        let report = Evaluator::new(self.config.evaluation_config()).run(&self.dataset, classifier)?;

        if let Some(info) = &self.checkpoint {
            for &(k, reported) in &info.reported_top_k {
                if let Some(acc) = report.accuracy(k) {
                    info!(
                        "📊 top-{}: measured {:.2}% / reported {:.2}%",
                        k,
                        acc * 100.0,
                        reported
                    );
                }
            }
        }
        Ok(report)
    }
}

impl Drop for EvaluationHarness {
    fn drop(&mut self) {
        info!("🗑️ EvaluationHarness: released");
    }
}
