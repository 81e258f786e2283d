//! 并行评估：逐条取样本、分类、统计 top-k 命中

use std::collections::BTreeMap;

use log::{debug, info, warn};
use rayon::prelude::*;

use super::classifier::{top_k, GlossClassifier};
use super::clip::ClipTensor;
use crate::core::dataset::WlaslDataset;
use crate::core::error::DatasetError;

#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub top_k: Vec<usize>,
    /// 只评估前 N 个样本
    pub limit: Option<usize>,
    /// 工作线程数，不超过 CPU 核数
    pub workers: Option<usize>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            top_k: vec![1, 5, 10],
            limit: None,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalReport {
    pub total: usize,
    pub evaluated: usize,
    pub skipped: usize,
    pub partial_decodes: usize,
    /// k -> number of items whose label was within the top k.
    pub hits: BTreeMap<usize, usize>,
}

impl EvalReport {
    /// Fraction of evaluated items with the label in the top k.
    pub fn accuracy(&self, k: usize) -> Option<f64> {
        if self.evaluated == 0 {
            return None;
        }
        let hits = *self.hits.get(&k)?;
        Some(hits as f64 / self.evaluated as f64)
    }
}

enum ItemOutcome {
    Ranked { rank: Option<usize>, partial: bool },
    Skipped,
}

/// top-k 评估器
pub struct Evaluator {
    config: EvaluationConfig,
}

impl Evaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    pub fn run(
        &self,
        dataset: &WlaslDataset,
        classifier: &dyn GlossClassifier,
    ) -> Result<EvalReport, DatasetError> {
        let total = self
            .config
            .limit
            .map_or(dataset.len(), |n| n.min(dataset.len()));
        let depth = self.config.top_k.iter().copied().max().unwrap_or(1);

        let num_threads = self
            .config
            .workers
            .map_or(num_cpus::get(), |w| w.clamp(1, num_cpus::get()));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| DatasetError::Config(format!("thread pool: {}", e)))?;

        info!(
            "🧪 Evaluating {} items on {} threads (top-k {:?})",
            total, num_threads, self.config.top_k
        );

        let outcomes: Vec<ItemOutcome> = pool.install(|| {
            (0..total)
                .into_par_iter()
                .map(|index| evaluate_item(dataset, classifier, index, depth))
                .collect()
        });

        let mut report = EvalReport {
            total,
            hits: self.config.top_k.iter().map(|&k| (k, 0)).collect(),
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Skipped => report.skipped += 1,
                ItemOutcome::Ranked { rank, partial } => {
                    report.evaluated += 1;
                    if partial {
                        report.partial_decodes += 1;
                    }
                    if let Some(rank) = rank {
                        for (&k, hits) in report.hits.iter_mut() {
                            if rank < k {
                                *hits += 1;
                            }
                        }
                    }
                }
            }
        }

        info!(
            "✅ Evaluation done: {} evaluated, {} skipped, {} partial",
            report.evaluated, report.skipped, report.partial_decodes
        );
        for &k in &self.config.top_k {
            if let Some(acc) = report.accuracy(k) {
                info!("   top-{}: {:.2}%", k, acc * 100.0);
            }
        }
        Ok(report)
    }
}

fn evaluate_item(
    dataset: &WlaslDataset,
    classifier: &dyn GlossClassifier,
    index: usize,
    depth: usize,
) -> ItemOutcome {
    let item = match dataset.item_at(index) {
        Ok(item) => item,
        Err(e) => {
            warn!("⏭️ Skipping item {}: {}", index, e);
            return ItemOutcome::Skipped;
        }
    };
    let partial = !item.extraction.is_complete();

    let logits = match ClipTensor::from_frames(item.extraction.frames())
        .and_then(|clip| classifier.classify(&clip))
    {
        Ok(logits) => logits,
        Err(e) => {
            warn!("⏭️ Skipping item {} ({}): {}", index, item.video_id, e);
            return ItemOutcome::Skipped;
        }
    };

    let rank = top_k(&logits, depth)
        .iter()
        .position(|&class| class == item.gloss_index);
    debug!(
        "Item {} ({}): gloss {} rank {:?}",
        index, item.video_id, item.gloss_index, rank
    );
    ItemOutcome::Ranked { rank, partial }
}
