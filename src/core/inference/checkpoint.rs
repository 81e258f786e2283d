//! 从权重文件名中解析训练信息
//!
//! Released WLASL checkpoints encode their metadata in the file name, e.g.
//! `FINAL_nslt_2000_iters=5104_top1=32.48_top5=57.31_top10=66.31.pt`.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

static CLASSES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"nslt_(\d+)").expect("valid regex"));
static ITERS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"iters=(\d+)").expect("valid regex"));
static TOPK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"top(\d+)=(\d+(?:\.\d+)?)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointInfo {
    pub path: PathBuf,
    pub num_classes: Option<usize>,
    pub iterations: Option<u64>,
    /// `(k, accuracy %)` pairs as reported at training time.
    pub reported_top_k: Vec<(usize, f32)>,
}

impl CheckpointInfo {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let num_classes = CLASSES_RE
            .captures(&name)
            .and_then(|c| c[1].parse().ok());
        let iterations = ITERS_RE.captures(&name).and_then(|c| c[1].parse().ok());
        let reported_top_k = TOPK_RE
            .captures_iter(&name)
            .filter_map(|c| Some((c[1].parse().ok()?, c[2].parse().ok()?)))
            .collect();

        Self {
            path: path.to_path_buf(),
            num_classes,
            iterations,
            reported_top_k,
        }
    }

    pub fn reported(&self, k: usize) -> Option<f32> {
        self.reported_top_k
            .iter()
            .find(|(rk, _)| *rk == k)
            .map(|(_, acc)| *acc)
    }
}
