//! WLASL 标签清单的数据模型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 清单中的一个手语词及其视频实例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossEntry {
    #[serde(rename = "gloss")]
    pub word: String,
    pub instances: Vec<InstanceRecord>,
}

/// 单个视频实例
///
/// The fixed core (`video_id`, `frame_start`, `gloss_index`) is typed; every
/// other manifest field is carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub video_id: String,
    pub frame_start: u64,
    /// 构建索引时分配，不读也不写回清单
    #[serde(skip)]
    pub gloss_index: usize,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InstanceRecord {
    pub fn new(video_id: impl Into<String>, frame_start: u64) -> Self {
        Self {
            video_id: video_id.into(),
            frame_start,
            gloss_index: 0,
            extra: Map::new(),
        }
    }

    /// Raw passthrough field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// `"train"`, `"val"` or `"test"` in the published WLASL manifests.
    pub fn split(&self) -> Option<&str> {
        self.field("split").and_then(Value::as_str)
    }

    /// Last frame of the clip; WLASL uses `-1` for "until the end".
    pub fn frame_end(&self) -> Option<i64> {
        self.field("frame_end").and_then(Value::as_i64)
    }

    pub fn fps(&self) -> Option<f64> {
        self.field("fps").and_then(Value::as_f64)
    }

    pub fn signer_id(&self) -> Option<i64> {
        self.field("signer_id").and_then(Value::as_i64)
    }
}
