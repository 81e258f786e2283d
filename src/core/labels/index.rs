use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, info};

use super::error::ManifestError;
use super::manifest::{GlossEntry, InstanceRecord};
use crate::core::error::DatasetError;

/// 索引过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexFilter {
    /// 只保留 `split` 字段等于该值的实例
    pub split: Option<String>,
    /// Keep only the first N glosses (WLASL100/300/1000/2000 are prefixes).
    pub max_glosses: Option<usize>,
}

impl IndexFilter {
    pub fn is_empty(&self) -> bool {
        self.split.is_none() && self.max_glosses.is_none()
    }
}

/// Flat, positionally addressable view over a WLASL manifest.
///
/// Instances are ordered by gloss, then by their order inside the gloss.
/// Every `gloss_index` points into `glosses`.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    instances: Vec<InstanceRecord>,
    glosses: Vec<String>,
}

impl LabelIndex {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        info!("📖 Loading label manifest: {:?}", path);

        let file = File::open(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ManifestError> {
        let entries: Vec<GlossEntry> =
            serde_json::from_reader(reader).map_err(classify_json_error)?;
        Ok(Self::from_entries(entries))
    }

    pub fn from_json_str(json: &str) -> Result<Self, ManifestError> {
        let entries: Vec<GlossEntry> = serde_json::from_str(json).map_err(classify_json_error)?;
        Ok(Self::from_entries(entries))
    }

    pub fn from_entries(entries: Vec<GlossEntry>) -> Self {
        let mut glosses = Vec::with_capacity(entries.len());
        let mut instances = Vec::new();

        for (gloss_index, entry) in entries.into_iter().enumerate() {
            glosses.push(entry.word);
            for mut instance in entry.instances {
                instance.gloss_index = gloss_index;
                instances.push(instance);
            }
        }

        info!(
            "✅ Label index built: {} glosses, {} instances",
            glosses.len(),
            instances.len()
        );
        Self { instances, glosses }
    }

    /// Derives a narrower index. Gloss indices are preserved, so labels stay
    /// comparable with a classifier trained on the full gloss table.
    pub fn filtered(&self, filter: &IndexFilter) -> Self {
        if filter.is_empty() {
            return self.clone();
        }

        let gloss_limit = filter
            .max_glosses
            .map_or(self.glosses.len(), |n| n.min(self.glosses.len()));

        let instances: Vec<InstanceRecord> = self
            .instances
            .iter()
            .filter(|r| r.gloss_index < gloss_limit)
            .filter(|r| match &filter.split {
                Some(split) => r.split() == Some(split.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        debug!(
            "Filtered label index {:?}: {} -> {} instances",
            filter,
            self.instances.len(),
            instances.len()
        );

        Self {
            instances,
            glosses: self.glosses[..gloss_limit].to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&InstanceRecord, DatasetError> {
        self.instances
            .get(index)
            .ok_or(DatasetError::IndexOutOfRange {
                index,
                len: self.instances.len(),
            })
    }

    pub fn gloss_word(&self, gloss_index: usize) -> Result<&str, DatasetError> {
        self.glosses
            .get(gloss_index)
            .map(String::as_str)
            .ok_or(DatasetError::IndexOutOfRange {
                index: gloss_index,
                len: self.glosses.len(),
            })
    }

    pub fn num_classes(&self) -> usize {
        self.glosses.len()
    }

    pub fn glosses(&self) -> &[String] {
        &self.glosses
    }

    pub fn instances(&self) -> &[InstanceRecord] {
        &self.instances
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InstanceRecord> {
        self.instances.iter()
    }
}

impl<'a> IntoIterator for &'a LabelIndex {
    type Item = &'a InstanceRecord;
    type IntoIter = std::slice::Iter<'a, InstanceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Well-formed JSON that does not match the manifest layout is a shape error.
fn classify_json_error(err: serde_json::Error) -> ManifestError {
    if err.is_data() {
        ManifestError::Shape(err.to_string())
    } else {
        ManifestError::Json(err)
    }
}
