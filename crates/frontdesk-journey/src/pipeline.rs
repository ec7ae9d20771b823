//! 阶段流水线
//!
//! 所有患者共用的有序阶段列表，索引从 1 开始

use frontdesk_core::{DeskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 默认前台流程
pub const DEFAULT_STAGES: [&str; 6] = [
    "Registration",
    "Billing",
    "Optometry",
    "Doctor",
    "Pharmacy",
    "Optical",
];

/// 单个阶段
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub index: usize,
    pub name: String,
}

/// 阶段流水线
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StagePipeline {
    stages: Vec<Stage>,
}

impl StagePipeline {
    /// 从阶段名称创建流水线
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut stages = Vec::new();

        for (offset, name) in names.into_iter().enumerate() {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(DeskError::Validation(format!(
                    "stage {} has an empty name",
                    offset + 1
                )));
            }
            if !seen.insert(name.to_lowercase()) {
                return Err(DeskError::Validation(format!("duplicate stage name '{}'", name)));
            }
            stages.push(Stage {
                index: offset + 1,
                name: name.to_string(),
            });
        }

        if stages.is_empty() {
            return Err(DeskError::Validation("pipeline needs at least one stage".to_string()));
        }

        Ok(Self { stages })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// 流水线至少有一个阶段，始终为 false
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// 按 1 起始索引获取阶段
    pub fn stage(&self, index: usize) -> Option<&Stage> {
        index.checked_sub(1).and_then(|i| self.stages.get(i))
    }

    pub fn contains(&self, index: usize) -> bool {
        (1..=self.len()).contains(&index)
    }

    pub fn last_index(&self) -> usize {
        self.len()
    }

    /// 按名称查找阶段索引（忽略大小写）
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.stages
            .iter()
            .find(|stage| stage.name.eq_ignore_ascii_case(name))
            .map(|stage| stage.index)
    }

    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name.as_str()).collect()
    }
}

impl Default for StagePipeline {
    fn default() -> Self {
        Self {
            stages: DEFAULT_STAGES
                .iter()
                .enumerate()
                .map(|(offset, name)| Stage {
                    index: offset + 1,
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}
