//! 进度渲染
//!
//! 为界面层生成每个阶段的显示状态和连续进度条比例

use crate::pipeline::StagePipeline;
use serde::{Deserialize, Serialize};

/// 阶段显示状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StageState {
    Completed, // 已完成
    Active,    // 当前阶段
    Pending,   // 待处理
}

impl StageState {
    pub fn of(index: usize, current: usize) -> Self {
        use std::cmp::Ordering;
        match index.cmp(&current) {
            Ordering::Less => StageState::Completed,
            Ordering::Equal => StageState::Active,
            Ordering::Greater => StageState::Pending,
        }
    }
}

/// 单个阶段的渲染结果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageView {
    pub index: usize,
    pub name: String,
    pub state: StageState,
}

/// 旅程进度
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JourneyProgress {
    pub current_stage_index: usize,
    pub current_stage_name: Option<String>,
    pub stages: Vec<StageView>,
    /// 进度比例, 范围 [0, 1]
    pub ratio: f64,
}

impl JourneyProgress {
    pub fn render(pipeline: &StagePipeline, current: usize) -> Self {
        let stages = pipeline
            .stages()
            .iter()
            .map(|stage| StageView {
                index: stage.index,
                name: stage.name.clone(),
                state: StageState::of(stage.index, current),
            })
            .collect();

        Self {
            current_stage_index: current,
            current_stage_name: pipeline.stage(current).map(|stage| stage.name.clone()),
            stages,
            ratio: progress_ratio(current, pipeline.len()),
        }
    }

    pub fn percent(&self) -> u8 {
        (self.ratio * 100.0).round() as u8
    }

    pub fn completed_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|view| view.state == StageState::Completed)
            .count()
    }

    /// 单行文本进度, 如 `[x] Registration > [*] Billing > [ ] Optometry`
    pub fn to_line(&self) -> String {
        self.stages
            .iter()
            .map(|view| {
                let mark = match view.state {
                    StageState::Completed => "x",
                    StageState::Active => "*",
                    StageState::Pending => " ",
                };
                format!("[{}] {}", mark, view.name)
            })
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

/// `(current - 1) / (len - 1)`，截断到 [0, 1]；单阶段流水线视为已满
pub fn progress_ratio(current: usize, len: usize) -> f64 {
    if len <= 1 {
        return if current >= len { 1.0 } else { 0.0 };
    }
    let ratio = (current as f64 - 1.0) / (len as f64 - 1.0);
    ratio.clamp(0.0, 1.0)
}
