//! # 患者旅程模块
//!
//! 跟踪患者在前台固定流程中的位置，包括：
//! - 阶段流水线：有序的命名阶段（挂号、收费、验光、医生、药房、配镜）
//! - 旅程状态机：只允许向前推进的阶段指针
//! - 进度渲染：每个阶段的完成/当前/待处理状态以及进度比例
//! - 旅程跟踪器：基于注入存储的登记、推进、状态更新和看板查询

pub mod board;
pub mod pipeline;
pub mod progress;
pub mod state_machine;
pub mod store;
pub mod tracker;

// 重新导出主要类型
pub use board::{BoardEntry, JourneyFilter, JourneyStats, SortKey};
pub use pipeline::{Stage, StagePipeline};
pub use progress::{JourneyProgress, StageState, StageView};
pub use state_machine::JourneyStateMachine;
pub use store::{InMemoryJourneyStore, JourneyStore};
pub use tracker::JourneyTracker;
