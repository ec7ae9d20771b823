//! 旅程状态机
//!
//! 管理患者在阶段流水线中的位置转换：只能向前（或停留在当前阶段），
//! 可以跳过中间阶段；到达最后一个阶段即为完成。

use crate::pipeline::StagePipeline;
use chrono::{DateTime, Utc};
use frontdesk_core::{DeskError, JourneyStatus, PatientJourney, Result, StageTransition};
use std::sync::Arc;

/// 旅程状态机
#[derive(Debug, Clone)]
pub struct JourneyStateMachine {
    pipeline: Arc<StagePipeline>,
}

impl JourneyStateMachine {
    /// 创建新的状态机实例
    pub fn new(pipeline: Arc<StagePipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &StagePipeline {
        &self.pipeline
    }

    /// 检查阶段转换是否有效
    pub fn can_advance(&self, current: usize, target: usize) -> bool {
        self.pipeline.contains(target) && target >= current
    }

    /// 验证阶段转换，返回目标阶段
    pub fn transition(&self, current: usize, target: usize) -> Result<usize> {
        if self.can_advance(current, target) {
            Ok(target)
        } else {
            Err(DeskError::InvalidStageIndex {
                target,
                current,
                stages: self.pipeline.len(),
            })
        }
    }

    /// 下一个阶段；已在最后阶段时拒绝
    pub fn next_stage(&self, current: usize) -> Result<usize> {
        self.transition(current, current + 1)
    }

    /// 获取当前阶段可以转到的所有阶段
    pub fn possible_targets(&self, current: usize) -> Vec<usize> {
        (1..=self.pipeline.len())
            .filter(|&target| self.can_advance(current, target))
            .collect()
    }

    pub fn is_final_stage(&self, index: usize) -> bool {
        index == self.pipeline.last_index()
    }

    /// 推进后的状态：到达最后阶段即完成，否则保持不变
    pub fn status_after_advance(&self, target: usize, status: JourneyStatus) -> JourneyStatus {
        if self.is_final_stage(target) {
            JourneyStatus::Completed
        } else {
            status
        }
    }

    /// 检查状态与阶段是否一致：completed 当且仅当处于最后阶段
    pub fn validate_status(&self, stage: usize, status: JourneyStatus) -> Result<()> {
        let at_final = self.is_final_stage(stage);
        let completed = status == JourneyStatus::Completed;
        if at_final == completed {
            Ok(())
        } else {
            Err(DeskError::InvalidStatus {
                status: status.to_string(),
                stage,
                stages: self.pipeline.len(),
            })
        }
    }

    /// 在旅程上执行阶段推进
    pub fn apply_advance(
        &self,
        journey: &mut PatientJourney,
        target: usize,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let current = journey.current_stage_index;
        let target = self.transition(current, target)?;

        if target != current {
            journey.history.push(StageTransition {
                from: current,
                to: target,
                at: now,
            });
            journey.current_stage_index = target;
            journey.stage_entered_at = now;
        }
        journey.status = self.status_after_advance(target, journey.status);
        journey.last_updated = now;
        Ok(())
    }

    /// 在旅程上执行状态更新
    pub fn apply_status(
        &self,
        journey: &mut PatientJourney,
        status: JourneyStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.validate_status(journey.current_stage_index, status)?;
        journey.status = status;
        journey.last_updated = now;
        Ok(())
    }
}

impl Default for JourneyStateMachine {
    fn default() -> Self {
        Self::new(Arc::new(StagePipeline::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_valid_transitions() {
        let sm = JourneyStateMachine::default();

        assert!(sm.can_advance(1, 1));
        assert!(sm.can_advance(1, 2));
        assert!(sm.can_advance(2, 6));
        assert!(sm.can_advance(6, 6));
    }

    #[test]
    fn test_invalid_transitions() {
        let sm = JourneyStateMachine::default();

        assert!(!sm.can_advance(3, 1));
        assert!(!sm.can_advance(1, 0));
        assert!(!sm.can_advance(1, 7));
        assert!(matches!(
            sm.transition(3, 2),
            Err(DeskError::InvalidStageIndex { target: 2, current: 3, stages: 6 })
        ));
    }

    #[test]
    fn test_next_stage() {
        let sm = JourneyStateMachine::default();
        assert_eq!(sm.next_stage(1).unwrap(), 2);
        assert_eq!(sm.next_stage(5).unwrap(), 6);
        assert!(sm.next_stage(6).is_err());
    }

    #[test]
    fn test_possible_targets() {
        let sm = JourneyStateMachine::default();
        assert_eq!(sm.possible_targets(4), vec![4, 5, 6]);
        assert_eq!(sm.possible_targets(1).len(), 6);
    }

    #[test]
    fn test_status_rule() {
        let sm = JourneyStateMachine::default();
        assert_eq!(sm.status_after_advance(2, JourneyStatus::Delayed), JourneyStatus::Delayed);
        assert_eq!(sm.status_after_advance(6, JourneyStatus::Waiting), JourneyStatus::Completed);

        assert!(sm.validate_status(3, JourneyStatus::Delayed).is_ok());
        assert!(sm.validate_status(6, JourneyStatus::Completed).is_ok());
        assert!(sm.validate_status(3, JourneyStatus::Completed).is_err());
        assert!(sm.validate_status(6, JourneyStatus::Waiting).is_err());
    }

    #[test]
    fn test_apply_advance_records_history() {
        let sm = JourneyStateMachine::default();
        let start = Utc::now();
        let mut journey = PatientJourney::new("SCI-23051", start);

        let later = start + Duration::minutes(10);
        sm.apply_advance(&mut journey, 3, later).unwrap();
        assert_eq!(journey.current_stage_index, 3);
        assert_eq!(journey.stage_entered_at, later);
        assert_eq!(journey.history, vec![StageTransition { from: 1, to: 3, at: later }]);

        // 重选当前阶段只刷新时间戳
        let again = later + Duration::minutes(5);
        sm.apply_advance(&mut journey, 3, again).unwrap();
        assert_eq!(journey.history.len(), 1);
        assert_eq!(journey.stage_entered_at, later);
        assert_eq!(journey.last_updated, again);
    }

    #[test]
    fn test_apply_advance_rejected_leaves_journey_untouched() {
        let sm = JourneyStateMachine::default();
        let mut journey = PatientJourney::new("SCI-23051", Utc::now());
        sm.apply_advance(&mut journey, 3, Utc::now()).unwrap();
        let before = journey.clone();

        assert!(sm.apply_advance(&mut journey, 1, Utc::now()).is_err());
        assert_eq!(journey, before);
    }

    #[test]
    fn test_apply_status_updates_timestamp() {
        let sm = JourneyStateMachine::default();
        let start = Utc::now();
        let mut journey = PatientJourney::new("SCI-23054", start);
        sm.apply_advance(&mut journey, 4, start).unwrap();

        let later = start + Duration::minutes(30);
        sm.apply_status(&mut journey, JourneyStatus::Delayed, later).unwrap();
        assert_eq!(journey.status, JourneyStatus::Delayed);
        assert_eq!(journey.last_updated, later);
        assert_eq!(journey.stage_entered_at, start);
    }

    #[test]
    fn test_apply_status_rejected_leaves_journey_untouched() {
        let sm = JourneyStateMachine::default();
        let start = Utc::now();
        let mut journey = PatientJourney::new("SCI-23054", start);
        sm.apply_advance(&mut journey, 4, start).unwrap();
        let before = journey.clone();

        let later = start + Duration::minutes(30);
        assert!(matches!(
            sm.apply_status(&mut journey, JourneyStatus::Completed, later),
            Err(DeskError::InvalidStatus { stage: 4, stages: 6, .. })
        ));
        assert_eq!(journey, before);
    }
}
