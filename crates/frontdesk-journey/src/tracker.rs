//! 旅程跟踪器
//!
//! 协调阶段流水线、状态机和存储，提供前台操作的统一接口

use crate::{
    board::{BoardEntry, JourneyFilter, JourneyStats},
    pipeline::StagePipeline,
    progress::JourneyProgress,
    state_machine::JourneyStateMachine,
    store::{InMemoryJourneyStore, JourneyStore},
};
use chrono::Utc;
use frontdesk_core::utils::{generate_patient_id, is_valid_patient_id, DEFAULT_ID_PREFIX};
use frontdesk_core::{
    DeskError, JourneyStatus, Patient, PatientJourney, PatientRegistration, Result,
};
use std::sync::Arc;

const MAX_ID_ATTEMPTS: usize = 16;

/// 旅程跟踪器
///
/// 单个前台会话内的所有患者旅程。只有一个操作员同步修改，不需要加锁。
#[derive(Debug)]
pub struct JourneyTracker<S: JourneyStore = InMemoryJourneyStore> {
    state_machine: JourneyStateMachine,
    store: S,
    id_prefix: String,
}

impl JourneyTracker<InMemoryJourneyStore> {
    /// 使用内存存储创建跟踪器
    pub fn new(pipeline: StagePipeline) -> Self {
        Self::with_store(pipeline, InMemoryJourneyStore::new())
    }
}

impl<S: JourneyStore> JourneyTracker<S> {
    pub fn with_store(pipeline: StagePipeline, store: S) -> Self {
        Self {
            state_machine: JourneyStateMachine::new(Arc::new(pipeline)),
            store,
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }

    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    pub fn pipeline(&self) -> &StagePipeline {
        self.state_machine.pipeline()
    }

    pub fn state_machine(&self) -> &JourneyStateMachine {
        &self.state_machine
    }

    /// 登记新患者，旅程从第一阶段开始
    pub fn register(&mut self, registration: PatientRegistration) -> Result<PatientJourney> {
        let name = registration.name.trim();
        if name.is_empty() {
            return Err(DeskError::Validation("patient name is required".to_string()));
        }
        let department = registration.department.trim();
        if department.is_empty() {
            return Err(DeskError::Validation("department is required".to_string()));
        }

        let id = match registration.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => {
                if !is_valid_patient_id(id) {
                    return Err(DeskError::Validation(format!(
                        "patient id '{}' must look like PREFIX-NNNNN",
                        id
                    )));
                }
                if self.store.contains(id) {
                    return Err(DeskError::DuplicatePatient(id.to_string()));
                }
                id.to_string()
            }
            _ => self.next_patient_id()?,
        };

        let now = Utc::now();
        let patient = Patient {
            id: id.clone(),
            name: name.to_string(),
            age: registration.age,
            gender: registration.gender,
            contact_number: registration.contact_number,
            department: department.to_string(),
            doctor: registration.doctor,
            registered_at: now,
        };
        let mut journey = PatientJourney::new(id.clone(), now);
        // 单阶段流水线登记即完成
        journey.status = self
            .state_machine
            .status_after_advance(journey.current_stage_index, journey.status);

        if !self.store.insert(patient, journey.clone()) {
            return Err(DeskError::DuplicatePatient(id));
        }

        tracing::info!("Registered patient {} in department {}", id, department);
        Ok(journey)
    }

    /// 将患者推进到目标阶段（只能向前，可跳过阶段）
    pub fn advance(&mut self, patient_id: &str, target: usize) -> Result<PatientJourney> {
        let journey = journey_mut(&mut self.store, patient_id)?;
        let from = journey.current_stage_index;

        if let Err(e) = self.state_machine.apply_advance(journey, target, Utc::now()) {
            tracing::warn!(
                "Rejected stage change for {} from {} to {}",
                patient_id,
                from,
                target
            );
            return Err(e);
        }

        tracing::info!(
            "Patient {} moved from stage {} to {} ({})",
            patient_id,
            from,
            target,
            journey.status
        );
        Ok(journey.clone())
    }

    /// 按阶段名称推进（忽略大小写）
    pub fn advance_to_stage(
        &mut self,
        patient_id: &str,
        stage_name: &str,
    ) -> Result<PatientJourney> {
        let target = self
            .pipeline()
            .index_of(stage_name)
            .ok_or_else(|| DeskError::NotFound(format!("Stage '{}' not found", stage_name)))?;
        self.advance(patient_id, target)
    }

    /// 推进到下一个阶段
    pub fn advance_next(&mut self, patient_id: &str) -> Result<PatientJourney> {
        let current = self.journey(patient_id)?.current_stage_index;
        let next = self.state_machine.next_stage(current)?;
        self.advance(patient_id, next)
    }

    /// 更新旅程状态
    pub fn set_status(
        &mut self,
        patient_id: &str,
        status: JourneyStatus,
    ) -> Result<PatientJourney> {
        let journey = journey_mut(&mut self.store, patient_id)?;
        let old_status = journey.status;
        self.state_machine.apply_status(journey, status, Utc::now())?;

        tracing::info!(
            "Patient {} status changed from {} to {}",
            patient_id,
            old_status,
            status
        );
        Ok(journey.clone())
    }

    /// 获取旅程快照
    pub fn journey(&self, patient_id: &str) -> Result<PatientJourney> {
        self.store
            .journey(patient_id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound(format!("Patient {} not found", patient_id)))
    }

    pub fn patient(&self, patient_id: &str) -> Result<Patient> {
        self.store
            .patient(patient_id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound(format!("Patient {} not found", patient_id)))
    }

    /// 渲染患者旅程进度
    pub fn progress(&self, patient_id: &str) -> Result<JourneyProgress> {
        let journey = self.journey(patient_id)?;
        Ok(JourneyProgress::render(self.pipeline(), journey.current_stage_index))
    }

    /// 查询跟踪看板：过滤、排序后分页
    pub fn query(&self, filter: &JourneyFilter) -> Vec<BoardEntry> {
        let mut entries: Vec<BoardEntry> = self
            .store
            .entries()
            .into_iter()
            .filter(|(patient, journey)| filter.matches(patient, journey))
            .map(|(patient, journey)| BoardEntry {
                patient: patient.clone(),
                journey: journey.clone(),
                stage_name: self
                    .pipeline()
                    .stage(journey.current_stage_index)
                    .map(|stage| stage.name.clone())
                    .unwrap_or_default(),
            })
            .collect();

        filter.sort(&mut entries);
        filter.paginate(entries)
    }

    /// 看板统计
    pub fn stats(&self) -> JourneyStats {
        JourneyStats::collect(self.store.entries().into_iter().map(|(_, journey)| journey))
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    fn next_patient_id(&self) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = generate_patient_id(&self.id_prefix);
            if !self.store.contains(&id) {
                return Ok(id);
            }
        }
        Err(DeskError::Internal("could not allocate a unique patient id".to_string()))
    }
}

fn journey_mut<'a, S: JourneyStore>(
    store: &'a mut S,
    patient_id: &str,
) -> Result<&'a mut PatientJourney> {
    store
        .journey_mut(patient_id)
        .ok_or_else(|| DeskError::NotFound(format!("Patient {} not found", patient_id)))
}

impl Default for JourneyTracker<InMemoryJourneyStore> {
    fn default() -> Self {
        Self::new(StagePipeline::default())
    }
}
