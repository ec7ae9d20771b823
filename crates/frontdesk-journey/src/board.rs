//! 跟踪看板
//!
//! 前台患者跟踪列表的过滤、排序、分页和统计

use frontdesk_core::{DeskError, JourneyStatus, Patient, PatientJourney};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

/// 看板排序字段
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Name,
    Status,
    /// 在当前阶段的等候时间
    WaitTime,
    Doctor,
    Department,
    Stage,
}

impl FromStr for SortKey {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "name" => Ok(SortKey::Name),
            "status" => Ok(SortKey::Status),
            "wait" | "wait-time" => Ok(SortKey::WaitTime),
            "doctor" => Ok(SortKey::Doctor),
            "department" | "dept" => Ok(SortKey::Department),
            "stage" => Ok(SortKey::Stage),
            other => Err(DeskError::Validation(format!("unknown sort key '{}'", other))),
        }
    }
}

/// 看板过滤器
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JourneyFilter {
    /// 按姓名或ID搜索（忽略大小写，子串匹配）
    pub search: Option<String>,
    pub status: Option<Vec<JourneyStatus>>,
    pub department: Option<String>,
    pub stage_index: Option<usize>,
    /// 未指定时保持登记顺序
    pub sort_by: Option<SortKey>,
    pub sort_desc: bool,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Default for JourneyFilter {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            department: None,
            stage_index: None,
            sort_by: None,
            sort_desc: false,
            limit: Some(50),
            offset: Some(0),
        }
    }
}

impl JourneyFilter {
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_status(mut self, status: JourneyStatus) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_stage(mut self, stage: usize) -> Self {
        self.stage_index = Some(stage);
        self
    }

    pub fn sorted_by(mut self, key: SortKey, descending: bool) -> Self {
        self.sort_by = Some(key);
        self.sort_desc = descending;
        self
    }

    pub fn matches(&self, patient: &Patient, journey: &PatientJourney) -> bool {
        if let Some(term) = &self.search {
            let term = term.trim().to_lowercase();
            if !term.is_empty()
                && !patient.name.to_lowercase().contains(&term)
                && !patient.id.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        if let Some(statuses) = &self.status {
            if !statuses.contains(&journey.status) {
                return false;
            }
        }

        if let Some(department) = &self.department {
            if !patient.department.eq_ignore_ascii_case(department.trim()) {
                return false;
            }
        }

        if let Some(stage) = self.stage_index {
            if journey.current_stage_index != stage {
                return false;
            }
        }

        true
    }

    /// 按排序字段稳定排序，相同值保持登记顺序
    pub fn sort(&self, entries: &mut [BoardEntry]) {
        let Some(key) = self.sort_by else {
            return;
        };

        entries.sort_by(|a, b| {
            let ordering = compare_by(key, a, b);
            if self.sort_desc {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    /// 应用分页
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0);
        let limit = self.limit.unwrap_or(50);
        items.into_iter().skip(offset).take(limit).collect()
    }
}

fn compare_by(key: SortKey, a: &BoardEntry, b: &BoardEntry) -> Ordering {
    match key {
        SortKey::Name => a.patient.name.to_lowercase().cmp(&b.patient.name.to_lowercase()),
        SortKey::Status => a.journey.status.as_str().cmp(b.journey.status.as_str()),
        // 进入当前阶段越早，等候越久
        SortKey::WaitTime => b.journey.stage_entered_at.cmp(&a.journey.stage_entered_at),
        SortKey::Doctor => {
            let doctor =
                |entry: &BoardEntry| entry.patient.doctor.as_deref().map(str::to_lowercase);
            doctor(a).cmp(&doctor(b))
        }
        SortKey::Department => a
            .patient
            .department
            .to_lowercase()
            .cmp(&b.patient.department.to_lowercase()),
        SortKey::Stage => a.journey.current_stage_index.cmp(&b.journey.current_stage_index),
    }
}

/// 看板条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEntry {
    pub patient: Patient,
    pub journey: PatientJourney,
    pub stage_name: String,
}

/// 看板统计
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct JourneyStats {
    pub total: usize,
    pub waiting: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub delayed: usize,
    /// 阶段索引 -> 患者数
    pub by_stage: BTreeMap<usize, usize>,
}

impl JourneyStats {
    pub fn collect<'a, I>(journeys: I) -> Self
    where
        I: IntoIterator<Item = &'a PatientJourney>,
    {
        let mut stats = JourneyStats::default();
        for journey in journeys {
            stats.total += 1;
            match journey.status {
                JourneyStatus::Waiting => stats.waiting += 1,
                JourneyStatus::InProgress => stats.in_progress += 1,
                JourneyStatus::Completed => stats.completed += 1,
                JourneyStatus::Delayed => stats.delayed += 1,
            }
            *stats.by_stage.entry(journey.current_stage_index).or_insert(0) += 1;
        }
        stats
    }

    /// 尚未完成的患者数
    pub fn active(&self) -> usize {
        self.total - self.completed
    }
}
