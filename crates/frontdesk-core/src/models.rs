//! 核心数据模型定义

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DeskError;

/// 患者基本信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,                     // 蓝卡患者ID, 如 SCI-23051
    pub name: String,                   // 患者姓名
    pub age: Option<u32>,               // 年龄
    pub gender: Option<Gender>,         // 性别
    pub contact_number: Option<String>, // 联系电话
    pub department: String,             // 就诊科室
    pub doctor: Option<String>,         // 接诊医生
    pub registered_at: DateTime<Utc>,
}

/// 性别枚举
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(DeskError::Validation(format!("unknown gender '{}'", other))),
        }
    }
}

/// 挂号登记信息（蓝卡表单）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRegistration {
    /// 为空时自动生成
    pub id: Option<String>,
    pub name: String,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub contact_number: Option<String>,
    pub department: String,
    pub doctor: Option<String>,
}

impl PatientRegistration {
    pub fn new(name: impl Into<String>, department: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            department: department.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_doctor(mut self, doctor: impl Into<String>) -> Self {
        self.doctor = Some(doctor.into());
        self
    }
}

/// 旅程状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum JourneyStatus {
    Waiting,    // 等候中
    InProgress, // 处理中
    Completed,  // 已完成
    Delayed,    // 已延误
}

impl JourneyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JourneyStatus::Waiting => "waiting",
            JourneyStatus::InProgress => "in-progress",
            JourneyStatus::Completed => "completed",
            JourneyStatus::Delayed => "delayed",
        }
    }
}

impl fmt::Display for JourneyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JourneyStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "waiting" => Ok(JourneyStatus::Waiting),
            "in-progress" | "inprogress" => Ok(JourneyStatus::InProgress),
            "completed" | "complete" => Ok(JourneyStatus::Completed),
            "delayed" => Ok(JourneyStatus::Delayed),
            other => Err(DeskError::Validation(format!("unknown journey status '{}'", other))),
        }
    }
}

/// 阶段转换记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageTransition {
    pub from: usize,
    pub to: usize,
    pub at: DateTime<Utc>,
}

/// 患者就诊旅程
///
/// `current_stage_index` 从 1 开始计数。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientJourney {
    pub patient_id: String,
    pub current_stage_index: usize,
    pub status: JourneyStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// 进入当前阶段的时间
    pub stage_entered_at: DateTime<Utc>,
    pub history: Vec<StageTransition>,
}

impl PatientJourney {
    /// 新登记的旅程：第一阶段，等候中
    pub fn new(patient_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            patient_id: patient_id.into(),
            current_stage_index: 1,
            status: JourneyStatus::Waiting,
            created_at: now,
            last_updated: now,
            stage_entered_at: now,
            history: Vec::new(),
        }
    }

    /// 在当前阶段已停留的时间
    pub fn time_in_stage(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = now - self.stage_entered_at;
        if elapsed < Duration::zero() {
            Duration::zero()
        } else {
            elapsed
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == JourneyStatus::Completed
    }
}
