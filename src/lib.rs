//! # Front Desk
//!
//! 医院前台患者旅程跟踪的统一入口，重新导出各子模块

pub use frontdesk_journey as journey;

pub use frontdesk_core::{
    DeskError, JourneyStatus, Patient, PatientJourney, PatientRegistration, Result,
};
pub use frontdesk_journey::{JourneyProgress, JourneyTracker, StagePipeline};
