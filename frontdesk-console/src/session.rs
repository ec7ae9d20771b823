//! 前台会话
//!
//! 在一个跟踪器上执行脚本命令并渲染文本或 JSON 输出

use crate::script::{Command, StageTarget};
use anyhow::Result;
use chrono::Utc;
use frontdesk_core::{Gender, JourneyStatus, PatientRegistration};
use frontdesk_journey::{BoardEntry, JourneyTracker};
use std::fmt::Write;

/// 演示患者
struct DemoPatient {
    id: &'static str,
    name: &'static str,
    age: u32,
    gender: Gender,
    department: &'static str,
    doctor: &'static str,
    stage: usize,
    status: JourneyStatus,
}

/// 已完成的演示患者总是放在最后阶段
const DEMO_PATIENTS: [DemoPatient; 5] = [
    DemoPatient {
        id: "SCI-23051",
        name: "Arun Patel",
        age: 45,
        gender: Gender::Male,
        department: "Retina",
        doctor: "Dr. Mehta",
        stage: 2,
        status: JourneyStatus::Waiting,
    },
    DemoPatient {
        id: "SCI-23052",
        name: "Priya Sharma",
        age: 32,
        gender: Gender::Female,
        department: "Cornea",
        doctor: "Dr. Gupta",
        stage: 3,
        status: JourneyStatus::InProgress,
    },
    DemoPatient {
        id: "SCI-23053",
        name: "Vikram Singh",
        age: 58,
        gender: Gender::Male,
        department: "Glaucoma",
        doctor: "Dr. Shah",
        stage: 1,
        status: JourneyStatus::Waiting,
    },
    DemoPatient {
        id: "SCI-23054",
        name: "Neha Desai",
        age: 27,
        gender: Gender::Female,
        department: "Pediatric",
        doctor: "Dr. Patel",
        stage: 4,
        status: JourneyStatus::Delayed,
    },
    DemoPatient {
        id: "SCI-23055",
        name: "Rajesh Kumar",
        age: 62,
        gender: Gender::Male,
        department: "Retina",
        doctor: "Dr. Mehta",
        stage: 6,
        status: JourneyStatus::Completed,
    },
];

pub struct Session {
    tracker: JourneyTracker,
    json: bool,
}

impl Session {
    pub fn new(tracker: JourneyTracker, json: bool) -> Self {
        Self { tracker, json }
    }

    pub fn tracker(&self) -> &JourneyTracker {
        &self.tracker
    }

    /// 载入演示患者
    ///
    /// 阶段数与演示数据不同时，未完成的患者截到倒数第二阶段，已完成的放到最后阶段
    pub fn seed_demo(&mut self) -> Result<()> {
        let last = self.tracker.pipeline().last_index();
        for demo in &DEMO_PATIENTS {
            let registration = PatientRegistration {
                age: Some(demo.age),
                gender: Some(demo.gender),
                ..PatientRegistration::new(demo.name, demo.department)
                    .with_doctor(demo.doctor)
                    .with_id(demo.id)
            };
            self.tracker.register(registration)?;

            let stage = if demo.status == JourneyStatus::Completed {
                last
            } else {
                demo.stage.min(last.saturating_sub(1)).max(1)
            };
            let journey = self.tracker.advance(demo.id, stage)?;
            if !journey.is_completed() {
                self.tracker.set_status(demo.id, demo.status)?;
            }
        }
        tracing::info!("Seeded {} demo patients", DEMO_PATIENTS.len());
        Ok(())
    }

    /// 执行单条命令，返回输出文本
    pub fn execute(&mut self, command: Command) -> Result<String> {
        match command {
            Command::Register(args) => {
                let journey = self.tracker.register(args.into())?;
                self.render_journey(&journey.patient_id)
            }
            Command::Advance { patient_id, stage } => {
                match stage {
                    StageTarget::Index(index) => self.tracker.advance(&patient_id, index)?,
                    StageTarget::Name(name) => self.tracker.advance_to_stage(&patient_id, &name)?,
                };
                self.render_journey(&patient_id)
            }
            Command::Next { patient_id } => {
                self.tracker.advance_next(&patient_id)?;
                self.render_journey(&patient_id)
            }
            Command::Status { patient_id, status } => {
                self.tracker.set_status(&patient_id, status)?;
                self.render_journey(&patient_id)
            }
            Command::Show { patient_id } => self.render_journey(&patient_id),
            Command::Board(filter) => self.render_board(&self.tracker.query(&filter)),
            Command::Stats => {
                let stats = self.tracker.stats();
                if self.json {
                    return Ok(serde_json::to_string_pretty(&stats)?);
                }
                let mut out = format!(
                    "total {} | waiting {} | in-progress {} | delayed {} | completed {}",
                    stats.total, stats.waiting, stats.in_progress, stats.delayed, stats.completed
                );
                for (stage, count) in &stats.by_stage {
                    let name = self
                        .tracker
                        .pipeline()
                        .stage(*stage)
                        .map(|s| s.name.as_str())
                        .unwrap_or("?");
                    write!(out, "\n  {}: {}", name, count)?;
                }
                Ok(out)
            }
        }
    }

    fn render_journey(&self, patient_id: &str) -> Result<String> {
        let patient = self.tracker.patient(patient_id)?;
        let journey = self.tracker.journey(patient_id)?;
        let progress = self.tracker.progress(patient_id)?;

        if self.json {
            let value = serde_json::json!({
                "patient": patient,
                "journey": journey,
                "progress": progress,
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let waited = journey.time_in_stage(Utc::now()).num_minutes();
        let mut out = format!(
            "{} {} [{}] stage {}/{} {} ({}%, {} min in stage)\n  {}",
            patient.id,
            patient.name,
            journey.status,
            journey.current_stage_index,
            self.tracker.pipeline().len(),
            progress.current_stage_name.as_deref().unwrap_or("?"),
            progress.percent(),
            waited,
            progress.to_line()
        );

        let pipeline = self.tracker.pipeline();
        let next: Vec<&str> = self
            .tracker
            .state_machine()
            .possible_targets(journey.current_stage_index)
            .into_iter()
            .filter(|&index| index != journey.current_stage_index)
            .filter_map(|index| pipeline.stage(index).map(|stage| stage.name.as_str()))
            .collect();
        if !next.is_empty() {
            write!(out, "\n  next: {}", next.join(", "))?;
        }
        Ok(out)
    }

    fn render_board(&self, entries: &[BoardEntry]) -> Result<String> {
        if self.json {
            return Ok(serde_json::to_string_pretty(entries)?);
        }
        if entries.is_empty() {
            return Ok("no patients match".to_string());
        }

        let total = self.tracker.pipeline().len();
        let mut out = String::new();
        for entry in entries {
            writeln!(
                out,
                "{:<10} {:<16} {:<10} {:<12} {}/{} {}",
                entry.patient.id,
                entry.patient.name,
                entry.patient.department,
                entry.journey.status,
                entry.journey.current_stage_index,
                total,
                entry.stage_name
            )?;
        }
        Ok(out.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_journey::{JourneyFilter, StagePipeline};

    fn advance(patient_id: &str, stage: StageTarget) -> Command {
        Command::Advance {
            patient_id: patient_id.to_string(),
            stage,
        }
    }

    fn demo_session() -> Session {
        let mut session = Session::new(JourneyTracker::default(), false);
        session.seed_demo().unwrap();
        session
    }

    #[test]
    fn test_seed_demo() {
        let session = demo_session();
        let stats = session.tracker().stats();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.waiting, 2);
        assert_eq!(stats.in_progress, 1);
        assert_eq!(stats.delayed, 1);
        assert_eq!(stats.completed, 1);
    }

    #[test]
    fn test_execute_advance_and_reject() {
        let mut session = demo_session();
        let out = session.execute(advance("SCI-23052", StageTarget::Index(5))).unwrap();
        assert!(out.contains("stage 5/6 Pharmacy"));
        assert!(out.contains("next: Optical"));

        assert!(session.execute(advance("SCI-23052", StageTarget::Index(2))).is_err());
        let journey = session.tracker().journey("SCI-23052").unwrap();
        assert_eq!(journey.current_stage_index, 5);
    }

    #[test]
    fn test_execute_advance_by_stage_name() {
        let mut session = demo_session();
        let name = StageTarget::Name("optical".to_string());
        let out = session.execute(advance("SCI-23051", name)).unwrap();
        assert!(out.contains("[completed] stage 6/6 Optical"));
        assert!(!out.contains("next:"));

        let unknown = StageTarget::Name("Radiology".to_string());
        assert!(session.execute(advance("SCI-23053", unknown)).is_err());
    }

    #[test]
    fn test_seed_demo_with_longer_pipeline() {
        let stages = [
            "Registration",
            "Billing",
            "Optometry",
            "Doctor",
            "Imaging",
            "Counselling",
            "Pharmacy",
            "Optical",
        ];
        let tracker = JourneyTracker::new(StagePipeline::new(stages).unwrap());
        let mut session = Session::new(tracker, false);
        session.seed_demo().unwrap();

        let done = session.tracker().journey("SCI-23055").unwrap();
        assert_eq!(done.current_stage_index, 8);
        assert_eq!(done.status, JourneyStatus::Completed);
        assert_eq!(session.tracker().stats().completed, 1);
    }

    #[test]
    fn test_seed_demo_with_shorter_pipeline() {
        let stages = ["Registration", "Doctor", "Pharmacy"];
        let tracker = JourneyTracker::new(StagePipeline::new(stages).unwrap());
        let mut session = Session::new(tracker, false);
        session.seed_demo().unwrap();

        let delayed = session.tracker().journey("SCI-23054").unwrap();
        assert_eq!(delayed.current_stage_index, 2);
        assert_eq!(delayed.status, JourneyStatus::Delayed);
        let stats = session.tracker().stats();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.delayed, 1);
    }

    #[test]
    fn test_board_filter() {
        let mut session = demo_session();
        let filter = JourneyFilter::default().with_status(JourneyStatus::Delayed);
        let out = session.execute(Command::Board(filter)).unwrap();
        assert!(out.contains("Neha Desai"));
        assert!(!out.contains("Arun Patel"));
    }

    #[test]
    fn test_board_command_line() {
        let mut session = demo_session();
        let command = "board dept=retina sort=stage desc".parse().unwrap();
        let out = session.execute(command).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("SCI-23055"));
        assert!(lines[1].starts_with("SCI-23051"));

        let command = "board search=sharma".parse().unwrap();
        let out = session.execute(command).unwrap();
        assert!(out.contains("Priya Sharma"));
        assert_eq!(out.lines().count(), 1);

        let command = "board stage=1".parse().unwrap();
        let out = session.execute(command).unwrap();
        assert!(out.starts_with("SCI-23053"));
        assert_eq!(out.lines().count(), 1);
    }

    #[test]
    fn test_json_output() {
        let mut session = Session::new(JourneyTracker::default(), true);
        session.seed_demo().unwrap();
        let show = Command::Show { patient_id: "SCI-23055".to_string() };
        let out = session.execute(show).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["journey"]["status"], "completed");
        assert_eq!(value["progress"]["ratio"], 1.0);
    }
}
