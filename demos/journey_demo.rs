//! 患者旅程演示程序
//!
//! 展示登记、阶段推进、状态更新、进度渲染和看板查询

use frontdesk::journey::JourneyFilter;
use frontdesk::{DeskError, JourneyStatus, JourneyTracker, PatientRegistration};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::fmt::init();

    let mut tracker: JourneyTracker = JourneyTracker::default();

    println!("前台患者旅程演示\n");

    // 1. 登记患者（生成蓝卡）
    let arun = tracker.register(
        PatientRegistration::new("Arun Patel", "Retina").with_doctor("Dr. Mehta"),
    )?;
    let priya = tracker.register(PatientRegistration::new("Priya Sharma", "Cornea"))?;
    println!("登记了 {} 和 {}", arun.patient_id, priya.patient_id);

    // 2. 开始旅程：前往收费处
    tracker.advance(&arun.patient_id, 2)?;
    tracker.advance(&priya.patient_id, 3)?;
    tracker.set_status(&priya.patient_id, JourneyStatus::Delayed)?;

    // 3. 不允许回退
    match tracker.advance(&priya.patient_id, 1) {
        Err(DeskError::InvalidStageIndex { target, current, .. }) => {
            println!("拒绝从阶段 {} 回退到 {}", current, target);
        }
        other => println!("意外结果: {:?}", other),
    }

    // 4. 跳到最后阶段即完成
    let done = tracker.advance(&arun.patient_id, 6)?;
    println!("{} 状态: {}", done.patient_id, done.status);

    // 5. 进度
    for id in [&arun.patient_id, &priya.patient_id] {
        let progress = tracker.progress(id)?;
        println!("{} {:>3}%  {}", id, progress.percent(), progress.to_line());
    }

    // 6. 看板
    let delayed = tracker.query(&JourneyFilter::default().with_status(JourneyStatus::Delayed));
    println!("\n延误患者: {}", delayed.len());
    for entry in delayed {
        println!("  {} {} @ {}", entry.patient.id, entry.patient.name, entry.stage_name);
    }

    let stats = tracker.stats();
    println!("\n共 {} 人, 已完成 {}, 进行中 {}", stats.total, stats.completed, stats.active());
    Ok(())
}
