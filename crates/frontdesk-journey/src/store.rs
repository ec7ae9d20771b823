//! 旅程存储
//!
//! 跟踪器通过注入的存储读写旅程记录；默认实现为会话内存存储

use frontdesk_core::{Patient, PatientJourney};
use std::collections::HashMap;

/// 旅程存储接口
pub trait JourneyStore {
    /// 保存新患者及其旅程；已存在时返回 false
    fn insert(&mut self, patient: Patient, journey: PatientJourney) -> bool;

    fn contains(&self, patient_id: &str) -> bool;

    fn patient(&self, patient_id: &str) -> Option<&Patient>;

    fn journey(&self, patient_id: &str) -> Option<&PatientJourney>;

    fn journey_mut(&mut self, patient_id: &str) -> Option<&mut PatientJourney>;

    /// 按登记顺序列出所有记录
    fn entries(&self) -> Vec<(&Patient, &PatientJourney)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 内存存储，保留登记顺序
#[derive(Debug, Default)]
pub struct InMemoryJourneyStore {
    patients: HashMap<String, Patient>,
    journeys: HashMap<String, PatientJourney>,
    order: Vec<String>,
}

impl InMemoryJourneyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JourneyStore for InMemoryJourneyStore {
    fn insert(&mut self, patient: Patient, journey: PatientJourney) -> bool {
        if self.patients.contains_key(&patient.id) {
            return false;
        }
        let id = patient.id.clone();
        self.order.push(id.clone());
        self.journeys.insert(id.clone(), journey);
        self.patients.insert(id, patient);
        true
    }

    fn contains(&self, patient_id: &str) -> bool {
        self.patients.contains_key(patient_id)
    }

    fn patient(&self, patient_id: &str) -> Option<&Patient> {
        self.patients.get(patient_id)
    }

    fn journey(&self, patient_id: &str) -> Option<&PatientJourney> {
        self.journeys.get(patient_id)
    }

    fn journey_mut(&mut self, patient_id: &str) -> Option<&mut PatientJourney> {
        self.journeys.get_mut(patient_id)
    }

    fn entries(&self) -> Vec<(&Patient, &PatientJourney)> {
        self.order
            .iter()
            .filter_map(|id| Some((self.patients.get(id)?, self.journeys.get(id)?)))
            .collect()
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn patient(id: &str, name: &str) -> Patient {
        Patient {
            id: id.to_string(),
            name: name.to_string(),
            age: None,
            gender: None,
            contact_number: None,
            department: "Retina".to_string(),
            doctor: None,
            registered_at: Utc::now(),
        }
    }

    #[test]
    fn test_insert_preserves_order_and_rejects_duplicates() {
        let mut store = InMemoryJourneyStore::new();
        let journey = |id: &str| PatientJourney::new(id, Utc::now());
        assert!(store.insert(patient("SCI-30000", "B"), journey("SCI-30000")));
        assert!(store.insert(patient("SCI-10000", "A"), journey("SCI-10000")));
        assert!(!store.insert(patient("SCI-30000", "C"), journey("SCI-30000")));

        let ids: Vec<&str> = store.entries().iter().map(|(p, _)| p.id.as_str()).collect();
        assert_eq!(ids, vec!["SCI-30000", "SCI-10000"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.patient("SCI-30000").unwrap().name, "B");
    }
}
