//! 通用工具函数

use uuid::Uuid;

/// 默认患者ID前缀
pub const DEFAULT_ID_PREFIX: &str = "SCI";

/// 生成蓝卡患者ID, 格式为 `<前缀>-NNNNN`
pub fn generate_patient_id(prefix: &str) -> String {
    let number = 10000 + (Uuid::new_v4().as_u128() % 90000) as u32;
    format!("{}-{}", prefix, number)
}

/// 验证患者ID格式
pub fn is_valid_patient_id(id: &str) -> bool {
    match id.split_once('-') {
        Some((prefix, number)) => {
            !prefix.is_empty()
                && prefix.chars().all(|c| c.is_ascii_alphanumeric())
                && number.len() == 5
                && number.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_patient_id() {
        for _ in 0..32 {
            let id = generate_patient_id(DEFAULT_ID_PREFIX);
            assert!(id.starts_with("SCI-"));
            assert!(is_valid_patient_id(&id));
            let number: u32 = id[4..].parse().unwrap();
            assert!((10000..=99999).contains(&number));
        }
    }

    #[test]
    fn test_is_valid_patient_id() {
        assert!(is_valid_patient_id("SCI-23051"));
        assert!(is_valid_patient_id("OPD2-10000"));
        assert!(!is_valid_patient_id(""));
        assert!(!is_valid_patient_id("SCI23051"));
        assert!(!is_valid_patient_id("SCI-2305"));
        assert!(!is_valid_patient_id("SCI-2305a"));
        assert!(!is_valid_patient_id("-23051"));
    }
}
