//! # Front Desk Core
//!
//! 前台系统的核心模块，提供患者与就诊旅程的基础数据结构、错误定义和通用工具。

pub mod error;
pub mod models;
pub mod utils;

pub use error::{DeskError, Result};
pub use models::*;
