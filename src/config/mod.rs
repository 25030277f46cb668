// ==========================================
// 통합 주문 발주 시스템 - 설정 계층
// ==========================================

pub mod config_manager;

pub use config_manager::{ConfigManager, GLOBAL_SCOPE, KEY_DUPLICATE_CHECK};
