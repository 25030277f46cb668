// ==========================================
// 통합 주문 발주 시스템 - 저장 계층
// ==========================================
// 원칙: SQL 은 이 계층에서만 조립한다.
// 모든 저장소는 Arc<Mutex<Connection>> 공유를 지원한다.
// ==========================================

pub mod error;
pub mod manufacturer_repo;
pub mod mapping_repo;
pub mod order_repo;
pub mod send_log_repo;
pub mod settings_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use manufacturer_repo::ManufacturerRepository;
pub use mapping_repo::MappingRepository;
pub use order_repo::OrderRepository;
pub use send_log_repo::SendLogRepository;
pub use settings_repo::SettingsRepository;
