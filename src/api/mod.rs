// ==========================================
// 통합 주문 발주 시스템 - API 계층
// ==========================================
// 화면/외부가 호출하는 진입점. 저장소와 엔진을 엮는 오케스트레이션만
// 담당하고 업무 규칙 자체는 엔진 계층에 둔다.
// ==========================================

pub mod error;
pub mod mapping_api;
pub mod render_api;
pub mod send_api;
pub mod upload_api;

pub use error::{ApiError, ApiResult};
pub use mapping_api::MappingApi;
pub use render_api::RenderApi;
pub use send_api::{SendApi, SendRequest};
pub use upload_api::UploadApi;
