// ==========================================
// 통합 주문 발주 시스템 - 출력 계층
// ==========================================
// 렌더링 결과를 실제 파일(.xlsx)로 만드는 마지막 구간
// ==========================================

pub mod error;
pub mod xlsx_writer;

pub use error::{ExportError, ExportResult};
pub use xlsx_writer::XlsxWriter;
