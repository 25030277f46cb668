// ==========================================
// 통합 주문 발주 시스템 - 수집 계층
// ==========================================
// 파일 파싱 → 구조 분석 → 필드 매핑 → 정규화 저장까지의 경로
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod order_importer;

pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use order_importer::{ImportSummary, OrderImporter};
