// ==========================================
// 통합 주문 발주 시스템 - 도메인 계층
// ==========================================
// 역할: 엔티티와 타입 정의, 업무 로직 없음
// ==========================================

pub mod mapping;
pub mod order;
pub mod types;

pub use mapping::{
    column_index, column_letter, ColumnRule, DuplicateCheckSettings, ExclusionPattern,
    ExportColumn, ExportPipelineConfig, Manufacturer, MappingRuleSet, SendRecord, SynonymEntry,
};
pub use order::{format_currency, CanonicalOrderRecord, RawOrderRecord};
pub use types::{CanonicalField, DestinationKind, OrderStatus};
