// ==========================================
// 통합 주문 발주 시스템 - 엔진 계층
// ==========================================
// 역할: 업무 규칙 구현. SQL 을 조립하지 않는다.
// 원칙: (입력, 설정) 의 순수 함수. 설정 객체는 명시적으로 주입된다.
// ==========================================

pub mod classify;
pub mod duplicate;
pub mod exclusion;
pub mod export_pipeline;
pub mod renderer;
pub mod send_batch;
pub mod structure;
pub mod synonym;
pub mod template;
pub mod validation;

// 핵심 엔진 재노출
pub use classify::ClassificationEngine;
pub use duplicate::{DuplicateCheckResult, DuplicateDetector};
pub use exclusion::ExclusionFilter;
pub use export_pipeline::ExportColumnPipeline;
pub use renderer::{RenderError, RenderedSheet, SheetRenderer};
pub use send_batch::{
    validate_send, BatchOutcome, BatchSendReport, MailTransport, SendBatch, SendBatchEngine,
    SendValidationError,
};
pub use structure::{StructureAnalyzer, StructureError, StructureReport};
pub use synonym::SynonymDictionary;
pub use template::{RenderContext, TemplateEngine, TemplateError};
pub use validation::{RuleSetValidator, ValidationReport};
