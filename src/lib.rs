// ==========================================
// 통합 주문 발주 시스템 - 핵심 라이브러리
// ==========================================
// 기술 스택: Rust + SQLite
// 시스템 역할: 주문 스프레드시트 정규화 / 제조사 분류 / 발주서 렌더링
// ==========================================

// ==========================================
// 모듈 선언
// ==========================================

// 도메인 계층 - 엔티티와 타입
pub mod domain;

// 데이터 저장 계층 - 데이터 접근
pub mod repository;

// 엔진 계층 - 업무 규칙
pub mod engine;

// 수집 계층 - 외부 스프레드시트 데이터
pub mod importer;

// 출력 계층 - 발주서 워크북 생성
pub mod export;

// 설정 계층 - 시스템 설정
pub mod config;

// 데이터베이스 기반 (연결 초기화 / PRAGMA 통일)
pub mod db;

// 로그 시스템
pub mod logging;

// API 계층 - 업무 인터페이스
pub mod api;

// ==========================================
// 핵심 타입 재노출
// ==========================================

// 도메인 타입
pub use domain::types::{CanonicalField, DestinationKind, OrderStatus};

// 도메인 엔티티
pub use domain::{
    CanonicalOrderRecord, ColumnRule, DuplicateCheckSettings, ExclusionPattern, ExportColumn,
    ExportPipelineConfig, Manufacturer, MappingRuleSet, RawOrderRecord, SendRecord, SynonymEntry,
};

// 엔진
pub use engine::{
    ClassificationEngine, DuplicateDetector, ExclusionFilter, ExportColumnPipeline,
    RuleSetValidator, SendBatchEngine, SheetRenderer, StructureAnalyzer, SynonymDictionary,
    TemplateEngine,
};

// API
pub use api::{MappingApi, RenderApi, SendApi, UploadApi};

// ==========================================
// 상수 정의
// ==========================================

// 시스템 버전
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 시스템 이름
pub const APP_NAME: &str = "통합 주문 발주 시스템";

// 데이터베이스 버전
pub const DB_VERSION: &str = "v0.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
