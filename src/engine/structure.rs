// ==========================================
// 통합 주문 발주 시스템 - 시트 구조 분석 엔진
// ==========================================
// 역할: 샘플 스프레드시트에서 헤더 행 탐지, 헤더/미리보기 추출,
//       동의어 사전 기반 필드 매핑 제안
// 원칙: 입력 그리드 + 강제 행 번호의 순수 함수 (부작용 없음)
// ==========================================

mod core;


pub use self::core::{StructureAnalyzer, StructureError, StructureReport, MIN_HEADER_DENSITY};
