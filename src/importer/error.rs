// ==========================================
// 통합 주문 발주 시스템 - 수집 모듈 오류 타입
// ==========================================
// 도구: thiserror 파생 매크로
// ==========================================

use crate::engine::structure::StructureError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 수집 모듈 오류 타입
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 파일 관련 오류 =====
    #[error("파일이 존재하지 않습니다: {0}")]
    FileNotFound(String),

    #[error("지원하지 않는 파일 형식: {0} (.xlsx/.xls/.csv 만 지원)")]
    UnsupportedFormat(String),

    #[error("파일 읽기 실패: {0}")]
    FileReadError(String),

    #[error("Excel 파싱 실패: {0}")]
    ExcelParseError(String),

    #[error("CSV 파싱 실패: {0}")]
    CsvParseError(String),

    // ===== 구조 오류 (해당 파일만 중단) =====
    #[error("시트 구조 오류: {0}")]
    Structure(#[from] StructureError),

    // ===== 데이터 변환 오류 =====
    #[error("타입 변환 실패 (행 {row}, 필드 {field}): {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("주문번호 누락 (행 {0})")]
    OrderNoMissing(usize),

    // ===== 저장 계층 오류 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 공통 오류 =====
    #[error("내부 오류: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// std::io::Error 변환
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// csv::Error 변환
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 타입 별칭
pub type ImportResult<T> = Result<T, ImportError>;
