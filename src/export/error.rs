// ==========================================
// 통합 주문 발주 시스템 - 출력 계층 오류 타입
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("xlsx 기록 실패: {0}")]
    Xlsx(String),

    #[error("출력 레이아웃 오류: {0}")]
    InvalidLayout(String),

    #[error("파일 기록 실패: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::Xlsx(err.to_string())
    }
}

pub type ExportResult<T> = Result<T, ExportError>;
