// ==========================================
// 통합 주문 발주 시스템 - API 계층 오류 타입
// ==========================================
// 하위 계층 오류를 호출자에게 전달하기 전의 최종 변환 지점
// ==========================================

use crate::engine::renderer::RenderError;
use crate::export::error::ExportError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("규칙 검증 실패: {0}")]
    RuleValidationFailed(String),

    #[error("리소스를 찾을 수 없습니다: {0}")]
    NotFound(String),

    #[error("요청이 올바르지 않습니다: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;
