// ==========================================
// 통합 주문 발주 시스템 - 저장 계층 오류 타입
// ==========================================
// 도구: thiserror 파생 매크로
// ==========================================

use thiserror::Error;

/// 저장 계층 오류 타입
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 데이터베이스 오류 =====
    #[error("레코드를 찾을 수 없습니다: {entity} (id={id})")]
    NotFound { entity: String, id: String },

    #[error("데이터베이스 연결 실패: {0}")]
    DatabaseConnectionError(String),

    #[error("데이터베이스 잠금 획득 실패: {0}")]
    LockError(String),

    #[error("데이터베이스 트랜잭션 실패: {0}")]
    DatabaseTransactionError(String),

    #[error("데이터베이스 질의 실패: {0}")]
    DatabaseQueryError(String),

    #[error("유일성 제약 위반: {0}")]
    UniqueConstraintViolation(String),

    #[error("외래키 제약 위반: {0}")]
    ForeignKeyViolation(String),

    // ===== 직렬화 오류 =====
    #[error("영속 데이터 역직렬화 실패: {0}")]
    DeserializationError(String),

    // ===== 데이터 품질 오류 =====
    #[error("데이터 검증 실패: {0}")]
    ValidationError(String),

    // ===== 공통 오류 =====
    #[error("내부 오류: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// rusqlite::Error 변환
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

// serde_json::Error 변환 (payload 역직렬화)
impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::DeserializationError(err.to_string())
    }
}

/// Result 타입 별칭
pub type RepositoryResult<T> = Result<T, RepositoryError>;
