// ==========================================
// 통합 주문 발주 시스템 - 발송 배치 엔진
// ==========================================
// 상태 전이: PENDING→SENT, PENDING→ERROR, SENT→SENT(재발송), ERROR→SENT(재시도)
// 전제 조건:
// - SENT 진입은 수신 이메일 필수
// - 재발송(SENT→SENT) 또는 중복 감지 시 사유 문자열 필수 (발송 이력에 보존)
// 실행 모델:
// - 배치를 엄격히 순차 처리 (메일 전송 부하 제한)
// - 반복 사이에 협조적 취소 플래그 확인, 취소돼도 부분 집계는 보고
// - 한 배치의 실패가 나머지 배치를 중단시키지 않는다
// - 검증 실패는 동기 보고되며 발송 이력을 만들지 않는다
// ==========================================

use crate::domain::types::OrderStatus;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::{info, warn};

// ==========================================
// MailTransport - 메일 전송 이음새
// ==========================================
// 실제 전송(SMTP 등)은 외부 협력자. 타임아웃은 구현체/호출 측 책임.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send_order_sheet(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), anyhow::Error>;
}

// ==========================================
// SendValidationError - 발송 전제 조건 위반
// ==========================================
// 동기 보고: 발송 이력도, 상태 전이도 만들지 않는다
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SendValidationError {
    #[error("수신 이메일이 없어 발송할 수 없습니다")]
    MissingEmail,

    #[error("재발송에는 사유가 필요합니다")]
    MissingResendReason,

    #[error("중복 발송이 감지되어 사유가 필요합니다")]
    MissingDuplicateReason,
}

/// SENT 진입 전제 조건 검증
///
/// # 매개변수
/// - current: 현재 상태 (SENT 이면 이번 발송은 재발송)
/// - email: 수신 이메일
/// - reason: 사유 문자열
/// - duplicate_detected: 중복 발송 감지 여부
pub fn validate_send(
    current: OrderStatus,
    email: Option<&str>,
    reason: Option<&str>,
    duplicate_detected: bool,
) -> Result<(), SendValidationError> {
    let email_ok = email.map(|e| !e.trim().is_empty()).unwrap_or(false);
    if !email_ok {
        return Err(SendValidationError::MissingEmail);
    }

    let reason_ok = reason.map(|r| !r.trim().is_empty()).unwrap_or(false);
    if current == OrderStatus::Sent && !reason_ok {
        return Err(SendValidationError::MissingResendReason);
    }
    if duplicate_detected && !reason_ok {
        return Err(SendValidationError::MissingDuplicateReason);
    }

    Ok(())
}

// ==========================================
// SendBatch - 발송 배치 1건 (제조사 단위)
// ==========================================
#[derive(Debug, Clone)]
pub struct SendBatch {
    pub manufacturer_id: i64,
    pub manufacturer_name: String,
    /// 수신 이메일 (없으면 검증 실패)
    pub email: Option<String>,
    /// 배치의 현재 상태 (SENT 이면 재발송)
    pub current_status: OrderStatus,
    /// 발송 대상 수취인 주소 (발송 이력 기록용)
    pub addresses: Vec<String>,
    /// 재발송/중복 통과 사유
    pub reason: Option<String>,
    /// 발송 전 중복 감지 결과
    pub duplicate_detected: bool,
    /// 메일 제목/본문 (렌더링 완료본)
    pub subject: String,
    pub body: String,
}

// ==========================================
// BatchOutcome - 배치별 처리 결과
// ==========================================
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    /// 발송 성공 (호출 측이 발송 이력 기록 + SENT 전이)
    Sent { manufacturer_id: i64 },
    /// 전송 실패 (ERROR 전이, 재시도 가능)
    Failed {
        manufacturer_id: i64,
        message: String,
    },
    /// 검증 실패로 건너뜀 (상태 변화 없음)
    Skipped {
        manufacturer_id: i64,
        error: SendValidationError,
    },
}

// ==========================================
// BatchSendReport - 실행 집계
// ==========================================
// 취소돼도 그 시점까지의 집계를 그대로 보고한다
#[derive(Debug, Default)]
pub struct BatchSendReport {
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: bool,
    pub outcomes: Vec<BatchOutcome>,
}

// ==========================================
// SendBatchEngine - 순차 발송 엔진
// ==========================================
pub struct SendBatchEngine<'a, T: MailTransport> {
    transport: &'a T,
}

impl<'a, T: MailTransport> SendBatchEngine<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// 배치 목록 순차 실행
    ///
    /// 병렬 처리하지 않는다. 반복 사이에 cancel 플래그를 확인하고,
    /// 취소 시 남은 배치는 건드리지 않은 채 부분 집계를 반환한다.
    pub async fn run(&self, batches: Vec<SendBatch>, cancel: &AtomicBool) -> BatchSendReport {
        let mut report = BatchSendReport::default();

        for batch in batches {
            if cancel.load(Ordering::Relaxed) {
                info!(
                    success = report.success,
                    failed = report.failed,
                    skipped = report.skipped,
                    "발송 배치 실행이 취소되었습니다"
                );
                report.cancelled = true;
                break;
            }

            let outcome = self.process_one(&batch).await;
            match &outcome {
                BatchOutcome::Sent { .. } => report.success += 1,
                BatchOutcome::Failed { .. } => report.failed += 1,
                BatchOutcome::Skipped { .. } => report.skipped += 1,
            }
            report.outcomes.push(outcome);
        }

        report
    }

    /// 배치 1건 처리: 검증 → 전송
    async fn process_one(&self, batch: &SendBatch) -> BatchOutcome {
        if let Err(error) = validate_send(
            batch.current_status,
            batch.email.as_deref(),
            batch.reason.as_deref(),
            batch.duplicate_detected,
        ) {
            warn!(
                manufacturer_id = batch.manufacturer_id,
                manufacturer = %batch.manufacturer_name,
                error = %error,
                "발송 전제 조건 미충족, 건너뜀"
            );
            return BatchOutcome::Skipped {
                manufacturer_id: batch.manufacturer_id,
                error,
            };
        }

        // validate_send 통과 시 email 존재 보장
        let email = batch.email.as_deref().unwrap_or_default();

        match self
            .transport
            .send_order_sheet(email, &batch.subject, &batch.body)
            .await
        {
            Ok(()) => {
                info!(
                    manufacturer_id = batch.manufacturer_id,
                    manufacturer = %batch.manufacturer_name,
                    "발주서 발송 완료"
                );
                BatchOutcome::Sent {
                    manufacturer_id: batch.manufacturer_id,
                }
            }
            Err(e) => {
                warn!(
                    manufacturer_id = batch.manufacturer_id,
                    manufacturer = %batch.manufacturer_name,
                    error = %e,
                    "발주서 발송 실패 (재시도 가능)"
                );
                BatchOutcome::Failed {
                    manufacturer_id: batch.manufacturer_id,
                    message: e.to_string(),
                }
            }
        }
    }
}
