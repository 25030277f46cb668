// ==========================================
// 통합 주문 발주 시스템 - 발송 API
// ==========================================
// 흐름: 중복 확인 → 배치 구성 → 순차 발송 → 결과 반영
// 결과 반영 규칙:
// - 발송 성공: 발송 이력(send_log) 1건 추가 + 주문 SENT 전이
// - 전송 실패: 주문 ERROR 전이 (재시도 가능)
// - 검증 건너뜀: 이력도 상태 변화도 없음
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::config_manager::ConfigManager;
use crate::domain::types::OrderStatus;
use crate::engine::duplicate::{DuplicateCheckResult, DuplicateDetector};
use crate::engine::send_batch::{
    BatchOutcome, BatchSendReport, MailTransport, SendBatch, SendBatchEngine,
};
use crate::repository::manufacturer_repo::ManufacturerRepository;
use crate::repository::order_repo::OrderRepository;
use crate::repository::send_log_repo::SendLogRepository;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use tracing::{info, warn};

// ==========================================
// SendRequest - 제조사 1건의 발송 요청
// ==========================================
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub manufacturer_id: i64,
    /// 재발송/중복 경고 통과 사유
    pub reason: Option<String>,
    /// 메일 제목/본문 (렌더링 완료본)
    pub subject: String,
    pub body: String,
}

pub struct SendApi<'a> {
    pub order_repo: &'a OrderRepository,
    pub manufacturer_repo: &'a ManufacturerRepository,
    pub send_log_repo: &'a SendLogRepository,
    pub config: &'a ConfigManager,
}

impl<'a> SendApi<'a> {
    /// 발송 전 중복 확인
    ///
    /// 설정이 꺼져 있으면 감지기를 호출하지 않고 None 을 돌려준다.
    pub fn check_duplicate(&self, manufacturer_id: i64) -> ApiResult<Option<DuplicateCheckResult>> {
        let settings = self.config.get_duplicate_check_settings()?;
        if !settings.enabled {
            return Ok(None);
        }

        let now = Utc::now();
        let addresses = self.sendable_addresses(manufacturer_id)?;
        let logs = self
            .send_log_repo
            .find_recent(manufacturer_id, now - Duration::days(settings.period_days))?;

        Ok(Some(DuplicateDetector::check(
            &addresses,
            settings.period_days,
            now,
            &logs,
        )))
    }

    /// 발송 요청 목록 실행
    ///
    /// 배치는 엄격히 순차 처리되며 cancel 플래그로 중단할 수 있다.
    /// 취소 시에도 그 시점까지의 결과는 저장 계층에 반영된 상태로 남는다.
    pub async fn dispatch<T: MailTransport>(
        &self,
        requests: Vec<SendRequest>,
        transport: &T,
        cancel: &AtomicBool,
    ) -> ApiResult<BatchSendReport> {
        let settings = self.config.get_duplicate_check_settings()?;
        let now = Utc::now();

        let mut batches = Vec::with_capacity(requests.len());
        // 발송 후 반영용: 제조사 → (주문번호 목록, 정규화 주소, 사유)
        let mut context: HashMap<i64, (Vec<String>, Vec<String>, Option<String>)> = HashMap::new();

        for request in requests {
            let manufacturer = self
                .manufacturer_repo
                .find_by_id(request.manufacturer_id)?
                .ok_or_else(|| {
                    ApiError::NotFound(format!("제조사: {}", request.manufacturer_id))
                })?;

            let records = self
                .order_repo
                .list_sendable_by_manufacturer(request.manufacturer_id)?;
            if records.is_empty() {
                warn!(
                    manufacturer = %manufacturer.name,
                    "발송 가능한 주문이 없어 배치에서 제외"
                );
                continue;
            }

            // 배치 상태: 하나라도 SENT 면 재발송으로 본다
            let current_status = if records.iter().any(|r| r.status == OrderStatus::Sent) {
                OrderStatus::Sent
            } else if records.iter().any(|r| r.status == OrderStatus::Error) {
                OrderStatus::Error
            } else {
                OrderStatus::Pending
            };

            let addresses: Vec<String> = records
                .iter()
                .filter_map(|r| r.address.as_deref())
                .map(DuplicateDetector::normalize_address)
                .filter(|a| !a.is_empty())
                .collect();

            let duplicate_detected = if settings.enabled {
                let logs = self.send_log_repo.find_recent(
                    request.manufacturer_id,
                    now - Duration::days(settings.period_days),
                )?;
                DuplicateDetector::check(&addresses, settings.period_days, now, &logs)
                    .has_duplicate
            } else {
                false
            };

            let order_nos: Vec<String> = records.iter().map(|r| r.order_no.clone()).collect();
            context.insert(
                request.manufacturer_id,
                (order_nos, addresses.clone(), request.reason.clone()),
            );

            batches.push(SendBatch {
                manufacturer_id: request.manufacturer_id,
                manufacturer_name: manufacturer.name,
                email: manufacturer.order_email,
                current_status,
                addresses,
                reason: request.reason,
                duplicate_detected,
                subject: request.subject,
                body: request.body,
            });
        }

        let engine = SendBatchEngine::new(transport);
        let report = engine.run(batches, cancel).await;

        // ===== 결과 반영 =====
        for outcome in &report.outcomes {
            match outcome {
                BatchOutcome::Sent { manufacturer_id } => {
                    if let Some((order_nos, addresses, reason)) = context.get(manufacturer_id) {
                        self.send_log_repo.append(
                            *manufacturer_id,
                            addresses,
                            reason.as_deref(),
                            Utc::now(),
                        )?;
                        self.order_repo
                            .update_status_bulk(order_nos, OrderStatus::Sent)?;
                    }
                }
                BatchOutcome::Failed {
                    manufacturer_id, ..
                } => {
                    if let Some((order_nos, _, _)) = context.get(manufacturer_id) {
                        self.order_repo
                            .update_status_bulk(order_nos, OrderStatus::Error)?;
                    }
                }
                BatchOutcome::Skipped { .. } => {}
            }
        }

        info!(
            success = report.success,
            failed = report.failed,
            skipped = report.skipped,
            cancelled = report.cancelled,
            "발송 실행 완료"
        );
        Ok(report)
    }

    fn sendable_addresses(&self, manufacturer_id: i64) -> ApiResult<Vec<String>> {
        let records = self.order_repo.list_sendable_by_manufacturer(manufacturer_id)?;
        Ok(records
            .iter()
            .filter_map(|r| r.address.as_deref())
            .map(DuplicateDetector::normalize_address)
            .filter(|a| !a.is_empty())
            .collect())
    }
}
