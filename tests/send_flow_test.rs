// ==========================================
// 통합 주문 발주 시스템 - 발송 흐름 통합 테스트
// ==========================================
// 시나리오: 발송 → 상태 전이 + 발송 이력 → 기간 내 중복 감지 →
//           사유 없는 재발송 차단 → 사유 입력 후 재발송
// ==========================================

mod test_helpers;

use async_trait::async_trait;
use chrono::Utc;
use order_bridge::api::{SendApi, SendRequest};
use order_bridge::config::ConfigManager;
use order_bridge::domain::mapping::DuplicateCheckSettings;
use order_bridge::domain::order::RawOrderRecord;
use order_bridge::domain::types::OrderStatus;
use order_bridge::engine::send_batch::MailTransport;
use order_bridge::repository::{
    ManufacturerRepository, OrderRepository, SendLogRepository,
};
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;

// ==========================================
// 기록용 테스트 전송 구현
// ==========================================
struct RecordingTransport {
    sent_to: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingTransport {
    fn new() -> Self {
        Self {
            sent_to: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            sent_to: Mutex::new(Vec::new()),
            fail: true,
        }
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send_order_sheet(
        &self,
        to: &str,
        _subject: &str,
        _body: &str,
    ) -> Result<(), anyhow::Error> {
        if self.fail {
            anyhow::bail!("SMTP 연결 실패");
        }
        self.sent_to.lock().unwrap().push(to.to_string());
        Ok(())
    }
}

struct Fixture {
    order_repo: OrderRepository,
    manufacturer_repo: ManufacturerRepository,
    send_log_repo: SendLogRepository,
    config: ConfigManager,
}

impl Fixture {
    fn new() -> Self {
        let conn = test_helpers::create_test_conn();
        Self {
            order_repo: OrderRepository::from_connection(conn.clone()),
            manufacturer_repo: ManufacturerRepository::from_connection(conn.clone()),
            send_log_repo: SendLogRepository::from_connection(conn.clone()),
            config: ConfigManager::from_connection(conn),
        }
    }

    fn send_api(&self) -> SendApi<'_> {
        SendApi {
            order_repo: &self.order_repo,
            manufacturer_repo: &self.manufacturer_repo,
            send_log_repo: &self.send_log_repo,
            config: &self.config,
        }
    }

    fn seed_manufacturer_with_orders(&self, email: Option<&str>) -> i64 {
        let id = self
            .manufacturer_repo
            .insert_manufacturer("한빛유리", email)
            .unwrap();

        let records: Vec<_> = ["ORD-1", "ORD-2"]
            .iter()
            .map(|no| {
                let mut record = RawOrderRecord {
                    order_no: Some(no.to_string()),
                    sub_order_no: None,
                    mall_order_no: None,
                    product_name: Some("유리컵".to_string()),
                    option_name: None,
                    quantity: Some(1),
                    product_code: None,
                    orderer_name: None,
                    recipient_name: Some("이수취".to_string()),
                    phone: None,
                    mobile: None,
                    postal_code: None,
                    address: Some("서울시 강남구 1".to_string()),
                    payment_amount: None,
                    cost: None,
                    shipping_cost: None,
                    mall_name: None,
                    fulfillment_type: None,
                    ordered_at: None,
                    row_number: 2,
                }
                .into_canonical(Utc::now())
                .unwrap();
                record.manufacturer_id = Some(id);
                record
            })
            .collect();
        self.order_repo.insert_orders_ignore_existing(&records).unwrap();
        id
    }

    fn request(&self, manufacturer_id: i64, reason: Option<&str>) -> SendRequest {
        SendRequest {
            manufacturer_id,
            reason: reason.map(str::to_string),
            subject: "8월 발주서".to_string(),
            body: "첨부 확인 바랍니다".to_string(),
        }
    }
}

#[tokio::test]
async fn test_send_transitions_status_and_records_log() {
    let fixture = Fixture::new();
    let id = fixture.seed_manufacturer_with_orders(Some("order@hanbit.kr"));
    let transport = RecordingTransport::new();
    let cancel = AtomicBool::new(false);

    let report = fixture
        .send_api()
        .dispatch(vec![fixture.request(id, None)], &transport, &cancel)
        .await
        .unwrap();

    assert_eq!(report.success, 1);
    assert_eq!(*transport.sent_to.lock().unwrap(), vec!["order@hanbit.kr"]);

    // 주문이 SENT 로 전이
    assert_eq!(
        fixture.order_repo.list_by_status(OrderStatus::Sent).unwrap().len(),
        2
    );

    // 발송 이력 1건 기록
    let logs = fixture
        .send_log_repo
        .find_recent(id, Utc::now() - chrono::Duration::days(1))
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].addresses.contains(&"서울시 강남구 1".to_string()));
}

#[tokio::test]
async fn test_missing_email_skips_without_state_change() {
    let fixture = Fixture::new();
    let id = fixture.seed_manufacturer_with_orders(None);
    let transport = RecordingTransport::new();
    let cancel = AtomicBool::new(false);

    let report = fixture
        .send_api()
        .dispatch(vec![fixture.request(id, None)], &transport, &cancel)
        .await
        .unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.success, 0);
    // 상태 변화도 발송 이력도 없다
    assert_eq!(
        fixture.order_repo.list_by_status(OrderStatus::Pending).unwrap().len(),
        2
    );
    assert!(fixture
        .send_log_repo
        .find_recent(id, Utc::now() - chrono::Duration::days(1))
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_transport_failure_marks_error_and_allows_retry() {
    let fixture = Fixture::new();
    let id = fixture.seed_manufacturer_with_orders(Some("order@hanbit.kr"));
    let cancel = AtomicBool::new(false);

    let failing = RecordingTransport::failing();
    let report = fixture
        .send_api()
        .dispatch(vec![fixture.request(id, None)], &failing, &cancel)
        .await
        .unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(
        fixture.order_repo.list_by_status(OrderStatus::Error).unwrap().len(),
        2
    );

    // ERROR→SENT 재시도는 사유 없이 가능
    let transport = RecordingTransport::new();
    let report = fixture
        .send_api()
        .dispatch(vec![fixture.request(id, None)], &transport, &cancel)
        .await
        .unwrap();
    assert_eq!(report.success, 1);
    assert_eq!(
        fixture.order_repo.list_by_status(OrderStatus::Sent).unwrap().len(),
        2
    );
}

#[tokio::test]
async fn test_duplicate_detection_and_resend_reason_gate() {
    let fixture = Fixture::new();
    let id = fixture.seed_manufacturer_with_orders(Some("order@hanbit.kr"));
    let transport = RecordingTransport::new();
    let cancel = AtomicBool::new(false);

    // 1차 발송
    fixture
        .send_api()
        .dispatch(vec![fixture.request(id, None)], &transport, &cancel)
        .await
        .unwrap();

    // 기간 내 같은 주소 → 중복 감지
    let check = fixture.send_api().check_duplicate(id).unwrap().unwrap();
    assert!(check.has_duplicate);
    assert_eq!(check.matched_addresses, vec!["서울시 강남구 1".to_string()]);

    // 사유 없는 재발송은 건너뜀
    let report = fixture
        .send_api()
        .dispatch(vec![fixture.request(id, None)], &transport, &cancel)
        .await
        .unwrap();
    assert_eq!(report.skipped, 1);

    // 사유를 넣으면 재발송 허용, 이력에 사유 보존
    let report = fixture
        .send_api()
        .dispatch(
            vec![fixture.request(id, Some("고객 요청 재발송"))],
            &transport,
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(report.success, 1);

    let logs = fixture
        .send_log_repo
        .find_recent(id, Utc::now() - chrono::Duration::days(1))
        .unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].reason, Some("고객 요청 재발송".to_string()));
}

#[tokio::test]
async fn test_duplicate_check_disabled_returns_none() {
    let fixture = Fixture::new();
    let id = fixture.seed_manufacturer_with_orders(Some("order@hanbit.kr"));

    fixture
        .config
        .set_duplicate_check_settings(DuplicateCheckSettings {
            enabled: false,
            period_days: 10,
        })
        .unwrap();

    assert!(fixture.send_api().check_duplicate(id).unwrap().is_none());
}
