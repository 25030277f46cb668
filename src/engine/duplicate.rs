// ==========================================
// 통합 주문 발주 시스템 - 중복 발송 감지기
// ==========================================
// 역할: 같은 제조사 + 같은 수취인 주소로 기간 내 발송 이력이 있는지 감지
// 의미: 경고 게이트 (오류 아님) - 사유 입력 후 진행 가능
// 원칙: 순수 함수. 발송 이력 조회는 저장 계층이, 설정의 on/off 판단은
//       호출 측이 담당한다 (꺼져 있으면 감지기 자체를 호출하지 않는다)
// ==========================================

use crate::domain::mapping::SendRecord;
use chrono::{DateTime, Duration, Utc};

// ==========================================
// DuplicateCheckResult - 감지 결과
// ==========================================
#[derive(Debug, Clone)]
pub struct DuplicateCheckResult {
    pub has_duplicate: bool,
    /// 후보 주소 중 기간 내 발송 이력과 겹친 것
    pub matched_addresses: Vec<String>,
    /// 겹침이 발생한 발송 이력
    pub duplicate_logs: Vec<SendRecord>,
}

// ==========================================
// DuplicateDetector - 중복 감지기
// ==========================================
pub struct DuplicateDetector;

impl DuplicateDetector {
    /// 주소 정규화: trim + 내부 연속 공백 축약
    ///
    /// 일치는 정규화 문자열의 정확 일치다 (유사 주소 추정 없음)
    pub fn normalize_address(address: &str) -> String {
        address.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// 중복 발송 확인
    ///
    /// # 매개변수
    /// - candidate_addresses: 이번 발송 대상 주소들
    /// - period_days: 확인 기간 (일). [now - period, now] 범위 검사
    /// - now: 기준 시각 (테스트 주입용)
    /// - logs: 같은 제조사의 발송 이력 (저장 계층이 조회해 전달)
    pub fn check(
        candidate_addresses: &[String],
        period_days: i64,
        now: DateTime<Utc>,
        logs: &[SendRecord],
    ) -> DuplicateCheckResult {
        let window_start = now - Duration::days(period_days);

        let candidates: Vec<String> = candidate_addresses
            .iter()
            .map(|a| Self::normalize_address(a))
            .filter(|a| !a.is_empty())
            .collect();

        let mut matched_addresses: Vec<String> = Vec::new();
        let mut duplicate_logs: Vec<SendRecord> = Vec::new();

        for log in logs {
            if log.sent_at < window_start || log.sent_at > now {
                continue;
            }

            let normalized_sent: Vec<String> = log
                .addresses
                .iter()
                .map(|a| Self::normalize_address(a))
                .collect();

            let overlap: Vec<String> = candidates
                .iter()
                .filter(|c| normalized_sent.contains(c))
                .cloned()
                .collect();

            if !overlap.is_empty() {
                for address in overlap {
                    if !matched_addresses.contains(&address) {
                        matched_addresses.push(address);
                    }
                }
                duplicate_logs.push(log.clone());
            }
        }

        DuplicateCheckResult {
            has_duplicate: !matched_addresses.is_empty(),
            matched_addresses,
            duplicate_logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(addresses: &[&str], days_ago: i64, now: DateTime<Utc>) -> SendRecord {
        SendRecord {
            send_id: format!("send-{}", days_ago),
            manufacturer_id: 1,
            addresses: addresses.iter().map(|a| a.to_string()).collect(),
            reason: None,
            sent_at: now - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_duplicate_within_period() {
        let now = Utc::now();
        let logs = vec![log(&["서울시 강남구 1"], 5, now)];

        let result =
            DuplicateDetector::check(&["서울시 강남구 1".to_string()], 10, now, &logs);
        assert!(result.has_duplicate);
        assert_eq!(result.matched_addresses, vec!["서울시 강남구 1"]);
        assert_eq!(result.duplicate_logs.len(), 1);
    }

    #[test]
    fn test_no_duplicate_outside_period() {
        let now = Utc::now();
        let logs = vec![log(&["서울시 강남구 1"], 5, now)];

        // 기간 3일이면 5일 전 이력은 범위 밖
        let result = DuplicateDetector::check(&["서울시 강남구 1".to_string()], 3, now, &logs);
        assert!(!result.has_duplicate);
        assert!(result.matched_addresses.is_empty());
    }

    #[test]
    fn test_address_normalization_exact_match() {
        let now = Utc::now();
        let logs = vec![log(&["서울시  강남구   테헤란로 1"], 2, now)];

        // 공백 차이는 정규화로 흡수
        let result = DuplicateDetector::check(
            &["  서울시 강남구 테헤란로 1 ".to_string()],
            10,
            now,
            &logs,
        );
        assert!(result.has_duplicate);

        // 내용이 다르면 불일치 (유사 추정 없음)
        let result =
            DuplicateDetector::check(&["서울시 강남구 테헤란로 2".to_string()], 10, now, &logs);
        assert!(!result.has_duplicate);
    }

    #[test]
    fn test_matched_addresses_deduplicated_across_logs() {
        let now = Utc::now();
        let logs = vec![log(&["주소A"], 1, now), log(&["주소A", "주소B"], 2, now)];

        let result = DuplicateDetector::check(
            &["주소A".to_string(), "주소B".to_string()],
            10,
            now,
            &logs,
        );
        assert_eq!(result.matched_addresses, vec!["주소A", "주소B"]);
        assert_eq!(result.duplicate_logs.len(), 2);
    }
}
