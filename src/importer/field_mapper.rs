// ==========================================
// 통합 주문 발주 시스템 - 필드 매퍼
// ==========================================
// 역할: 헤더 해석 결과를 바탕으로 원본 행 → RawOrderRecord 타입 변환
// 원칙: 헤더 → 필드 해석은 동의어 사전이, 열 위치 결정은 이 매퍼가 담당
//       (같은 필드로 해석되는 헤더 중복 시 가장 왼쪽 열 유지)
// ==========================================

use crate::domain::order::RawOrderRecord;
use crate::domain::types::CanonicalField;
use crate::engine::synonym::SynonymDictionary;
use crate::importer::error::{ImportError, ImportResult};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

// ==========================================
// FieldMapper - 행 변환기
// ==========================================
pub struct FieldMapper {
    /// 표준 필드 → 열 인덱스 (0-based)
    column_of: BTreeMap<CanonicalField, usize>,
}

impl FieldMapper {
    /// 헤더 행에서 매퍼 구성
    pub fn from_headers(headers: &[String], dictionary: &SynonymDictionary) -> Self {
        let mut column_of = BTreeMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(field) = dictionary.resolve(header) {
                column_of.entry(field).or_insert(idx);
            }
        }
        Self { column_of }
    }

    /// 해석된 필드 수 (수집 품질 로그용)
    pub fn resolved_field_count(&self) -> usize {
        self.column_of.len()
    }

    /// 원본 데이터 행 → RawOrderRecord
    ///
    /// # 매개변수
    /// - row: 데이터 행
    /// - row_number: 원본 시트 기준 행 번호 (1-based, 오류 문맥용)
    pub fn map_row(&self, row: &[String], row_number: usize) -> ImportResult<RawOrderRecord> {
        Ok(RawOrderRecord {
            order_no: self.get_string(row, CanonicalField::OrderNo),
            sub_order_no: self.get_string(row, CanonicalField::SubOrderNo),
            mall_order_no: self.get_string(row, CanonicalField::MallOrderNo),
            product_name: self.get_string(row, CanonicalField::ProductName),
            option_name: self.get_string(row, CanonicalField::OptionName),
            quantity: self.parse_i64(row, CanonicalField::Quantity, row_number)?,
            product_code: self.get_string(row, CanonicalField::ProductCode),
            orderer_name: self.get_string(row, CanonicalField::OrdererName),
            recipient_name: self.get_string(row, CanonicalField::RecipientName),
            phone: self.get_string(row, CanonicalField::Phone),
            mobile: self.get_string(row, CanonicalField::Mobile),
            postal_code: self.get_string(row, CanonicalField::PostalCode),
            address: self.get_string(row, CanonicalField::Address),
            payment_amount: self.parse_i64(row, CanonicalField::PaymentAmount, row_number)?,
            cost: self.parse_i64(row, CanonicalField::Cost, row_number)?,
            shipping_cost: self.parse_i64(row, CanonicalField::ShippingCost, row_number)?,
            mall_name: self.get_string(row, CanonicalField::MallName),
            fulfillment_type: self.get_string(row, CanonicalField::FulfillmentType),
            ordered_at: self.parse_datetime(row, CanonicalField::OrderedAt, row_number)?,
            row_number,
        })
    }

    /// 문자열 필드 추출 (trim, 빈 값은 None)
    fn get_string(&self, row: &[String], field: CanonicalField) -> Option<String> {
        let idx = *self.column_of.get(&field)?;
        let value = row.get(idx)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// 정수 파싱 (천 단위 구분 기호 허용: "15,900")
    fn parse_i64(
        &self,
        row: &[String],
        field: CanonicalField,
        row_number: usize,
    ) -> ImportResult<Option<i64>> {
        match self.get_string(row, field) {
            None => Ok(None),
            Some(value) => {
                let cleaned = value.replace(',', "");
                // 일부 몰 내보내기는 금액을 "12000.0" 처럼 소수 표기
                let cleaned = cleaned.strip_suffix(".0").unwrap_or(&cleaned);
                cleaned.parse::<i64>().map(Some).map_err(|_| {
                    ImportError::TypeConversionError {
                        row: row_number,
                        field: field.key().to_string(),
                        message: format!("정수로 해석할 수 없습니다: {}", value),
                    }
                })
            }
        }
    }

    /// 일시 파싱 (YYYY-MM-DD HH:MM:SS, YYYY-MM-DD, YYYY/MM/DD HH:MM 호환)
    fn parse_datetime(
        &self,
        row: &[String],
        field: CanonicalField,
        row_number: usize,
    ) -> ImportResult<Option<NaiveDateTime>> {
        match self.get_string(row, field) {
            None => Ok(None),
            Some(value) => NaiveDateTime::parse_from_str(&value, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(&value, "%Y/%m/%d %H:%M"))
                .or_else(|_| {
                    NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
                })
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row_number,
                    field: field.key().to_string(),
                    message: format!("일시 형식 오류: {}", value),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_map_row_basic() {
        let mapper = FieldMapper::from_headers(
            &headers(&["주문번호", "수취인", "수량", "결제금액"]),
            &SynonymDictionary::empty(),
        );

        let record = mapper
            .map_row(&row(&["ORD-1", "이수취", "3", "15,900"]), 2)
            .unwrap();

        assert_eq!(record.order_no, Some("ORD-1".to_string()));
        assert_eq!(record.recipient_name, Some("이수취".to_string()));
        assert_eq!(record.quantity, Some(3));
        assert_eq!(record.payment_amount, Some(15900));
    }

    #[test]
    fn test_map_row_trims_and_empty_as_none() {
        let mapper = FieldMapper::from_headers(
            &headers(&["주문번호", "수취인"]),
            &SynonymDictionary::empty(),
        );

        let record = mapper.map_row(&row(&["  ORD-1  ", ""]), 2).unwrap();
        assert_eq!(record.order_no, Some("ORD-1".to_string()));
        assert_eq!(record.recipient_name, None);
    }

    #[test]
    fn test_map_row_invalid_number_reports_context() {
        let mapper = FieldMapper::from_headers(
            &headers(&["주문번호", "수량"]),
            &SynonymDictionary::empty(),
        );

        let result = mapper.map_row(&row(&["ORD-1", "세개"]), 7);
        match result {
            Err(ImportError::TypeConversionError { row, field, .. }) => {
                assert_eq!(row, 7);
                assert_eq!(field, "quantity");
            }
            other => panic!("TypeConversionError 를 기대했으나: {:?}", other),
        }
    }

    #[test]
    fn test_map_row_datetime_formats() {
        let mapper = FieldMapper::from_headers(
            &headers(&["주문번호", "주문일시"]),
            &SynonymDictionary::empty(),
        );

        let record = mapper
            .map_row(&row(&["ORD-1", "2026-08-20 10:30:00"]), 2)
            .unwrap();
        assert!(record.ordered_at.is_some());

        // 날짜만 있는 형식도 허용 (자정으로 해석)
        let record = mapper.map_row(&row(&["ORD-2", "2026-08-20"]), 3).unwrap();
        assert_eq!(
            record.ordered_at.unwrap().format("%H:%M:%S").to_string(),
            "00:00:00"
        );
    }

    #[test]
    fn test_short_row_is_not_an_error() {
        let mapper = FieldMapper::from_headers(
            &headers(&["주문번호", "수취인", "주소"]),
            &SynonymDictionary::empty(),
        );

        let record = mapper.map_row(&row(&["ORD-1"]), 2).unwrap();
        assert_eq!(record.address, None);
    }
}
