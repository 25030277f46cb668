// ==========================================
// 통합 주문 발주 시스템 - 주문 수집 오케스트레이터
// ==========================================
// 흐름: 파일 파싱 → 구조 분석 → 필드 매핑 → 정규화 → 분류 →
//       제외 판정 → 저장
// 원칙:
// - 행 단위 타입 변환 실패는 기록하고 건너뛴다 (파일 전체를 중단하지 않음)
// - 구조 오류(헤더 미탐지 등)는 해당 파일만 중단
// - 재수집 멱등성: 같은 order_no 는 INSERT OR IGNORE 로 무시
// ==========================================

use crate::engine::classify::ClassificationEngine;
use crate::engine::exclusion::ExclusionFilter;
use crate::engine::structure::{StructureAnalyzer, StructureReport};
use crate::engine::synonym::SynonymDictionary;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::repository::order_repo::OrderRepository;
use chrono::Utc;
use std::path::Path;
use tracing::{info, warn};

// ==========================================
// ImportSummary - 수집 결과 요약
// ==========================================
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ImportSummary {
    /// 데이터 행 전체 수 (헤더 이후)
    pub total_rows: usize,
    /// 신규 저장 건수
    pub imported: usize,
    /// 건너뛴 행 수 (변환 실패 / 주문번호 누락 / 기존 주문)
    pub skipped: usize,
    /// 발송 제외 플래그가 붙은 건수
    pub excluded: usize,
    /// 제조사가 판정된 건수
    pub classified: usize,
    /// 행 단위 오류 메시지 (행 번호 포함)
    pub errors: Vec<String>,
}

// ==========================================
// OrderImporter - 수집 오케스트레이터
// ==========================================
// 엔진(분류/제외/사전)은 호출 시점 상태로 주입받는다.
// 설정 적재는 api 계층 담당.
pub struct OrderImporter<'a> {
    dictionary: &'a SynonymDictionary,
    classifier: &'a ClassificationEngine,
    exclusion: &'a ExclusionFilter,
}

impl<'a> OrderImporter<'a> {
    pub fn new(
        dictionary: &'a SynonymDictionary,
        classifier: &'a ClassificationEngine,
        exclusion: &'a ExclusionFilter,
    ) -> Self {
        Self {
            dictionary,
            classifier,
            exclusion,
        }
    }

    /// 구조 미리보기 (저장 없음)
    ///
    /// 매핑 규칙 편집 화면이 헤더/미리보기/제안 매핑을 얻는 경로.
    pub fn analyze_file(
        &self,
        file_path: &Path,
        forced_header_row: Option<u32>,
    ) -> ImportResult<StructureReport> {
        let grid = UniversalFileParser.parse(file_path)?;
        let report = StructureAnalyzer::analyze(&grid, forced_header_row, self.dictionary)?;
        Ok(report)
    }

    /// 파일 수집 실행
    pub fn import_file(
        &self,
        file_path: &Path,
        forced_header_row: Option<u32>,
        order_repo: &OrderRepository,
    ) -> ImportResult<ImportSummary> {
        info!(file = %file_path.display(), "주문 파일 수집 시작");

        let grid = UniversalFileParser.parse(file_path)?;
        let report = StructureAnalyzer::analyze(&grid, forced_header_row, self.dictionary)?;
        let mapper = FieldMapper::from_headers(&report.headers, self.dictionary);
        info!(
            header_row = report.header_row,
            resolved_fields = mapper.resolved_field_count(),
            "시트 구조 분석 완료"
        );

        let mut summary = ImportSummary::default();
        let mut records = Vec::new();
        let now = Utc::now();

        let data_start_idx = (report.data_start_row - 1) as usize;
        for (offset, row) in grid.iter().skip(data_start_idx).enumerate() {
            let row_number = data_start_idx + offset + 1;

            // 완전히 빈 행은 집계에서 제외
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            summary.total_rows += 1;

            // 행 단위 변환 실패는 기록 후 다음 행으로
            let raw = match mapper.map_row(row, row_number) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(row = row_number, error = %e, "행 변환 실패, 건너뜀");
                    summary.errors.push(e.to_string());
                    summary.skipped += 1;
                    continue;
                }
            };

            let mut record = match raw.into_canonical(now) {
                Some(record) => record,
                None => {
                    summary
                        .errors
                        .push(crate::importer::error::ImportError::OrderNoMissing(row_number).to_string());
                    summary.skipped += 1;
                    continue;
                }
            };

            record.manufacturer_id = self.classifier.classify(&record);
            if record.manufacturer_id.is_some() {
                summary.classified += 1;
            }

            record.excluded = record
                .fulfillment_type
                .as_deref()
                .map(|t| self.exclusion.is_excluded(t))
                .unwrap_or(false);
            if record.excluded {
                summary.excluded += 1;
            }

            records.push(record);
        }

        let inserted = order_repo.insert_orders_ignore_existing(&records)?;
        // 기존 주문번호와 겹쳐 무시된 건도 건너뜀으로 집계
        summary.skipped += records.len() - inserted;
        summary.imported = inserted;

        info!(
            total = summary.total_rows,
            imported = summary.imported,
            skipped = summary.skipped,
            excluded = summary.excluded,
            classified = summary.classified,
            "주문 파일 수집 완료"
        );
        Ok(summary)
    }
}
