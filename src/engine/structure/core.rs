use crate::domain::mapping::column_letter;
use crate::domain::types::CanonicalField;
use crate::engine::synonym::SynonymDictionary;
use std::collections::BTreeMap;
use thiserror::Error;

/// 헤더 행 판정 최소 밀도 (비어 있지 않은 셀 수)
pub const MIN_HEADER_DENSITY: usize = 3;

/// 미리보기로 돌려주는 데이터 행 수
const PREVIEW_ROW_LIMIT: usize = 5;

// ==========================================
// StructureError - 구조 오류
// ==========================================
// 해당 시트의 수집만 중단한다 (다른 목적지에 영향 없음)
#[derive(Error, Debug)]
pub enum StructureError {
    #[error("빈 시트: 분석할 행이 없습니다")]
    EmptySheet,

    #[error("헤더 행을 찾지 못했습니다 (최소 {MIN_HEADER_DENSITY}개 셀 필요)")]
    HeaderNotFound,

    #[error("강제 지정된 헤더 행 {0} 이 시트 범위를 벗어났습니다 (전체 {1}행)")]
    ForcedRowOutOfRange(u32, usize),
}

// ==========================================
// StructureReport - 구조 분석 결과
// ==========================================
#[derive(Debug, Clone)]
pub struct StructureReport {
    /// 헤더 행 (1-based)
    pub header_row: u32,
    /// 데이터 시작 행 (1-based, 항상 header_row + 1)
    pub data_start_row: u32,
    /// 헤더 행의 셀 텍스트 (trim 적용)
    pub headers: Vec<String>,
    /// 미리보기 데이터 행 (최대 PREVIEW_ROW_LIMIT)
    pub preview_rows: Vec<Vec<String>>,
    /// 제안 매핑: 표준 필드 → 출력 열 문자
    pub suggested_mappings: BTreeMap<CanonicalField, String>,
}

// ==========================================
// StructureAnalyzer - 구조 분석기
// ==========================================
pub struct StructureAnalyzer;

impl StructureAnalyzer {
    /// 그리드 구조 분석
    ///
    /// # 규칙
    /// - 헤더 행: 위에서부터 비어 있지 않은 셀이 MIN_HEADER_DENSITY 개 이상인
    ///   첫 번째 행. forced_header_row 가 있으면 그 행을 그대로 사용
    /// - 제안 매핑: 각 헤더를 동의어 사전으로 해석, 같은 필드로 해석되는
    ///   헤더가 중복되면 가장 왼쪽 열 유지
    /// - 같은 입력에 같은 강제 행을 주면 항상 같은 결과 (순수 함수)
    pub fn analyze(
        grid: &[Vec<String>],
        forced_header_row: Option<u32>,
        dictionary: &SynonymDictionary,
    ) -> Result<StructureReport, StructureError> {
        if grid.is_empty() {
            return Err(StructureError::EmptySheet);
        }

        let header_row = match forced_header_row {
            Some(row) => {
                if row < 1 || row as usize > grid.len() {
                    return Err(StructureError::ForcedRowOutOfRange(row, grid.len()));
                }
                row
            }
            None => Self::detect_header_row(grid)?,
        };

        let header_idx = (header_row - 1) as usize;
        let headers: Vec<String> = grid[header_idx]
            .iter()
            .map(|cell| cell.trim().to_string())
            .collect();

        let preview_rows: Vec<Vec<String>> = grid
            .iter()
            .skip(header_idx + 1)
            .take(PREVIEW_ROW_LIMIT)
            .cloned()
            .collect();

        // 헤더 해석: 같은 필드 중복 시 왼쪽 열 우선
        let mut suggested_mappings: BTreeMap<CanonicalField, String> = BTreeMap::new();
        for (col_idx, header) in headers.iter().enumerate() {
            if let Some(field) = dictionary.resolve(header) {
                suggested_mappings
                    .entry(field)
                    .or_insert_with(|| column_letter(col_idx + 1));
            }
        }

        Ok(StructureReport {
            header_row,
            data_start_row: header_row + 1,
            headers,
            preview_rows,
            suggested_mappings,
        })
    }

    /// 밀도 기반 헤더 행 탐지
    fn detect_header_row(grid: &[Vec<String>]) -> Result<u32, StructureError> {
        for (idx, row) in grid.iter().enumerate() {
            let non_empty = row.iter().filter(|cell| !cell.trim().is_empty()).count();
            if non_empty >= MIN_HEADER_DENSITY {
                return Ok((idx + 1) as u32);
            }
        }
        Err(StructureError::HeaderNotFound)
    }
}
