// ==========================================
// 통합 주문 발주 시스템 - 채널 재출력 열 파이프라인
// ==========================================
// 역할: 입력 열 목록을 출력 열 목록으로 재배치 (재정렬/삭제/상수 삽입)
// 적용 대상: 쇼핑몰 채널 재출력 목적지만 (제조사 발주서는 렌더러 직접 사용)
// 원칙:
// - 서술자 순서 = 출력 열 순서
// - 나열되지 않은 입력 열은 절대 통과되지 않는다 (골든 파일 대조 가능성)
// - 입력 열 범위를 벗어난 from 은 빈 문자열 (오류 아님)
// ==========================================

use crate::domain::mapping::{ExportColumn, ExportPipelineConfig};

// ==========================================
// ExportColumnPipeline - 열 재배치 파이프라인
// ==========================================
pub struct ExportColumnPipeline;

impl ExportColumnPipeline {
    /// 입력 그리드 재배치
    ///
    /// # 매개변수
    /// - grid: 원본 그리드 전체 (1행부터)
    /// - header_row: 분석 시점에 확정된 헤더 행 (1-based)
    ///
    /// # 동작
    /// - copy_prefix_rows 가 켜져 있으면 헤더 행 위의 행을 그대로 복사
    ///   (일부 채널이 요구하는 표지/제목 보존)
    /// - 헤더 행부터 마지막 행까지 서술자 목록대로 재배치
    pub fn apply(config: &ExportPipelineConfig, grid: &[Vec<String>], header_row: u32) -> Vec<Vec<String>> {
        let header_idx = (header_row.max(1) - 1) as usize;
        let mut output = Vec::with_capacity(grid.len());

        if config.copy_prefix_rows {
            for prefix_row in grid.iter().take(header_idx) {
                output.push(prefix_row.clone());
            }
        }

        for input_row in grid.iter().skip(header_idx) {
            output.push(Self::reshape_row(&config.columns, input_row));
        }

        output
    }

    /// 행 하나 재배치
    pub fn reshape_row(columns: &[ExportColumn], input_row: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|descriptor| match descriptor {
                ExportColumn::From { from } => {
                    // 1-based. 범위 밖이면 빈 문자열
                    if *from >= 1 {
                        input_row.get(from - 1).cloned().unwrap_or_default()
                    } else {
                        String::new()
                    }
                }
                ExportColumn::Const { value } => value.clone(),
            })
            .collect()
    }
}
