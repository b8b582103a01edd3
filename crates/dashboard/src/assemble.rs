//! 순차 의존 조립기 -- 패널 체인과 실행 통계를 만드는 상태 기계
//!
//! 입력 순서대로 (규칙, 분류, 변환 결과)를 소비하여 패널 목록을 만듭니다.
//! 각 패널은 직전 패널의 완료 토큰에 의존하므로, 대시보드가 열릴 때
//! 검색이 하나씩 차례로 실행됩니다. 무거운 검색 수백 개가 동시에
//! 플랫폼을 때리지 않도록 하는 의도된 직렬화 설계입니다.
//!
//! # 상태 전이
//! ```text
//! AwaitingFirst --Converted--> Chaining(T0) --Converted--> Chaining(T1) ...
//!       |                          |
//!       +-------Failed-------------+   (상태 유지, 패널 없음, 실패 카운트만 증가)
//! ```

use serde::Serialize;

use crate::convert::ConversionOutcome;
use crate::rule::{RuleCategory, RuleFile};

/// 패널 쿼리에 삽입되는 호스트 필터 토큰
pub const HOST_FILTER_TOKEN: &str = "user_input_field_host";

/// 패널 완료 토큰 이름 (순번이 유일한 이름 소스)
pub fn done_token(index: usize) -> String {
    format!("searchNum_{index}")
}

/// 조립된 문서의 한 행 -- 게이트된 검색 테이블 하나
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// 표시 제목: `{분류} | {규칙 이름} | {규칙 제목}`
    pub title: String,
    /// 최종 쿼리 텍스트 (prepend + 호스트 필터 + 변환 쿼리 + append)
    pub query: String,
    /// 0 기반 순번 (입력 순회 순서 중 성공분)
    pub index: usize,
    /// 직전 패널의 완료 토큰 (첫 패널만 없음)
    pub depends_on: Option<String>,
    /// 이 패널이 완료 시 발행하는 토큰
    pub done_token: String,
}

/// 분류별 카운터
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    /// derived-category 규칙 수
    pub derived_category: u64,
    /// derived-service 규칙 수
    pub derived_service: u64,
    /// unclassified 규칙 수
    pub unclassified: u64,
}

impl CategoryCounts {
    fn increment(&mut self, category: RuleCategory) {
        match category {
            RuleCategory::DerivedCategory => self.derived_category += 1,
            RuleCategory::DerivedService => self.derived_service += 1,
            RuleCategory::Unclassified => self.unclassified += 1,
        }
    }

    /// 분류 하나의 카운트를 반환합니다.
    pub fn get(&self, category: RuleCategory) -> u64 {
        match category {
            RuleCategory::DerivedCategory => self.derived_category,
            RuleCategory::DerivedService => self.derived_service,
            RuleCategory::Unclassified => self.unclassified,
        }
    }

    /// 세 분류의 합을 반환합니다.
    pub fn sum(&self) -> u64 {
        self.derived_category + self.derived_service + self.unclassified
    }
}

/// 한 번의 실행에 대한 집계 통계
///
/// 조립기만이 이 값을 변경하며, [`SequenceAssembler::finish`] 이후에는
/// 읽기 전용입니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// 파싱에 성공하여 파이프라인에 들어온 규칙 수
    pub total: u64,
    /// 변환에 성공한 규칙 수 (= 패널 수)
    pub converted: u64,
    /// 변환에 실패한 규칙 수
    pub failed: u64,
    /// 분류별 규칙 수 (변환 결과와 무관)
    pub classified: CategoryCounts,
    /// 분류별 변환 성공 수
    pub converted_by_category: CategoryCounts,
    /// 분류별 변환 실패 수
    pub failed_by_category: CategoryCounts,
}

/// 체인 상태
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChainState {
    /// 아직 패널이 없음
    AwaitingFirst,
    /// 마지막으로 발행된 완료 토큰
    Chaining(String),
}

/// 순차 의존 조립기
///
/// 입력 순서가 곧 패널 순서입니다. 재정렬도 롤백도 없습니다.
pub struct SequenceAssembler {
    prepend: String,
    append: String,
    state: ChainState,
    panels: Vec<Panel>,
    stats: RunStats,
}

impl SequenceAssembler {
    /// 쿼리 앞뒤 조각을 고정하여 조립기를 생성합니다.
    pub fn new(prepend: &str, append: &str) -> Self {
        Self {
            prepend: prepend.to_owned(),
            append: append.to_owned(),
            state: ChainState::AwaitingFirst,
            panels: Vec::new(),
            stats: RunStats::default(),
        }
    }

    /// 규칙 하나의 처리 결과를 소비합니다. 입력 순서대로 호출해야 합니다.
    pub fn push(&mut self, file: &RuleFile, category: RuleCategory, outcome: ConversionOutcome) {
        self.stats.total += 1;
        self.stats.classified.increment(category);

        let query = match outcome {
            ConversionOutcome::Converted(query) => query,
            ConversionOutcome::Failed(reason) => {
                self.stats.failed += 1;
                self.stats.failed_by_category.increment(category);
                tracing::debug!(
                    rule = %file.name,
                    kind = reason.kind(),
                    "rule excluded from dashboard"
                );
                return;
            }
        };

        let index = self.panels.len();
        let depends_on = match &self.state {
            ChainState::AwaitingFirst => None,
            ChainState::Chaining(last_token) => Some(last_token.clone()),
        };
        let token = done_token(index);

        self.panels.push(Panel {
            title: format!("{} | {} | {}", category, file.name, file.rule.title),
            query: self.final_query(&query),
            index,
            depends_on,
            done_token: token.clone(),
        });
        self.state = ChainState::Chaining(token);

        self.stats.converted += 1;
        self.stats.converted_by_category.increment(category);
    }

    /// 조립을 종료하고 패널 목록과 통계를 반환합니다.
    pub fn finish(self) -> (Vec<Panel>, RunStats) {
        (self.panels, self.stats)
    }

    /// 최종 쿼리 텍스트를 만듭니다.
    ///
    /// 호스트 필터 토큰은 prepend 조각 바로 뒤의 고정 위치에 들어갑니다.
    fn final_query(&self, converted: &str) -> String {
        let mut query = String::new();
        if !self.prepend.is_empty() {
            query.push_str(&self.prepend);
            query.push(' ');
        }
        query.push_str(&format!("host=${HOST_FILTER_TOKEN}$ "));
        query.push_str(converted);
        if !self.append.is_empty() {
            query.push(' ');
            query.push_str(&self.append);
        }
        query
    }
}
