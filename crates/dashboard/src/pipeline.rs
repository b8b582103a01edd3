//! 파이프라인 오케스트레이션 -- 로딩/분류/변환/조립/직렬화의 전체 흐름
//!
//! 흐름은 단방향입니다:
//! ```text
//! RuleLoader -> classify -> ConversionAdapter -> SequenceAssembler
//!            -> DocumentBuilder -> XmlElement -> persist
//! ```
//!
//! 파이프라인은 의도적으로 단일 스레드, 순차 실행입니다. 패널 토큰이
//! 입력 순서에 묶여 있으므로 병렬 변환은 순서 모호성만 더합니다.

use chrono::Local;

use sigmadash_core::config::DashboardConfig;

use crate::assemble::{RunStats, SequenceAssembler};
use crate::backend::{NormalizationPipeline, QueryBackend, SplunkBackend};
use crate::convert::ConversionAdapter;
use crate::document::{Dashboard, DocumentBuilder};
use crate::error::DashboardError;
use crate::rule::{RuleLoader, classify};
use crate::xml;

/// 대시보드 생성 파이프라인
///
/// # 사용 예시
/// ```no_run
/// # async fn example() -> Result<(), sigmadash_dashboard::DashboardError> {
/// use sigmadash_core::config::DashboardConfig;
/// use sigmadash_dashboard::DashboardPipeline;
///
/// let config = DashboardConfig::default();
/// let stats = DashboardPipeline::with_splunk_backend(config).run().await?;
/// println!("converted {} of {} rules", stats.converted, stats.total);
/// # Ok(())
/// # }
/// ```
pub struct DashboardPipeline<B: QueryBackend> {
    config: DashboardConfig,
    adapter: ConversionAdapter<B>,
}

impl DashboardPipeline<SplunkBackend> {
    /// Sysmon 정규화 파이프라인을 쓰는 Splunk 백엔드로 구성합니다.
    pub fn with_splunk_backend(config: DashboardConfig) -> Self {
        Self::new(
            config,
            SplunkBackend::new(NormalizationPipeline::sysmon()),
        )
    }
}

impl<B: QueryBackend> DashboardPipeline<B> {
    /// 지정한 백엔드로 파이프라인을 구성합니다.
    ///
    /// 백엔드(및 그 정규화 파이프라인)는 실행당 한 번 선택되며
    /// 규칙마다 재구성되지 않습니다.
    pub fn new(config: DashboardConfig, backend: B) -> Self {
        Self {
            config,
            adapter: ConversionAdapter::new(backend),
        }
    }

    /// 전체 파이프라인을 실행하고 출력 파일을 기록합니다.
    ///
    /// # Errors
    /// - 규칙 디렉토리가 없는 경우 (규칙 처리 전 치명적)
    /// - 백엔드의 예기치 않은 실패
    /// - 출력 파일 쓰기 실패 (메모리 조립 완료 후)
    pub async fn run(&self) -> Result<RunStats, DashboardError> {
        let (bytes, stats) = self.generate().await?;

        xml::persist(&bytes, &self.config.output_path).await?;

        tracing::info!(
            output = %self.config.output_path,
            total = stats.total,
            converted = stats.converted,
            failed = stats.failed,
            "dashboard written"
        );
        Ok(stats)
    }

    /// 문서를 조립하고 직렬화하되 디스크에는 쓰지 않습니다.
    pub async fn generate(&self) -> Result<(Vec<u8>, RunStats), DashboardError> {
        let rules = RuleLoader::load_directory(&self.config.rule_dir).await?;
        tracing::info!(
            rule_dir = %self.config.rule_dir,
            count = rules.len(),
            "loaded rule files"
        );

        let mut assembler =
            SequenceAssembler::new(&self.config.prepend_query, &self.config.append_query);

        for file in &rules {
            let category = classify(file);
            let outcome = self.adapter.convert(file)?;
            assembler.push(file, category, outcome);
        }

        let (panels, stats) = assembler.finish();

        let dashboard = Dashboard {
            title: self.config.title.clone(),
            description: self.config.description.clone(),
            panel_title: self.config.panel_title.clone(),
            generated_on: Local::now().date_naive(),
            panels,
            stats: stats.clone(),
        };

        let tree = DocumentBuilder::build(&dashboard);
        Ok((tree.to_bytes(), stats))
    }
}
