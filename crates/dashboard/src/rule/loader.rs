//! 규칙 파일 로더 -- YAML 규칙 파일을 디스크에서 로드합니다.
//!
//! 규칙 디렉토리를 재귀적으로 스캔하고 `.yml`/`.yaml` 파일을 파싱합니다.
//! 발견된 파일은 전체 경로 기준으로 정렬하여 처리 순서를 결정적으로 만듭니다.
//! 개별 파일 파싱 실패는 경고 로그를 남기고 건너뜁니다.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::DashboardError;

use super::types::{RuleFile, SigmaRule};

/// 규칙 파일 크기 상한 (이보다 큰 파일은 경고 후 건너뜀)
const MAX_RULE_FILE_SIZE: u64 = 1024 * 1024; // 1MB

/// 규칙 파일 로더
pub struct RuleLoader;

impl RuleLoader {
    /// 디렉토리에서 모든 YAML 규칙 파일을 재귀적으로 로드합니다.
    ///
    /// `.yml` 또는 `.yaml` 확장자를 가진 파일만 처리하며,
    /// 발견 순서는 전체 경로의 사전순으로 고정됩니다. 디렉토리 열거 순서는
    /// 플랫폼마다 다르므로 토큰 체인과 출력 재현성을 위해 정렬이 필요합니다.
    ///
    /// 개별 파일 로딩 실패는 경고 로그를 남기고 건너뜁니다.
    ///
    /// # Errors
    /// - 규칙 디렉토리가 없거나 디렉토리가 아닌 경우
    pub async fn load_directory(dir: impl AsRef<Path>) -> Result<Vec<RuleFile>, DashboardError> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(DashboardError::RuleSource {
                path: dir.display().to_string(),
                reason: "no such directory".to_owned(),
            });
        }

        let paths = Self::discover(dir);
        tracing::debug!(
            count = paths.len(),
            dir = %dir.display(),
            "discovered rule files"
        );

        let mut rules = Vec::new();
        for path in paths {
            match Self::load_file(&path).await {
                Ok(rule) => rules.push(rule),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load rule file, skipping"
                    );
                }
            }
        }

        Ok(rules)
    }

    /// 디렉토리 트리에서 YAML 규칙 파일 경로를 수집하고 정렬합니다.
    pub fn discover(dir: &Path) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read directory entry, skipping");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .is_some_and(|ext| ext == "yml" || ext == "yaml")
            })
            .collect();
        paths.sort();
        paths
    }

    /// 단일 규칙 파일을 로드하고 검증합니다.
    ///
    /// # Errors
    /// - 파일 크기가 `MAX_RULE_FILE_SIZE`를 초과하는 경우
    /// - YAML 파싱 또는 규칙 검증에 실패하는 경우
    pub async fn load_file(path: &Path) -> Result<RuleFile, DashboardError> {
        let metadata = tokio::fs::metadata(path).await?;
        if metadata.len() > MAX_RULE_FILE_SIZE {
            return Err(DashboardError::RuleParse {
                path: path.display().to_string(),
                reason: format!(
                    "file too large: {} bytes (max: {MAX_RULE_FILE_SIZE})",
                    metadata.len()
                ),
            });
        }

        let content = tokio::fs::read_to_string(path).await?;
        let rule: SigmaRule =
            serde_yaml::from_str(&content).map_err(|e| DashboardError::RuleParse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        rule.validate(&name)?;

        Ok(RuleFile {
            name,
            path: path.to_path_buf(),
            rule,
        })
    }
}
