//! Splunk SPL 백엔드 -- Sigma 탐지 로직을 SPL 검색어로 번역합니다.
//!
//! 셀렉션 블록을 필드 매칭 검색어로 렌더링하고, 조건식을
//! 재귀 하강 파서로 해석하여 결합합니다.
//!
//! # 지원 범위
//! - 필드 수정자: `contains`, `startswith`, `endswith`, `all`
//! - 조건식: `and`, `or`, `not`, 괄호, `1 of X` / `all of X` / `... of them`
//! - 값: 스칼라, 값 목록 (OR 결합), null (`NOT field=*`)
//!
//! `re`, `base64` 계열 수정자, 집계 조건(`| count(...)`), `near`는
//! [`BackendError::Unsupported`]로 거부합니다.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::rule::{LogSource, SigmaRule};

use super::{BackendError, QueryBackend};

/// 로그 소스 정규화 파이프라인
///
/// 실행당 한 번 선택되며, 잘 알려진 이벤트 카테고리를
/// 플랫폼별 이벤트 필터로 사상합니다 (Sysmon EventCode 등).
#[derive(Debug, Clone, Default)]
pub struct NormalizationPipeline {
    /// category -> 이벤트 필터 SPL 조각
    category_filters: BTreeMap<String, String>,
}

impl NormalizationPipeline {
    /// 아무 필터도 더하지 않는 파이프라인
    pub fn passthrough() -> Self {
        Self::default()
    }

    /// Sysmon 이벤트 채널용 파이프라인
    ///
    /// Sigma의 공통 카테고리를 Sysmon EventCode 필터로 사상합니다.
    pub fn sysmon() -> Self {
        let mut category_filters = BTreeMap::new();
        for (category, event_code) in [
            ("process_creation", 1),
            ("network_connection", 3),
            ("driver_load", 6),
            ("image_load", 7),
            ("create_remote_thread", 8),
            ("process_access", 10),
            ("file_event", 11),
            ("registry_set", 13),
            ("dns_query", 22),
        ] {
            category_filters.insert(category.to_owned(), format!("EventCode={event_code}"));
        }
        Self { category_filters }
    }

    /// 로그 소스에 해당하는 이벤트 필터를 반환합니다.
    fn event_filter(&self, logsource: &LogSource) -> Option<&str> {
        logsource
            .category
            .as_deref()
            .and_then(|c| self.category_filters.get(c))
            .map(String::as_str)
    }
}

/// Splunk SPL 변환 백엔드
pub struct SplunkBackend {
    pipeline: NormalizationPipeline,
}

impl SplunkBackend {
    /// 지정한 정규화 파이프라인으로 백엔드를 생성합니다.
    pub fn new(pipeline: NormalizationPipeline) -> Self {
        Self { pipeline }
    }
}

impl QueryBackend for SplunkBackend {
    fn name(&self) -> &'static str {
        "splunk"
    }

    fn convert(&self, rule: &SigmaRule) -> Result<Vec<String>, BackendError> {
        let rendered = render_selections(&rule.detection.selections)?;

        let expr = ConditionParser::new(&rule.detection.condition).parse()?;
        let body = expr.to_spl(&rendered)?;

        let query = match self.pipeline.event_filter(&rule.logsource) {
            Some(filter) => format!("{filter} {body}"),
            None => body,
        };

        Ok(vec![query])
    }
}

// --- 셀렉션 렌더링 ---

/// 모든 셀렉션을 SPL 조각으로 렌더링합니다.
fn render_selections(
    selections: &BTreeMap<String, Value>,
) -> Result<BTreeMap<String, String>, BackendError> {
    let mut rendered = BTreeMap::new();
    for (name, value) in selections {
        rendered.insert(name.clone(), render_selection(name, value)?);
    }
    Ok(rendered)
}

/// 하나의 셀렉션 블록을 SPL 조각으로 렌더링합니다.
///
/// 매핑은 필드 매칭의 AND 결합, 매핑 목록은 OR 결합,
/// 스칼라 목록은 키워드 검색의 OR 결합입니다.
fn render_selection(name: &str, value: &Value) -> Result<String, BackendError> {
    match value {
        Value::Mapping(map) => render_field_map(name, map),
        Value::Sequence(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Mapping(map) => parts.push(render_field_map(name, map)?),
                    Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                        parts.push(format!("\"{}\"", escape_value(&scalar_to_string(item))));
                    }
                    _ => {
                        return Err(BackendError::Condition {
                            reason: format!(
                                "selection '{name}': list items must be mappings or scalars"
                            ),
                        });
                    }
                }
            }
            if parts.is_empty() {
                return Err(BackendError::Condition {
                    reason: format!("selection '{name}' is an empty list"),
                });
            }
            Ok(join_or(parts))
        }
        _ => Err(BackendError::Condition {
            reason: format!("selection '{name}' must be a mapping or a list"),
        }),
    }
}

/// 필드 매핑 하나를 AND 결합 SPL로 렌더링합니다.
fn render_field_map(
    selection: &str,
    map: &serde_yaml::Mapping,
) -> Result<String, BackendError> {
    // 키 순서를 고정해 출력이 결정적이 되도록 함
    let mut entries: Vec<(String, &Value)> = map
        .iter()
        .map(|(k, v)| {
            let key = k.as_str().map(str::to_owned).ok_or_else(|| {
                BackendError::Condition {
                    reason: format!("selection '{selection}': field keys must be strings"),
                }
            })?;
            Ok((key, v))
        })
        .collect::<Result<_, BackendError>>()?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut parts = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        parts.push(render_field(selection, &key, value)?);
    }
    if parts.is_empty() {
        return Err(BackendError::Condition {
            reason: format!("selection '{selection}' has an empty mapping"),
        });
    }
    Ok(join_and(parts))
}

/// `Field|modifier` 키 하나를 SPL 필드 매칭으로 렌더링합니다.
fn render_field(selection: &str, key: &str, value: &Value) -> Result<String, BackendError> {
    let mut parts = key.split('|');
    let field = parts.next().unwrap_or_default();
    let modifiers: Vec<&str> = parts.collect();

    if field.is_empty() {
        return Err(BackendError::Condition {
            reason: format!("selection '{selection}': empty field name in '{key}'"),
        });
    }

    let mut shape = ValueShape::Exact;
    let mut all_of_list = false;
    for modifier in &modifiers {
        match *modifier {
            "contains" => shape = ValueShape::Contains,
            "startswith" => shape = ValueShape::StartsWith,
            "endswith" => shape = ValueShape::EndsWith,
            "all" => all_of_list = true,
            "re" | "base64" | "base64offset" | "cidr" | "windash" | "lt" | "lte" | "gt"
            | "gte" => {
                return Err(BackendError::Unsupported {
                    feature: format!("field modifier '|{modifier}'"),
                });
            }
            other => {
                return Err(BackendError::Condition {
                    reason: format!("selection '{selection}': unknown modifier '|{other}'"),
                });
            }
        }
    }

    match value {
        Value::Sequence(items) => {
            if items.is_empty() {
                return Err(BackendError::Condition {
                    reason: format!("selection '{selection}': field '{field}' has an empty list"),
                });
            }
            let mut tests = Vec::with_capacity(items.len());
            for item in items {
                tests.push(render_single_test(selection, field, shape, item)?);
            }
            Ok(if all_of_list {
                join_and(tests)
            } else {
                join_or(tests)
            })
        }
        _ => render_single_test(selection, field, shape, value),
    }
}

/// 필드 하나, 스칼라 값 하나의 매칭을 렌더링합니다.
fn render_single_test(
    selection: &str,
    field: &str,
    shape: ValueShape,
    value: &Value,
) -> Result<String, BackendError> {
    match value {
        Value::Null => Ok(format!("NOT {field}=*")),
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            let raw = scalar_to_string(value);
            let escaped = escape_value(&raw);
            Ok(match shape {
                ValueShape::Exact => format!("{field}=\"{escaped}\""),
                ValueShape::Contains => format!("{field}=\"*{escaped}*\""),
                ValueShape::StartsWith => format!("{field}=\"{escaped}*\""),
                ValueShape::EndsWith => format!("{field}=\"*{escaped}\""),
            })
        }
        _ => Err(BackendError::Condition {
            reason: format!("selection '{selection}': field '{field}' has a non-scalar value"),
        }),
    }
}

/// 값 렌더링 형태 (수정자에서 결정)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueShape {
    Exact,
    Contains,
    StartsWith,
    EndsWith,
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// SPL 따옴표 문자열 내부 이스케이프
fn escape_value(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

fn join_and(parts: Vec<String>) -> String {
    if parts.len() == 1 {
        parts.into_iter().next().unwrap_or_default()
    } else {
        format!("({})", parts.join(" "))
    }
}

fn join_or(parts: Vec<String>) -> String {
    if parts.len() == 1 {
        parts.into_iter().next().unwrap_or_default()
    } else {
        format!("({})", parts.join(" OR "))
    }
}

// --- 조건식 파서 ---

/// 조건식 AST
#[derive(Debug, Clone, PartialEq, Eq)]
enum ConditionExpr {
    /// 셀렉션 이름 참조
    Selection(String),
    /// `1 of pattern` / `all of pattern` (pattern은 `*` 접미 와일드카드 또는 `them`)
    OfPattern { all: bool, pattern: String },
    And(Vec<ConditionExpr>),
    Or(Vec<ConditionExpr>),
    Not(Box<ConditionExpr>),
}

impl ConditionExpr {
    /// 렌더링된 셀렉션 테이블을 이용해 SPL로 전개합니다.
    fn to_spl(&self, rendered: &BTreeMap<String, String>) -> Result<String, BackendError> {
        match self {
            Self::Selection(name) => rendered.get(name).cloned().ok_or_else(|| {
                BackendError::Condition {
                    reason: format!("condition references unknown selection '{name}'"),
                }
            }),
            Self::OfPattern { all, pattern } => {
                let matched: Vec<String> = rendered
                    .iter()
                    .filter(|(name, _)| pattern_matches(pattern, name))
                    .map(|(_, spl)| spl.clone())
                    .collect();
                if matched.is_empty() {
                    return Err(BackendError::Condition {
                        reason: format!("'of {pattern}' matches no selection"),
                    });
                }
                Ok(if *all {
                    join_and(matched)
                } else {
                    join_or(matched)
                })
            }
            Self::And(terms) => {
                let parts = terms
                    .iter()
                    .map(|t| t.to_spl(rendered))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(join_and(parts))
            }
            Self::Or(terms) => {
                let parts = terms
                    .iter()
                    .map(|t| t.to_spl(rendered))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(join_or(parts))
            }
            Self::Not(inner) => {
                let body = inner.to_spl(rendered)?;
                if body.starts_with('(') {
                    Ok(format!("NOT {body}"))
                } else {
                    Ok(format!("NOT ({body})"))
                }
            }
        }
    }
}

/// `prefix*` 또는 `them` 패턴 매칭
fn pattern_matches(pattern: &str, name: &str) -> bool {
    if pattern == "them" {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => name.starts_with(prefix),
        None => name == pattern,
    }
}

/// 조건식 재귀 하강 파서
///
/// 문법:
/// ```text
/// expr     := and_expr ('or' and_expr)*
/// and_expr := not_expr ('and' not_expr)*
/// not_expr := 'not' not_expr | primary
/// primary  := '(' expr ')' | ('1'|'any'|'all') 'of' pattern | ident
/// ```
struct ConditionParser<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> ConditionParser<'a> {
    fn new(condition: &'a str) -> Self {
        let tokens = condition
            .split_whitespace()
            .flat_map(split_parens)
            .collect();
        Self { tokens, pos: 0 }
    }

    fn parse(mut self) -> Result<ConditionExpr, BackendError> {
        if self.tokens.iter().any(|t| *t == "|") {
            return Err(BackendError::Unsupported {
                feature: "aggregation condition".to_owned(),
            });
        }
        if self.tokens.iter().any(|t| *t == "near") {
            return Err(BackendError::Unsupported {
                feature: "'near' temporal correlation".to_owned(),
            });
        }
        if self.tokens.is_empty() {
            return Err(BackendError::Condition {
                reason: "empty condition".to_owned(),
            });
        }

        let expr = self.parse_or()?;
        if self.pos != self.tokens.len() {
            return Err(BackendError::Condition {
                reason: format!(
                    "unexpected token '{}' after end of condition",
                    self.tokens[self.pos]
                ),
            });
        }
        Ok(expr)
    }

    fn parse_or(&mut self) -> Result<ConditionExpr, BackendError> {
        let mut terms = vec![self.parse_and()?];
        while self.peek() == Some("or") {
            self.pos += 1;
            terms.push(self.parse_and()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            ConditionExpr::Or(terms)
        })
    }

    fn parse_and(&mut self) -> Result<ConditionExpr, BackendError> {
        let mut terms = vec![self.parse_not()?];
        while self.peek() == Some("and") {
            self.pos += 1;
            terms.push(self.parse_not()?);
        }
        Ok(if terms.len() == 1 {
            terms.remove(0)
        } else {
            ConditionExpr::And(terms)
        })
    }

    fn parse_not(&mut self) -> Result<ConditionExpr, BackendError> {
        if self.peek() == Some("not") {
            self.pos += 1;
            let inner = self.parse_not()?;
            return Ok(ConditionExpr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<ConditionExpr, BackendError> {
        match self.next() {
            Some("(") => {
                let expr = self.parse_or()?;
                match self.next() {
                    Some(")") => Ok(expr),
                    other => Err(BackendError::Condition {
                        reason: format!("expected ')', found {other:?}"),
                    }),
                }
            }
            Some(count @ ("1" | "any" | "all")) => {
                if self.next() != Some("of") {
                    return Err(BackendError::Condition {
                        reason: format!("expected 'of' after '{count}'"),
                    });
                }
                let pattern = self.next().ok_or_else(|| BackendError::Condition {
                    reason: "expected selection pattern after 'of'".to_owned(),
                })?;
                Ok(ConditionExpr::OfPattern {
                    all: count == "all",
                    pattern: pattern.to_owned(),
                })
            }
            Some(token) if token.parse::<u64>().is_ok() => Err(BackendError::Unsupported {
                feature: format!("'{token} of' quantifier (only 1/any/all supported)"),
            }),
            Some(token) if is_identifier(token) => {
                Ok(ConditionExpr::Selection(token.to_owned()))
            }
            Some(token) => Err(BackendError::Condition {
                reason: format!("unexpected token '{token}'"),
            }),
            None => Err(BackendError::Condition {
                reason: "unexpected end of condition".to_owned(),
            }),
        }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }
}

/// 괄호를 독립 토큰으로 분리합니다.
fn split_parens(word: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = word;
    while let Some(stripped) = rest.strip_prefix('(') {
        out.push("(");
        rest = stripped;
    }
    let mut suffix_count = 0;
    while let Some(stripped) = rest.strip_suffix(')') {
        suffix_count += 1;
        rest = stripped;
    }
    if !rest.is_empty() {
        out.push(rest);
    }
    out.extend(std::iter::repeat_n(")", suffix_count));
    out
}

fn is_identifier(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '*')
}
