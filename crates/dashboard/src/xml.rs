//! XML 요소 트리와 결정적 직렬화
//!
//! 대시보드 문서를 표현하기 위한 최소한의 요소 트리입니다.
//! 동일한 트리는 항상 동일한 바이트로 직렬화됩니다 (탭 들여쓰기,
//! 속성은 삽입 순서 유지). 라운드트립 테스트와 출력 재현성이
//! 이 결정성에 의존합니다.

use std::path::Path;

use crate::error::DashboardError;

/// XML 요소 하나
///
/// 속성은 삽입 순서를 유지하는 벡터로 보관합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attrs: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// 빈 요소를 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// 속성을 추가합니다 (빌더 스타일).
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    /// 텍스트 내용을 설정합니다 (빌더 스타일).
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// 자식 요소를 덧붙입니다 (빌더 스타일).
    pub fn child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// 자식 요소를 제자리에서 덧붙입니다.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// 트리를 문자열로 직렬화합니다.
    ///
    /// 탭 들여쓰기, 요소당 한 줄. 텍스트만 있는 요소는
    /// `<name>text</name>` 형태의 한 줄로 출력됩니다.
    /// XML 선언(`<?xml ...?>`)은 출력하지 않습니다.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out, 0);
        out
    }

    /// 트리를 바이트로 직렬화합니다.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize().into_bytes()
    }

    fn write_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push('\t');
        }
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            escape_into(value, out, true);
            out.push('"');
        }

        match (&self.text, self.children.is_empty()) {
            (None, true) => {
                out.push_str("/>\n");
            }
            (Some(text), true) => {
                out.push('>');
                escape_into(text, out, false);
                out.push_str("</");
                out.push_str(&self.name);
                out.push_str(">\n");
            }
            (text, false) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    for _ in 0..=depth {
                        out.push('\t');
                    }
                    escape_into(text, out, false);
                    out.push('\n');
                }
                for child in &self.children {
                    child.write_into(out, depth + 1);
                }
                for _ in 0..depth {
                    out.push('\t');
                }
                out.push_str("</");
                out.push_str(&self.name);
                out.push_str(">\n");
            }
        }
    }
}

/// XML 특수문자 이스케이프
fn escape_into(raw: &str, out: &mut String, attr: bool) {
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// 직렬화된 문서를 디스크에 기록합니다.
///
/// # Errors
/// 쓰기 실패는 [`DashboardError::Write`]로 보고되며 치명적입니다.
/// 이 시점에는 메모리 조립이 모두 끝나 있으므로 손실은 출력 쓰기에 한정됩니다.
pub async fn persist(bytes: &[u8], path: impl AsRef<Path>) -> Result<(), DashboardError> {
    let path = path.as_ref();
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| DashboardError::Write {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_element_is_self_closing() {
        let el = XmlElement::new("label");
        assert_eq!(el.serialize(), "<label/>\n");
    }

    #[test]
    fn text_element_on_one_line() {
        let el = XmlElement::new("label").text("My Dashboard");
        assert_eq!(el.serialize(), "<label>My Dashboard</label>\n");
    }

    #[test]
    fn attributes_keep_insertion_order() {
        let el = XmlElement::new("form").attr("version", "1.1").attr("theme", "dark");
        assert_eq!(el.serialize(), "<form version=\"1.1\" theme=\"dark\"/>\n");
    }

    #[test]
    fn children_are_tab_indented() {
        let el = XmlElement::new("form")
            .attr("version", "1.1")
            .child(XmlElement::new("label").text("Title"))
            .child(
                XmlElement::new("fieldset")
                    .attr("submitButton", "true")
                    .child(XmlElement::new("input").attr("type", "time")),
            );
        let expected = "<form version=\"1.1\">\n\
            \t<label>Title</label>\n\
            \t<fieldset submitButton=\"true\">\n\
            \t\t<input type=\"time\"/>\n\
            \t</fieldset>\n\
            </form>\n";
        assert_eq!(el.serialize(), expected);
    }

    #[test]
    fn document_starts_without_xml_declaration() {
        let el = XmlElement::new("form")
            .attr("version", "1.1")
            .child(XmlElement::new("label").text("T"));
        let out = el.serialize();
        assert!(out.starts_with("<form "));
        assert!(!out.contains("<?xml"));
    }

    #[test]
    fn apostrophes_pass_through_unescaped() {
        let el = XmlElement::new("query")
            .attr("note", "it's quoted")
            .text("CommandLine=\"*don't*\"");
        let out = el.serialize();
        assert!(out.contains("note=\"it's quoted\""));
        assert!(out.contains("*don't*"));
        assert!(!out.contains("&apos;"));
    }

    #[test]
    fn special_characters_are_escaped() {
        let el = XmlElement::new("query").text(r#"a < b & host="*""#);
        assert_eq!(
            el.serialize(),
            "<query>a &lt; b &amp; host=\"*\"</query>\n"
        );
    }

    #[test]
    fn attribute_quotes_are_escaped() {
        let el = XmlElement::new("search").attr("depends", "$a\"b$");
        assert_eq!(el.serialize(), "<search depends=\"$a&quot;b$\"/>\n");
    }

    #[test]
    fn serialization_is_deterministic() {
        let build = || {
            XmlElement::new("row")
                .child(XmlElement::new("panel").child(XmlElement::new("title").text("X")))
        };
        assert_eq!(build().serialize(), build().serialize());
    }

    #[tokio::test]
    async fn persist_writes_bytes() {
        let dir = tempfile::tempdir().expect("create tempdir");
        let path = dir.path().join("dashboard.xml");
        let el = XmlElement::new("form").child(XmlElement::new("label").text("T"));

        persist(&el.to_bytes(), &path).await.unwrap();

        let written = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(written, el.serialize());
    }

    #[tokio::test]
    async fn persist_to_unwritable_path_is_fatal() {
        let el = XmlElement::new("form");
        let result = persist(&el.to_bytes(), "/nonexistent/dir/dashboard.xml").await;
        assert!(matches!(result, Err(DashboardError::Write { .. })));
    }
}
