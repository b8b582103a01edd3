//! 문서 빌더 -- 조립된 패널과 통계를 대시보드 XML 트리로 렌더링합니다.
//!
//! 순수 변환이며 변환 로직도 I/O도 없습니다. 정적 프런트매터
//! (제목, 설명, 전역 입력), 실행 요약 블록, 그리고 패널별
//! 게이트된 검색 테이블을 순서대로 방출합니다.

use chrono::NaiveDate;

use crate::assemble::{HOST_FILTER_TOKEN, Panel, RunStats};
use crate::rule::RuleCategory;
use crate::xml::XmlElement;

/// 전역 시간 범위 입력 토큰
pub const TIME_PICKER_TOKEN: &str = "globalTimePicker";

/// 완성된 대시보드 엔티티
///
/// 한 번의 실행에서 생성되어 직렬화 외의 생명주기를 갖지 않습니다.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// 대시보드 제목
    pub title: String,
    /// 대시보드 설명
    pub description: String,
    /// 규칙 테이블이 모이는 패널 제목
    pub panel_title: String,
    /// 생성 날짜 (요약 블록에 표시)
    pub generated_on: NaiveDate,
    /// 순서가 고정된 패널 목록
    pub panels: Vec<Panel>,
    /// 실행 통계
    pub stats: RunStats,
}

/// 대시보드 문서 빌더
pub struct DocumentBuilder;

impl DocumentBuilder {
    /// 대시보드를 XML 요소 트리로 변환합니다.
    pub fn build(dashboard: &Dashboard) -> XmlElement {
        let mut form = XmlElement::new("form")
            .attr("version", "1.1")
            .child(XmlElement::new("label").text(&dashboard.title))
            .child(XmlElement::new("description").text(&dashboard.description))
            .child(Self::fieldset());

        form.push_child(Self::summary_row(dashboard));
        form.push_child(Self::panel_row(dashboard));
        form
    }

    /// 전역 입력 필드셋: 시간 범위 + 호스트 필터
    fn fieldset() -> XmlElement {
        XmlElement::new("fieldset")
            .attr("submitButton", "true")
            .child(
                XmlElement::new("input")
                    .attr("type", "time")
                    .attr("token", TIME_PICKER_TOKEN)
                    .child(XmlElement::new("label").text("Time range"))
                    .child(
                        XmlElement::new("default")
                            .child(XmlElement::new("earliest").text("-24h@h"))
                            .child(XmlElement::new("latest").text("now")),
                    ),
            )
            .child(
                XmlElement::new("input")
                    .attr("type", "text")
                    .attr("token", HOST_FILTER_TOKEN)
                    .child(
                        XmlElement::new("label")
                            .text("Added to all searches like: host=<value>"),
                    )
                    .child(XmlElement::new("default").text("*")),
            )
    }

    /// 실행 메타데이터와 통계를 담는 HTML 요약 블록
    fn summary_row(dashboard: &Dashboard) -> XmlElement {
        let stats = &dashboard.stats;
        let mut list = XmlElement::new("ul")
            .child(XmlElement::new("li").text(
                "Each search waits on the previous one to finish, so the panels run serially.",
            ))
            .child(XmlElement::new("li").text(
                "The host filter input is applied to every search as host=<value>. \
                 Use \"*\" to search all hosts.",
            ))
            .child(
                XmlElement::new("li")
                    .text(format!("Dashboard generation date: {}", dashboard.generated_on)),
            )
            .child(
                XmlElement::new("li")
                    .text(format!("Number of rules loaded: {}", stats.total)),
            )
            .child(XmlElement::new("li").text(format!(
                "Number of rules failing to convert: {}",
                stats.failed
            )))
            .child(XmlElement::new("li").text(format!(
                "Total number of rules converted: {}",
                stats.converted
            )));

        for category in [
            RuleCategory::DerivedCategory,
            RuleCategory::DerivedService,
            RuleCategory::Unclassified,
        ] {
            list.push_child(XmlElement::new("li").text(format!(
                "|---- {}: {}",
                category,
                stats.converted_by_category.get(category)
            )));
        }

        XmlElement::new("row").child(
            XmlElement::new("html")
                .child(XmlElement::new("h1").text(&dashboard.title))
                .child(list),
        )
    }

    /// 패널별 게이트된 검색 테이블을 담는 행
    fn panel_row(dashboard: &Dashboard) -> XmlElement {
        let mut panel = XmlElement::new("panel")
            .child(XmlElement::new("title").text(&dashboard.panel_title));

        for entry in &dashboard.panels {
            panel.push_child(Self::panel_table(entry));
        }

        XmlElement::new("row").child(panel)
    }

    /// 패널 하나의 테이블 요소
    ///
    /// 검색은 직전 패널의 완료 토큰에 의존하며(`depends`), 자신의 완료 시
    /// 다음 패널을 위한 토큰을 설정합니다.
    fn panel_table(panel: &Panel) -> XmlElement {
        let mut search = XmlElement::new("search");
        if let Some(depends_on) = &panel.depends_on {
            search = search.attr("depends", format!("${depends_on}$"));
        }
        search = search
            .child(
                XmlElement::new("done").child(
                    XmlElement::new("set")
                        .attr("token", &panel.done_token)
                        .text("done"),
                ),
            )
            .child(XmlElement::new("query").text(&panel.query))
            .child(XmlElement::new("earliest").text(format!("${TIME_PICKER_TOKEN}.earliest$")))
            .child(XmlElement::new("latest").text(format!("${TIME_PICKER_TOKEN}.latest$")));

        XmlElement::new("table")
            .child(XmlElement::new("title").text(&panel.title))
            .child(search)
            .child(
                XmlElement::new("option")
                    .attr("name", "drilldown")
                    .text("none"),
            )
            .child(
                XmlElement::new("option")
                    .attr("name", "refresh.display")
                    .text("progressbar"),
            )
    }
}
