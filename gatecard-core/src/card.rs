//! Feishu interactive card document and the report-to-card formatter.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisReport, BranchKind, CheckedReport};
use crate::error::Result;
use crate::metrics::{PLACEHOLDER, format_conditions};

/// Card title shown in the header.
pub const CARD_TITLE: &str = "SonarQube 分析报告";
/// Status text for a passed quality gate.
pub const STATUS_PASSED: &str = "✅ 通过";
/// Status text for a failed quality gate.
pub const STATUS_FAILED: &str = "❌ 不通过";
/// Label of the dashboard button.
pub const DASHBOARD_BUTTON: &str = "📊 查看仪表盘";

const BUILD_INFO: &str = "**🔧 构建信息**\n\n- CI 检测：Gitlab CI\n- SCM 工具：Git";
const PADDING: &str = "12px 12px 12px 12px";
const TIMESTAMP_FORMAT: &str = "%Y/%-m/%-d %H:%M:%S";
const SONAR_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Plain text node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainText {
    /// Node tag, always `plain_text`.
    pub tag: String,
    /// Text content.
    pub content: String,
}

impl PlainText {
    fn new(content: impl Into<String>) -> Self {
        Self {
            tag: "plain_text".to_string(),
            content: content.into(),
        }
    }
}

/// Header color template.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardTheme {
    /// Passed quality gate.
    Green,
    /// Failed quality gate.
    Red,
}

impl CardTheme {
    /// Theme for a quality gate outcome.
    pub fn for_gate(passed: bool) -> Self {
        if passed { CardTheme::Green } else { CardTheme::Red }
    }
}

/// Per-client text size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSize {
    /// Fallback size.
    pub default: String,
    /// Desktop size.
    pub pc: String,
    /// Mobile size.
    pub mobile: String,
}

/// Named text sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSizes {
    /// Size used for normal body text.
    pub normal_v2: TextSize,
}

/// Card style block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStyle {
    /// Text sizes.
    pub text_size: TextSizes,
}

/// Card configuration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
    /// Whether updates apply to every recipient.
    pub update_multi: bool,
    /// Style overrides.
    pub style: CardStyle,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            update_multi: true,
            style: CardStyle {
                text_size: TextSizes {
                    normal_v2: TextSize {
                        default: "normal".to_string(),
                        pc: "normal".to_string(),
                        mobile: "heading".to_string(),
                    },
                },
            },
        }
    }
}

/// Card header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardHeader {
    /// Title line.
    pub title: PlainText,
    /// Subtitle line.
    pub subtitle: PlainText,
    /// Color template.
    pub template: CardTheme,
    /// CSS-style padding.
    pub padding: String,
}

/// Button behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Behavior {
    /// Open a URL in the browser.
    OpenUrl {
        /// Target URL.
        default_url: String,
    },
}

/// Body element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum CardElement {
    /// Markdown block.
    Markdown {
        /// Markdown source.
        content: String,
    },
    /// Action button.
    Button {
        /// Button label.
        text: PlainText,
        /// Button style (`primary`, `default`).
        #[serde(rename = "type")]
        kind: String,
        /// Width mode.
        width: String,
        /// Size.
        size: String,
        /// Actions on click.
        behaviors: Vec<Behavior>,
    },
}

impl CardElement {
    fn markdown(content: String) -> Self {
        CardElement::Markdown { content }
    }

    fn link_button(label: &str, url: &str) -> Self {
        CardElement::Button {
            text: PlainText::new(label),
            kind: "primary".to_string(),
            width: "default".to_string(),
            size: "medium".to_string(),
            behaviors: vec![Behavior::OpenUrl {
                default_url: url.to_string(),
            }],
        }
    }
}

/// Card body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardBody {
    /// Layout direction.
    pub direction: String,
    /// CSS-style padding.
    pub padding: String,
    /// Elements in display order.
    pub elements: Vec<CardElement>,
}

/// Card document (schema 2.0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card schema version.
    pub schema: String,
    /// Configuration block.
    pub config: CardConfig,
    /// Header.
    pub header: CardHeader,
    /// Body.
    pub body: CardBody,
}

/// Message posted to a Feishu custom bot webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationCard {
    /// Message type, always `interactive`.
    pub msg_type: String,
    /// Card payload.
    pub card: Card,
}

impl NotificationCard {
    /// Header theme of the card.
    pub fn theme(&self) -> CardTheme {
        self.card.header.template
    }
}

/// Formatting options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardOptions {
    /// Time zone the analysis timestamp is rendered in.
    pub utc_offset: FixedOffset,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            utc_offset: FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| Utc.fix()),
        }
    }
}

/// Render a SonarQube timestamp in the given offset, zh-CN style.
///
/// Absent timestamps render as the placeholder; unparsable ones verbatim.
pub fn format_analysed_at(raw: Option<&str>, offset: FixedOffset) -> String {
    let Some(raw) = raw else {
        return PLACEHOLDER.to_string();
    };
    DateTime::parse_from_str(raw, SONAR_TIMESTAMP)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|ts| ts.with_timezone(&offset).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Build the card for a report with default options.
pub fn build_card(report: &AnalysisReport) -> Result<NotificationCard> {
    build_card_with(report, &CardOptions::default())
}

/// Build the card for a report.
pub fn build_card_with(report: &AnalysisReport, options: &CardOptions) -> Result<NotificationCard> {
    let checked = report.validate()?;
    let passed = checked.passed();
    let status = if passed { STATUS_PASSED } else { STATUS_FAILED };

    let header = CardHeader {
        title: PlainText::new(CARD_TITLE),
        subtitle: PlainText::new(subtitle(&checked)),
        template: CardTheme::for_gate(passed),
        padding: PADDING.to_string(),
    };

    let elements = vec![
        CardElement::markdown(summary_markdown(&checked, status, options)),
        CardElement::markdown(format!(
            "**🧪 质量门条件详情：**\n\n{}",
            format_conditions(checked.conditions)
        )),
        CardElement::markdown(BUILD_INFO.to_string()),
        CardElement::link_button(DASHBOARD_BUTTON, checked.dashboard_url),
    ];

    Ok(NotificationCard {
        msg_type: "interactive".to_string(),
        card: Card {
            schema: "2.0".to_string(),
            config: CardConfig::default(),
            header,
            body: CardBody {
                direction: "vertical".to_string(),
                padding: PADDING.to_string(),
                elements,
            },
        },
    })
}

fn subtitle(report: &CheckedReport<'_>) -> String {
    match report.branch_kind {
        BranchKind::PullRequest => format!("{} · PR #{}", report.project_name, report.branch_name),
        BranchKind::Branch => format!("{} · {}", report.project_name, report.branch_name),
    }
}

fn summary_markdown(report: &CheckedReport<'_>, status: &str, options: &CardOptions) -> String {
    let time = format_analysed_at(report.analysed_at, options.utc_offset);
    let revision = report.revision.unwrap_or(PLACEHOLDER);
    format!(
        "**📌 分析摘要**\n\n- **项目**：{project}\n- **分支类型**：{kind}\n- **编号**：#{branch}\n- **提交版本**：{revision}\n- **状态**：{status}\n- **分析时间**：{time}\n- **质量门**：{status}",
        project = report.project_name,
        kind = report.branch_kind.label(),
        branch = report.branch_name,
    )
}
