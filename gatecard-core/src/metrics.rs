//! Metric naming, rating grades and condition line formatting.

use crate::domain::Condition;

/// Placeholder shown when a value or threshold is absent.
pub const PLACEHOLDER: &str = "无";

/// Display names for SonarQube metric keys.
pub const METRIC_NAMES: &[(&str, &str)] = &[
    ("new_reliability_rating", "可靠性等级"),
    ("new_security_rating", "安全等级"),
    ("new_maintainability_rating", "可维护性等级"),
    ("new_coverage", "新增代码覆盖率"),
    ("new_duplicated_lines_density", "新增重复率"),
    ("new_security_hotspots_reviewed", "安全热点审查率"),
    ("new_violations", "新增问题数"),
    ("new_bugs", "新增缺陷"),
    ("new_vulnerabilities", "新增漏洞"),
    ("new_code_smells", "新增代码异味"),
    ("coverage", "代码覆盖率"),
    ("duplicated_lines_density", "重复率"),
];

/// Metrics whose values are scores to be shown as letter grades.
pub const RATING_METRICS: &[&str] = &[
    "new_reliability_rating",
    "new_security_rating",
    "new_maintainability_rating",
];

/// Upper bound (inclusive) of each grade band; the first band starts at 0.
pub const RATING_SCALE: &[(f64, &str)] = &[(1.0, "A"), (2.0, "B"), (3.0, "C"), (4.0, "D")];

/// Grade for scores outside every band.
pub const FAILING_GRADE: &str = "F";

/// Condition status icons.
pub const ICON_OK: &str = "✅";
/// Icon for a failed condition.
pub const ICON_ERROR: &str = "❌";
/// Icon for a condition without a value.
pub const ICON_NO_VALUE: &str = "⚪️";
/// Icon for an unrecognised status.
pub const ICON_UNKNOWN: &str = "❔";

/// Human-readable name for a metric, or the key itself when unmapped.
pub fn display_name(metric: &str) -> &str {
    METRIC_NAMES
        .iter()
        .find(|(key, _)| *key == metric)
        .map(|(_, name)| *name)
        .unwrap_or(metric)
}

/// Icon for a condition status.
pub fn status_icon(status: Option<&str>) -> &'static str {
    match status {
        Some("OK") => ICON_OK,
        Some("ERROR") => ICON_ERROR,
        Some("NO_VALUE") => ICON_NO_VALUE,
        _ => ICON_UNKNOWN,
    }
}

/// Whether a metric is reported as a rating score.
pub fn is_rating_metric(metric: &str) -> bool {
    RATING_METRICS.contains(&metric)
}

/// Map a rating score to its letter grade.
pub fn letter_grade(score: f64) -> &'static str {
    if score.is_nan() || score < 0.0 {
        return FAILING_GRADE;
    }
    RATING_SCALE
        .iter()
        .find(|(upper, _)| score <= *upper)
        .map(|(_, grade)| *grade)
        .unwrap_or(FAILING_GRADE)
}

/// Leading integer of a numeric string, truncating any fractional part.
///
/// `"2.9"` yields 2 and `"-1"` yields -1; input without leading digits
/// yields `None`.
pub fn integer_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits = rest
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(idx, _)| &rest[..idx])
        .unwrap_or(rest);
    digits.parse::<i64>().ok().map(|value| sign * value)
}

fn rating_value(raw: Option<&str>) -> &'static str {
    raw.and_then(integer_prefix)
        .map(|score| letter_grade(score as f64))
        .unwrap_or(FAILING_GRADE)
}

fn plain_value(raw: Option<&str>) -> &str {
    raw.filter(|value| !value.is_empty()).unwrap_or(PLACEHOLDER)
}

/// Format one condition as a markdown list item.
pub fn format_condition(condition: &Condition) -> String {
    let name = display_name(&condition.metric);
    let icon = status_icon(condition.status.as_deref());
    let value = condition.value.as_deref();
    let threshold = condition.error_threshold.as_deref();
    let (value, threshold) = if is_rating_metric(&condition.metric) {
        (rating_value(value), rating_value(threshold))
    } else {
        (plain_value(value), plain_value(threshold))
    };
    format!("- {icon} **{name}**  当前值: {value}  阈值: {threshold}")
}

/// Format all conditions, preserving their order, separated by blank lines.
pub fn format_conditions(conditions: &[Condition]) -> String {
    conditions
        .iter()
        .map(format_condition)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(metric: &str, status: &str, value: Option<&str>, threshold: Option<&str>) -> Condition {
        Condition {
            metric: metric.to_string(),
            operator: Some("GREATER_THAN".to_string()),
            status: Some(status.to_string()),
            value: value.map(String::from),
            error_threshold: threshold.map(String::from),
        }
    }

    #[test]
    fn letter_grade_bands_are_upper_inclusive() {
        let cases = [
            (0.0, "A"),
            (1.0, "A"),
            (1.5, "B"),
            (2.0, "B"),
            (2.5, "C"),
            (3.0, "C"),
            (3.5, "D"),
            (4.0, "D"),
            (5.0, "F"),
            (-1.0, "F"),
            (f64::NAN, "F"),
        ];
        for (score, expected) in cases {
            assert_eq!(letter_grade(score), expected, "score {score}");
        }
    }

    #[test]
    fn integer_prefix_truncates() {
        assert_eq!(integer_prefix("2"), Some(2));
        assert_eq!(integer_prefix("2.9"), Some(2));
        assert_eq!(integer_prefix("  3abc"), Some(3));
        assert_eq!(integer_prefix("-1"), Some(-1));
        assert_eq!(integer_prefix("+4"), Some(4));
        assert_eq!(integer_prefix(".5"), None);
        assert_eq!(integer_prefix(""), None);
        assert_eq!(integer_prefix("n/a"), None);
    }

    #[test]
    fn status_icons_cover_known_and_unknown() {
        assert_eq!(status_icon(Some("OK")), "✅");
        assert_eq!(status_icon(Some("ERROR")), "❌");
        assert_eq!(status_icon(Some("NO_VALUE")), "⚪️");
        assert_eq!(status_icon(Some("WARN")), "❔");
        assert_eq!(status_icon(None), "❔");
    }

    #[test]
    fn display_name_falls_back_to_key() {
        assert_eq!(display_name("new_coverage"), "新增代码覆盖率");
        assert_eq!(display_name("custom_metric"), "custom_metric");
    }

    #[test]
    fn plain_condition_line() {
        let line = format_condition(&condition("new_coverage", "OK", Some("85"), Some("80")));
        assert_eq!(line, "- ✅ **新增代码覆盖率**  当前值: 85  阈值: 80");
    }

    #[test]
    fn absent_values_use_placeholder() {
        let line = format_condition(&condition("new_coverage", "NO_VALUE", None, Some("")));
        assert_eq!(line, "- ⚪️ **新增代码覆盖率**  当前值: 无  阈值: 无");
    }

    #[test]
    fn rating_metrics_render_grades() {
        let line = format_condition(&condition(
            "new_security_rating",
            "ERROR",
            Some("2.9"),
            Some("1"),
        ));
        assert_eq!(line, "- ❌ **安全等级**  当前值: B  阈值: A");

        let line = format_condition(&condition("new_reliability_rating", "OK", None, Some("5")));
        assert_eq!(line, "- ✅ **可靠性等级**  当前值: F  阈值: F");
    }

    #[test]
    fn conditions_keep_input_order() {
        let conditions = vec![
            condition("new_violations", "ERROR", Some("3"), Some("0")),
            condition("new_coverage", "OK", Some("85"), Some("80")),
            condition("zzz_custom", "OK", Some("1"), Some("2")),
        ];
        let text = format_conditions(&conditions);
        let lines: Vec<&str> = text.split("\n\n").collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("新增问题数"));
        assert!(lines[1].contains("新增代码覆盖率"));
        assert!(lines[2].contains("zzz_custom"));
    }

    #[test]
    fn empty_conditions_format_to_empty_text() {
        assert_eq!(format_conditions(&[]), "");
    }
}
