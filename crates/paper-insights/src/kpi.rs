//! Line-by-line display of the KPI answer

use serde::{Deserialize, Serialize};

/// One display line of the KPI answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KpiLine {
    /// A `label: value` line, split on the first colon
    Pair { label: String, value: String },
    Text { text: String },
}

impl KpiLine {
    pub fn parse(line: &str) -> Self {
        match line.split_once(':') {
            Some((label, value)) => KpiLine::Pair {
                label: label.trim().to_string(),
                value: value.trim().to_string(),
            },
            None => KpiLine::Text {
                text: line.trim().to_string(),
            },
        }
    }

    /// The line as it is shown to the user
    pub fn render(&self) -> String {
        match self {
            KpiLine::Pair { label, value } => format!("{}: {}", label, value),
            KpiLine::Text { text } => text.clone(),
        }
    }
}

/// Split the KPI answer into display lines, one per `\n`-separated line
pub fn kpi_lines(kpi: &str) -> Vec<KpiLine> {
    kpi.split('\n').map(KpiLine::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_colon_lines_become_pairs() {
        assert_eq!(
            KpiLine::parse("1. Domain Similarity :  Yes - both use graphs "),
            KpiLine::Pair {
                label: "1. Domain Similarity".into(),
                value: "Yes - both use graphs".into(),
            }
        );
    }

    #[test]
    fn test_split_on_first_colon_only() {
        let line = KpiLine::parse("Gap Analysis: Paper 1: no ablations");
        assert_eq!(line.render(), "Gap Analysis: Paper 1: no ablations");
        assert!(matches!(line, KpiLine::Pair { ref value, .. } if value == "Paper 1: no ablations"));
    }

    #[test]
    fn test_plain_lines_trimmed() {
        assert_eq!(
            KpiLine::parse("   Paper 1 focuses on attention.  "),
            KpiLine::Text {
                text: "Paper 1 focuses on attention.".into()
            }
        );
    }

    #[test]
    fn test_kpi_lines_keeps_blank_lines() {
        let lines = kpi_lines("4. Content Similarity Index: 65%\n\nTheme");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], KpiLine::Text { text: String::new() });
        assert_eq!(lines[0].render(), "4. Content Similarity Index: 65%");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(KpiLine::parse("Score: 7")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "pair", "label": "Score", "value": "7"})
        );
    }
}
