//! Markdown renderers.
//!
//! [`render_markdown`] renders the aggregated article list;
//! [`render_analysis_markdown`] renders a single channel's [`AnalysisReport`].

use crate::aggregate::AggregatedArticle;
use crate::analyze::AnalysisReport;
use crate::channel::Channel;

/// Render the article list as Markdown.
pub fn render_markdown(articles: &[AggregatedArticle]) -> String {
    let mut lines = vec![
        "# Chronological Article List".to_string(),
        String::new(),
        format!("**Total Articles:** {}", articles.len()),
        String::new(),
    ];

    for (i, article) in articles.iter().enumerate() {
        lines.push(format!("## {}. {}", i + 1, article.title));
        lines.push(String::new());
        lines.push(format!("**Relevant:** {}", if article.is_relevant { "yes" } else { "no" }));
        lines.push(format!("**Source:** {} | **Date:** {}", article.source.label(), article.date));
        lines.push(format!("**Alert Query:** {}", article.alert_query));
        lines.push(String::new());
        lines.push(format!("**URL:** {}", article.url));
        lines.push(String::new());

        if !article.summary.is_empty() {
            lines.push(format!("**Summary:** {}", article.summary));
            lines.push(String::new());
        }
        if !article.relevance_reasoning.is_empty() {
            lines.push(format!("**Relevance:** {}", article.relevance_reasoning));
            lines.push(String::new());
        }

        lines.push("---".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

fn config_str<'a>(report: &'a AnalysisReport, key: &str) -> &'a str {
    report.configuration.get(key).and_then(|v| v.as_str()).unwrap_or("unknown")
}

fn period(report: &AnalysisReport) -> String {
    let days = |key: &str| report.configuration.get(key).and_then(|v| v.as_u64());
    match (days("days_back"), days("days_back_start")) {
        (Some(back), Some(start)) => format!("{} to {} days ago", start, back),
        (Some(back), None) => format!("Last {} days", back),
        _ => "All available messages".to_string(),
    }
}

/// Render one channel's analysis report as Markdown: a summary, then the
/// relevant alerts in full and the rest in brief.
pub fn render_analysis_markdown(report: &AnalysisReport, channel: Channel) -> String {
    let mut lines = vec![
        format!("# {}s Analysis Report", channel.label()),
        String::new(),
        format!("**Generated:** {}", report.timestamp),
        format!("**Classifier:** {} ({})", config_str(report, "llm_provider"), config_str(report, "llm_model")),
        format!("**Period:** {}", period(report)),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- **Total Alerts Processed:** {}", report.total_alerts),
        format!("- **Relevant Alerts:** {}", report.relevant_alerts),
        format!("- **Relevance Rate:** {:.1}%", report.relevance_rate()),
        String::new(),
    ];

    if let Some(stats) = &report.statistics {
        lines.push("## Mailbox Statistics".to_string());
        lines.push(String::new());
        lines.push(format!("- **Total {}s (in period):** {}", channel.label(), stats.total));
        let counts =
            [("Processed", stats.processed), ("Skipped", stats.skipped), ("Unread", stats.unread), ("Read", stats.read)];
        for (name, count) in counts.into_iter().filter_map(|(name, count)| count.map(|c| (name, c))) {
            lines.push(format!("- **{}:** {}", name, count));
        }
        lines.push(String::new());
    }

    lines.push("## Relevant Alerts".to_string());
    lines.push(String::new());

    let (relevant, other): (Vec<_>, Vec<_>) =
        report.results.iter().partition(|result| result.decision.is_alert_relevant());

    if relevant.is_empty() {
        lines.push("*No relevant alerts found.*".to_string());
        lines.push(String::new());
    }

    for (i, result) in relevant.iter().enumerate() {
        let (alert, decision) = (&result.alert, &result.decision);
        lines.push(format!("### {}. {}", i + 1, alert.alert_query));
        lines.push(String::new());
        lines.push(format!("**Category:** {}", decision.category));
        lines.push(format!("**Confidence:** {:.2}", decision.confidence));
        lines.push(format!("**Date:** {}", alert.date));
        if let (Some(relevant), Some(total)) = (decision.relevant_article_count, decision.total_article_count) {
            lines.push(format!("**Relevant Articles:** {} of {}", relevant, total));
        }
        lines.push(String::new());
        lines.push(format!("**Summary:** {}", decision.summary));
        lines.push(String::new());
        lines.push(format!("**Keywords:** {}", decision.keywords.join(", ")));
        lines.push(String::new());
        lines.push(format!("**Reasoning:** {}", decision.reasoning));
        lines.push(String::new());
        lines.push("**Articles:**".to_string());
        lines.push(String::new());

        for (j, article) in alert.articles.iter().enumerate() {
            if article.title.is_empty() {
                lines.push(format!("{}. {}", j + 1, article.url));
            } else {
                lines.push(format!("{}. [{}]({})", j + 1, article.title, article.url));
            }
        }
        lines.push(String::new());
    }

    if !other.is_empty() {
        lines.push("## Non-Relevant Alerts".to_string());
        lines.push(String::new());
        for (i, result) in other.iter().enumerate() {
            let decision = &result.decision;
            lines.push(format!("### {}. {}", i + 1, result.alert.alert_query));
            lines.push(format!("**Category:** {} | **Confidence:** {:.2}", decision.category, decision.confidence));
            lines.push(format!("**Reasoning:** {}", decision.reasoning));
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{Alert, Article};
    use crate::analyze::{AlertResult, Statistics};
    use crate::classify::Decision;
    use serde_json::{Map, Value};

    fn report() -> AnalysisReport {
        let mut configuration = Map::new();
        configuration.insert("llm_provider".to_string(), Value::from("openai"));
        configuration.insert("llm_model".to_string(), Value::from("gpt-4o-mini"));
        configuration.insert("days_back".to_string(), Value::from(7));

        AnalysisReport {
            timestamp: "2024-01-15T12:00:00Z".to_string(),
            configuration,
            statistics: None,
            total_alerts: 2,
            relevant_alerts: 1,
            results: vec![
                AlertResult {
                    alert: Alert {
                        alert_query: "mineral exploration".to_string(),
                        date: "2024-01-14".to_string(),
                        articles: vec![
                            Article::new("AI finds copper", "https://example.com/copper"),
                            Article::new("", "https://example.com/untitled"),
                        ],
                        ..Default::default()
                    },
                    decision: Decision {
                        is_relevant: true,
                        confidence: 0.9,
                        category: "Machine Learning".to_string(),
                        keywords: vec!["ml".to_string(), "copper".to_string()],
                        ..Default::default()
                    },
                },
                AlertResult {
                    alert: Alert { alert_query: "bitcoin mining".to_string(), ..Default::default() },
                    decision: Decision::failed("Not Relevant", "Cryptocurrency"),
                },
            ],
        }
    }

    #[test]
    fn test_analysis_report_sections() {
        let out = render_analysis_markdown(&report(), Channel::GoogleAlerts);

        assert!(out.starts_with("# Google Alerts Analysis Report"));
        assert!(out.contains("**Classifier:** openai (gpt-4o-mini)"));
        assert!(out.contains("**Period:** Last 7 days"));
        assert!(out.contains("- **Relevance Rate:** 50.0%"));
        assert!(out.contains("### 1. mineral exploration"));
        assert!(out.contains("**Keywords:** ml, copper"));
        assert!(out.contains("1. [AI finds copper](https://example.com/copper)"));
        assert!(out.contains("2. https://example.com/untitled"));
        assert!(out.contains("## Non-Relevant Alerts"));
        assert!(out.contains("**Category:** Not Relevant | **Confidence:** 0.00"));
        assert!(!out.contains("## Mailbox Statistics"));
    }

    #[test]
    fn test_analysis_report_statistics() {
        let mut report = report();
        report.statistics = Some(Statistics { total: 12, unread: Some(3), read: Some(9), ..Default::default() });
        let out = render_analysis_markdown(&report, Channel::ScholarAlerts);

        assert!(out.contains("## Mailbox Statistics\n\n- **Total Scholar Alerts (in period):** 12\n"));
        assert!(out.contains("- **Unread:** 3\n- **Read:** 9\n"));
        assert!(!out.contains("**Processed:**"));
        assert!(out.find("## Mailbox Statistics") < out.find("## Relevant Alerts"));
    }

    #[test]
    fn test_analysis_report_without_relevant_alerts() {
        let mut report = report();
        report.results.remove(0);
        let out = render_analysis_markdown(&report, Channel::ScholarAlerts);

        assert!(out.starts_with("# Scholar Alerts Analysis Report"));
        assert!(out.contains("*No relevant alerts found.*"));
    }

    #[test]
    fn test_article_list_markdown() {
        let article = AggregatedArticle {
            title: "Graph networks for drill targeting".to_string(),
            url: "https://example.org/graph".to_string(),
            summary: "Uses GNNs".to_string(),
            date: "2024-01-02".to_string(),
            source: Channel::ScholarAlerts,
            alert_query: "drill targeting".to_string(),
            is_relevant: true,
            relevance_reasoning: String::new(),
        };

        let out = render_markdown(&[article]);
        assert!(out.starts_with("# Chronological Article List\n\n**Total Articles:** 1\n"));
        assert!(out.contains("## 1. Graph networks for drill targeting"));
        assert!(out.contains("**Source:** Scholar Alert | **Date:** 2024-01-02"));
        assert!(out.contains("**Summary:** Uses GNNs"));
        assert!(!out.contains("**Relevance:**"));
        assert!(out.trim_end().ends_with("---"));
    }
}
