//! Server-rendered pages for the two-step workflow: collect/analyze/generate
//! on `/`, then design and download on `/design`.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::Html,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::pipeline::{DesignSummary, RunSummary, split_list};
use crate::render::{DEFAULT_TEMPLATE, Template};

const MISSING_FIELDS: &str = "Please fill out all fields.";

#[derive(Debug, Default, Deserialize)]
pub struct CollectForm {
    #[serde(default)]
    pub competitors: String,
    #[serde(default)]
    pub keywords: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DesignForm {
    #[serde(default)]
    pub template: String,
}

enum Notice {
    Success(String),
    Error(String),
}

type Page = (StatusCode, Html<String>);

pub async fn collect_page() -> Html<String> {
    Html(render_collect(&CollectForm::default(), None))
}

pub async fn collect(State(state): State<AppState>, Form(form): Form<CollectForm>) -> Page {
    let competitors = split_list(&form.competitors);
    let keywords = split_list(&form.keywords);

    if competitors.is_empty() || keywords.is_empty() {
        let notice = Notice::Error(MISSING_FIELDS.to_string());
        return (
            StatusCode::BAD_REQUEST,
            Html(render_collect(&form, Some(notice))),
        );
    }

    match state.pipeline.run_pipeline(&competitors, &keywords).await {
        Ok(summary) => {
            let notice = Notice::Success(run_message(&summary));
            (StatusCode::OK, Html(render_collect(&form, Some(notice))))
        }
        Err(e) => error_page(e, |notice| render_collect(&form, Some(notice))),
    }
}

pub async fn design_page() -> Html<String> {
    Html(render_design(DEFAULT_TEMPLATE, None, None))
}

pub async fn design(State(state): State<AppState>, Form(form): Form<DesignForm>) -> Page {
    let template = if form.template.trim().is_empty() {
        DEFAULT_TEMPLATE
    } else {
        form.template.trim()
    };

    match state.pipeline.design_battlecards(template).await {
        Ok(summary) => {
            let notice = Notice::Success("Battlecards designed successfully!".to_string());
            (
                StatusCode::OK,
                Html(render_design(&summary.template, Some(notice), Some(&summary))),
            )
        }
        Err(e) => error_page(e, |notice| render_design(template, Some(notice), None)),
    }
}

fn error_page(error: AppError, render: impl FnOnce(Notice) -> String) -> Page {
    let status = error.status_code();
    let message = match &error {
        AppError::NotFound(_) => {
            "No battlecards yet. Run Process Data on the first page.".to_string()
        }
        _ => error.public_message(),
    };
    (status, Html(render(Notice::Error(message))))
}

fn run_message(summary: &RunSummary) -> String {
    let mut message =
        "Data collected, analyzed, and battlecards generated successfully!".to_string();
    if !summary.skipped.is_empty() {
        message.push_str(&format!(
            " Skipped due to generation errors: {}.",
            summary.skipped.join(", ")
        ));
    }
    message
}

fn render_collect(form: &CollectForm, notice: Option<Notice>) -> String {
    let body = format!(
        r#"<h1>Strategic Battlecard Generator</h1>
<p>Welcome to the Battlecard Generator. This page will:</p>
<ol>
  <li><strong>Collect Data</strong>: search the news for each competitor and industry keyword.</li>
  <li><strong>Analyze Data</strong>: extract products and organizations from the articles.</li>
  <li><strong>Generate Battlecards</strong>: write a battlecard per competitor with a language model.</li>
</ol>
<p>Enter comma-separated lists, for example <code>Competitor A, Competitor B</code> and
<code>AI, Machine Learning, Data Science</code>.</p>
{notice}
<form method="post" action="/collect">
  <label>Enter competitor names (comma-separated):
    <input type="text" name="competitors" value="{competitors}"></label>
  <label>Enter industry keywords (comma-separated):
    <input type="text" name="keywords" value="{keywords}"></label>
  <button type="submit">Process Data</button>
</form>"#,
        notice = render_notice(notice),
        competitors = escape(&form.competitors),
        keywords = escape(&form.keywords),
    );
    layout("Collect, Analyze, and Generate Battlecards", &body)
}

fn render_design(selected: &str, notice: Option<Notice>, summary: Option<&DesignSummary>) -> String {
    let options: String = Template::names()
        .into_iter()
        .map(|name| {
            let marker = if name == selected { " selected" } else { "" };
            format!(r#"<option value="{name}"{marker}>{name}</option>"#)
        })
        .collect();

    let downloads = summary
        .filter(|s| !s.cards.is_empty())
        .map(|s| {
            let links: String = s
                .cards
                .iter()
                .map(|card| {
                    format!(
                        r#"<li><a href="/battlecards/{href}" download>Download {name}</a></li>"#,
                        href = escape(&urlencoding::encode(&card.pdf)),
                        name = escape(&card.pdf),
                    )
                })
                .collect();
            format!("<p>Download the generated battlecards:</p>\n<ul>{links}</ul>")
        })
        .unwrap_or_default();

    let body = format!(
        r#"<h1>Design Battlecards</h1>
<p>Choose a template (<code>modern</code>, <code>classic</code> or <code>professional</code>)
and apply it to the generated battlecards.</p>
{notice}
<form method="post" action="/design">
  <label>Select Template
    <select name="template">{options}</select></label>
  <button type="submit">Design Battlecards</button>
</form>
{downloads}"#,
        notice = render_notice(notice),
    );
    layout("Design Battlecards", &body)
}

fn render_notice(notice: Option<Notice>) -> String {
    match notice {
        Some(Notice::Success(msg)) => format!(r#"<p class="success">{}</p>"#, escape(&msg)),
        Some(Notice::Error(msg)) => format!(r#"<p class="error">{}</p>"#, escape(&msg)),
        None => String::new(),
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
  nav a {{ margin-right: 1rem; }}
  label {{ display: block; margin: 1rem 0; }}
  input {{ width: 100%; }}
  .success {{ color: #1a7f37; }}
  .error {{ color: #cf222e; }}
</style>
</head>
<body>
<nav><a href="/">Collect, Analyze, and Generate Battlecards</a><a href="/design">Design Battlecards</a></nav>
{body}
</body>
</html>"#,
        title = escape(title),
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RenderedCard;

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<b>"AT&T"</b>"#), "&lt;b&gt;&quot;AT&amp;T&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_collect_page_keeps_input_and_shows_error() {
        let form = CollectForm {
            competitors: "Apple, <Vivo>".to_string(),
            keywords: String::new(),
        };
        let html = render_collect(&form, Some(Notice::Error(MISSING_FIELDS.to_string())));
        assert!(html.contains("Please fill out all fields."));
        assert!(html.contains(r#"value="Apple, &lt;Vivo&gt;""#));
        assert!(html.contains("Process Data"));
    }

    #[test]
    fn test_design_page_lists_templates_and_downloads() {
        let summary = DesignSummary {
            template: "professional".to_string(),
            cards: vec![RenderedCard {
                competitor: "Vivo".to_string(),
                pdf: "Vivo_battlecard.pdf".to_string(),
                txt: Some("Vivo_battlecard.txt".to_string()),
            }],
        };
        let html = render_design("professional", None, Some(&summary));

        assert!(html.contains(r#"<option value="modern">modern</option>"#));
        assert!(html.contains(r#"<option value="professional" selected>professional</option>"#));
        assert!(html.contains(r#"href="/battlecards/Vivo_battlecard.pdf""#));
        assert!(!html.contains("Vivo_battlecard.txt"));
    }

    #[test]
    fn test_download_links_are_percent_encoded() {
        let summary = DesignSummary {
            template: "classic".to_string(),
            cards: vec![
                RenderedCard {
                    competitor: "Acme #1".to_string(),
                    pdf: "Acme #1_battlecard.pdf".to_string(),
                    txt: None,
                },
                RenderedCard {
                    competitor: "100% Mobile".to_string(),
                    pdf: "100% Mobile_battlecard.pdf".to_string(),
                    txt: None,
                },
            ],
        };
        let html = render_design("classic", None, Some(&summary));

        assert!(html.contains(r#"href="/battlecards/Acme%20%231_battlecard.pdf""#));
        assert!(html.contains(r#"href="/battlecards/100%25%20Mobile_battlecard.pdf""#));
        assert!(html.contains("Download Acme #1_battlecard.pdf"));
    }
}
