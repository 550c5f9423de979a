use serde::Serialize;
use tracing::{debug, warn};

use crate::format::{escape, escape_attr, long_date};
use crate::newspaper::Newspaper;
use crate::newspaper::template::MASTHEAD;
use mj_core::Result;

const SHELL_STYLE: &str = "body{font-family:Georgia,serif;max-width:900px;margin:0 auto;padding:24px;color:#222}\
img{max-width:100%}.newspaper-header{text-align:center;border-bottom:3px double #222}\
.lead-story{border-bottom:1px solid #ccc}.newspaper-footer{border-top:3px double #222;margin-top:24px}";

const PRINT_STYLE: &str = "@media print{.no-print{display:none}body{padding:0}}";

/// Wrap the composed fragment in a standalone HTML document.
pub fn standalone_document(newspaper: &Newspaper, print: bool) -> String {
    let (extra_style, onload) = if print {
        (PRINT_STYLE, " onload=\"window.print()\"")
    } else {
        ("", "")
    };
    format!(
        "<!DOCTYPE html><html lang=\"bg\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title><style>{}{}</style></head><body{}>{}</body></html>",
        escape(&newspaper.title()),
        SHELL_STYLE,
        extra_style,
        onload,
        newspaper.html
    )
}

/// The printable page handed to the host's print dialog.
pub fn print_view(newspaper: &Newspaper) -> String {
    standalone_document(newspaper, true)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Download {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

pub fn download(newspaper: &Newspaper) -> Download {
    Download {
        filename: format!("mlad-zhurnalist-{}.html", newspaper.issue_date.format("%Y-%m-%d")),
        content_type: "text/html; charset=utf-8",
        body: standalone_document(newspaper, false),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

/// A platform share sheet.
pub trait ShareTarget {
    fn share(&self, payload: &SharePayload) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShareOutcome {
    Shared(SharePayload),
    /// No share capability; the text is shown for manual copying.
    ManualCopy { text: String },
}

pub fn share_payload(newspaper: &Newspaper, site_url: &str) -> SharePayload {
    SharePayload {
        title: newspaper.title(),
        text: format!(
            "Брой от {} с {} статии",
            long_date(&newspaper.issue_date),
            newspaper.stats.article_count
        ),
        url: site_url.to_string(),
    }
}

pub fn share(newspaper: &Newspaper, site_url: &str, target: Option<&dyn ShareTarget>) -> ShareOutcome {
    let payload = share_payload(newspaper, site_url);
    if let Some(target) = target {
        match target.share(&payload) {
            Ok(()) => {
                debug!(url = %payload.url, "newspaper shared");
                return ShareOutcome::Shared(payload);
            }
            Err(e) => warn!(error = %e, "share target failed, falling back to manual copy"),
        }
    }
    ShareOutcome::ManualCopy {
        text: format!("{}\n{}\n{}", payload.title, payload.text, payload.url),
    }
}

/// Manual-copy box markup.
pub fn render_manual_copy(text: &str) -> String {
    format!(
        "<div class=\"share-fallback\"><p>Копирайте текста и го споделете:</p>\
         <textarea readonly aria-label=\"{}\">{}</textarea></div>",
        escape_attr(MASTHEAD),
        escape(text)
    )
}
