use mj_core::{Error, ErrorKind};
use serde::Serialize;

use crate::format::escape;

pub const LOADING_ARTICLES: &str = "Зареждане на статиите...";
pub const LOADING_ARTICLE: &str = "Зареждане на статията...";
pub const LOADING_RUBRICS: &str = "Зареждане на забавното съдържание...";
pub const LOADING_EVENTS: &str = "Зареждане на събитията...";
pub const LOADING_NEWSPAPER: &str = "Генериране на вестника...";

pub fn render_loading(message: &str) -> String {
    format!(
        "<div class=\"loading\"><div class=\"spinner\"></div><p>{}</p></div>",
        escape(message)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

/// Inline form feedback (`✅ ...` / `❌ ...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }

    pub fn render(&self) -> String {
        match self.severity {
            Severity::Success => format!("<div class=\"success-message\">✅ {}</div>", escape(&self.text)),
            Severity::Error => format!("<div class=\"error-message\">❌ {}</div>", escape(&self.text)),
        }
    }
}

fn kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not_found",
        ErrorKind::Validation => "validation",
        ErrorKind::Transport => "transport",
    }
}

/// A visible, dismissible error state. Transport failures keep a retry
/// action; the state that raised them is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPanel {
    pub id: u64,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
    pub retry: bool,
    pub dismissible: bool,
}

impl ErrorPanel {
    /// `title` names what failed, e.g. `Грешка при зареждане на статиите`.
    pub fn from_error(id: u64, title: impl Into<String>, error: &Error) -> Self {
        let kind = error.kind();
        Self {
            id,
            kind: kind_name(kind),
            title: title.into(),
            message: error.to_string(),
            retry: kind == ErrorKind::Transport,
            dismissible: true,
        }
    }

    pub fn render(&self) -> String {
        let retry = if self.retry {
            "<button class=\"btn-retry\" data-action=\"retry\">🔄 Опитай отново</button>"
        } else {
            ""
        };
        format!(
            "<div class=\"error-state\" data-panel-id=\"{}\">\
             <button class=\"btn-dismiss\" data-action=\"dismiss\">✕</button>\
             <div class=\"error-icon\">❌</div><h3>{}</h3><p>{}</p>{}</div>",
            self.id,
            escape(&self.title),
            escape(&self.message),
            retry
        )
    }
}

/// The error panels currently on screen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorPanels {
    next_id: u64,
    panels: Vec<ErrorPanel>,
}

impl ErrorPanels {
    pub fn push(&mut self, title: impl Into<String>, error: &Error) -> &ErrorPanel {
        self.next_id += 1;
        let panel = ErrorPanel::from_error(self.next_id, title, error);
        self.panels.push(panel);
        &self.panels[self.panels.len() - 1]
    }

    /// Returns whether a panel with `id` was showing.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.panels.len();
        self.panels.retain(|panel| panel.id != id);
        before != self.panels.len()
    }

    pub fn panels(&self) -> &[ErrorPanel] {
        &self.panels
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn render(&self) -> String {
        self.panels.iter().map(ErrorPanel::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Message::success("Събитието е добавено успешно!").render(),
            "<div class=\"success-message\">✅ Събитието е добавено успешно!</div>"
        );
        assert!(Message::error("<x>").render().contains("&lt;x&gt;"));
        assert!(render_loading(LOADING_NEWSPAPER).contains("Генериране на вестника..."));
    }

    #[test]
    fn test_error_panels_are_dismissible() {
        let mut panels = ErrorPanels::default();
        let id = panels
            .push("Грешка при зареждане на статиите", &Error::Storage("timeout".into()))
            .id;
        panels.push("Грешка", &Error::validation("Моля, попълнете всички задължителни полета"));

        let first = &panels.panels()[0];
        assert_eq!(first.kind, "transport");
        assert!(first.retry && first.dismissible);
        assert!(first.render().contains("data-action=\"retry\""));
        assert!(!panels.panels()[1].retry);
        assert_eq!(panels.panels()[1].message, "Моля, попълнете всички задължителни полета");

        assert!(panels.dismiss(id));
        assert!(!panels.dismiss(id));
        assert_eq!(panels.panels().len(), 1);
    }
}
