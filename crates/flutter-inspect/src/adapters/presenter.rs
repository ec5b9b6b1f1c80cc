#![expect(clippy::print_stdout, reason = "CLI output is emitted here")]
#![expect(clippy::print_stderr, reason = "CLI output is emitted here")]

//! CLI output presenter.
//!
//! stdout carries only the requested data (snapshots, service listings);
//! progress notes and errors go to stderr.

use serde_json::Value;

use crate::adapters::format::OutputFormat;
use crate::common::Colors;
use crate::domain::EndpointCandidate;

const PROGRAM_NAME: &str = "flutter-inspect";

#[derive(Clone, Debug, Default)]
pub struct ErrorView {
    pub message: String,
    pub suggestion: Option<String>,
    pub hints: Vec<String>,
    pub json: Option<Value>,
}

impl ErrorView {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_suggestion(mut self, suggestion: Option<&str>) -> Self {
        self.suggestion = suggestion.map(str::to_string);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }
}

pub trait Presenter {
    fn present_snapshot(&self, text: &str);

    fn present_services(&self, services: &[EndpointCandidate]);

    fn present_note(&self, message: &str);

    fn present_update(&self, update: usize);

    fn present_tokens(&self, tokens: usize);

    fn present_error(&self, error: &ErrorView);
}

/// Plain-text service listing. Written to stdout, so never colored.
pub fn services_text(services: &[EndpointCandidate]) -> String {
    if services.is_empty() {
        return "No Flutter debug apps found.".to_string();
    }
    let mut out = format!("\nFound {} service(s):\n\n", services.len());
    for (index, service) in services.iter().enumerate() {
        out.push_str(&format!("  [{index}] {}\n", service.uri));
        if let Some(pid) = service.pid {
            out.push_str(&format!("      PID: {pid}\n"));
        }
        if let Some(app) = service.app_name.as_deref() {
            out.push_str(&format!("      App: {app}\n"));
        }
        out.push_str(&format!("      via {}\n", service.origin));
    }
    out
}

pub fn services_json(services: &[EndpointCandidate]) -> Value {
    services
        .iter()
        .map(|service| {
            serde_json::json!({
                "uri": service.uri,
                "pid": service.pid,
                "app_name": service.app_name,
                "method": service.origin.as_str(),
            })
        })
        .collect()
}

pub fn error_lines(error: &ErrorView) -> String {
    let mut lines = vec![format!(
        "{}: {} {}",
        PROGRAM_NAME,
        Colors::error("Error:"),
        error.message
    )];
    if let Some(suggestion) = &error.suggestion {
        lines.push(format!("{} {}", Colors::dim("Suggestion:"), suggestion));
    }
    lines.extend(error.hints.iter().cloned());
    lines.join("\n")
}

pub fn error_json(error: &ErrorView) -> Value {
    match &error.json {
        Some(json) => serde_json::json!({ "success": false, "error": json }),
        None => serde_json::json!({
            "success": false,
            "error": {
                "message": error.message,
                "suggestion": error.suggestion,
            },
        }),
    }
}

pub struct TextPresenter;

impl Presenter for TextPresenter {
    fn present_snapshot(&self, text: &str) {
        println!("{text}");
    }

    fn present_services(&self, services: &[EndpointCandidate]) {
        println!("{}", services_text(services));
    }

    fn present_note(&self, message: &str) {
        eprintln!("{}", Colors::dim(message));
    }

    fn present_update(&self, update: usize) {
        eprintln!("\n{}", Colors::bold(&format!("--- Update #{update} ---")));
    }

    fn present_tokens(&self, tokens: usize) {
        eprintln!("\n[Estimated tokens: ~{tokens}]");
    }

    fn present_error(&self, error: &ErrorView) {
        eprintln!("{}", error_lines(error));
    }
}

pub struct JsonPresenter;

impl Presenter for JsonPresenter {
    fn present_snapshot(&self, text: &str) {
        println!("{text}");
    }

    fn present_services(&self, services: &[EndpointCandidate]) {
        println!(
            "{}",
            serde_json::to_string_pretty(&services_json(services)).unwrap_or_default()
        );
    }

    fn present_note(&self, message: &str) {
        eprintln!("{message}");
    }

    fn present_update(&self, update: usize) {
        eprintln!("\n--- Update #{update} ---");
    }

    fn present_tokens(&self, tokens: usize) {
        eprintln!("\n[Estimated tokens: ~{tokens}]");
    }

    fn present_error(&self, error: &ErrorView) {
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&error_json(error)).unwrap_or_default()
        );
    }
}

pub fn create_presenter(format: OutputFormat) -> Box<dyn Presenter> {
    if format.is_json() {
        Box::new(JsonPresenter)
    } else {
        Box::new(TextPresenter)
    }
}
