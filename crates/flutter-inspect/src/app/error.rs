use thiserror::Error;

/// Failures the CLI reports without a lower-layer cause.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("No Flutter debug app found.")]
    NoServiceFound,

    #[error("Widget tree is empty")]
    EmptyWidgetTree,

    #[error("Failed to install signal handler: {0}")]
    SignalSetup(#[from] std::io::Error),
}

impl CliError {
    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            CliError::NoServiceFound => &[
                "Make sure you have a Flutter app running in debug mode.",
                "Tip: Run 'flutter run' in your Flutter project.",
            ],
            CliError::EmptyWidgetTree => &[],
            CliError::SignalSetup(_) => &[],
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let category = match self {
            CliError::NoServiceFound => "discovery",
            CliError::EmptyWidgetTree => "empty",
            CliError::SignalSetup(_) => "internal",
        };
        serde_json::json!({
            "message": self.to_string(),
            "category": category,
            "hints": self.hints(),
        })
    }
}
