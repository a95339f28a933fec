use console::style;
use covgrid_core::{CoverageError, ErrorKind};
use std::fmt;

/// Error message with suggestions for the user
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), context: None, suggestions: Vec::new() }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": "error",
            "message": self.message,
            "context": self.context,
            "suggestions": self.suggestions,
        })
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Describe a failed command, with hints keyed on the underlying error class
pub fn describe(err: &anyhow::Error) -> CliError {
    let Some(coverage) = err.chain().find_map(|e| e.downcast_ref::<CoverageError>()) else {
        return CliError::new(format!("{:#}", err));
    };

    let error = CliError::new(coverage.to_string());
    let error = if err.to_string() != coverage.to_string() {
        error.with_context(err.to_string())
    } else {
        error
    };

    match (coverage.kind(), coverage) {
        (_, CoverageError::AoiTooSmall { minimum, .. }) => error
            .with_suggestion(format!("Use an AOI at least {:.0} m on each side", minimum))
            .with_suggestion("Or lower the cell size with --min-cell-size"),
        (_, CoverageError::LatitudeOutOfRange { .. }) => {
            error.with_suggestion("Polar AOIs need a polar stereographic grid, which is not supported")
        }
        (_, CoverageError::ConfigMissing { key }) if key == "api_key" => error
            .with_suggestion("Pass --api-key <KEY>")
            .with_suggestion("Or set PL_API_KEY in the environment")
            .with_suggestion("Or use --items <FILE> to work from a saved search"),
        (ErrorKind::Geometry, _) => {
            error.with_suggestion("Check that every ring is closed and does not cross itself")
        }
        (ErrorKind::Collaborator, _) => {
            error.with_suggestion("Check the API key and the service URLs with `covgrid config`")
        }
        _ => error,
    }
}

/// Print a failed command to stderr
pub fn report(err: &anyhow::Error, json: bool) {
    let error = describe(err);
    if json {
        let value = error.to_json();
        eprintln!("{}", serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()));
    } else {
        error.display();
    }
}
