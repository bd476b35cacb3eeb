//! Widget states and the pure transition function.

use crate::document::DocumentKind;
use crate::result::AnalysisResult;
use std::fmt;

/// Shown when the selected file is neither PDF nor DOCX.
pub const CLIENT_TYPE_MESSAGE: &str = "Please upload a PDF or DOCX file.";

/// A file chosen by the user, by drag-and-drop or the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub file_name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// The accepted format this file declares, if any.
    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_media_type(&self.media_type)
    }
}

/// Where the widget is in its flow. Exactly one file is in flight at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Idle,
    /// First submission: contract check and scoring in one call.
    AnalyzingGatekeeper { file: SelectedFile },
    /// The service did not recognise a contract; the user decides.
    WaitingUserConfirmation { file: SelectedFile },
    /// Re-submission with the contract check skipped.
    AnalyzingRisk { file: SelectedFile },
    Complete { result: AnalysisResult },
    Error { message: String },
}

/// Inputs to [`WidgetState::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    FileSelected(SelectedFile),
    Succeeded(AnalysisResult),
    Failed(String),
    ConfirmAnyway,
    Dismiss,
    Reset,
}

impl WidgetState {
    /// Apply one event. Events that make no sense in the current state
    /// return the state unchanged.
    pub fn next(self, event: WidgetEvent) -> WidgetState {
        use WidgetEvent as E;
        use WidgetState as S;

        match (self, event) {
            (_, E::Reset) => S::Idle,

            (S::Idle, E::FileSelected(file)) => match file.kind() {
                Some(_) => S::AnalyzingGatekeeper { file },
                None => S::Error {
                    message: CLIENT_TYPE_MESSAGE.to_string(),
                },
            },

            (S::AnalyzingGatekeeper { file }, E::Succeeded(result)) => {
                if result.is_contract {
                    S::Complete { result }
                } else {
                    S::WaitingUserConfirmation { file }
                }
            }
            (S::AnalyzingRisk { .. }, E::Succeeded(result)) => S::Complete { result },
            (S::AnalyzingGatekeeper { .. } | S::AnalyzingRisk { .. }, E::Failed(message)) => {
                S::Error { message }
            }

            (S::WaitingUserConfirmation { file }, E::ConfirmAnyway) => S::AnalyzingRisk { file },
            (S::WaitingUserConfirmation { .. }, E::Dismiss) => S::Idle,

            (state, _) => state,
        }
    }

    /// The file to submit and its skip flag, while a request is due.
    pub fn submission(&self) -> Option<(&SelectedFile, bool)> {
        match self {
            WidgetState::AnalyzingGatekeeper { file } => Some((file, false)),
            WidgetState::AnalyzingRisk { file } => Some((file, true)),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.submission().is_some()
    }

    /// Short state name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            WidgetState::Idle => "idle",
            WidgetState::AnalyzingGatekeeper { .. } => "analyzing_gatekeeper",
            WidgetState::WaitingUserConfirmation { .. } => "waiting_user_confirmation",
            WidgetState::AnalyzingRisk { .. } => "analyzing_risk",
            WidgetState::Complete { .. } => "complete",
            WidgetState::Error { .. } => "error",
        }
    }
}

/// Plain-text rendering of what the widget shows.
impl fmt::Display for WidgetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetState::Idle => write!(f, "Drop a PDF or DOCX contract here, or choose a file."),
            WidgetState::AnalyzingGatekeeper { file } => {
                write!(f, "Checking {}…", file.file_name)
            }
            WidgetState::WaitingUserConfirmation { file } => write!(
                f,
                "{} does not look like a legal contract. Analyse it anyway?",
                file.file_name
            ),
            WidgetState::AnalyzingRisk { file } => write!(f, "Assessing risk in {}…", file.file_name),
            WidgetState::Complete { result } => {
                writeln!(f, "Risk score: {}/10", result.risk_score)?;
                writeln!(f, "{}", result.interpretation)?;
                if !result.risk_summary.is_empty() {
                    writeln!(f, "{}", result.risk_summary)?;
                }
                for risk in result.displayed_risks() {
                    writeln!(f, "• {risk}")?;
                }
                Ok(())
            }
            WidgetState::Error { message } => write!(f, "Error: {message}"),
        }
    }
}
