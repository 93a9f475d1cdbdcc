/// Outcome of handling one inbound text event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Drop the event; no reply is produced for it.
    Suppress,
    /// Replace the event content with this merged text and continue the pipeline.
    Emit(String),
}

impl Decision {
    /// Whether the caller should forward a payload.
    #[must_use]
    pub fn is_emit(&self) -> bool {
        matches!(self, Self::Emit(_))
    }

    /// Borrow the merged payload, if any.
    #[must_use]
    pub fn merged_text(&self) -> Option<&str> {
        match self {
            Self::Suppress => None,
            Self::Emit(text) => Some(text),
        }
    }

    /// Take the merged payload, if any.
    #[must_use]
    pub fn into_merged_text(self) -> Option<String> {
        match self {
            Self::Suppress => None,
            Self::Emit(text) => Some(text),
        }
    }

    /// Short label for logs and replay output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Suppress => "suppress",
            Self::Emit(_) => "emit",
        }
    }
}
