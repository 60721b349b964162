//! Fehlertypen der UV-Schleifen-Engine.
//!
//! `EngineError` bricht eine Operation ab. `SkipReason` markiert nur eine
//! einzelne Komponente oder Schleife als übersprungen.

use crate::core::{UvHandle, QuantizedKey};
use thiserror::Error;

/// Fatale Fehler einer Operation oder Sitzung.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Ungültiger Optionswert (vor jeder Verarbeitung geprüft)
    #[error("ungültige Option `{name}` = {value}: {reason}")]
    InvalidOption {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Der Editor synchronisiert UV- und Mesh-Selektion; Kantenselektion
    /// ist dann nicht eindeutig lesbar.
    #[error("UV-Sync-Selektion ist aktiv – bitte im UV-Editor deaktivieren")]
    SyncSelectionActive,

    /// Graph-Knoten ohne zugeordnete UV-Ecke
    #[error("Graph-Knoten ({}, {}) hat keine UV-Ecke", .0.x, .0.y)]
    MissingHandles(QuantizedKey),

    /// Handle existiert im Container-Zustand nicht
    #[error("unbekannter UV-Handle {}", .0.0)]
    UnknownHandle(UvHandle),

    /// Container konnte nicht gelesen werden
    #[error("Container `{label}` nicht lesbar: {reason}")]
    ContainerRead { label: String, reason: String },

    /// Container konnte nicht geschrieben werden
    #[error("Container `{label}` nicht schreibbar: {reason}")]
    ContainerWrite { label: String, reason: String },

    /// Sitzungs-Bearbeitung nicht zulässig (z.B. Minimum unterschritten)
    #[error("ungültige Bearbeitung: {0}")]
    InvalidEdit(String),
}

impl EngineError {
    pub(crate) fn invalid_option(
        name: &'static str,
        value: impl std::fmt::Display,
        reason: &'static str,
    ) -> Self {
        Self::InvalidOption {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

/// Grund, warum eine Komponente oder Schleife übersprungen wurde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Komponente lieferte keine Pfade
    NoPaths,
    /// Pfad mit höchstens 2 verschiedenen Knoten
    DegeneratePath,
    /// Nach Deduplizierung zu wenige Punkte
    TooFewPoints,
    /// Operation gilt nur für offene Schleifen
    ClosedLoop,
    /// Fehlende 3D-Kantenlänge entlang des Pfads
    MissingLength3d,
    /// 3D-Gesamtlänge ist null
    ZeroLength3d,
    /// Container nicht les- oder schreibbar
    ContainerFailed,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NoPaths => "keine Pfade",
            Self::DegeneratePath => "entarteter Pfad",
            Self::TooFewPoints => "zu wenige Punkte",
            Self::ClosedLoop => "geschlossene Schleife",
            Self::MissingLength3d => "fehlende 3D-Länge",
            Self::ZeroLength3d => "3D-Länge null",
            Self::ContainerFailed => "Container-Fehler",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_option_message_names_the_field() {
        let err = EngineError::invalid_option("iteration_count", 0, "muss zwischen 1 und 100 liegen");
        assert_eq!(
            err.to_string(),
            "ungültige Option `iteration_count` = 0: muss zwischen 1 und 100 liegen"
        );
    }

    #[test]
    fn missing_handles_shows_key() {
        let err = EngineError::MissingHandles(QuantizedKey::new(3, -4));
        assert!(err.to_string().contains("(3, -4)"));
    }
}
