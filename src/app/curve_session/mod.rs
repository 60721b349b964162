//! Interaktive Spline-Sitzung: selektierte UV-Schleifen als Catmull-Rom-Kurven bearbeiten.
//!
//! Aufgeteilt in:
//! - `state`:     Structs der Sitzung, Kurven und angehängten Ecken
//! - `lifecycle`: Start, Vorschau, Übernehmen, Abbrechen
//! - `edit`:      Selektion, Verschieben, Einfügen, Löschen, Neu-Verteilen

mod edit;
mod lifecycle;
mod state;

pub use edit::{InsertAnchor, SessionEdit};
pub use lifecycle::{write_session_updates, SessionStart};
pub use state::{AttachedCorner, CurveSession, CurveState, SessionCommit, SessionUpdate};
