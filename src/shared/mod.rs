//! Geteilte Geometrie und Konfiguration.
//!
//! Layer-neutral: `core` und `app` importieren von hier, nie umgekehrt.

pub mod options;
pub mod polyline;
pub mod redistribute;
pub mod seam;
pub mod spline_geometry;

pub use options::{CurveOptions, EngineOptions, IterationMode};
pub use polyline::{ArcLengthTable, ClosestPoint, Deduped};
pub use redistribute::Redistributed;
pub use spline_geometry::DenseCurve;
