//! UV Loop Tools Library.
//! Werkzeuge für selektierte UV-Kantenschleifen: Abstände angleichen,
//! gerade ziehen, an 3D-Längen anpassen und als Kurve bearbeiten.

pub mod app;
pub mod core;
pub mod error;
pub mod shared;

/// UV-Koordinate in doppelter Genauigkeit.
pub type Point2 = glam::DVec2;

pub use app::{
    run_operation, CurveSession, Operation, OperationStatus, OperationSummary, SessionEdit,
    UvContainer, UvMesh,
};
pub use core::{ContainerSnapshot, LoopTypeOverride, PositionUpdate, SelectedEdge, UvHandle};
pub use error::{EngineError, SkipReason};
pub use shared::{EngineOptions, IterationMode};
