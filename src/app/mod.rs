//! Application-Layer: Container-Schnittstelle, Batch-Operationen und Spline-Sitzung.

pub mod container;
pub mod convergence;
pub mod curve_session;
pub mod summary;
pub mod use_cases;

pub use container::{FaceCorner, MeshFace, UvContainer, UvMesh};
pub use convergence::{ConvergencePolicy, ConvergenceReport};
pub use curve_session::{
    write_session_updates, CurveSession, CurveState, InsertAnchor, SessionCommit, SessionEdit,
    SessionStart, SessionUpdate,
};
pub use summary::{OperationStatus, OperationSummary};
pub use use_cases::{process_snapshot, run_operation, Operation};
