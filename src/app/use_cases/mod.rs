//! Use-Cases: die vier Batch-Operationen auf UV-Schleifen.

pub mod batch;
mod equalize;
mod match3d;
mod path_job;
mod straighten;

pub use batch::{process_snapshot, run_operation};

use crate::error::SkipReason;

/// Die verfügbaren Batch-Operationen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Abstände angleichen, Form bleibt
    Equalize,
    /// Offene Schleifen gerade ziehen
    StraightenOpen,
    /// Abstände im Verhältnis der 3D-Längen, Form bleibt
    Match3dRatio,
    /// Abstände im Verhältnis der 3D-Längen, gerade (nur offen)
    Match3dStraighten,
}

impl Operation {
    pub fn label(self) -> &'static str {
        match self {
            Self::Equalize => "Equalize",
            Self::StraightenOpen => "Gerade (offen)",
            Self::Match3dRatio => "3D-Verhältnis",
            Self::Match3dStraighten => "3D-Verhältnis gerade",
        }
    }
}

/// Ergebnis für einen einzelnen Pfad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PathOutcome {
    Processed {
        moved_points: usize,
        /// Nur für iterierende Operationen
        iterations: Option<usize>,
    },
    Skipped(SkipReason),
}
