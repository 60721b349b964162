//! Abbruchregeln für wiederholtes Equalize.

use crate::shared::options::{EngineOptions, IterationMode};

/// Iterations-Grenzen für einen einzelnen Pfad.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergencePolicy {
    pub max_iterations: usize,
    /// Auto-Modus: bei Erreichen einer Schwelle vorzeitig stoppen
    pub stop_on_convergence: bool,
    pub position_epsilon: f64,
    pub spacing_cv_epsilon: f64,
}

impl ConvergencePolicy {
    /// Leitet die Grenzen aus den Optionen ab.
    ///
    /// Offene Pfade bekommen mit `repeat_closed_only` genau einen Durchlauf.
    pub fn for_path(options: &EngineOptions, closed: bool) -> Self {
        let (max_iterations, stop_on_convergence) = match options.iteration_mode {
            IterationMode::Auto => (options.auto_max_iterations, true),
            IterationMode::Fixed => (options.iteration_count, false),
        };
        let max_iterations = if !closed && options.repeat_closed_only {
            1
        } else {
            max_iterations.max(1)
        };
        Self {
            max_iterations,
            stop_on_convergence,
            position_epsilon: options.position_epsilon(),
            spacing_cv_epsilon: options.spacing_cv_tolerance,
        }
    }

    /// Eine der beiden Schwellen ist erreicht.
    pub fn is_converged(&self, max_displacement: f64, spacing_cv: f64) -> bool {
        max_displacement <= self.position_epsilon || spacing_cv <= self.spacing_cv_epsilon
    }

    /// Nach diesem Durchlauf aufhören?
    pub fn should_stop(&self, max_displacement: f64, spacing_cv: f64) -> bool {
        self.stop_on_convergence && self.is_converged(max_displacement, spacing_cv)
    }
}

/// Verlauf eines Pfads über alle Durchläufe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConvergenceReport {
    pub iterations: usize,
    pub converged: bool,
    /// Segmentlängen-CV nach jedem Durchlauf
    pub spacing_cv: Vec<f64>,
    /// Maximale Verschiebung nach jedem Durchlauf
    pub displacement: Vec<f64>,
}

impl ConvergenceReport {
    pub fn push(&mut self, max_displacement: f64, spacing_cv: f64) {
        self.iterations += 1;
        self.displacement.push(max_displacement);
        self.spacing_cv.push(spacing_cv);
    }
}
