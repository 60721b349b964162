//! Zentrale Konfiguration der UV-Schleifen-Werkzeuge.
//!
//! `EngineOptions` enthält alle pro Aufruf änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use crate::core::LoopTypeOverride;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

// ── Toleranzen ──────────────────────────────────────────────────────

/// Standard-Weld-Toleranz (UV-Einheiten).
pub const WELD_TOLERANCE_DEFAULT: f64 = 1e-6;
/// Kleinste erlaubte Weld-Toleranz.
pub const WELD_TOLERANCE_MIN: f64 = 1e-8;
/// Größte erlaubte Weld-Toleranz.
pub const WELD_TOLERANCE_MAX: f64 = 1e-2;
/// Obergrenze der Graph-Toleranz (feinere Stufe).
pub const GRAPH_TOLERANCE_CAP: f64 = 5e-7;
/// Untergrenze für die Quantisierungs-Skala `1 / tol`.
pub const QUANTIZE_SCALE_FLOOR: f64 = 1e-12;
/// Abstand, unter dem aufeinanderfolgende Punkte als Duplikat gelten.
pub const DEDUP_EPSILON: f64 = 1e-9;
/// Gesamtlänge, unter der eine Schleife als entartet gilt.
pub const ARC_LENGTH_FLOOR: f64 = 1e-20;

// ── Wiederholung / Konvergenz ───────────────────────────────────────

/// Wiederholungen im Fixed-Modus.
pub const ITERATION_COUNT_DEFAULT: usize = 5;
/// Obergrenze für `iteration_count`.
pub const ITERATION_COUNT_MAX: usize = 100;
/// Wiederholungs-Obergrenze im Auto-Modus.
pub const AUTO_MAX_ITERATIONS_DEFAULT: usize = 12;
/// Obergrenze für `auto_max_iterations`.
pub const AUTO_MAX_ITERATIONS_MAX: usize = 25;
/// Auto-Stopp: maximale Positionsänderung.
pub const CONVERGE_EPSILON_DEFAULT: f64 = 1e-6;
/// Auto-Stopp: Variationskoeffizient der Segmentlängen.
pub const SPACING_CV_TOLERANCE_DEFAULT: f64 = 0.002;

// ── Spline-Sitzung ──────────────────────────────────────────────────

/// Kontrollpunkte beim Start einer Sitzung.
pub const CONTROL_POINTS_DEFAULT: usize = 4;
/// Maximale Kontrollpunkte pro Kurve.
pub const CONTROL_POINTS_MAX: usize = 30;
/// Dichte der Kurven-Auswertung (Samples über alle Segmente).
pub const CURVE_RESOLUTION: usize = 128;

/// Wiederholungsmodus der Equalize-Operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationMode {
    /// Wiederholen bis konvergiert (mit Obergrenze)
    #[default]
    Auto,
    /// Exakt `iteration_count` Durchläufe
    Fixed,
}

/// Einstellungen der interaktiven Spline-Sitzung.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveOptions {
    /// Kontrollpunkte pro Kurve beim Start
    pub default_control_points: usize,
    /// Obergrenze beim Ändern der Kontrollpunkt-Anzahl
    pub max_control_points: usize,
    /// Sample-Dichte für Kurven-Auswertung
    pub resolution: usize,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            default_control_points: CONTROL_POINTS_DEFAULT,
            max_control_points: CONTROL_POINTS_MAX,
            resolution: CURVE_RESOLUTION,
        }
    }
}

/// Alle pro Aufruf änderbaren Optionen.
/// Kann als `uv_loop_tools.toml` gespeichert werden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Rundung, unter der UV-Punkte als derselbe Punkt gelten
    pub weld_tolerance: f64,
    /// Schleifentyp erzwingen oder automatisch bestimmen
    #[serde(default)]
    pub loop_type: LoopTypeOverride,
    /// Auto (konvergieren) oder feste Anzahl
    #[serde(default)]
    pub iteration_mode: IterationMode,
    /// Durchläufe im Fixed-Modus
    pub iteration_count: usize,
    /// Obergrenze im Auto-Modus
    pub auto_max_iterations: usize,
    /// Auto-Stopp bei maximaler Positionsänderung ≤ diesem Wert
    pub converge_epsilon: f64,
    /// Auto-Stopp bei Segmentlängen-CV ≤ diesem Wert
    pub spacing_cv_tolerance: f64,
    /// Offene Schleifen immer nur einmal verarbeiten
    #[serde(default = "default_repeat_closed_only")]
    pub repeat_closed_only: bool,
    /// Spline-Sitzung
    #[serde(default)]
    pub curve: CurveOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            weld_tolerance: WELD_TOLERANCE_DEFAULT,
            loop_type: LoopTypeOverride::Auto,
            iteration_mode: IterationMode::Auto,
            iteration_count: ITERATION_COUNT_DEFAULT,
            auto_max_iterations: AUTO_MAX_ITERATIONS_DEFAULT,
            converge_epsilon: CONVERGE_EPSILON_DEFAULT,
            spacing_cv_tolerance: SPACING_CV_TOLERANCE_DEFAULT,
            repeat_closed_only: true,
            curve: CurveOptions::default(),
        }
    }
}

fn default_repeat_closed_only() -> bool {
    true
}

impl EngineOptions {
    /// Lädt Optionen aus einer TOML-Datei. Fehlt die Datei oder ist sie
    /// fehlerhaft, werden Standardwerte verwendet.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Prüft alle Wertebereiche, bevor irgendetwas verarbeitet wird.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(WELD_TOLERANCE_MIN..=WELD_TOLERANCE_MAX).contains(&self.weld_tolerance) {
            return Err(EngineError::invalid_option(
                "weld_tolerance",
                self.weld_tolerance,
                "muss zwischen 1e-8 und 1e-2 liegen",
            ));
        }
        if !(1..=ITERATION_COUNT_MAX).contains(&self.iteration_count) {
            return Err(EngineError::invalid_option(
                "iteration_count",
                self.iteration_count,
                "muss zwischen 1 und 100 liegen",
            ));
        }
        if !(1..=AUTO_MAX_ITERATIONS_MAX).contains(&self.auto_max_iterations) {
            return Err(EngineError::invalid_option(
                "auto_max_iterations",
                self.auto_max_iterations,
                "muss zwischen 1 und 25 liegen",
            ));
        }
        if !(1e-9..=1e-2).contains(&self.converge_epsilon) {
            return Err(EngineError::invalid_option(
                "converge_epsilon",
                self.converge_epsilon,
                "muss zwischen 1e-9 und 1e-2 liegen",
            ));
        }
        if !(0.0..=0.1).contains(&self.spacing_cv_tolerance) {
            return Err(EngineError::invalid_option(
                "spacing_cv_tolerance",
                self.spacing_cv_tolerance,
                "muss zwischen 0 und 0.1 liegen",
            ));
        }
        let curve = &self.curve;
        if curve.max_control_points < 3 {
            return Err(EngineError::invalid_option(
                "curve.max_control_points",
                curve.max_control_points,
                "muss mindestens 3 sein",
            ));
        }
        if !(2..=curve.max_control_points).contains(&curve.default_control_points) {
            return Err(EngineError::invalid_option(
                "curve.default_control_points",
                curve.default_control_points,
                "muss zwischen 2 und max_control_points liegen",
            ));
        }
        if curve.resolution < 2 {
            return Err(EngineError::invalid_option(
                "curve.resolution",
                curve.resolution,
                "muss mindestens 2 sein",
            ));
        }
        Ok(())
    }

    /// Positions-Schwelle der Konvergenz: nie feiner als die halbe Weld-Toleranz.
    pub fn position_epsilon(&self) -> f64 {
        self.converge_epsilon.max(self.weld_tolerance * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineOptions::default().validate().is_ok());
    }

    #[test]
    fn weld_tolerance_out_of_range_is_rejected() {
        let options = EngineOptions {
            weld_tolerance: 0.5,
            ..EngineOptions::default()
        };
        let err = options.validate().expect_err("Fehler erwartet");
        assert!(err.to_string().contains("weld_tolerance"));
    }

    #[test]
    fn position_epsilon_uses_half_weld_tolerance_when_larger() {
        let options = EngineOptions {
            weld_tolerance: 1e-4,
            converge_epsilon: 1e-6,
            ..EngineOptions::default()
        };
        assert_eq!(options.position_epsilon(), 5e-5);
    }

    #[test]
    fn toml_roundtrip_keeps_all_fields() {
        let options = EngineOptions {
            loop_type: LoopTypeOverride::Closed,
            iteration_mode: IterationMode::Fixed,
            iteration_count: 3,
            ..EngineOptions::default()
        };
        let text = toml::to_string_pretty(&options).expect("Serialisierung erwartet");
        assert!(text.contains("loop_type = \"closed\""));
        let back: EngineOptions = toml::from_str(&text).expect("Parse erwartet");
        assert_eq!(back, options);
    }

    #[test]
    fn partial_toml_falls_back_to_field_defaults() {
        let text = "weld_tolerance = 1e-5\niteration_count = 5\nauto_max_iterations = 12\n\
                    converge_epsilon = 1e-6\nspacing_cv_tolerance = 0.002\n";
        let options: EngineOptions = toml::from_str(text).expect("Parse erwartet");
        assert_eq!(options.loop_type, LoopTypeOverride::Auto);
        assert!(options.repeat_closed_only);
        assert_eq!(options.curve, CurveOptions::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let options = EngineOptions::load_from_file(std::path::Path::new(
            "/nonexistent/uv_loop_tools.toml",
        ));
        assert_eq!(options, EngineOptions::default());
    }
}
