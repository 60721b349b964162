//! Zusammenfassung einer Batch-Operation für Benutzer-Rückmeldung.

use crate::error::SkipReason;
use indexmap::IndexMap;

/// Ergebnis-Kategorie einer Operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    /// Mindestens ein Pfad verarbeitet
    Finished,
    /// Keine selektierten Kanten gefunden
    NothingFound,
    /// Pfade gefunden, aber alle übersprungen
    AllSkipped,
}

/// Zähler über alle Container einer Operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationSummary {
    /// Verarbeitete Pfade
    pub processed: usize,
    pub open: usize,
    pub closed: usize,
    /// Übersprungene Pfade, Komponenten oder Container
    pub skipped: usize,
    pub skip_reasons: IndexMap<SkipReason, usize>,
    /// Summe der Iterationen über alle iterierten Pfade
    pub total_iterations: usize,
    pub iterated_paths: usize,
    /// Verschiedene Weld-Positionen, die sich bewegt haben
    pub moved_points: usize,
    pub failed_containers: usize,
    /// Container mit mindestens einer selektierten Kante
    pub containers_with_selection: usize,
}

impl OperationSummary {
    pub fn record_skip(&mut self, reason: SkipReason) {
        self.skipped += 1;
        *self.skip_reasons.entry(reason).or_default() += 1;
    }

    pub fn record_processed(&mut self, closed: bool, moved_points: usize) {
        self.processed += 1;
        if closed {
            self.closed += 1;
        } else {
            self.open += 1;
        }
        self.moved_points += moved_points;
    }

    pub fn record_iterations(&mut self, iterations: usize) {
        self.total_iterations += iterations;
        self.iterated_paths += 1;
    }

    pub fn average_iterations(&self) -> f64 {
        if self.iterated_paths == 0 {
            0.0
        } else {
            self.total_iterations as f64 / self.iterated_paths as f64
        }
    }

    pub fn status(&self) -> OperationStatus {
        if self.processed > 0 {
            OperationStatus::Finished
        } else if self.containers_with_selection == 0 && self.skipped == 0 {
            OperationStatus::NothingFound
        } else {
            OperationStatus::AllSkipped
        }
    }

    /// Meldungstext wie in der Statuszeile.
    pub fn message(&self) -> String {
        match self.status() {
            OperationStatus::NothingFound => "Keine selektierten UV-Kanten gefunden".to_string(),
            OperationStatus::AllSkipped => {
                format!("Alle Schleifen übersprungen ({})", self.skip_details())
            }
            OperationStatus::Finished => {
                let mut text = format!(
                    "Fertig: {} offen, {} geschlossen, {} Punkte bewegt",
                    self.open, self.closed, self.moved_points
                );
                if self.iterated_paths > 0 {
                    text.push_str(&format!(
                        ", Ø {:.1} Iterationen",
                        self.average_iterations()
                    ));
                }
                if self.skipped > 0 {
                    text.push_str(&format!(
                        ", {} übersprungen ({})",
                        self.skipped,
                        self.skip_details()
                    ));
                }
                if self.failed_containers > 0 {
                    text.push_str(&format!(", {} Container fehlgeschlagen", self.failed_containers));
                }
                text
            }
        }
    }

    fn skip_details(&self) -> String {
        self.skip_reasons
            .iter()
            .map(|(reason, count)| format!("{reason}: {count}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_means_nothing_found() {
        let summary = OperationSummary::default();
        assert_eq!(summary.status(), OperationStatus::NothingFound);
        assert_eq!(summary.average_iterations(), 0.0);
    }

    #[test]
    fn only_skips_means_all_skipped() {
        let mut summary = OperationSummary {
            containers_with_selection: 1,
            ..OperationSummary::default()
        };
        summary.record_skip(SkipReason::DegeneratePath);
        summary.record_skip(SkipReason::DegeneratePath);
        assert_eq!(summary.status(), OperationStatus::AllSkipped);
        assert_eq!(summary.skip_reasons[&SkipReason::DegeneratePath], 2);
        assert!(summary.message().contains("entarteter Pfad: 2"));
    }

    #[test]
    fn finished_message_reports_average_iterations() {
        let mut summary = OperationSummary::default();
        summary.record_processed(true, 4);
        summary.record_processed(false, 2);
        summary.record_iterations(3);
        summary.record_iterations(1);
        assert_eq!(summary.status(), OperationStatus::Finished);
        assert_eq!(summary.average_iterations(), 2.0);
        assert_eq!(
            summary.message(),
            "Fertig: 1 offen, 1 geschlossen, 6 Punkte bewegt, Ø 2.0 Iterationen"
        );
    }
}
