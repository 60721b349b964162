//! Integrationstests für die Spline-Sitzung über mehrere Meshes
//! und für den Datei-Weg (JSON-Mesh, TOML-Optionen).

use approx::assert_relative_eq;
use glam::DVec3;
use uv_loop_tools::app::{write_session_updates, InsertAnchor};
use uv_loop_tools::{CurveSession, EngineOptions, Operation, Point2, SessionEdit, UvMesh};

fn arc_mesh(name: &str, y: f64) -> UvMesh {
    let uv: Vec<Point2> = (0..6)
        .map(|i| {
            let x = 0.1 + 0.1 * i as f64;
            Point2::new(x, y + 0.05 * (x * 3.0).sin())
        })
        .collect();
    let pos: Vec<DVec3> = (0..6).map(|i| DVec3::new(i as f64, 0.0, 0.0)).collect();
    UvMesh::strip(name, &uv, &pos, false)
}

#[test]
fn test_session_edit_commit_writes_all_meshes() {
    let mut meshes = vec![arc_mesh("Oben", 0.7), arc_mesh("Unten", 0.2)];
    let originals = meshes.clone();
    let options = EngineOptions::default();

    let started = CurveSession::begin_with(&meshes, options.curve.default_control_points, &options)
        .expect("kein Fehler erwartet")
        .expect("Sitzung erwartet");
    let mut session = started.session;
    write_session_updates(&mut meshes, &started.updates).expect("Vorschau schreibbar");
    assert_eq!(session.curves().len(), 2);
    let top_before = meshes[0].clone();

    let updates = session
        .apply_edit(SessionEdit::Insert {
            curve: 1,
            anchor: InsertAnchor::Fraction(0.25),
        })
        .expect("Einfügen erwartet");
    write_session_updates(&mut meshes, &updates).expect("Vorschau schreibbar");
    let updates = session
        .apply_edit(SessionEdit::MoveSelected {
            delta: Point2::new(0.0, -0.05),
        })
        .expect("Verschieben erwartet");
    write_session_updates(&mut meshes, &updates).expect("Vorschau schreibbar");

    assert_eq!(meshes[0], top_before, "Die obere Kurve bleibt unverändert");
    assert_ne!(meshes[1], originals[1]);

    let commit = session.commit();
    assert_eq!(commit.control_point_count, 5);
}

#[test]
fn test_session_cancel_restores_every_touched_corner() {
    let mut meshes = vec![arc_mesh("Bogen", 0.5)];
    let originals = meshes.clone();
    let options = EngineOptions::default();

    let started = CurveSession::begin_with(&meshes, 3, &options)
        .expect("kein Fehler erwartet")
        .expect("Sitzung erwartet");
    let mut session = started.session;
    write_session_updates(&mut meshes, &started.updates).expect("Vorschau schreibbar");
    let updates = session
        .apply_edit(SessionEdit::ResampleFromCurrent { count: 7 })
        .expect("Neu-Verteilen erwartet");
    write_session_updates(&mut meshes, &updates).expect("Vorschau schreibbar");

    let restore = session.cancel();
    write_session_updates(&mut meshes, &restore).expect("Zurücksetzen schreibbar");
    for (handle, corner) in originals[0].corners() {
        let now = meshes[0].corner_uv(handle).expect("Ecke erwartet");
        assert_relative_eq!(now.x, corner.uv.x, epsilon = 1e-12);
        assert_relative_eq!(now.y, corner.uv.y, epsilon = 1e-12);
    }
}

#[test]
fn test_mesh_and_options_files_roundtrip_through_batch() {
    let dir = std::env::temp_dir().join(format!("uv_loop_tools_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("Temp-Verzeichnis erwartet");
    let mesh_path = dir.join("bogen.json");
    let options_path = dir.join("optionen.toml");

    arc_mesh("Bogen", 0.5).save_json(&mesh_path).expect("Mesh speicherbar");
    let options = EngineOptions {
        weld_tolerance: 1e-5,
        ..EngineOptions::default()
    };
    options.save_to_file(&options_path).expect("Optionen speicherbar");

    let loaded_options = EngineOptions::load_from_file(&options_path);
    assert_eq!(loaded_options, options);
    let mut meshes = vec![UvMesh::load_json(&mesh_path).expect("Mesh ladbar")];
    let summary = uv_loop_tools::run_operation(&mut meshes, Operation::Equalize, &loaded_options)
        .expect("Equalize erwartet");
    assert_eq!(summary.processed, 1);

    let _ = std::fs::remove_dir_all(&dir);
}
