//! UV Loop Tools (Kommandozeile).
//!
//! Führt eine Batch-Operation auf UV-Meshes im JSON-Format aus.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use uv_loop_tools::{run_operation, EngineOptions, Operation, UvMesh};

#[derive(Parser)]
#[command(name = "uv-loop-tools")]
#[command(version, about = "UV-Kantenschleifen angleichen, gerade ziehen, an 3D-Längen anpassen", long_about = None)]
struct Cli {
    /// Auszuführende Operation
    #[arg(value_enum)]
    operation: OperationArg,

    /// Mesh-Dateien (JSON)
    #[arg(required = true)]
    meshes: Vec<PathBuf>,

    /// Optionen aus einer TOML-Datei
    #[arg(long)]
    options: Option<PathBuf>,

    /// Ergebnis in die Mesh-Dateien zurückschreiben
    #[arg(long)]
    write: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OperationArg {
    /// Abstände angleichen, Form bleibt
    Equalize,
    /// Offene Schleifen gerade ziehen
    Straighten,
    /// Abstände im Verhältnis der 3D-Längen
    #[value(name = "match3d")]
    Match3d,
    /// Wie match3d, aber gerade (nur offen)
    #[value(name = "match3d-straighten")]
    Match3dStraighten,
}

impl From<OperationArg> for Operation {
    fn from(arg: OperationArg) -> Self {
        match arg {
            OperationArg::Equalize => Operation::Equalize,
            OperationArg::Straighten => Operation::StraightenOpen,
            OperationArg::Match3d => Operation::Match3dRatio,
            OperationArg::Match3dStraighten => Operation::Match3dStraighten,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    log::info!("UV Loop Tools v{} startet...", env!("CARGO_PKG_VERSION"));

    let options = match &cli.options {
        Some(path) => EngineOptions::load_from_file(path),
        None => EngineOptions::default(),
    };

    let mut meshes = cli
        .meshes
        .iter()
        .map(|p| UvMesh::load_json(p))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let summary = run_operation(&mut meshes, cli.operation.into(), &options)?;
    println!("{}", summary.message());

    if cli.write {
        for (mesh, path) in meshes.iter().zip(&cli.meshes) {
            mesh.save_json(path)?;
            log::info!("Mesh geschrieben: {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let cli = Cli::try_parse_from([
            "uv-loop-tools",
            "match3d",
            "a.json",
            "--options",
            "o.toml",
            "b.json",
            "--write",
        ])
        .expect("gültige Argumente");
        assert_eq!(Operation::from(cli.operation), Operation::Match3dRatio);
        assert_eq!(cli.meshes, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(cli.options, Some(PathBuf::from("o.toml")));
        assert!(cli.write);
    }

    #[test]
    fn test_parse_kebab_case_operation() {
        let cli = Cli::try_parse_from(["uv-loop-tools", "match3d-straighten", "a.json"])
            .expect("gültige Argumente");
        assert_eq!(cli.operation, OperationArg::Match3dStraighten);
        assert!(!cli.write);
        assert_eq!(cli.options, None);
    }

    #[test]
    fn test_parse_rejects_unknown_operation_and_missing_mesh() {
        assert!(Cli::try_parse_from(["uv-loop-tools", "smooth", "a.json"]).is_err());
        assert!(Cli::try_parse_from(["uv-loop-tools", "equalize"]).is_err());
        assert!(Cli::try_parse_from(["uv-loop-tools", "equalize", "a.json", "--fast"]).is_err());
        assert!(Cli::try_parse_from(["uv-loop-tools"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
