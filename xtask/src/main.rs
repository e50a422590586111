use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use diamond_common::DiamondColor;
use diamond_scene::SceneManifest;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for Diamond's Universe")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy, tests and docs
    Check,
    Fmt,
    Clippy,
    Test,
    Doc,
    /// Report every asset the scene expects that is missing on disk
    CheckResources {
        #[arg(long, default_value = "resources")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            for step in [fmt, clippy, test, doc] {
                step()?;
            }
        }
        Commands::Fmt => fmt()?,
        Commands::Clippy => clippy()?,
        Commands::Test => test()?,
        Commands::Doc => doc()?,
        Commands::CheckResources { dir } => check_resources(&dir)?,
    }

    Ok(())
}

fn cargo(args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .context("failed to spawn cargo")?;
    if !status.success() {
        anyhow::bail!("cargo {} failed", args[0]);
    }
    Ok(())
}

fn fmt() -> Result<()> {
    cargo(&["fmt", "--all", "--", "--check"])
}

fn clippy() -> Result<()> {
    cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
}

fn test() -> Result<()> {
    cargo(&["test", "--workspace"])
}

fn doc() -> Result<()> {
    cargo(&["doc", "--workspace", "--no-deps"])
}

/// Every file the scene loads, relative to the resource root.
fn expected_assets(manifest: &SceneManifest) -> Vec<String> {
    let mut assets: Vec<String> = manifest
        .sunset_faces()
        .into_iter()
        .chain(manifest.universe_faces())
        .collect();
    assets.push(manifest.window_texture.clone());
    assets.extend(DiamondColor::ALL.iter().map(|c| c.model_path()));
    assets.extend(manifest.orbits.iter().map(|body| body.model.clone()));
    assets
}

fn missing_assets(dir: &Path, manifest: &SceneManifest) -> Vec<String> {
    expected_assets(manifest)
        .into_iter()
        .filter(|relative| !dir.join(relative).is_file())
        .collect()
}

fn check_resources(dir: &Path) -> Result<()> {
    let manifest = SceneManifest::load(dir)
        .with_context(|| format!("reading scene manifest in {}", dir.display()))?;
    let missing = missing_assets(dir, &manifest);
    let total = expected_assets(&manifest).len();

    for relative in &missing {
        println!("missing: {relative}");
    }
    println!("{} of {total} assets present", total - missing.len());

    if !missing.is_empty() {
        anyhow::bail!("{} assets missing under {}", missing.len(), dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expects_both_skyboxes_and_diamonds() {
        let manifest = SceneManifest::default();
        let assets = expected_assets(&manifest);
        assert_eq!(assets.len(), 12 + 1 + 2 + manifest.orbits.len());
        assert!(assets.contains(&"objects/diamond_pink/diamond.obj".to_string()));
    }

    #[test]
    fn present_files_are_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = SceneManifest::default();
        let window = dir.path().join(&manifest.window_texture);
        std::fs::create_dir_all(window.parent().unwrap()).unwrap();
        std::fs::write(&window, b"png").unwrap();

        let missing = missing_assets(dir.path(), &manifest);
        assert_eq!(missing.len(), expected_assets(&manifest).len() - 1);
        assert!(!missing.contains(&manifest.window_texture));
    }
}
