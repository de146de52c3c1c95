//! Index generation command

use std::path::Path;

use colored::Colorize;
use log::info;

use crate::error::Result;
use crate::index::FileIndex;

/// Walk `dir` and write the file index to `output`, or stdout
pub fn run(dir: &Path, output: Option<&Path>, prefix: &str) -> Result<()> {
    let index = FileIndex::generate(dir, prefix)?;
    let json = index.to_json()?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, format!("{}\n", json))?;
            info!("Wrote {} entries to {}", index.files.len(), path.display());
            eprintln!(
                "{} Indexed {} files into {}",
                "✓".green(),
                index.files.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}
