use std::path::PathBuf;

use clap::Args;
use enlist_manifest::EnlistToml;
use eyre::Result;

use super::UnwrapOrExit;

#[derive(Args)]
pub struct ListCommand {
    /// Path to enlist.toml (defaults to ./enlist.toml)
    #[arg(short, long, default_value = "enlist.toml")]
    pub config: PathBuf,
}

impl ListCommand {
    pub fn run(&self) -> Result<()> {
        let enlist_toml = EnlistToml::open(&self.config).unwrap_or_exit();
        let manifest = enlist_toml.manifest();

        if manifest.entries.is_empty() {
            println!("No entries defined");
            return Ok(());
        }

        for kind in manifest.kinds() {
            println!("{kind}:");
            for entry in manifest.entries.iter().filter(|e| e.kind == kind) {
                let mut line = format!("  {}:{}", manifest.namespace(), entry.name);
                if let Some(parent) = &entry.parent {
                    line.push_str(&format!(" (under {parent})"));
                }
                if !entry.tags.is_empty() {
                    line.push_str(&format!(" [{}]", entry.tags.join(", ")));
                }
                println!("{line}");
            }
        }

        Ok(())
    }
}
