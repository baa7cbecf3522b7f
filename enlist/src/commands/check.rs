use std::path::PathBuf;

use clap::Args;
use enlist_manifest::EnlistToml;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct CheckCommand {
    /// Path to enlist.toml (defaults to ./enlist.toml)
    #[arg(short, long, default_value = "enlist.toml")]
    pub config: PathBuf,
}

impl CheckCommand {
    /// Run the check command
    pub fn run(&self) -> Result<()> {
        let enlist_toml = EnlistToml::open(&self.config).unwrap_or_exit();

        let report = ops::check(enlist_toml.manifest(), &self.config)?;
        report.render(&mut TerminalOutput::new());

        if !report.is_valid() {
            std::process::exit(1);
        }
        Ok(())
    }
}
