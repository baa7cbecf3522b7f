use std::path::PathBuf;

use clap::{Args, ValueEnum};
use enlist_core::{Side, Sides};
use enlist_manifest::EnlistToml;
use eyre::{Result, bail};

use super::UnwrapOrExit;
use crate::{
    ops::{self, BakeOptions},
    reports::{Report, TerminalOutput},
};

/// Which sides of generated data to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    /// Both sides
    All,
    /// Authoritative data only (tags, loot tables, recipes)
    Authoritative,
    /// Presentation data only (names, models)
    Presentation,
}

impl SideArg {
    pub fn sides(self) -> Sides {
        match self {
            SideArg::All => Sides::all(),
            SideArg::Authoritative => Sides::only(Side::Authoritative),
            SideArg::Presentation => Sides::only(Side::Presentation),
        }
    }
}

#[derive(Args)]
pub struct BakeCommand {
    /// Path to enlist.toml (defaults to ./enlist.toml)
    #[arg(short, long, default_value = "enlist.toml")]
    pub config: PathBuf,

    /// Output directory (overrides [output] dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Sides to generate (overrides [output.sides])
    #[arg(short, long, value_enum)]
    pub side: Option<SideArg>,

    /// Preview generated files without writing to disk
    #[arg(long)]
    pub dry_run: bool,

    /// Do not overwrite files that already exist in the output directory
    #[arg(long)]
    pub keep_existing: bool,
}

impl BakeCommand {
    /// Run the bake command
    pub fn run(&self) -> Result<()> {
        let enlist_toml = EnlistToml::open(&self.config).unwrap_or_exit();
        let manifest = enlist_toml.manifest();

        let output_dir = self
            .output
            .clone()
            .unwrap_or_else(|| enlist_toml.output_dir());
        let sides = self
            .side
            .map(SideArg::sides)
            .unwrap_or(manifest.output.sides);

        let report = ops::bake(
            manifest,
            BakeOptions {
                output_dir: &output_dir,
                sides,
                dry_run: self.dry_run,
                keep_existing: self.keep_existing,
            },
        )?;
        report.render(&mut TerminalOutput::new());

        if !report.failures.is_empty() {
            bail!("{} data callback(s) failed", report.failures.len());
        }
        Ok(())
    }
}
