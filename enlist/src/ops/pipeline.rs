//! The register and generate signals, driven against an in-memory host.

use enlist_core::Sides;
use enlist_manifest::Manifest;
use enlist_registry::{
    GenerateOutput, GenerateSignal, GenerationSession, MemoryRegistry, RegisterReport, Registrar,
};
use eyre::{Context, Result};

use super::declare::{ContentKinds, declare};

/// Everything one run of both signals produced.
pub struct PipelineRun {
    pub kinds: ContentKinds,
    pub host: MemoryRegistry,
    pub registered: RegisterReport,
    pub output: GenerateOutput,
}

/// Declare the manifest's entries, then deliver the register and generate
/// signals.
///
/// With `skip_errors`, registration failures are collected in the report
/// instead of aborting, whatever the manifest says.
pub fn run(
    manifest: &Manifest,
    sides: Sides,
    skip_errors: bool,
) -> Result<PipelineRun> {
    let mut config = manifest.registrar.clone();
    if skip_errors {
        config = config.skip_errors(true);
    }
    let registrar = Registrar::with_config(config)?;

    let kinds = declare(&registrar, manifest).wrap_err("Failed to declare entries")?;

    let mut host = MemoryRegistry::new();
    let registered = registrar
        .register_all(&mut host)
        .wrap_err("Registration failed")?;

    let signal = GenerateSignal::new(sides, GenerationSession::new(manifest.namespace()));
    let output = registrar
        .generate(&signal)
        .wrap_err("Generation failed")?;

    Ok(PipelineRun {
        kinds,
        host,
        registered,
        output,
    })
}
