use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use surface_audit::{
    BinaryData, Catalog, Cli, DwarfContext, ReportRenderer, ScanFailure, catalog_module,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    // TODO: print a usage hint here; invoking without a module path
    // currently exits silently, which is preserved behavior but unhelpful.
    let Some(module) = cli.module else {
        return Ok(());
    };
    run_report(&module)
}

fn run_report(module: &Path) -> Result<()> {
    let search_root =
        std::env::current_dir().context("Failed to resolve the working directory")?;

    let (catalog, failures) = match scan_module(module, &search_root) {
        Ok(result) => result,
        // A module that cannot be loaded at all still produces a report:
        // title, diagnostics, footer.
        Err(err) => (Catalog::default(), vec![ScanFailure::from(err)]),
    };

    let renderer = ReportRenderer::new(module_display_name(module));
    print!("{}", renderer.render(&catalog, &failures));

    Ok(())
}

fn scan_module(
    module: &Path,
    search_root: &Path,
) -> surface_audit::Result<(Catalog, Vec<ScanFailure>)> {
    let binary = BinaryData::load(module)?;
    let loaded = binary.load_module(search_root)?;
    let dwarf = loaded.dwarf()?;
    let context = DwarfContext::new(&dwarf);
    Ok(catalog_module(&context))
}

fn module_display_name(module: &Path) -> String {
    module
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| module.display().to_string())
}
