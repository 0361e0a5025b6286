use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "surface-audit")]
#[command(
    author,
    version,
    about = "Catalogue the public type surface of a compiled binary module"
)]
#[command(
    long_about = "surface-audit reads the type information of a compiled binary module and \
prints a tabular catalogue of every publicly visible type, static field, property, method \
and field it declares.\n\n\
Example:\n  surface-audit ./target/debug/libmylib.so"
)]
pub struct Cli {
    /// Path to the module to catalogue, resolved relative to the current directory
    #[arg(value_name = "MODULE")]
    pub module: Option<PathBuf>,
}
