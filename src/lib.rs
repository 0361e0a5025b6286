pub mod classify;
pub mod cli;
pub mod dwarf;
pub mod error;
pub mod loader;
pub mod model;
pub mod output;
pub mod surface;

pub use classify::{catalog_module, classify_type, method_signature};
pub use cli::Cli;
pub use dwarf::DwarfContext;
pub use error::{Error, Result};
pub use loader::{BinaryData, DependencySearch, LoadedModule};
pub use model::{Catalog, CatalogBuilder, Category, Entry, EntryId};
pub use output::ReportRenderer;
pub use surface::{
    MethodMember, Param, ScanFailure, ScanOutcome, TypeSurface, TypeSurfaceProvider, ValueMember,
};
