use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read module: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse module: {0}")]
    ObjectParse(#[from] object::read::Error),

    /// The module and its resolvable companions carry no `.debug_info`.
    /// The log records every companion probe made before giving up.
    #[error(
        "No type information found. Compile the module with debug info, or place its \
         debug companion somewhere under the working directory."
    )]
    NoDebugInfo { resolution_log: Vec<String> },

    #[error("Unsupported module format; expected ELF, Mach-O or PE")]
    UnsupportedFormat,

    #[error("Failed to read DWARF data: {0}")]
    Dwarf(String),
}
