use crate::error::{Error, Result};
use gimli::{Dwarf, EndianSlice, RunTimeEndian, SectionId};
use memmap2::Mmap;
use object::{Object, ObjectSection};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct BinaryData {
    pub mmap: Mmap,
}

pub type DwarfSlice<'a> = EndianSlice<'a, RunTimeEndian>;

/// DWARF sections worth carrying; anything else is left on disk.
const DEBUG_SECTIONS: &[SectionId] = &[
    SectionId::DebugAbbrev,
    SectionId::DebugAddr,
    SectionId::DebugAranges,
    SectionId::DebugInfo,
    SectionId::DebugLine,
    SectionId::DebugLineStr,
    SectionId::DebugLoc,
    SectionId::DebugLocLists,
    SectionId::DebugRanges,
    SectionId::DebugRngLists,
    SectionId::DebugStr,
    SectionId::DebugStrOffsets,
    SectionId::DebugTypes,
];

/// A module whose debug sections have been copied into owned storage.
///
/// Owning the bytes (decompressed where the producer compressed them) keeps
/// the `Dwarf` view free of any tie to the original mapping, including when
/// the sections actually came from a separate debug companion file.
#[derive(Debug)]
pub struct LoadedModule {
    sections: HashMap<&'static str, Vec<u8>>,
    pub endian: RunTimeEndian,
}

impl LoadedModule {
    /// Borrow a DWARF view over the stored sections. Missing sections read
    /// as empty, which gimli treats as absent.
    pub fn dwarf(&self) -> Result<Dwarf<DwarfSlice<'_>>> {
        Dwarf::load(|id: SectionId| -> std::result::Result<DwarfSlice<'_>, gimli::Error> {
            let data = self.sections.get(id.name()).map(|v| v.as_slice()).unwrap_or(&[]);
            Ok(EndianSlice::new(data, self.endian))
        })
        .map_err(|e| Error::Dwarf(e.to_string()))
    }
}

impl BinaryData {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: The file is opened read-only and we keep the mmap alive
        // for the lifetime of BinaryData.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap })
    }

    /// Parse the module container and assemble its DWARF sections.
    ///
    /// When the module itself carries no `.debug_info`, its declared debug
    /// companion is resolved by searching `search_root` recursively; failing
    /// that, the error carries the full resolution trace.
    pub fn load_module(&self, search_root: &Path) -> Result<LoadedModule> {
        let object = object::File::parse(&*self.mmap)?;

        if !matches!(
            object.format(),
            object::BinaryFormat::Elf | object::BinaryFormat::MachO | object::BinaryFormat::Pe
        ) {
            return Err(Error::UnsupportedFormat);
        }

        let endian =
            if object.is_little_endian() { RunTimeEndian::Little } else { RunTimeEndian::Big };

        let mut sections = collect_debug_sections(&object);

        if sections.get(SectionId::DebugInfo.name()).is_none_or(|data| data.is_empty()) {
            let mut search = DependencySearch::new(search_root);
            match resolve_debug_companion(&object, &mut search) {
                Some(companion_path) => {
                    let companion = BinaryData::load(&companion_path)?;
                    let companion_object = object::File::parse(&*companion.mmap)?;
                    sections = collect_debug_sections(&companion_object);
                }
                None => return Err(Error::NoDebugInfo { resolution_log: search.into_log() }),
            }
            if sections.get(SectionId::DebugInfo.name()).is_none_or(|data| data.is_empty()) {
                return Err(Error::NoDebugInfo { resolution_log: search.into_log() });
            }
        }

        Ok(LoadedModule { sections, endian })
    }
}

/// Copy every present debug section out of the container, keyed by its
/// canonical `.debug_*` name. `.zdebug_*` variants are decompressed by
/// `uncompressed_data` and stored under the canonical name.
fn collect_debug_sections(object: &object::File<'_>) -> HashMap<&'static str, Vec<u8>> {
    let mut sections = HashMap::new();

    for &id in DEBUG_SECTIONS {
        let name = id.name();
        let zname = name.replacen(".debug_", ".zdebug_", 1);

        let data = object
            .section_by_name(name)
            .or_else(|| object.section_by_name(&zname))
            .and_then(|section| section.uncompressed_data().ok())
            .map(|data| data.into_owned());

        if let Some(data) = data
            && !data.is_empty()
        {
            sections.insert(name, data);
        }
    }

    sections
}

/// Follow the module's `.gnu_debuglink` reference through the search tree.
fn resolve_debug_companion(
    object: &object::File<'_>,
    search: &mut DependencySearch,
) -> Option<PathBuf> {
    let link_name = match object.gnu_debuglink() {
        Ok(Some((name, _crc))) => String::from_utf8_lossy(name).into_owned(),
        _ => {
            search.note("module declares no debug companion");
            return None;
        }
    };

    let build_id = object.build_id().ok().flatten();
    search.resolve(&link_name, build_id)
}

/// Recursive search for a referenced sibling module under one root directory.
///
/// Candidates are matched by file name, then by GNU build-id when the
/// referencing module carries one. Every probe is logged so a failed
/// resolution can be dumped alongside the load diagnostics.
pub struct DependencySearch {
    root: PathBuf,
    log: Vec<String>,
}

impl DependencySearch {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), log: Vec::new() }
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.log.push(message.into());
    }

    pub fn into_log(self) -> Vec<String> {
        self.log
    }

    /// Walk the root in name-sorted order and return the first candidate
    /// whose identity matches, or `None` when nothing matches.
    pub fn resolve(&mut self, file_name: &str, build_id: Option<&[u8]>) -> Option<PathBuf> {
        self.note(format!("searching for '{}' under {}", file_name, self.root.display()));

        let walker = WalkDir::new(&self.root).sort_by_file_name().into_iter();
        for entry in walker.filter_map(|entry| entry.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_str() != Some(file_name) {
                continue;
            }

            let path = entry.path();
            match identity_matches(path, build_id) {
                Ok(true) => {
                    self.note(format!("resolved to {}", path.display()));
                    return Some(path.to_path_buf());
                }
                Ok(false) => self.note(format!("identity mismatch: {}", path.display())),
                Err(e) => self.note(format!("could not probe {}: {}", path.display(), e)),
            }
        }

        self.note(format!("no candidate matching '{}' found", file_name));
        None
    }
}

/// A candidate matches when its build-id equals the referencing module's.
/// Without a build-id to compare against, the name match stands.
fn identity_matches(path: &Path, want: Option<&[u8]>) -> Result<bool> {
    let Some(want) = want else { return Ok(true) };

    let data = BinaryData::load(path)?;
    let object = object::File::parse(&*data.mmap)?;
    Ok(object.build_id().ok().flatten().is_some_and(|id| id == want))
}
