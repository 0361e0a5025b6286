use crate::dwarf::{read_flag_from_attr, read_u64_from_attr};
use crate::error::{Error, Result};
use crate::loader::DwarfSlice;
use crate::surface::{
    MethodMember, Param, ScanFailure, ScanOutcome, TypeSurface, TypeSurfaceProvider, ValueMember,
};
use gimli::{DebuggingInformationEntry, Dwarf, EntriesTreeNode, Unit, UnitOffset};
use std::collections::HashSet;

use super::TypeResolver;

/// DWARF-backed type-surface provider.
///
/// Walks every compilation unit, applies the type-discovery filters and
/// collects the publicly declared, own-declared members of each class-like
/// type. Units or types that fail to parse become scan failures; the walk
/// always continues with whatever still resolves.
pub struct DwarfContext<'a, 'b> {
    dwarf: &'b Dwarf<DwarfSlice<'a>>,
}

impl TypeSurfaceProvider for DwarfContext<'_, '_> {
    fn scan(&self) -> ScanOutcome {
        self.scan_types()
    }
}

impl<'a, 'b> DwarfContext<'a, 'b> {
    pub fn new(dwarf: &'b Dwarf<DwarfSlice<'a>>) -> Self {
        Self { dwarf }
    }

    pub fn scan_types(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        // Header-defined types recur across units; first definition wins.
        let mut seen: HashSet<String> = HashSet::new();
        let mut units = self.dwarf.units();

        loop {
            let header = match units.next() {
                Ok(Some(header)) => header,
                Ok(None) => break,
                Err(e) => {
                    outcome
                        .failures
                        .push(ScanFailure::new(format!("Failed to read unit header: {}", e)));
                    break;
                }
            };
            match self.dwarf.unit(header) {
                Ok(unit) => self.scan_unit(&unit, &mut seen, &mut outcome),
                Err(e) => outcome
                    .failures
                    .push(ScanFailure::new(format!("Failed to load compilation unit: {}", e))),
            }
        }

        outcome
    }

    fn scan_unit(
        &self,
        unit: &Unit<DwarfSlice<'a>>,
        seen: &mut HashSet<String>,
        outcome: &mut ScanOutcome,
    ) {
        let mut resolver = TypeResolver::new(self.dwarf, unit);
        let mut entries = unit.entries();

        loop {
            let (tag, offset, name) = match entries.next_dfs() {
                Ok(Some((_, entry))) => {
                    let tag = entry.tag();
                    if !matches!(tag, gimli::DW_TAG_structure_type | gimli::DW_TAG_class_type) {
                        continue;
                    }
                    // Forward declarations carry no member surface.
                    if read_flag_from_attr(
                        entry.attr_value(gimli::DW_AT_declaration).ok().flatten(),
                    ) {
                        continue;
                    }
                    let name = match self.get_die_name(unit, entry) {
                        Ok(Some(name)) => name,
                        Ok(None) => continue, // anonymous
                        Err(e) => {
                            outcome.failures.push(ScanFailure::new(e.to_string()));
                            continue;
                        }
                    };
                    if name.starts_with("__") {
                        continue; // compiler-generated
                    }
                    (tag, entry.offset(), name)
                }
                Ok(None) => break,
                Err(e) => {
                    outcome
                        .failures
                        .push(ScanFailure::new(format!("Failed to walk debug entries: {}", e)));
                    break;
                }
            };

            if seen.contains(&name) {
                continue;
            }

            match self.collect_type(unit, offset, tag, &name, &mut resolver) {
                Ok(Some(surface)) => {
                    seen.insert(name);
                    outcome.types.push(surface);
                }
                Ok(None) => {}
                Err(e) => outcome.failures.push(ScanFailure::new(format!(
                    "Type '{}' could not be inspected: {}",
                    name, e
                ))),
            }
        }
    }

    /// Collect one type's member surface, or `None` when a discovery filter
    /// rejects it (delegate-like types with a function-type base).
    fn collect_type(
        &self,
        unit: &Unit<DwarfSlice<'a>>,
        offset: UnitOffset,
        tag: gimli::DwTag,
        name: &str,
        resolver: &mut TypeResolver<'a, '_>,
    ) -> Result<Option<TypeSurface>> {
        // DWARF default accessibility: public members for structs, private
        // for classes.
        let default_public = tag == gimli::DW_TAG_structure_type;
        let mut surface = TypeSurface::new(name);

        let mut tree = unit
            .entries_tree(Some(offset))
            .map_err(|e| Error::Dwarf(format!("Failed to create entries tree: {}", e)))?;
        let root =
            tree.root().map_err(|e| Error::Dwarf(format!("Failed to get tree root: {}", e)))?;

        let mut children = root.children();
        while let Some(child) = children
            .next()
            .map_err(|e| Error::Dwarf(format!("Failed to iterate children: {}", e)))?
        {
            match child.entry().tag() {
                gimli::DW_TAG_inheritance => {
                    let base =
                        resolver.resolve_type_attr(child.entry().attr_value(gimli::DW_AT_type))?;
                    if base.starts_with("fn(") {
                        return Ok(None);
                    }
                    // Inherited members are not own declarations; the base
                    // link itself is not catalogued.
                }
                gimli::DW_TAG_member => {
                    if !self.is_public(child.entry(), default_public) {
                        continue;
                    }
                    let Some(member_name) = self.get_die_name(unit, child.entry())? else {
                        continue;
                    };
                    let type_name =
                        resolver.resolve_type_attr(child.entry().attr_value(gimli::DW_AT_type))?;
                    let is_static = is_static_data_member(child.entry());
                    let member = ValueMember { name: member_name, type_name };
                    if is_static {
                        surface.static_fields.push(member.clone());
                    }
                    surface.fields.push(member);
                }
                gimli::DW_TAG_variable => {
                    // DWARF 5 emits static data members as variables.
                    if !self.is_public(child.entry(), default_public) {
                        continue;
                    }
                    let Some(member_name) = self.get_die_name(unit, child.entry())? else {
                        continue;
                    };
                    let type_name =
                        resolver.resolve_type_attr(child.entry().attr_value(gimli::DW_AT_type))?;
                    let member = ValueMember { name: member_name, type_name };
                    surface.static_fields.push(member.clone());
                    surface.fields.push(member);
                }
                gimli::DW_TAG_APPLE_property => {
                    let Some(member_name) = self.get_property_name(unit, child.entry())? else {
                        continue;
                    };
                    let type_name =
                        resolver.resolve_type_attr(child.entry().attr_value(gimli::DW_AT_type))?;
                    surface.properties.push(ValueMember { name: member_name, type_name });
                }
                gimli::DW_TAG_subprogram => {
                    if let Some(method) =
                        self.collect_method(unit, child, name, default_public, resolver)?
                    {
                        surface.methods.push(method);
                    }
                }
                _ => {}
            }
        }

        Ok(Some(surface))
    }

    /// Collect one ordinary named method, or `None` when it is non-public,
    /// compiler-synthesized or a special name (constructor, destructor,
    /// operator overload, accessor hook).
    fn collect_method(
        &self,
        unit: &Unit<DwarfSlice<'a>>,
        node: EntriesTreeNode<'_, '_, '_, DwarfSlice<'a>>,
        type_name: &str,
        default_public: bool,
        resolver: &mut TypeResolver<'a, '_>,
    ) -> Result<Option<MethodMember>> {
        let name;
        let return_type;
        {
            let entry = node.entry();
            if !self.is_public(entry, default_public) {
                return Ok(None);
            }
            if read_flag_from_attr(entry.attr_value(gimli::DW_AT_artificial).ok().flatten()) {
                return Ok(None);
            }
            let Some(method_name) = self.get_die_name(unit, entry)? else {
                return Ok(None);
            };
            if is_special_name(&method_name, type_name) {
                return Ok(None);
            }
            return_type = resolver.resolve_type_attr(entry.attr_value(gimli::DW_AT_type))?;
            name = method_name;
        }

        let mut params = Vec::new();
        let mut children = node.children();
        while let Some(child) = children
            .next()
            .map_err(|e| Error::Dwarf(format!("Failed to iterate parameters: {}", e)))?
        {
            let entry = child.entry();
            if entry.tag() != gimli::DW_TAG_formal_parameter {
                continue;
            }
            // The implicit `this` parameter is artificial.
            if read_flag_from_attr(entry.attr_value(gimli::DW_AT_artificial).ok().flatten()) {
                continue;
            }
            let param_name = self
                .get_die_name(unit, entry)?
                .unwrap_or_else(|| format!("arg{}", params.len()));
            let param_type = resolver.resolve_type_attr(entry.attr_value(gimli::DW_AT_type))?;
            params.push(Param { type_name: param_type, name: param_name });
        }

        Ok(Some(MethodMember { name, return_type, params }))
    }

    fn is_public(
        &self,
        entry: &DebuggingInformationEntry<DwarfSlice<'a>>,
        default_public: bool,
    ) -> bool {
        match read_u64_from_attr(entry.attr_value(gimli::DW_AT_accessibility).ok().flatten()) {
            Some(value) => value == u64::from(gimli::DW_ACCESS_public.0),
            None => default_public,
        }
    }

    fn get_die_name(
        &self,
        unit: &Unit<DwarfSlice<'a>>,
        entry: &DebuggingInformationEntry<DwarfSlice<'a>>,
    ) -> Result<Option<String>> {
        match entry.attr_value(gimli::DW_AT_name) {
            Ok(Some(attr)) => {
                let name = self
                    .dwarf
                    .attr_string(unit, attr)
                    .map_err(|e| Error::Dwarf(format!("Failed to read name: {}", e)))?;
                Ok(Some(name.to_string_lossy().to_string()))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(Error::Dwarf(format!("Failed to read name attribute: {}", e))),
        }
    }

    /// Property DIEs name themselves through a vendor attribute, with
    /// DW_AT_name as a fallback.
    fn get_property_name(
        &self,
        unit: &Unit<DwarfSlice<'a>>,
        entry: &DebuggingInformationEntry<DwarfSlice<'a>>,
    ) -> Result<Option<String>> {
        if let Ok(Some(attr)) = entry.attr_value(gimli::DW_AT_APPLE_property_name) {
            let name = self
                .dwarf
                .attr_string(unit, attr)
                .map_err(|e| Error::Dwarf(format!("Failed to read property name: {}", e)))?;
            return Ok(Some(name.to_string_lossy().to_string()));
        }
        self.get_die_name(unit, entry)
    }
}

/// Pre-DWARF 5 static data members: a member with no storage location,
/// flagged external or declaration-only.
fn is_static_data_member(entry: &DebuggingInformationEntry<DwarfSlice<'_>>) -> bool {
    entry.attr_value(gimli::DW_AT_data_member_location).ok().flatten().is_none()
        && (read_flag_from_attr(entry.attr_value(gimli::DW_AT_external).ok().flatten())
            || read_flag_from_attr(entry.attr_value(gimli::DW_AT_declaration).ok().flatten()))
}

/// Special-name methods are compiler-synthesized surface: constructors
/// (named after the type), destructors, operator overloads and `__` hooks.
fn is_special_name(method_name: &str, type_name: &str) -> bool {
    let bare_type = type_name.split('<').next().unwrap_or(type_name);
    method_name.starts_with('~')
        || method_name == bare_type
        || method_name.starts_with("operator")
        || method_name.starts_with("__")
}

#[cfg(test)]
mod tests {
    use super::is_special_name;

    #[test]
    fn constructors_destructors_and_operators_are_special() {
        assert!(is_special_name("Point", "Point"));
        assert!(is_special_name("~Point", "Point"));
        assert!(is_special_name("operator==", "Point"));
        assert!(is_special_name("operator+", "Point"));
        assert!(is_special_name("__get_x", "Point"));
        assert!(is_special_name("Vec", "Vec<int>"));
    }

    #[test]
    fn ordinary_methods_are_not_special() {
        assert!(!is_special_name("ToString", "Point"));
        assert!(!is_special_name("translate", "Point"));
        assert!(!is_special_name("operate", "Point"));
    }
}
