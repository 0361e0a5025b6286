use crate::error::{Error, Result};
use crate::loader::DwarfSlice;
use gimli::{AttributeValue, Dwarf, Unit, UnitOffset};
use std::collections::HashMap;

/// Resolves DWARF type references to display names, with a per-unit cache.
pub struct TypeResolver<'a, 'b> {
    dwarf: &'b Dwarf<DwarfSlice<'a>>,
    unit: &'b Unit<DwarfSlice<'a>>,
    cache: HashMap<UnitOffset, String>,
}

impl<'a, 'b> TypeResolver<'a, 'b> {
    pub fn new(dwarf: &'b Dwarf<DwarfSlice<'a>>, unit: &'b Unit<DwarfSlice<'a>>) -> Self {
        Self { dwarf, unit, cache: HashMap::new() }
    }

    pub fn resolve_type(&mut self, offset: UnitOffset) -> Result<String> {
        if let Some(cached) = self.cache.get(&offset) {
            return Ok(cached.clone());
        }

        let name = self.resolve_type_inner(offset, 0)?;
        self.cache.insert(offset, name.clone());
        Ok(name)
    }

    /// Resolve an attribute that references another type DIE, mapping
    /// cross-unit section offsets into this unit where possible. `None`
    /// references resolve to `void` (a method with no return type DIE).
    pub fn resolve_type_attr(
        &mut self,
        attr: std::result::Result<Option<AttributeValue<DwarfSlice<'a>>>, gimli::Error>,
    ) -> Result<String> {
        match attr {
            Ok(Some(AttributeValue::UnitRef(offset))) => self.resolve_type(offset),
            Ok(Some(AttributeValue::DebugInfoRef(debug_info_offset))) => {
                if let Some(unit_debug_offset) = self.unit.header.offset().as_debug_info_offset() {
                    let unit_offset =
                        UnitOffset(debug_info_offset.0.saturating_sub(unit_debug_offset.0));
                    self.resolve_type(unit_offset)
                } else {
                    Ok("unknown".to_string())
                }
            }
            Ok(Some(_)) => Ok("unknown".to_string()),
            Ok(None) => Ok("void".to_string()),
            Err(e) => Err(Error::Dwarf(format!("Failed to read type reference: {}", e))),
        }
    }

    fn resolve_type_inner(&mut self, offset: UnitOffset, depth: usize) -> Result<String> {
        // Malformed type chains can cycle.
        if depth > 20 {
            return Ok("...".to_string());
        }

        let entry = self
            .unit
            .entry(offset)
            .map_err(|e| Error::Dwarf(format!("Failed to get type entry: {}", e)))?;

        let tag = entry.tag();

        match tag {
            gimli::DW_TAG_base_type => {
                Ok(self.get_type_name(&entry)?.unwrap_or_else(|| "?".to_string()))
            }

            gimli::DW_TAG_pointer_type => {
                let pointee = match self.get_type_ref(&entry)? {
                    Some(type_offset) => self.resolve_type_inner(type_offset, depth + 1)?,
                    None => "void".to_string(),
                };
                Ok(format!("*{}", pointee))
            }

            gimli::DW_TAG_reference_type | gimli::DW_TAG_rvalue_reference_type => {
                let referee = match self.get_type_ref(&entry)? {
                    Some(type_offset) => self.resolve_type_inner(type_offset, depth + 1)?,
                    None => "void".to_string(),
                };
                Ok(format!("&{}", referee))
            }

            gimli::DW_TAG_const_type
            | gimli::DW_TAG_volatile_type
            | gimli::DW_TAG_restrict_type => {
                let prefix = match tag {
                    gimli::DW_TAG_const_type => "const ",
                    gimli::DW_TAG_volatile_type => "volatile ",
                    _ => "restrict ",
                };
                let inner = match self.get_type_ref(&entry)? {
                    Some(type_offset) => self.resolve_type_inner(type_offset, depth + 1)?,
                    None => "void".to_string(),
                };
                Ok(format!("{}{}", prefix, inner))
            }

            gimli::DW_TAG_typedef => {
                Ok(self.get_type_name(&entry)?.unwrap_or_else(|| "typedef".to_string()))
            }

            gimli::DW_TAG_array_type => {
                let element = match self.get_type_ref(&entry)? {
                    Some(type_offset) => self.resolve_type_inner(type_offset, depth + 1)?,
                    None => "?".to_string(),
                };
                let count =
                    self.get_array_count(&entry)?.map_or_else(|| "?".to_string(), |c| c.to_string());
                Ok(format!("[{}; {}]", element, count))
            }

            gimli::DW_TAG_structure_type
            | gimli::DW_TAG_class_type
            | gimli::DW_TAG_union_type => {
                Ok(self.get_type_name(&entry)?.unwrap_or_else(|| "<anonymous>".to_string()))
            }

            gimli::DW_TAG_enumeration_type => {
                Ok(self.get_type_name(&entry)?.unwrap_or_else(|| "enum".to_string()))
            }

            gimli::DW_TAG_subroutine_type => Ok("fn(...)".to_string()),

            _ => Ok(self.get_type_name(&entry)?.unwrap_or_else(|| format!("?<{:?}>", tag))),
        }
    }

    fn get_type_name(
        &self,
        entry: &gimli::DebuggingInformationEntry<DwarfSlice<'a>>,
    ) -> Result<Option<String>> {
        match entry.attr_value(gimli::DW_AT_name) {
            Ok(Some(attr)) => {
                let name = self
                    .dwarf
                    .attr_string(self.unit, attr)
                    .map_err(|e| Error::Dwarf(format!("Failed to read type name: {}", e)))?;
                Ok(Some(name.to_string_lossy().to_string()))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(Error::Dwarf(format!("Failed to read name attr: {}", e))),
        }
    }

    fn get_type_ref(
        &self,
        entry: &gimli::DebuggingInformationEntry<DwarfSlice<'a>>,
    ) -> Result<Option<UnitOffset>> {
        match entry.attr_value(gimli::DW_AT_type) {
            Ok(Some(AttributeValue::UnitRef(offset))) => Ok(Some(offset)),
            Ok(Some(AttributeValue::DebugInfoRef(debug_info_offset))) => {
                // Convert section offset to unit offset.
                if let Some(unit_debug_offset) = self.unit.header.offset().as_debug_info_offset() {
                    let unit_offset =
                        UnitOffset(debug_info_offset.0.saturating_sub(unit_debug_offset.0));
                    Ok(Some(unit_offset))
                } else {
                    Ok(None)
                }
            }
            _ => Ok(None),
        }
    }

    fn get_array_count(
        &self,
        entry: &gimli::DebuggingInformationEntry<DwarfSlice<'a>>,
    ) -> Result<Option<u64>> {
        let mut tree = self
            .unit
            .entries_tree(Some(entry.offset()))
            .map_err(|e| Error::Dwarf(format!("Failed to create tree: {}", e)))?;

        let root = tree.root().map_err(|e| Error::Dwarf(format!("Failed to get root: {}", e)))?;

        let mut children = root.children();
        while let Some(child) =
            children.next().map_err(|e| Error::Dwarf(format!("Failed to iterate: {}", e)))?
        {
            let child_entry = child.entry();
            if child_entry.tag() == gimli::DW_TAG_subrange_type {
                if let Some(count) =
                    super::read_u64_from_attr(child_entry.attr_value(gimli::DW_AT_count).ok().flatten())
                {
                    return Ok(Some(count));
                }
                // DW_AT_upper_bound is 0-indexed.
                if let Some(upper) = super::read_u64_from_attr(
                    child_entry.attr_value(gimli::DW_AT_upper_bound).ok().flatten(),
                ) {
                    return Ok(Some(upper + 1));
                }
            }
        }

        Ok(None)
    }
}
