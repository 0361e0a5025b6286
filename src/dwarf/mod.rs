mod context;
mod types;

pub use context::DwarfContext;
pub use types::TypeResolver;

use crate::loader::DwarfSlice;
use gimli::AttributeValue;

/// Extract a u64 value from a DWARF attribute, handling the common encoding
/// forms. Negative Sdata values are invalid for the indices we read and map
/// to None. Shared by context.rs and types.rs.
pub(crate) fn read_u64_from_attr(attr: Option<AttributeValue<DwarfSlice<'_>>>) -> Option<u64> {
    match attr? {
        AttributeValue::Udata(v) => Some(v),
        AttributeValue::Data1(v) => Some(v as u64),
        AttributeValue::Data2(v) => Some(v as u64),
        AttributeValue::Data4(v) => Some(v as u64),
        AttributeValue::Data8(v) => Some(v),
        AttributeValue::Sdata(v) if v >= 0 => Some(v as u64),
        _ => None,
    }
}

/// True when a flag attribute is present and set.
pub(crate) fn read_flag_from_attr(attr: Option<AttributeValue<DwarfSlice<'_>>>) -> bool {
    matches!(attr, Some(AttributeValue::Flag(true)))
}
