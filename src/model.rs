//! The API model: an append-only catalogue of classified entries.

/// Classification tag of a catalogued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Type,
    StaticField,
    Property,
    Method,
    Field,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Type => "Type",
            Category::StaticField => "StaticField",
            Category::Property => "Property",
            Category::Method => "Method",
            Category::Field => "Field",
        }
    }
}

/// Stable handle to an entry in its catalogue. Only ever minted by
/// [`CatalogBuilder::add_type`], so a member's parent always points at a
/// Type entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryId(usize);

/// One catalogued item: a type, or one member owned by a type.
#[derive(Debug, Clone)]
pub struct Entry {
    pub category: Category,
    /// Display identifier. For methods this is the synthesized signature,
    /// e.g. `Add( int x int y )`.
    pub name: String,
    /// Name of the owning type; empty for type-level entries. Tracked for
    /// the model but never printed as a report column.
    pub declared_type: String,
    /// Value type of the member (field/property type, method return type).
    /// Absent for type-level entries.
    pub member_type: Option<String>,
    /// Reserved annotation column. Always empty today, but the report always
    /// renders it so annotated copies stay column-compatible.
    pub tested: String,
    /// Owning type entry; `None` for type-level entries.
    pub parent: Option<EntryId>,
}

/// Builds the catalogue during the classification phase. Append-only;
/// finalize with [`CatalogBuilder::finish`] before rendering.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    entries: Vec<Entry>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a type-level entry and return its handle for member linkage.
    pub fn add_type(&mut self, name: &str) -> EntryId {
        let id = EntryId(self.entries.len());
        self.entries.push(Entry {
            category: Category::Type,
            name: name.to_string(),
            declared_type: String::new(),
            member_type: None,
            tested: String::new(),
            parent: None,
        });
        id
    }

    /// Append a member entry owned by a previously added type.
    pub fn add_member(
        &mut self,
        owner: EntryId,
        category: Category,
        name: &str,
        declared_type: &str,
        member_type: &str,
    ) {
        debug_assert!(category != Category::Type);
        self.entries.push(Entry {
            category,
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            member_type: Some(member_type.to_string()),
            tested: String::new(),
            parent: Some(owner),
        });
    }

    pub fn finish(self) -> Catalog {
        Catalog { entries: self.entries }
    }
}

/// The finalized, immutable catalogue. Insertion order is discovery order.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<Entry>,
}

impl Catalog {
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All type-level entries, in discovery order.
    pub fn types(&self) -> impl Iterator<Item = (EntryId, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.category == Category::Type)
            .map(|(i, e)| (EntryId(i), e))
    }

    /// All member entries owned by the given type, in discovery order.
    pub fn members_of(&self, owner: EntryId) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(move |e| e.parent == Some(owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_type_catalog() -> Catalog {
        let mut builder = CatalogBuilder::new();
        let point = builder.add_type("Point");
        builder.add_member(point, Category::Property, "X", "Point", "int");
        builder.add_member(point, Category::Field, "x", "Point", "int");
        builder.add_type("Empty");
        builder.finish()
    }

    #[test]
    fn insertion_order_is_preserved() {
        let catalog = two_type_catalog();
        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Point", "X", "x", "Empty"]);
    }

    #[test]
    fn types_query_returns_only_type_entries() {
        let catalog = two_type_catalog();
        let types: Vec<&str> = catalog.types().map(|(_, e)| e.name.as_str()).collect();
        assert_eq!(types, ["Point", "Empty"]);
    }

    #[test]
    fn members_query_groups_by_parent() {
        let catalog = two_type_catalog();
        let mut types = catalog.types();
        let (point, _) = types.next().unwrap();
        let (empty, _) = types.next().unwrap();

        let members: Vec<&str> = catalog.members_of(point).map(|e| e.name.as_str()).collect();
        assert_eq!(members, ["X", "x"]);
        assert_eq!(catalog.members_of(empty).count(), 0);
    }

    #[test]
    fn member_entries_carry_owner_and_value_type() {
        let catalog = two_type_catalog();
        let entry = &catalog.entries()[1];
        assert_eq!(entry.category, Category::Property);
        assert_eq!(entry.declared_type, "Point");
        assert_eq!(entry.member_type.as_deref(), Some("int"));
        assert!(entry.parent.is_some());
        assert!(entry.tested.is_empty());
    }

    #[test]
    fn type_entries_have_no_parent_or_value_type() {
        let catalog = two_type_catalog();
        let entry = &catalog.entries()[0];
        assert_eq!(entry.parent, None);
        assert_eq!(entry.member_type, None);
        assert!(entry.declared_type.is_empty());
    }
}
