//! Member classifier: turns one discovered type into catalogue entries.

use crate::model::{Catalog, CatalogBuilder, Category};
use crate::surface::{Param, ScanFailure, TypeSurface, TypeSurfaceProvider};

/// Classify one type into the shared catalogue: the type entry first, then
/// its members in the fixed order static fields, properties, methods, fields.
pub fn classify_type(surface: &TypeSurface, catalog: &mut CatalogBuilder) {
    let owner = catalog.add_type(&surface.name);

    for field in &surface.static_fields {
        catalog.add_member(owner, Category::StaticField, &field.name, &surface.name, &field.type_name);
    }
    for property in &surface.properties {
        catalog.add_member(owner, Category::Property, &property.name, &surface.name, &property.type_name);
    }
    for method in &surface.methods {
        let signature = method_signature(&method.name, &method.params);
        catalog.add_member(owner, Category::Method, &signature, &surface.name, &method.return_type);
    }
    for field in &surface.fields {
        catalog.add_member(owner, Category::Field, &field.name, &surface.name, &field.type_name);
    }
}

/// Run a provider's full scan through the classifier and finalize the model.
pub fn catalog_module(provider: &dyn TypeSurfaceProvider) -> (Catalog, Vec<ScanFailure>) {
    let outcome = provider.scan();
    let mut builder = CatalogBuilder::new();
    for surface in &outcome.types {
        classify_type(surface, &mut builder);
    }
    (builder.finish(), outcome.failures)
}

/// Synthesize the display signature for a method.
///
/// Each parameter contributes its type name and parameter name, space
/// separated, with a trailing space after every pair: `Add( int x int y )`.
/// A zero-parameter method yields `Name( )`. Downstream tooling diffs these
/// strings, so the exact spacing is load-bearing.
pub fn method_signature(name: &str, params: &[Param]) -> String {
    let mut signature = String::with_capacity(name.len() + 4);
    signature.push_str(name);
    signature.push_str("( ");
    for param in params {
        signature.push_str(&param.type_name);
        signature.push(' ');
        signature.push_str(&param.name);
        signature.push(' ');
    }
    signature.push(')');
    signature
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MethodMember, ValueMember};

    fn param(type_name: &str, name: &str) -> Param {
        Param { type_name: type_name.to_string(), name: name.to_string() }
    }

    #[test]
    fn signature_with_parameters() {
        let sig = method_signature("Foo", &[param("int", "a"), param("string", "b")]);
        assert_eq!(sig, "Foo( int a string b )");
    }

    #[test]
    fn signature_without_parameters() {
        assert_eq!(method_signature("Bar", &[]), "Bar( )");
    }

    #[test]
    fn members_are_classified_in_fixed_category_order() {
        let surface = TypeSurface {
            name: "Widget".to_string(),
            static_fields: vec![ValueMember {
                name: "Default".to_string(),
                type_name: "Widget".to_string(),
            }],
            properties: vec![ValueMember {
                name: "Width".to_string(),
                type_name: "int".to_string(),
            }],
            methods: vec![MethodMember {
                name: "Resize".to_string(),
                return_type: "void".to_string(),
                params: vec![param("int", "w")],
            }],
            fields: vec![
                ValueMember { name: "Default".to_string(), type_name: "Widget".to_string() },
                ValueMember { name: "width".to_string(), type_name: "int".to_string() },
            ],
        };

        let mut builder = CatalogBuilder::new();
        classify_type(&surface, &mut builder);
        let catalog = builder.finish();

        let categories: Vec<Category> =
            catalog.entries().iter().map(|e| e.category).collect();
        assert_eq!(
            categories,
            [
                Category::Type,
                Category::StaticField,
                Category::Property,
                Category::Method,
                Category::Field,
                Category::Field,
            ]
        );

        let method = &catalog.entries()[3];
        assert_eq!(method.name, "Resize( int w )");
        assert_eq!(method.member_type.as_deref(), Some("void"));
        assert_eq!(method.declared_type, "Widget");
    }

    #[test]
    fn static_fields_also_appear_in_the_field_pass() {
        // The provider reports statics in both collections; the classifier
        // catalogues both, so they show under StaticField and Field alike.
        let surface = TypeSurface {
            name: "Counter".to_string(),
            static_fields: vec![ValueMember {
                name: "shared".to_string(),
                type_name: "long".to_string(),
            }],
            fields: vec![ValueMember {
                name: "shared".to_string(),
                type_name: "long".to_string(),
            }],
            ..TypeSurface::default()
        };

        let mut builder = CatalogBuilder::new();
        classify_type(&surface, &mut builder);
        let catalog = builder.finish();

        let shared: Vec<Category> = catalog
            .entries()
            .iter()
            .filter(|e| e.name == "shared")
            .map(|e| e.category)
            .collect();
        assert_eq!(shared, [Category::StaticField, Category::Field]);
    }
}
