use surface_audit::{
    BinaryData, DwarfContext, MethodMember, Param, ReportRenderer, ScanFailure, ScanOutcome,
    TypeSurface, TypeSurfaceProvider, ValueMember, catalog_module,
};

/// In-memory provider: the pipeline below the introspection seam is pure, so
/// the full load-classify-render path can be exercised without a binary.
struct FakeProvider {
    outcome: ScanOutcome,
}

impl TypeSurfaceProvider for FakeProvider {
    fn scan(&self) -> ScanOutcome {
        self.outcome.clone()
    }
}

fn value(name: &str, type_name: &str) -> ValueMember {
    ValueMember { name: name.to_string(), type_name: type_name.to_string() }
}

fn sample_module() -> FakeProvider {
    let point = TypeSurface {
        name: "Point".to_string(),
        properties: vec![value("X", "int")],
        methods: vec![MethodMember {
            name: "ToString".to_string(),
            return_type: "string".to_string(),
            params: Vec::new(),
        }],
        ..TypeSurface::default()
    };

    let counter = TypeSurface {
        name: "Counter".to_string(),
        static_fields: vec![value("shared", "long")],
        fields: vec![value("shared", "long")],
        ..TypeSurface::default()
    };

    // Only a private field in the source; its public surface is empty.
    let origin = TypeSurface::new("Origin");

    FakeProvider { outcome: ScanOutcome { types: vec![point, counter, origin], failures: Vec::new() } }
}

#[test]
fn full_pipeline_produces_the_expected_document() {
    let provider = sample_module();
    let (catalog, failures) = catalog_module(&provider);
    let report = ReportRenderer::new("demo.so").render(&catalog, &failures);

    let expected = "\
# Public type surface of demo.so

## Point

| Category    | Name        | Type   | Tested |
| ----------- | ----------- | ------ | ------ |
| Property    | X           | int    |        |
| Method      | ToString( ) | string |        |

## Counter

| Category    | Name        | Type   | Tested |
| ----------- | ----------- | ------ | ------ |
| StaticField | shared      | long   |        |
| Field       | shared      | long   |        |

## Origin

No newly defined public members.

---
*Generated by surface-audit*
";
    assert_eq!(report, expected);
}

#[test]
fn pipeline_output_is_deterministic() {
    let provider = sample_module();

    let (catalog_a, failures_a) = catalog_module(&provider);
    let (catalog_b, failures_b) = catalog_module(&provider);

    let renderer = ReportRenderer::new("demo.so");
    assert_eq!(
        renderer.render(&catalog_a, &failures_a),
        renderer.render(&catalog_b, &failures_b)
    );
}

#[test]
fn every_table_row_has_the_same_width() {
    let provider = sample_module();
    let (catalog, failures) = catalog_module(&provider);
    let report = ReportRenderer::new("demo.so").render(&catalog, &failures);

    let rows: Vec<usize> = report
        .lines()
        .filter(|line| line.starts_with('|'))
        .map(|line| line.chars().count())
        .collect();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|len| *len == rows[0]));
}

#[test]
fn method_signatures_survive_the_whole_pipeline() {
    let provider = FakeProvider {
        outcome: ScanOutcome {
            types: vec![TypeSurface {
                name: "Calc".to_string(),
                methods: vec![MethodMember {
                    name: "Foo".to_string(),
                    return_type: "bool".to_string(),
                    params: vec![
                        Param { type_name: "int".to_string(), name: "a".to_string() },
                        Param { type_name: "string".to_string(), name: "b".to_string() },
                    ],
                }],
                ..TypeSurface::default()
            }],
            failures: Vec::new(),
        },
    };

    let (catalog, failures) = catalog_module(&provider);
    let report = ReportRenderer::new("demo.so").render(&catalog, &failures);
    assert!(report.contains("Foo( int a string b )"));
    assert!(report.contains("| bool"));
}

#[test]
fn partial_failures_render_before_the_surviving_sections() {
    let provider = FakeProvider {
        outcome: ScanOutcome {
            types: vec![TypeSurface::new("Survivor")],
            failures: vec![ScanFailure {
                message: "Type 'Broken' could not be inspected: truncated unit".to_string(),
                resolution_log: Vec::new(),
            }],
        },
    };

    let (catalog, failures) = catalog_module(&provider);
    let report = ReportRenderer::new("demo.so").render(&catalog, &failures);

    let diagnostics_at = report.find("Module load diagnostics:").expect("diagnostics block");
    let section_at = report.find("## Survivor").expect("surviving section");
    assert!(diagnostics_at < section_at);
    assert!(report.contains("- Type 'Broken' could not be inspected: truncated unit"));
}

// --- fixture-gated tests against a real binary ---------------------------

/// Path to a compiled DWARF fixture, or None if it has not been built.
/// Build with: g++ -g -o tests/fixtures/bin/test_api tests/fixtures/test_api.cpp
fn find_fixture_path(name: &str) -> Option<std::path::PathBuf> {
    let dsym_path = std::path::Path::new("tests/fixtures/bin")
        .join(format!("{}.dSYM/Contents/Resources/DWARF/{}", name, name));
    if dsym_path.exists() {
        return Some(dsym_path);
    }

    let direct_path = std::path::Path::new("tests/fixtures/bin").join(name);
    if direct_path.exists() {
        return Some(direct_path);
    }

    None
}

#[test]
fn fixture_scan_finds_public_surface() {
    let path = match find_fixture_path("test_api") {
        Some(p) => p,
        None => return,
    };

    let binary = BinaryData::load(&path).expect("Failed to load binary");
    let root = path.parent().expect("fixture dir").to_path_buf();
    let loaded = binary.load_module(&root).expect("Failed to load module");
    let dwarf = loaded.dwarf().expect("Failed to borrow DWARF view");
    let context = DwarfContext::new(&dwarf);

    let outcome = context.scan();
    let rect = outcome
        .types
        .iter()
        .find(|t| t.name == "Rect")
        .expect("fixture declares Rect");

    assert!(rect.fields.iter().any(|f| f.name == "width"));
    assert!(rect.methods.iter().any(|m| m.name == "area"));
    // Constructors and operators never surface as methods.
    assert!(!rect.methods.iter().any(|m| m.name == "Rect"));
    assert!(!rect.methods.iter().any(|m| m.name.starts_with("operator")));
}

#[test]
fn fixture_report_is_deterministic() {
    let path = match find_fixture_path("test_api") {
        Some(p) => p,
        None => return,
    };

    let render_once = || {
        let binary = BinaryData::load(&path).expect("Failed to load binary");
        let root = path.parent().expect("fixture dir").to_path_buf();
        let loaded = binary.load_module(&root).expect("Failed to load module");
        let dwarf = loaded.dwarf().expect("Failed to borrow DWARF view");
        let context = DwarfContext::new(&dwarf);
        let (catalog, failures) = catalog_module(&context);
        ReportRenderer::new("test_api").render(&catalog, &failures)
    };

    assert_eq!(render_once(), render_once());
}
