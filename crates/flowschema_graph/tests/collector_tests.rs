//! End-to-end collector scenarios over in-memory sources.

use bumpalo::Bump;
use std::path::Path;

use flowschema_graph::{
    Collector, Fund, GraphError, LiteralValue, NumberRepr, Type, TypeId, TypeKind,
};

fn try_collect(files: &[(&str, &str)], entry: &str) -> Result<Fund, GraphError> {
    let arena = Bump::new();
    let mut collector = Collector::new(&arena);
    for (path, text) in files {
        collector.add_source(*path, *text);
    }
    collector.collect(Path::new(entry))?;
    Ok(collector.finish())
}

fn collect(files: &[(&str, &str)], entry: &str) -> Fund {
    try_collect(files, entry).unwrap_or_else(|err| panic!("collection failed: {err}"))
}

fn collect_one(text: &str) -> Fund {
    collect(&[("/src/main.js", text)], "/src/main.js")
}

fn type_id(segments: &[&str]) -> TypeId {
    TypeId::new(segments.iter().map(|s| s.to_string()).collect())
}

fn get<'f>(fund: &'f Fund, segments: &[&str]) -> &'f Type {
    let id = type_id(segments);
    fund.take(&id)
        .unwrap_or_else(|| panic!("no type '{id}' in fund"))
}

fn record_field<'t>(ty: &'t Type, name: &str) -> &'t Type {
    match &ty.kind {
        TypeKind::Record { fields } => {
            &fields
                .iter()
                .find(|f| f.name == name)
                .unwrap_or_else(|| panic!("no field '{name}'"))
                .value
        }
        other => panic!("expected record, got {other:?}"),
    }
}

#[test]
fn test_simple_record_export() {
    let fund = collect_one("export type Point = {x: number, y: number};");
    let point = get(&fund, &["main", "Point"]);
    assert_eq!(
        *record_field(point, "x"),
        Type::number(NumberRepr::F64)
    );
    let tops: Vec<_> = fund.take_tops().collect();
    assert_eq!(tops.len(), 1);
    assert_eq!(tops[0].id, Some(type_id(&["main", "Point"])));
}

#[test]
fn test_determinism() {
    let files = [(
        "/src/main.js",
        "type Inner = {n: number};\n\
         export type Outer = {a: Inner, b: 'x' | 'y', c: ?string[]};",
    )];
    let first = collect(&files, "/src/main.js");
    let second = collect(&files, "/src/main.js");
    let a = serde_json::to_string(&first.take_all().collect::<Vec<_>>()).unwrap();
    let b = serde_json::to_string(&second.take_all().collect::<Vec<_>>()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_mutual_recursion_resolves_through_references() {
    let fund = collect_one(
        "export type Y = {z: Z};\n\
         export type Z = {y: Y};",
    );
    let y = get(&fund, &["main", "Y"]);
    let z = get(&fund, &["main", "Z"]);
    assert_eq!(
        *record_field(y, "z"),
        Type::reference(type_id(&["main", "Z"]))
    );
    assert_eq!(
        *record_field(z, "y"),
        Type::reference(type_id(&["main", "Y"]))
    );
    // Every reference in the fund points back into the fund.
    for ty in fund.take_all() {
        if let TypeKind::Record { fields } = &ty.kind {
            for field in fields {
                if let TypeKind::Reference { to } = &field.value.kind {
                    assert!(fund.take(to).is_some(), "dangling reference {to}");
                }
            }
        }
    }
}

#[test]
fn test_idempotent_collect() {
    let arena = Bump::new();
    let mut collector = Collector::new(&arena);
    collector.add_source("/src/main.js", "export type T = {a: string};");
    collector.collect(Path::new("/src/main.js")).unwrap();
    collector.collect(Path::new("/src/main.js")).unwrap();
    let fund = collector.finish();
    assert_eq!(fund.len(), 1);
    assert_eq!(fund.take_tops().count(), 1);
}

#[test]
fn test_generic_instantiation_dedup() {
    let fund = collect_one(
        "type Box<T> = {value: T};\n\
         export type Pair = {first: Box<string>, second: Box<string>};",
    );
    let instances: Vec<_> = fund
        .take_all()
        .filter(|t| {
            t.id.as_ref()
                .is_some_and(|id| id.join().starts_with("main.Box"))
        })
        .collect();
    assert_eq!(instances.len(), 1);
    assert_eq!(
        instances[0].id,
        Some(type_id(&["main", "Box", "string"]))
    );
    let pair = get(&fund, &["main", "Pair"]);
    assert_eq!(record_field(pair, "first"), record_field(pair, "second"));
}

#[test]
fn test_distinct_parameters_make_distinct_instances() {
    let fund = collect_one(
        "type Box<T> = {value: T};\n\
         export type Both = {s: Box<string>, b: Box<boolean>};",
    );
    assert!(fund.take(&type_id(&["main", "Box", "string"])).is_some());
    assert!(fund.take(&type_id(&["main", "Box", "boolean"])).is_some());
}

#[test]
fn test_self_recursive_generic_terminates() {
    let fund = collect_one("export type List<T = string> = {head: T, tail: ?List<T>};");
    let list = get(&fund, &["main", "List", "string"]);
    let tail = record_field(list, "tail");
    match &tail.kind {
        TypeKind::Maybe { value } => assert_eq!(
            **value,
            Type::reference(type_id(&["main", "List", "string"]))
        ),
        other => panic!("expected maybe, got {other:?}"),
    }
}

#[test]
fn test_inheritance_flattening() {
    let fund = collect_one(
        "class A { a: string; }\n\
         class B extends A { b: string; }\n\
         export class C extends B { c: string; }",
    );
    let c = get(&fund, &["main", "C"]);
    assert!(matches!(c.kind, TypeKind::Intersection { .. }));
    let mut names: Vec<_> = fund
        .merged_fields(c)
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_inheritance_most_derived_field_wins() {
    let fund = collect_one(
        "class Base { kind: string; }\n\
         export class Derived extends Base { kind: 'derived'; }",
    );
    let derived = get(&fund, &["main", "Derived"]);
    let fields = fund.merged_fields(derived).unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(
        fields[0].value,
        Type::literal(LiteralValue::Str("derived".to_string()))
    );
}

#[test]
fn test_pragma_overrides_number_repr() {
    let fund = collect_one(
        "export type Weights = {\n\
         // @repr {i64}\n\
         count: number,\n\
         ratio: number,\n\
         };",
    );
    let weights = get(&fund, &["main", "Weights"]);
    assert_eq!(
        *record_field(weights, "count"),
        Type::number(NumberRepr::I64)
    );
    assert_eq!(
        *record_field(weights, "ratio"),
        Type::number(NumberRepr::F64)
    );
}

#[test]
fn test_literal_union_field() {
    let fund = collect_one("export type T = {a: 'one' | 'two'};");
    let t = get(&fund, &["main", "T"]);
    match &record_field(t, "a").kind {
        TypeKind::Union { variants } => {
            assert_eq!(variants.len(), 2);
            assert_eq!(
                variants[0],
                Type::literal(LiteralValue::Str("one".to_string()))
            );
            assert_eq!(
                variants[1],
                Type::literal(LiteralValue::Str("two".to_string()))
            );
        }
        other => panic!("expected union, got {other:?}"),
    }
}

#[test]
fn test_map_collapse() {
    let fund = collect_one("export type T = {[string]: number};");
    let t = get(&fund, &["main", "T"]);
    match &t.kind {
        TypeKind::Map { keys, values } => {
            assert_eq!(**keys, Type::of(TypeKind::String));
            assert_eq!(**values, Type::number(NumberRepr::F64));
        }
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn test_mixed_fields_and_indexer_intersect() {
    let fund = collect_one("export type T = {name: string, [key: string]: number};");
    let t = get(&fund, &["main", "T"]);
    match &t.kind {
        TypeKind::Intersection { parts } => {
            assert_eq!(parts.len(), 2);
            assert!(matches!(parts[0].kind, TypeKind::Record { .. }));
            assert!(matches!(parts[1].kind, TypeKind::Map { .. }));
        }
        other => panic!("expected intersection, got {other:?}"),
    }
}

#[test]
fn test_cross_module_reference() {
    let fund = collect(
        &[
            ("/src/a.js", "export type A = {x: number};"),
            (
                "/src/b.js",
                "import {A} from './a';\nexport type B = {y: A};",
            ),
        ],
        "/src/b.js",
    );
    let b = get(&fund, &["b", "B"]);
    assert_eq!(*record_field(b, "y"), Type::reference(type_id(&["a", "A"])));
    // A is present transitively, but only B is a requested top.
    assert!(fund.take(&type_id(&["a", "A"])).is_some());
    let tops: Vec<_> = fund.take_tops().filter_map(|t| t.id.clone()).collect();
    assert_eq!(tops, vec![type_id(&["b", "B"])]);
}

#[test]
fn test_require_and_default_export() {
    let fund = collect(
        &[
            ("/src/a.js", "type A = {x: string};\nexport default A;"),
            (
                "/src/b.js",
                "const A = require('./a');\nexport type B = {y: A};",
            ),
        ],
        "/src/b.js",
    );
    let b = get(&fund, &["b", "B"]);
    assert_eq!(*record_field(b, "y"), Type::reference(type_id(&["a", "A"])));
}

#[test]
fn test_cross_module_generic_instantiation() {
    let fund = collect(
        &[
            ("/src/box.js", "export type Box<T> = {value: T};"),
            (
                "/src/b.js",
                "import type {Box} from './box';\nexport type Holder = {b: Box<boolean>};",
            ),
        ],
        "/src/b.js",
    );
    // The instance lives in the defining module's namespace.
    let instance = get(&fund, &["box", "Box", "boolean"]);
    assert_eq!(
        *record_field(instance, "value"),
        Type::of(TypeKind::Boolean)
    );
}

#[test]
fn test_tuple_keeps_unresolvable_slot_positionally() {
    let fund = collect_one("export type T = [string, (a: number) => void, boolean];");
    let t = get(&fund, &["main", "T"]);
    match &t.kind {
        TypeKind::Tuple { items } => {
            assert_eq!(items.len(), 3);
            assert_eq!(items[0], Some(Type::of(TypeKind::String)));
            assert_eq!(items[1], None);
            assert_eq!(items[2], Some(Type::of(TypeKind::Boolean)));
        }
        other => panic!("expected tuple, got {other:?}"),
    }
}

#[test]
fn test_maybe_collapses_once() {
    let fund = collect_one("export type T = {a: ? ?string};");
    let t = get(&fund, &["main", "T"]);
    match &record_field(t, "a").kind {
        TypeKind::Maybe { value } => assert_eq!(**value, Type::of(TypeKind::String)),
        other => panic!("expected maybe, got {other:?}"),
    }
}

#[test]
fn test_nested_unions_are_not_flattened() {
    let fund = collect_one("export type T = string | (number | boolean);");
    let t = get(&fund, &["main", "T"]);
    match &t.kind {
        TypeKind::Union { variants } => {
            assert_eq!(variants.len(), 2);
            assert!(matches!(variants[1].kind, TypeKind::Union { .. }));
        }
        other => panic!("expected union, got {other:?}"),
    }
}

#[test]
fn test_template_export_with_defaults_is_eager() {
    let fund = collect_one("export type Pair<A = string, B = number> = {a: A, b: B};");
    let pair = get(&fund, &["main", "Pair", "string_number_f64"]);
    assert_eq!(*record_field(pair, "a"), Type::of(TypeKind::String));
    assert_eq!(fund.take_tops().count(), 1);
}

#[test]
fn test_template_export_without_defaults_is_left_alone() {
    let fund = collect_one("export type Box<T> = {value: T};");
    assert!(fund.is_empty());
}

#[test]
fn test_keys_operator() {
    let fund = collect_one(
        "type User = {name: string, age: number};\n\
         export type K = {keys: $Keys<User>};",
    );
    let k = get(&fund, &["main", "K"]);
    match &record_field(k, "keys").kind {
        TypeKind::Union { variants } => {
            assert_eq!(
                variants[0],
                Type::literal(LiteralValue::Str("name".to_string()))
            );
            assert_eq!(
                variants[1],
                Type::literal(LiteralValue::Str("age".to_string()))
            );
        }
        other => panic!("expected union, got {other:?}"),
    }
}

#[test]
fn test_shape_operator_inlines_optional_record() {
    let fund = collect_one(
        "type User = {name: string};\n\
         export type Patch = {changes: $Shape<User>};",
    );
    let patch = get(&fund, &["main", "Patch"]);
    match &record_field(patch, "changes").kind {
        TypeKind::Record { fields } => {
            assert_eq!(fields.len(), 1);
            assert!(!fields[0].required);
        }
        other => panic!("expected record, got {other:?}"),
    }
}

#[test]
fn test_const_literal_declaration() {
    let fund = collect_one("export const KIND = 'circle';");
    let kind = get(&fund, &["main", "KIND"]);
    assert_eq!(
        *kind,
        Type {
            id: Some(type_id(&["main", "KIND"])),
            kind: TypeKind::Literal {
                value: LiteralValue::Str("circle".to_string())
            }
        }
    );
}

#[test]
fn test_array_forms_agree() {
    let fund = collect_one("export type T = {a: string[], b: Array<string>};");
    let t = get(&fund, &["main", "T"]);
    assert_eq!(record_field(t, "a"), record_field(t, "b"));
}

#[test]
fn test_unknown_name_fails() {
    let err = try_collect(
        &[("/src/main.js", "export type T = {a: Missing};")],
        "/src/main.js",
    )
    .unwrap_err();
    assert!(matches!(err, GraphError::UnknownName { name } if name == "Missing"));
}

#[test]
fn test_unresolved_import_fails() {
    let err = try_collect(
        &[(
            "/src/main.js",
            "import {A} from './gone';\nexport type T = {a: A};",
        )],
        "/src/main.js",
    )
    .unwrap_err();
    assert!(matches!(err, GraphError::UnresolvedImport { .. }));
}

#[test]
fn test_redefinition_fails() {
    let err = try_collect(
        &[("/src/main.js", "type T = string;\ntype T = boolean;")],
        "/src/main.js",
    )
    .unwrap_err();
    assert!(matches!(err, GraphError::Redefinition { name } if name == "T"));
}

#[test]
fn test_resolution_depth_cap() {
    let mut source = String::from("type T0 = {v: string};\n");
    for i in 1..300 {
        source.push_str(&format!("type T{i} = {{v: T{}}};\n", i - 1));
    }
    source.push_str("export type Top = {v: T299};\n");
    let err = try_collect(&[("/src/main.js", &source)], "/src/main.js").unwrap_err();
    assert!(matches!(err, GraphError::RecursiveInstantiation { .. }));
}

#[test]
fn test_bad_special_operand_fails() {
    let err = try_collect(
        &[(
            "/src/main.js",
            "type S = string;\nexport type K = {k: $Keys<S>};",
        )],
        "/src/main.js",
    )
    .unwrap_err();
    assert!(matches!(err, GraphError::BadOperand { .. }));
}

#[test]
fn test_collect_from_disk_with_fixture_tree() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("models")).unwrap();
    std::fs::write(
        dir.path().join("models/user.js"),
        "export type User = {name: string};\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("entry.js"),
        "import {User} from './models/user';\nexport type Session = {user: User};\n",
    )
    .unwrap();

    let arena = Bump::new();
    let mut collector = Collector::new(&arena);
    collector.collect(&dir.path().join("entry.js")).unwrap();
    let fund = collector.finish();

    let session = get(&fund, &["entry", "Session"]);
    assert_eq!(
        *record_field(session, "user"),
        Type::reference(type_id(&["models", "user", "User"]))
    );
}
