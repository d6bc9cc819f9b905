use super::classify::{RawExport, RawExportShape};
use super::records::{BindingOrigin, ExportBinding, ExportForm, ExportRecord, ImportRecord};
use super::specifier::ResolvedSpecifier;

/// Resolve the binding set of one export statement.
///
/// - `export { a as c } from X` → `{ exported: c, local: a }`.
/// - `export * as ns from X` → a single synthetic `ns` binding; the members of `X`
///   are not enumerated.
/// - `export {} from X` → [`ExportForm::ReexportEmpty`].
/// - Type-only flags are tracked per binding; a named record is type-only only when
///   every binding is.
/// - Local lists (no specifier) link each binding to the import that introduced the
///   name, when there is one. `imports` must hold every import of the file, since
///   import bindings are visible before their declaration.
pub fn resolve_export(
    raw: &RawExport,
    specifier: Option<ResolvedSpecifier>,
    imports: &[ImportRecord],
) -> ExportRecord {
    let (form, type_only) = match &raw.shape {
        RawExportShape::All => (ExportForm::ReexportAll, raw.type_only),
        RawExportShape::AllAsNamespace(alias) => {
            (ExportForm::ReexportAllAsNamespace(alias.clone()), raw.type_only)
        }
        RawExportShape::Named(list) if list.is_empty() && specifier.is_some() => {
            (ExportForm::ReexportEmpty, raw.type_only)
        }
        RawExportShape::Named(list) => {
            let bindings: Vec<ExportBinding> = list
                .iter()
                .map(|n| ExportBinding {
                    exported: n.exported.clone(),
                    local: n.local.clone(),
                    type_only: raw.type_only || n.type_only,
                    origin: if specifier.is_some() {
                        None
                    } else {
                        find_origin(&n.local, imports)
                    },
                })
                .collect();
            let all_types = !bindings.is_empty() && bindings.iter().all(|b| b.type_only);
            (ExportForm::ReexportNamed(bindings), raw.type_only || all_types)
        }
        RawExportShape::Declaration(names) => {
            (ExportForm::Declaration(names.clone()), raw.type_only)
        }
    };

    ExportRecord {
        specifier,
        form,
        type_only,
    }
}

/// The import that introduced `local`, ignoring dynamic imports.
fn find_origin(local: &str, imports: &[ImportRecord]) -> Option<BindingOrigin> {
    imports.iter().find_map(|record| {
        record
            .local_bindings()
            .into_iter()
            .find(|b| b.local == local)
            .map(|b| BindingOrigin {
                specifier: record.specifier.clone(),
                imported: b.imported,
            })
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::ast::NamedExport;
    use crate::extract::extensions::ExtensionTable;
    use crate::extract::records::{ImportBinding, ImportBindingSet, ImportedName};
    use crate::extract::specifier::normalize_specifier;

    fn spec(raw: &str) -> ResolvedSpecifier {
        normalize_specifier(raw, Path::new("src/index.ts"), &ExtensionTable::default())
    }

    fn named(
        source: Option<&str>,
        list: Vec<NamedExport>,
        type_only: bool,
    ) -> (RawExport, Option<ResolvedSpecifier>) {
        (
            RawExport {
                source: source.map(str::to_owned),
                shape: RawExportShape::Named(list),
                type_only,
            },
            source.map(spec),
        )
    }

    fn bindings(record: &ExportRecord) -> &[ExportBinding] {
        match &record.form {
            ExportForm::ReexportNamed(b) => b,
            other => panic!("expected named bindings, got {:?}", other),
        }
    }

    #[test]
    fn test_named_reexport_bindings() {
        let (raw, s) = named(
            Some("./file"),
            vec![NamedExport::new("foo"), NamedExport::aliased("bar", "baz")],
            false,
        );
        let record = resolve_export(&raw, s, &[]);
        assert!(!record.type_only);
        let b = bindings(&record);
        assert_eq!((b[0].exported.as_str(), b[0].local.as_str()), ("foo", "foo"));
        assert_eq!((b[1].exported.as_str(), b[1].local.as_str()), ("baz", "bar"));
        assert!(b.iter().all(|b| b.origin.is_none()));
    }

    #[test]
    fn test_empty_reexport_keeps_specifier() {
        let (raw, s) = named(Some("../parent/file.mjs"), vec![], false);
        let record = resolve_export(&raw, s, &[]);
        assert_eq!(record.form, ExportForm::ReexportEmpty);
        assert_eq!(record.specifier.unwrap().normalized_path, "../parent/file.mjs");
    }

    #[test]
    fn test_local_empty_export_is_named_without_specifier() {
        let (raw, s) = named(None, vec![], false);
        let record = resolve_export(&raw, s, &[]);
        assert_eq!(record.form, ExportForm::ReexportNamed(vec![]));
        assert!(record.specifier.is_none());
    }

    #[test]
    fn test_mixed_type_flags_are_per_binding() {
        let mut a = NamedExport::new("A");
        a.type_only = true;
        let (raw, s) = named(Some("./types"), vec![a.clone(), NamedExport::new("b")], false);
        let mixed = resolve_export(&raw, s, &[]);
        assert!(!mixed.type_only, "a value binding keeps the record runtime-significant");
        assert!(bindings(&mixed)[0].type_only);
        assert!(!bindings(&mixed)[1].type_only);

        let (raw, s) = named(Some("./types"), vec![a], false);
        assert!(resolve_export(&raw, s, &[]).type_only);

        let (raw, s) = named(Some("./types"), vec![NamedExport::new("C")], true);
        let whole = resolve_export(&raw, s, &[]);
        assert!(whole.type_only);
        assert!(bindings(&whole)[0].type_only);
    }

    #[test]
    fn test_type_only_star_export() {
        let raw = RawExport {
            source: Some("./nested/types".into()),
            shape: RawExportShape::All,
            type_only: true,
        };
        let record = resolve_export(&raw, Some(spec("./nested/types")), &[]);
        assert_eq!(record.form, ExportForm::ReexportAll);
        assert!(record.type_only);
    }

    #[test]
    fn test_local_export_links_to_import_origin() {
        let imports = vec![
            ImportRecord {
                raw_specifier: "./lazy".into(),
                specifier: spec("./lazy"),
                bindings: ImportBindingSet::None,
                dynamic: true,
                side_effect_only: false,
                type_only: false,
            },
            ImportRecord {
                raw_specifier: "./util".into(),
                specifier: spec("./util"),
                bindings: ImportBindingSet::Named(vec![ImportBinding {
                    imported: "helper".into(),
                    local: "h".into(),
                    type_only: false,
                }]),
                dynamic: false,
                side_effect_only: false,
                type_only: false,
            },
        ];
        let (raw, s) = named(
            None,
            vec![NamedExport::aliased("h", "helper"), NamedExport::new("own")],
            false,
        );
        let record = resolve_export(&raw, s, &imports);
        let b = bindings(&record);
        let origin = b[0].origin.as_ref().expect("h comes from ./util");
        assert_eq!(origin.specifier.normalized_path, "./util");
        assert_eq!(origin.imported, ImportedName::Named("helper".into()));
        assert!(b[1].origin.is_none());
    }
}
