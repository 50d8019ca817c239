//! Discovery through link-time registrations.

use std::sync::Arc;

use lineage_registry::{
	BoxError, CLASS_LISTER_GROUP, Catalog, ConstructError, Instance, ListerMap, Registry, RegistryConfig, RegistryError, SupertypeKey, abstract_type,
	class_lister, code_unit, concrete_type, construct_default, entry_point, not_implemented, reexport,
};
use pretty_assertions::assert_eq;
use rustc_hash::FxHashMap;

#[derive(Default)]
struct Handler;

fn refuses() -> Result<Instance, ConstructError> {
	Err(ConstructError::failed("requires credentials"))
}

fn unavailable() -> Result<(), BoxError> {
	Err("optional dependency missing".into())
}

abstract_type!(BASE, {
	unit: "pkg._core",
	name: "Base",
});
reexport!(BASE => "pkg");

concrete_type!(A, {
	unit: "pkg.impls",
	name: "A",
	extends: ["pkg.Base"],
	factory: construct_default::<Handler>,
});
concrete_type!(B, {
	unit: "pkg.impls",
	name: "B",
	extends: ["pkg.Base"],
	factory: construct_default::<Handler>,
});
abstract_type!(C, {
	unit: "pkg.impls",
	name: "C",
	extends: ["pkg.Base"],
});
concrete_type!(DRAFT, {
	unit: "pkg.impls",
	name: "Draft",
	extends: ["pkg.impls.C"],
	factory: not_implemented,
});
concrete_type!(REMOTE, {
	unit: "pkg.impls",
	name: "Remote",
	extends: ["pkg.impls.C"],
	factory: refuses,
});

concrete_type!(OPTIONAL, {
	unit: "pkg.optional",
	name: "Optional",
	extends: ["pkg.Base"],
	factory: construct_default::<Handler>,
});
code_unit!("pkg.optional", loader: unavailable);

concrete_type!(EXTRA, {
	unit: "pkg.extra",
	name: "Extra",
	extends: ["pkg.Base"],
	factory: construct_default::<Handler>,
});

class_lister!(LIST_HANDLERS, {
	unit: "pkg.listers",
	name: "list_handlers",
}, || {
	ListerMap::new()
		.with("pkg.Base", ["pkg.impls", "pkg.optional"])
		.with("pkg.impls.C", ["pkg.impls"])
});

class_lister!(LIST_EXTRA, {
	unit: "pkg.listers",
	name: "list_extra",
}, || ListerMap::new().with("pkg.Base", ["pkg.extra", "pkg.impls"]));

entry_point!(CLASS_LISTER_GROUP, "pkg" => "pkg.listers:list_handlers");
entry_point!("console_scripts", "pkg" => "pkg.listers:list_extra");

fn registry(vars: &[(&str, &str)]) -> Registry {
	let env: FxHashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
	Registry::installed().with_env(Arc::new(env))
}

#[test]
fn installed_catalog_sees_every_registration() {
	let catalog = Catalog::installed();
	let units: Vec<_> = catalog.units().map(|unit| unit.id()).collect();
	assert_eq!(units, ["pkg", "pkg._core", "pkg.extra", "pkg.impls", "pkg.listers", "pkg.optional"]);
	assert_eq!(catalog.entry_points(CLASS_LISTER_GROUP).count(), 1);
	assert_eq!(catalog.all_entry_points().len(), 2);
}

#[test]
fn published_lister_discovers_concrete_subtypes() {
	let registry = registry(&[]);
	let classes = registry.classes("pkg.Base").unwrap();
	assert_eq!(classes.to_vec(), ["pkg.impls.A", "pkg.impls.B"]);
	assert_eq!(registry.classes(&BASE).unwrap(), classes);
}

#[test]
fn environment_listers_join_the_union() {
	let registry = registry(&[("PKG_LISTERS", "pkg.listers:list_extra,badformat")]);
	registry.set_env_class_listers(Some("PKG_LISTERS"));
	let classes = registry.classes("pkg.Base").unwrap();
	assert_eq!(classes.to_vec(), ["pkg.extra.Extra", "pkg.impls.A", "pkg.impls.B"]);
}

#[test]
fn environment_variable_unset_leaves_entry_points_intact() {
	let registry = registry(&[]).with_config(RegistryConfig {
		env_class_listers: Some("PKG_LISTERS".to_owned()),
		..RegistryConfig::default()
	});
	assert_eq!(registry.classes_allow_empty("pkg.Base").to_vec(), ["pkg.impls.A", "pkg.impls.B"]);
}

#[test]
fn subtypes_that_refuse_construction_are_never_listed() {
	let registry = registry(&[]);
	assert!(registry.classes_allow_empty(&C).is_empty());
	assert_eq!(
		registry.classes(&C),
		Err(RegistryError::NoClasses {
			supertype: SupertypeKey::from("pkg.impls.C"),
		})
	);
}
