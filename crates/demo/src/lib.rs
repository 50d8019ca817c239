//! Sample plugins for the lineage registry.
//!
//! Linking this crate contributes two small hierarchies to the installed
//! catalog:
//!
//! - `lineage_demo.Formatter`, published through the `class_lister` entry
//!   point and therefore discovered without any configuration
//! - `lineage_demo.Generator`, reachable only when
//!   `lineage_demo.listers:list_generators` is configured on the registry or
//!   placed in the registry's lister environment variable

use lineage_registry::{CLASS_LISTER_GROUP, ListerMap, Registry, class_lister, entry_point};

pub mod formats;
pub mod generators;

pub use formats::{FORMATTER, Formatter};
pub use generators::{GENERATOR, Generator};

/// Descriptor of the formatter lister, published as an entry point.
pub const FORMATTERS_LISTER: &str = "lineage_demo.listers:list_formatters";

/// Descriptor of the generator lister, not published.
pub const GENERATORS_LISTER: &str = "lineage_demo.listers:list_generators";

fn list_formatters() -> ListerMap {
	ListerMap::new().with("lineage_demo.Formatter", ["lineage_demo.formats", "lineage_demo.formats._markdown"])
}

fn list_generators() -> ListerMap {
	ListerMap::new().with("lineage_demo.Generator", ["lineage_demo.generators"])
}

class_lister!(LIST_FORMATTERS, {
	unit: "lineage_demo.listers",
	name: "list_formatters",
}, list_formatters);

class_lister!(LIST_GENERATORS, {
	unit: "lineage_demo.listers",
	name: "list_generators",
}, list_generators);

entry_point!(CLASS_LISTER_GROUP, "lineage-demo" => FORMATTERS_LISTER);

/// Instantiates the formatter registered under `name`.
pub fn formatter(registry: &Registry, name: &str) -> Option<Box<dyn Formatter>> {
	let instance = registry.catalog().construct(registry.codec(), name).ok()?;
	instance.downcast::<Box<dyn Formatter>>().ok().map(|boxed| *boxed)
}

/// Instantiates the generator registered under `name`.
pub fn generator(registry: &Registry, name: &str) -> Option<Box<dyn Generator>> {
	let instance = registry.catalog().construct(registry.codec(), name).ok()?;
	instance.downcast::<Box<dyn Generator>>().ok().map(|boxed| *boxed)
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use pretty_assertions::assert_eq;
	use rustc_hash::FxHashMap;

	use super::*;

	fn registry(vars: &[(&str, &str)]) -> Registry {
		let env: FxHashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
		Registry::installed().with_env(Arc::new(env))
	}

	#[test]
	fn formatters_are_discovered_through_the_entry_point() {
		let registry = registry(&[]);
		let classes = registry.classes(&FORMATTER).unwrap();
		assert_eq!(
			classes.to_vec(),
			[
				"lineage_demo.formats.CsvFormatter",
				"lineage_demo.formats.MarkdownFormatter",
				"lineage_demo.formats.PlainFormatter",
			]
		);
	}

	#[test]
	fn generators_need_configuration() {
		let registry = registry(&[("LINEAGE_DEMO_LISTERS", GENERATORS_LISTER)]);
		assert!(registry.classes_allow_empty(&GENERATOR).is_empty());

		registry.set_env_class_listers(Some("LINEAGE_DEMO_LISTERS"));
		assert_eq!(
			registry.classes(&GENERATOR).unwrap().to_vec(),
			["lineage_demo.generators.CountingGenerator", "lineage_demo.generators.RepeatingGenerator"]
		);
	}

	#[test]
	fn discovered_names_instantiate() {
		let registry = registry(&[]);
		for name in registry.classes(&FORMATTER).unwrap().iter() {
			let instance = formatter(&registry, name).unwrap_or_else(|| panic!("{name} should instantiate"));
			assert!(!instance.format(&["a", "b"]).is_empty());
		}

		let csv = formatter(&registry, "lineage_demo.formats.CsvFormatter").unwrap();
		assert_eq!(csv.format(&["a", "b"]), "a,b");
		assert!(formatter(&registry, "lineage_demo.formats.TemplateFormatter").is_none());
	}

	#[test]
	fn generators_instantiate_by_name() {
		let registry = registry(&[]);
		let counting = generator(&registry, "lineage_demo.generators.CountingGenerator").unwrap();
		assert_eq!(counting.next_value(), "0");
		assert!(generator(&registry, "lineage_demo.formats.CsvFormatter").is_none());
	}

	#[test]
	fn seeded_generator_is_skipped_without_a_seed() {
		assert!(std::env::var_os("LINEAGE_DEMO_SEED").is_none());
		let registry = registry(&[("LINEAGE_DEMO_LISTERS", GENERATORS_LISTER)]);
		registry.set_env_class_listers(Some("LINEAGE_DEMO_LISTERS"));

		let classes = registry.classes(&GENERATOR).unwrap();
		assert!(!classes.iter().any(|name| name == "lineage_demo.generators.SeededGenerator"));
		assert!(generator(&registry, "lineage_demo.generators.SeededGenerator").is_none());
	}
}
