//! Scans a single code unit for constructible subtypes.

use tracing::{trace, warn};

use crate::catalog::{Binding, Catalog, TypeDef, construct};
use crate::name::NameCodec;

/// Returns the canonical names of all public, concrete, strict subtypes of
/// `supertype` bound in unit `unit_id` that survive construction.
///
/// A unit that fails to load yields nothing. A candidate whose factory
/// reports [`NotImplemented`](crate::ConstructError::NotImplemented) is
/// skipped silently; any other failure is logged and only that candidate is
/// skipped.
pub fn scan(catalog: &Catalog, codec: &dyn NameCodec, supertype: &TypeDef, unit_id: &str) -> Vec<String> {
	let unit = match catalog.load_unit(unit_id) {
		Ok(unit) => unit,
		Err(error) => {
			warn!(unit = unit_id, %error, "failed to load unit");
			return Vec::new();
		}
	};

	let mut found = Vec::new();
	for (binding, entry) in unit.public_bindings() {
		let Binding::Type(def) = entry else {
			continue;
		};
		if def.is_abstract() || !catalog.is_strict_subtype(codec, def, supertype) {
			continue;
		}

		let qualified = format!("{unit_id}.{binding}");
		match construct(def, &qualified) {
			// Instance dropped here; construction only proves usability.
			Ok(_) => found.push(codec.encode(catalog, def)),
			Err(error) if error.is_not_implemented() => {
				trace!(unit = unit_id, binding, "skipping type without no-argument construction");
			}
			Err(error) => {
				warn!(unit = unit_id, binding, %error, "problem encountered instantiating candidate");
			}
		}
	}
	found
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::catalog::{ListerDef, Registration, UnitDef, ValueDef, construct_default, not_implemented};
	use crate::error::ConstructError;
	use crate::lister::ListerMap;
	use crate::name::DottedNames;

	#[derive(Default)]
	struct Dummy;

	fn broken() -> Result<crate::Instance, ConstructError> {
		Err(ConstructError::failed("missing resource"))
	}

	fn panicking() -> Result<crate::Instance, ConstructError> {
		panic!("constructor exploded")
	}

	fn refuse_to_load() -> Result<(), crate::BoxError> {
		Err("unit is disabled".into())
	}

	static BASE: TypeDef = TypeDef::new_abstract("shapes", "Shape", &[]);
	static ROUND: TypeDef = TypeDef::new_abstract("shapes.impls", "Round", &["shapes.Shape"]);
	static CIRCLE: TypeDef = TypeDef::concrete("shapes.impls", "Circle", &["shapes.impls.Round"], construct_default::<Dummy>);
	static SQUARE: TypeDef = TypeDef::concrete("shapes.impls", "Square", &["shapes.Shape"], construct_default::<Dummy>);
	static HIDDEN: TypeDef = TypeDef::concrete("shapes.impls", "_Hidden", &["shapes.Shape"], construct_default::<Dummy>);
	static LAZY: TypeDef = TypeDef::concrete("shapes.impls", "Lazy", &["shapes.Shape"], not_implemented);
	static BROKEN: TypeDef = TypeDef::concrete("shapes.impls", "Broken", &["shapes.Shape"], broken);
	static PANICKY: TypeDef = TypeDef::concrete("shapes.impls", "Panicky", &["shapes.Shape"], panicking);
	static UNRELATED: TypeDef = TypeDef::concrete("shapes.impls", "Colour", &[], construct_default::<Dummy>);
	static PI: ValueDef = ValueDef::new("shapes.impls", "PI");
	static LIST: ListerDef = ListerDef::new("shapes.impls", "list", ListerMap::new);
	static DISABLED: UnitDef = UnitDef::new("shapes.disabled", Some(refuse_to_load));
	static DISABLED_SQUARE: TypeDef = TypeDef::concrete("shapes.disabled", "Square", &["shapes.Shape"], construct_default::<Dummy>);

	fn catalog() -> Catalog {
		let mut builder = Catalog::builder();
		builder
			.extend([
				Registration::Type(&BASE),
				Registration::Type(&ROUND),
				Registration::Type(&CIRCLE),
				Registration::Type(&SQUARE),
				Registration::Type(&HIDDEN),
				Registration::Type(&LAZY),
				Registration::Type(&BROKEN),
				Registration::Type(&PANICKY),
				Registration::Type(&UNRELATED),
				Registration::Value(&PI),
				Registration::Lister(&LIST),
				Registration::Unit(&DISABLED),
				Registration::Type(&DISABLED_SQUARE),
			])
			.unwrap();
		builder.build()
	}

	#[test]
	fn keeps_only_constructible_public_concrete_subtypes() {
		let catalog = catalog();
		let found = scan(&catalog, &DottedNames, &BASE, "shapes.impls");
		assert_eq!(found, vec!["shapes.impls.Circle".to_owned(), "shapes.impls.Square".to_owned()]);
	}

	#[test]
	fn intermediate_supertype_limits_candidates() {
		let catalog = catalog();
		let found = scan(&catalog, &DottedNames, &ROUND, "shapes.impls");
		assert_eq!(found, vec!["shapes.impls.Circle".to_owned()]);
	}

	#[test]
	fn unknown_or_failing_units_yield_nothing() {
		let catalog = catalog();
		assert!(scan(&catalog, &DottedNames, &BASE, "shapes.missing").is_empty());
		assert!(scan(&catalog, &DottedNames, &BASE, "shapes.disabled").is_empty());
	}
}
