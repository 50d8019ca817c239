//! Canonical dotted names.
//!
//! Every type known to a [`Catalog`] has a canonical name of the form
//! `unit.Type`, where `unit` is itself a dotted unit id (`a.b`). A type defined
//! in a private unit (`a.b._impl`) and re-exported by its parent unit is named
//! after the parent (`a.b.Type`), so that the same type always yields the same
//! name regardless of where it was found.

use std::borrow::Borrow;
use std::fmt;

use crate::catalog::{Binding, Catalog, TypeDef};

/// Prefix marking a binding or unit segment as private.
pub const PRIVATE_PREFIX: char = '_';

/// Canonical name of a supertype, used as the cache key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SupertypeKey(String);

impl SupertypeKey {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for SupertypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Borrow<str> for SupertypeKey {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl From<&str> for SupertypeKey {
	fn from(name: &str) -> Self {
		Self(name.to_owned())
	}
}

impl From<String> for SupertypeKey {
	fn from(name: String) -> Self {
		Self(name)
	}
}

/// A supertype given either by canonical name or by its definition.
#[derive(Debug, Clone, Copy)]
pub enum TypeQuery<'a> {
	Name(&'a str),
	Type(&'a TypeDef),
}

impl<'a> From<&'a str> for TypeQuery<'a> {
	fn from(name: &'a str) -> Self {
		TypeQuery::Name(name)
	}
}

impl<'a> From<&'a String> for TypeQuery<'a> {
	fn from(name: &'a String) -> Self {
		TypeQuery::Name(name)
	}
}

impl<'a> From<&'a SupertypeKey> for TypeQuery<'a> {
	fn from(key: &'a SupertypeKey) -> Self {
		TypeQuery::Name(key.as_str())
	}
}

impl<'a> From<&'a TypeDef> for TypeQuery<'a> {
	fn from(def: &'a TypeDef) -> Self {
		TypeQuery::Type(def)
	}
}

/// Converts between type definitions and canonical names.
pub trait NameCodec: Send + Sync {
	/// Returns the canonical name of `def`.
	fn encode(&self, catalog: &Catalog, def: &TypeDef) -> String;

	/// Splits a canonical name into its unit id and binding name.
	fn decode<'a>(&self, name: &'a str) -> Option<(&'a str, &'a str)>;
}

/// The default `unit.Type` codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct DottedNames;

impl NameCodec for DottedNames {
	fn encode(&self, catalog: &Catalog, def: &TypeDef) -> String {
		if let Some((parent, last)) = def.unit.rsplit_once('.')
			&& last.starts_with(PRIVATE_PREFIX)
			&& reexports(catalog, parent, def)
		{
			return format!("{parent}.{}", def.name);
		}
		format!("{}.{}", def.unit, def.name)
	}

	fn decode<'a>(&self, name: &'a str) -> Option<(&'a str, &'a str)> {
		let (unit, binding) = name.rsplit_once('.')?;
		(!unit.is_empty() && !binding.is_empty()).then_some((unit, binding))
	}
}

fn reexports(catalog: &Catalog, unit: &str, def: &TypeDef) -> bool {
	catalog
		.unit(unit)
		.and_then(|unit| unit.get(def.name))
		.is_some_and(|binding| matches!(binding, Binding::Type(found) if std::ptr::eq(*found, def)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::{ReExportDef, Registration};
	use crate::construct_default;

	#[derive(Default)]
	struct Json;

	static JSON: TypeDef = TypeDef::concrete("fmt._json", "Json", &["fmt.Base"], construct_default::<Json>);
	static JSON_AT_PARENT: ReExportDef = ReExportDef::new("fmt", &JSON);
	static HIDDEN: TypeDef = TypeDef::concrete("fmt._hidden", "Hidden", &["fmt.Base"], construct_default::<Json>);

	#[test]
	fn private_unit_is_rewritten_when_parent_reexports() {
		let mut builder = Catalog::builder();
		builder.register(Registration::Type(&JSON)).unwrap();
		builder.register(Registration::ReExport(&JSON_AT_PARENT)).unwrap();
		builder.register(Registration::Type(&HIDDEN)).unwrap();
		let catalog = builder.build();

		assert_eq!(DottedNames.encode(&catalog, &JSON), "fmt.Json");
		assert_eq!(DottedNames.encode(&catalog, &HIDDEN), "fmt._hidden.Hidden");
	}

	#[test]
	fn decode_splits_on_last_dot() {
		assert_eq!(DottedNames.decode("a.b.Type"), Some(("a.b", "Type")));
		assert_eq!(DottedNames.decode("Type"), None);
		assert_eq!(DottedNames.decode("a."), None);
		assert_eq!(DottedNames.decode(".Type"), None);
	}
}
