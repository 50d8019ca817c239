use std::any::Any;

use crate::error::{BoxError, ConstructError};
use crate::lister::ListerMap;

/// A constructed instance, discarded after validation.
pub type Instance = Box<dyn Any>;

/// No-argument constructor for a concrete type.
pub type Factory = fn() -> Result<Instance, ConstructError>;

/// Zero-argument lister function.
pub type ListerFn = fn() -> ListerMap;

/// Hook run the first time a unit is loaded.
pub type UnitLoader = fn() -> Result<(), BoxError>;

/// Whether a type can be constructed at all.
#[derive(Clone, Copy)]
pub enum TypeKind {
	/// Interface-only; never a discovery candidate.
	Abstract,
	Concrete(Factory),
}

impl std::fmt::Debug for TypeKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			TypeKind::Abstract => f.write_str("Abstract"),
			TypeKind::Concrete(_) => f.write_str("Concrete(..)"),
		}
	}
}

/// A type binding defined in a code unit.
#[derive(Debug)]
pub struct TypeDef {
	/// Id of the defining unit.
	pub unit: &'static str,
	/// Binding name within the unit.
	pub name: &'static str,
	/// Canonical names of the direct supertypes.
	pub parents: &'static [&'static str],
	pub kind: TypeKind,
}

impl TypeDef {
	pub const fn concrete(unit: &'static str, name: &'static str, parents: &'static [&'static str], factory: Factory) -> Self {
		Self {
			unit,
			name,
			parents,
			kind: TypeKind::Concrete(factory),
		}
	}

	pub const fn new_abstract(unit: &'static str, name: &'static str, parents: &'static [&'static str]) -> Self {
		Self {
			unit,
			name,
			parents,
			kind: TypeKind::Abstract,
		}
	}

	pub fn is_abstract(&self) -> bool {
		matches!(self.kind, TypeKind::Abstract)
	}
}

/// A lister function bound in a code unit.
pub struct ListerDef {
	pub unit: &'static str,
	pub name: &'static str,
	pub list: ListerFn,
}

impl ListerDef {
	pub const fn new(unit: &'static str, name: &'static str, list: ListerFn) -> Self {
		Self { unit, name, list }
	}
}

impl std::fmt::Debug for ListerDef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ListerDef").field("unit", &self.unit).field("name", &self.name).finish_non_exhaustive()
	}
}

/// A non-callable binding (constant, static, module alias).
///
/// Present so that a descriptor naming it is recognized and skipped.
#[derive(Debug)]
pub struct ValueDef {
	pub unit: &'static str,
	pub name: &'static str,
}

impl ValueDef {
	pub const fn new(unit: &'static str, name: &'static str) -> Self {
		Self { unit, name }
	}
}

/// Makes a type reachable from a unit other than its defining one.
#[derive(Debug)]
pub struct ReExportDef {
	pub unit: &'static str,
	pub target: &'static TypeDef,
}

impl ReExportDef {
	pub const fn new(unit: &'static str, target: &'static TypeDef) -> Self {
		Self { unit, target }
	}
}

/// Declares a unit explicitly, optionally with a load hook.
pub struct UnitDef {
	pub id: &'static str,
	pub loader: Option<UnitLoader>,
}

impl UnitDef {
	pub const fn new(id: &'static str, loader: Option<UnitLoader>) -> Self {
		Self { id, loader }
	}
}

impl std::fmt::Debug for UnitDef {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("UnitDef").field("id", &self.id).field("loader", &self.loader.is_some()).finish()
	}
}

/// An entry published under a named extension point.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct EntryPoint {
	/// Extension point the entry is published under.
	pub group: &'static str,
	/// Name of the publishing package.
	pub name: &'static str,
	/// Target in `unit:function` form.
	pub value: &'static str,
}

impl EntryPoint {
	pub const fn new(group: &'static str, name: &'static str, value: &'static str) -> Self {
		Self { group, name, value }
	}
}

/// A single link-time or builder registration.
#[derive(Debug, Clone, Copy)]
pub enum Registration {
	Unit(&'static UnitDef),
	Type(&'static TypeDef),
	Lister(&'static ListerDef),
	Value(&'static ValueDef),
	ReExport(&'static ReExportDef),
	EntryPoint(&'static EntryPoint),
}

inventory::collect!(Registration);

/// Constructs `T` through [`Default`].
pub fn construct_default<T: Default + 'static>() -> Result<Instance, ConstructError> {
	Ok(Box::new(T::default()))
}

/// Factory for types that opt out of no-argument discovery.
pub fn not_implemented() -> Result<Instance, ConstructError> {
	Err(ConstructError::NotImplemented)
}
