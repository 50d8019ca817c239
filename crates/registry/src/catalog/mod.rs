//! The table of code units, their bindings and published entry points.
//!
//! A [`Catalog`] is what the registry scans. It is assembled either from the
//! registrations every linked crate submits through `inventory` (see
//! [`Catalog::installed`] and the registration macros) or explicitly through
//! a [`CatalogBuilder`].

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tracing::warn;

use crate::error::{CatalogError, DiscoveryError, panic_message};
use crate::name::{NameCodec, PRIVATE_PREFIX};
use crate::reentry::{self, InProgress};

mod defs;

pub use defs::{
	EntryPoint, Factory, Instance, ListerDef, ListerFn, ReExportDef, Registration, TypeDef, TypeKind, UnitDef, UnitLoader, ValueDef,
	construct_default, not_implemented,
};

/// A named entry inside a unit.
#[derive(Debug, Clone, Copy)]
pub enum Binding {
	Type(&'static TypeDef),
	Lister(&'static ListerDef),
	Value(&'static ValueDef),
}

/// A code unit: a namespace of bindings with an optional load hook.
pub struct Unit {
	id: &'static str,
	loader: Option<UnitLoader>,
	loaded: Mutex<bool>,
	bindings: BTreeMap<&'static str, Binding>,
}

impl Unit {
	fn new(id: &'static str) -> Self {
		Self {
			id,
			loader: None,
			loaded: Mutex::new(false),
			bindings: BTreeMap::new(),
		}
	}

	pub fn id(&self) -> &'static str {
		self.id
	}

	pub fn get(&self, name: &str) -> Option<&Binding> {
		self.bindings.get(name)
	}

	/// All bindings in name order, private ones included.
	pub fn bindings(&self) -> impl Iterator<Item = (&'static str, &Binding)> {
		self.bindings.iter().map(|(name, binding)| (*name, binding))
	}

	/// Bindings whose names do not carry the private prefix, in name order.
	pub fn public_bindings(&self) -> impl Iterator<Item = (&'static str, &Binding)> {
		self.bindings().filter(|(name, _)| !name.starts_with(PRIVATE_PREFIX))
	}

	/// Runs the load hook once; a failed load is retried on the next call.
	fn load(&self) -> Result<(), DiscoveryError> {
		let Some(loader) = self.loader else {
			return Ok(());
		};
		let Some(_in_progress) = InProgress::enter(std::ptr::from_ref(self).addr(), self.id) else {
			return Err(DiscoveryError::Reentrant {
				context: format!("loader of unit {}", self.id),
			});
		};
		let mut loaded = self.loaded.lock();
		if *loaded {
			return Ok(());
		}
		match catch_unwind(loader) {
			Ok(Ok(())) => {
				*loaded = true;
				Ok(())
			}
			Ok(Err(source)) => Err(DiscoveryError::UnitLoad {
				unit: self.id.to_owned(),
				source,
			}),
			Err(payload) => Err(DiscoveryError::Panicked {
				context: format!("loader of unit {}", self.id),
				message: panic_message(&*payload),
			}),
		}
	}

	fn bind(&mut self, name: &'static str, binding: Binding) -> Result<(), CatalogError> {
		if let Some(existing) = self.bindings.get(name) {
			if same_binding(existing, &binding) {
				return Ok(());
			}
			return Err(CatalogError::DuplicateBinding { unit: self.id, name });
		}
		self.bindings.insert(name, binding);
		Ok(())
	}
}

impl std::fmt::Debug for Unit {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Unit")
			.field("id", &self.id)
			.field("bindings", &self.bindings.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

fn same_binding(a: &Binding, b: &Binding) -> bool {
	match (a, b) {
		(Binding::Type(a), Binding::Type(b)) => std::ptr::eq(*a, *b),
		(Binding::Lister(a), Binding::Lister(b)) => std::ptr::eq(*a, *b),
		(Binding::Value(a), Binding::Value(b)) => std::ptr::eq(*a, *b),
		_ => false,
	}
}

/// Every code unit and entry point visible to the process.
#[derive(Debug, Default)]
pub struct Catalog {
	units: BTreeMap<&'static str, Unit>,
	entry_points: Vec<&'static EntryPoint>,
}

impl Catalog {
	pub fn builder() -> CatalogBuilder {
		CatalogBuilder::default()
	}

	/// Collects every [`Registration`] submitted by linked crates.
	///
	/// Conflicting registrations are logged and the first one seen wins.
	pub fn installed() -> Self {
		let mut builder = CatalogBuilder::default();
		for registration in inventory::iter::<Registration> {
			if let Err(error) = builder.register(*registration) {
				warn!(%error, "ignoring conflicting registration");
			}
		}
		builder.build()
	}

	pub fn unit(&self, id: &str) -> Option<&Unit> {
		self.units.get(id)
	}

	/// Units in id order.
	pub fn units(&self) -> impl Iterator<Item = &Unit> {
		self.units.values()
	}

	/// Looks up a unit and runs its load hook.
	pub fn load_unit(&self, id: &str) -> Result<&Unit, DiscoveryError> {
		let unit = self.unit(id).ok_or_else(|| DiscoveryError::UnknownUnit { unit: id.to_owned() })?;
		unit.load()?;
		Ok(unit)
	}

	/// Entry points published under `group`, ordered by name.
	pub fn entry_points<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'static EntryPoint> + 'a {
		self.entry_points.iter().copied().filter(move |entry| entry.group == group)
	}

	pub fn all_entry_points(&self) -> &[&'static EntryPoint] {
		&self.entry_points
	}

	/// Finds a type by canonical name without loading its unit.
	pub fn find_type(&self, codec: &dyn NameCodec, name: &str) -> Option<&'static TypeDef> {
		let (unit, binding) = codec.decode(name)?;
		match self.unit(unit)?.get(binding)? {
			Binding::Type(def) => Some(*def),
			_ => None,
		}
	}

	/// Resolves a canonical name to its type, loading the unit first.
	pub fn resolve_type(&self, codec: &dyn NameCodec, name: &str) -> Result<&'static TypeDef, DiscoveryError> {
		let (unit, binding) = codec.decode(name).ok_or_else(|| DiscoveryError::UnknownType { name: name.to_owned() })?;
		match self.load_unit(unit)?.get(binding) {
			Some(Binding::Type(def)) => Ok(*def),
			Some(_) => Err(DiscoveryError::NotAType { name: name.to_owned() }),
			None => Err(DiscoveryError::UnknownType { name: name.to_owned() }),
		}
	}

	/// Whether `supertype` is a proper ancestor of `candidate`.
	///
	/// Parents are followed transitively; a type is never its own strict subtype.
	pub fn is_strict_subtype(&self, codec: &dyn NameCodec, candidate: &TypeDef, supertype: &TypeDef) -> bool {
		if std::ptr::eq(candidate, supertype) {
			return false;
		}
		let mut pending: Vec<&str> = candidate.parents.to_vec();
		let mut seen = FxHashSet::default();
		while let Some(parent) = pending.pop() {
			if !seen.insert(parent) {
				continue;
			}
			let Some(def) = self.find_type(codec, parent) else {
				continue;
			};
			if std::ptr::eq(def, supertype) {
				return true;
			}
			pending.extend_from_slice(def.parents);
		}
		false
	}

	/// Instantiates the type named `name` through its factory.
	pub fn construct(&self, codec: &dyn NameCodec, name: &str) -> Result<Instance, DiscoveryError> {
		let def = self.resolve_type(codec, name)?;
		construct(def, name)
	}
}

/// Runs the factory of `def`, containing panics.
pub(crate) fn construct(def: &TypeDef, name: &str) -> Result<Instance, DiscoveryError> {
	let TypeKind::Concrete(factory) = def.kind else {
		return Err(DiscoveryError::Abstract { name: name.to_owned() });
	};
	reentry::take_refused();
	match catch_unwind(AssertUnwindSafe(factory)) {
		Ok(Ok(_)) if reentry::take_refused() => Err(DiscoveryError::Reentrant {
			context: format!("constructor of {name}"),
		}),
		Ok(Ok(instance)) => Ok(instance),
		Ok(Err(source)) => Err(DiscoveryError::Construct {
			name: name.to_owned(),
			source,
		}),
		Err(payload) => Err(DiscoveryError::Panicked {
			context: format!("constructor of {name}"),
			message: panic_message(&*payload),
		}),
	}
}

/// Assembles a [`Catalog`] from registrations.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
	units: BTreeMap<&'static str, Unit>,
	entry_points: Vec<&'static EntryPoint>,
}

impl CatalogBuilder {
	/// Adds one registration. Units are created on first mention.
	pub fn register(&mut self, registration: Registration) -> Result<(), CatalogError> {
		match registration {
			Registration::Unit(def) => {
				let unit = self.unit_mut(def.id);
				if let Some(loader) = def.loader {
					if unit.loader.is_some_and(|existing| !std::ptr::fn_addr_eq(existing, loader)) {
						return Err(CatalogError::DuplicateLoader { unit: def.id });
					}
					unit.loader = Some(loader);
				}
				Ok(())
			}
			Registration::Type(def) => self.unit_mut(def.unit).bind(def.name, Binding::Type(def)),
			Registration::Lister(def) => self.unit_mut(def.unit).bind(def.name, Binding::Lister(def)),
			Registration::Value(def) => self.unit_mut(def.unit).bind(def.name, Binding::Value(def)),
			Registration::ReExport(def) => self.unit_mut(def.unit).bind(def.target.name, Binding::Type(def.target)),
			Registration::EntryPoint(entry) => {
				if !self.entry_points.iter().any(|existing| std::ptr::eq(*existing, entry)) {
					self.entry_points.push(entry);
				}
				Ok(())
			}
		}
	}

	/// Adds every registration, stopping at the first conflict.
	pub fn extend(&mut self, registrations: impl IntoIterator<Item = Registration>) -> Result<(), CatalogError> {
		registrations.into_iter().try_for_each(|registration| self.register(registration))
	}

	pub fn build(mut self) -> Catalog {
		self.entry_points.sort();
		Catalog {
			units: self.units,
			entry_points: self.entry_points,
		}
	}

	fn unit_mut(&mut self, id: &'static str) -> &mut Unit {
		self.units.entry(id).or_insert_with(|| Unit::new(id))
	}
}
