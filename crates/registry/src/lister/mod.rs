//! Descriptor resolution.
//!
//! A descriptor names a zero-argument lister function as `unit:function`.
//! Invoking the lister yields a [`ListerMap`] that tells the resolver which
//! units to scan for a given supertype.

use std::fmt;
use std::panic::catch_unwind;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{trace, warn};

use crate::catalog::{Binding, Catalog};
use crate::error::{DescriptorError, panic_message};
use crate::name::NameCodec;
use crate::scan::scan;


/// Separator between unit and function in a descriptor.
pub const DESCRIPTOR_SEPARATOR: char = ':';

/// A parsed `unit:function` descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor<'a> {
	pub unit: &'a str,
	pub function: &'a str,
}

impl<'a> Descriptor<'a> {
	/// Parses `unit:function`, trimming whitespace around both halves.
	pub fn parse(raw: &'a str) -> Result<Self, DescriptorError> {
		let (unit, function) = raw
			.split_once(DESCRIPTOR_SEPARATOR)
			.ok_or_else(|| DescriptorError::MissingSeparator(raw.to_owned()))?;
		if function.contains(DESCRIPTOR_SEPARATOR) {
			return Err(DescriptorError::ExtraSeparator(raw.to_owned()));
		}
		let (unit, function) = (unit.trim(), function.trim());
		if unit.is_empty() || function.is_empty() {
			return Err(DescriptorError::EmptyPart(raw.to_owned()));
		}
		Ok(Self { unit, function })
	}
}

impl fmt::Display for Descriptor<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{DESCRIPTOR_SEPARATOR}{}", self.unit, self.function)
	}
}

/// Supertype name to the units that should be scanned for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListerMap(FxHashMap<String, Vec<String>>);

impl ListerMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style [`insert`](Self::insert).
	pub fn with<I, S>(mut self, supertype: impl Into<String>, units: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.insert(supertype, units);
		self
	}

	/// Appends `units` to the list for `supertype`.
	pub fn insert<I, S>(&mut self, supertype: impl Into<String>, units: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.0.entry(supertype.into()).or_default().extend(units.into_iter().map(Into::into));
	}

	pub fn units_for(&self, supertype: &str) -> Option<&[String]> {
		self.0.get(supertype).map(Vec::as_slice)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Descriptors suppressed during resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(FxHashSet<String>);

impl ExclusionSet {
	pub fn contains(&self, descriptor: &str) -> bool {
		self.0.contains(descriptor.trim())
	}
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self(iter.into_iter().map(|item| item.into().trim().to_owned()).collect())
	}
}

impl<S: Into<String>> Extend<S> for ExclusionSet {
	fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
		self.0.extend(iter.into_iter().map(|item| item.into().trim().to_owned()));
	}
}

/// Resolves descriptors to candidate subtypes.
///
/// Stateless; create one per resolution.
pub struct ListerResolver<'a> {
	catalog: &'a Catalog,
	codec: &'a dyn NameCodec,
	exclusions: Option<&'a ExclusionSet>,
}

impl<'a> ListerResolver<'a> {
	pub fn new(catalog: &'a Catalog, codec: &'a dyn NameCodec) -> Self {
		Self {
			catalog,
			codec,
			exclusions: None,
		}
	}

	pub fn with_exclusions(mut self, exclusions: &'a ExclusionSet) -> Self {
		self.exclusions = Some(exclusions);
		self
	}

	/// Collects the subtypes of `supertype` contributed by `descriptors`.
	///
	/// Results are not deduplicated. Every failure is contained to the
	/// descriptor (or candidate) that caused it, except an unresolvable
	/// supertype, which makes the whole call return nothing.
	pub fn resolve<S: AsRef<str>>(&self, supertype: &str, descriptors: &[S]) -> Vec<String> {
		let mut result = Vec::new();
		if descriptors.is_empty() {
			return result;
		}

		let supertype_def = match self.catalog.resolve_type(self.codec, supertype) {
			Ok(def) => def,
			Err(error) => {
				warn!(supertype, %error, "failed to resolve supertype");
				return result;
			}
		};

		for raw in descriptors {
			let raw = raw.as_ref();
			if self.exclusions.is_some_and(|exclusions| exclusions.contains(raw)) {
				trace!(descriptor = raw, "descriptor excluded");
				continue;
			}

			let descriptor = match Descriptor::parse(raw) {
				Ok(descriptor) => descriptor,
				Err(error) => {
					warn!(descriptor = raw, %error, "skipping malformed class lister");
					continue;
				}
			};

			let unit = match self.catalog.load_unit(descriptor.unit) {
				Ok(unit) => unit,
				Err(error) => {
					warn!(descriptor = raw, %error, "failed to load class lister unit");
					continue;
				}
			};

			// Unrelated bindings may share the function's name.
			let Some(Binding::Lister(lister)) = unit.get(descriptor.function) else {
				trace!(descriptor = raw, "no lister function behind descriptor");
				continue;
			};

			let map = match catch_unwind(lister.list) {
				Ok(map) => map,
				Err(payload) => {
					warn!(descriptor = raw, error = %panic_message(&*payload), "class lister panicked");
					continue;
				}
			};

			let Some(units) = map.units_for(supertype) else {
				continue;
			};
			for unit_id in units {
				result.extend(scan(self.catalog, self.codec, supertype_def, unit_id));
			}
		}

		result
	}
}
