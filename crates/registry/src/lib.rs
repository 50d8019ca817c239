//! Pluggable type registry.
//!
//! Given the canonical name of a supertype, the [`Registry`] discovers the
//! canonical names of every concrete, constructible subtype available to the
//! process, without the caller naming the units that define them.
//!
//! # Discovery
//!
//! Linked crates describe themselves to a [`Catalog`] through the registration
//! macros ([`abstract_type!`], [`concrete_type!`], [`class_lister!`],
//! [`reexport!`], [`entry_point!`], [`code_unit!`]). On a cache miss the
//! registry gathers `unit:function` descriptors from three independent
//! sources:
//!
//! - entry points published under [`CLASS_LISTER_GROUP`]
//! - the descriptors configured on the registry
//! - an environment variable whose name is configured on the registry
//!
//! Each descriptor names a lister returning a [`ListerMap`]. The units listed
//! for the queried supertype are scanned, every candidate is validated by
//! constructing it, and the union of all sources is sorted and cached.
//!
//! Failures inside third-party code (unit loaders, listers, factories) are
//! logged through `tracing` and skipped. The only error a lookup returns is
//! [`RegistryError::NoClasses`].

#[doc(hidden)]
pub use inventory;

mod catalog;
mod config;
mod error;
mod lister;
mod macros;
mod name;
mod reentry;
mod registry;
mod scan;
mod sources;

pub use catalog::{
	Binding, Catalog, CatalogBuilder, EntryPoint, Factory, Instance, ListerDef, ListerFn, ReExportDef, Registration, TypeDef, TypeKind, Unit, UnitDef,
	UnitLoader, ValueDef, construct_default, not_implemented,
};
pub use config::{DescriptorList, RegistryConfig};
pub use error::{BoxError, CatalogError, ConfigError, ConstructError, DescriptorError, DiscoveryError, RegistryError};
pub use lister::{DESCRIPTOR_SEPARATOR, Descriptor, ExclusionSet, ListerMap, ListerResolver};
pub use name::{DottedNames, NameCodec, PRIVATE_PREFIX, SupertypeKey, TypeQuery};
pub use registry::{Classes, Registry};
pub use scan::scan;
pub use sources::{CLASS_LISTER_GROUP, ConfiguredSource, DiscoverySource, EntryPointSource, Env, EnvSource, ProcessEnv, split_list};
