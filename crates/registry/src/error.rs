use std::path::PathBuf;

use crate::name::SupertypeKey;

/// Boxed error produced by third-party hooks (unit loaders, factories).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The only error a lookup surfaces to its caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	/// Discovery produced no subtypes and the caller asked for a non-empty result.
	#[error("no classes found for: {supertype}")]
	NoClasses { supertype: SupertypeKey },
}

/// Outcome of a failed no-argument construction.
#[derive(Debug, thiserror::Error)]
pub enum ConstructError {
	/// The type opts out of no-argument discovery.
	#[error("no-argument construction is not implemented")]
	NotImplemented,
	#[error("{0}")]
	Failed(BoxError),
}

impl ConstructError {
	/// Wraps an arbitrary error as a construction failure.
	pub fn failed(error: impl Into<BoxError>) -> Self {
		Self::Failed(error.into())
	}
}

/// Malformed `unit:function` descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
	#[error("missing ':' separator in descriptor {0:?}")]
	MissingSeparator(String),
	#[error("more than one ':' separator in descriptor {0:?}")]
	ExtraSeparator(String),
	#[error("empty unit or function in descriptor {0:?}")]
	EmptyPart(String),
}

/// Failures hit while discovering subtypes.
///
/// These never reach the caller of a lookup; they are written to the
/// diagnostic stream and the offending item is skipped.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
	#[error("unknown unit: {unit}")]
	UnknownUnit { unit: String },
	#[error("failed to load unit {unit}: {source}")]
	UnitLoad { unit: String, source: BoxError },
	#[error("unknown type: {name}")]
	UnknownType { name: String },
	#[error("{name} is not a type")]
	NotAType { name: String },
	#[error("{name} is abstract")]
	Abstract { name: String },
	#[error("failed to construct {name}: {source}")]
	Construct { name: String, source: ConstructError },
	#[error("{context} panicked: {message}")]
	Panicked { context: String, message: String },
	/// Third-party code re-entered a lookup or load that was already running
	/// on this thread.
	#[error("{context} re-entered discovery already in progress")]
	Reentrant { context: String },
}

impl DiscoveryError {
	/// Whether this is the sanctioned no-argument opt-out.
	pub fn is_not_implemented(&self) -> bool {
		matches!(
			self,
			DiscoveryError::Construct {
				source: ConstructError::NotImplemented,
				..
			}
		)
	}
}

/// Catalog assembly conflicts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
	#[error("duplicate binding {name} in unit {unit}")]
	DuplicateBinding { unit: &'static str, name: &'static str },
	#[error("unit {unit} already has a loader")]
	DuplicateLoader { unit: &'static str },
}

/// Configuration file failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", .path.display())]
	Io { path: PathBuf, source: std::io::Error },
	#[error("invalid registry config: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&'static str>() {
		(*message).to_owned()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"non-string panic payload".to_owned()
	}
}
