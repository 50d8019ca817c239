//! Link-time registration macros.
//!
//! Each macro defines a static and submits it through `inventory`, so that
//! [`Catalog::installed`](crate::Catalog::installed) sees it as soon as the
//! defining crate is linked.

/// Defines and registers an abstract type.
///
/// ```ignore
/// lineage_registry::abstract_type!(pub HANDLER, {
/// 	unit: "app.handlers",
/// 	name: "Handler",
/// });
/// ```
#[macro_export]
macro_rules! abstract_type {
	($vis:vis $ident:ident, {
		unit: $unit:expr,
		name: $name:expr
		$(, extends: [$($parent:expr),* $(,)?])?
		$(,)?
	}) => {
		$vis static $ident: $crate::TypeDef = $crate::TypeDef::new_abstract($unit, $name, &[$($($parent),*)?]);

		$crate::inventory::submit! { $crate::Registration::Type(&$ident) }
	};
}

/// Defines and registers a concrete type with its no-argument factory.
///
/// ```ignore
/// lineage_registry::concrete_type!(pub CSV, {
/// 	unit: "app.handlers.csv",
/// 	name: "CsvHandler",
/// 	extends: ["app.handlers.Handler"],
/// 	factory: lineage_registry::construct_default::<CsvHandler>,
/// });
/// ```
#[macro_export]
macro_rules! concrete_type {
	($vis:vis $ident:ident, {
		unit: $unit:expr,
		name: $name:expr,
		extends: [$($parent:expr),* $(,)?],
		factory: $factory:expr
		$(,)?
	}) => {
		$vis static $ident: $crate::TypeDef = $crate::TypeDef::concrete($unit, $name, &[$($parent),*], $factory);

		$crate::inventory::submit! { $crate::Registration::Type(&$ident) }
	};
}

/// Defines and registers a lister function binding.
#[macro_export]
macro_rules! class_lister {
	($vis:vis $ident:ident, {
		unit: $unit:expr,
		name: $name:expr
		$(,)?
	}, $list:expr) => {
		$vis static $ident: $crate::ListerDef = $crate::ListerDef::new($unit, $name, $list);

		$crate::inventory::submit! { $crate::Registration::Lister(&$ident) }
	};
}

/// Re-exports a registered type from another unit.
#[macro_export]
macro_rules! reexport {
	($target:path => $unit:expr) => {
		const _: () = {
			static REEXPORT: $crate::ReExportDef = $crate::ReExportDef::new($unit, &$target);

			$crate::inventory::submit! { $crate::Registration::ReExport(&REEXPORT) }
		};
	};
}

/// Publishes an entry point, typically under [`CLASS_LISTER_GROUP`](crate::CLASS_LISTER_GROUP).
#[macro_export]
macro_rules! entry_point {
	($group:expr, $name:expr => $value:expr) => {
		const _: () = {
			static ENTRY: $crate::EntryPoint = $crate::EntryPoint::new($group, $name, $value);

			$crate::inventory::submit! { $crate::Registration::EntryPoint(&ENTRY) }
		};
	};
}

/// Declares a unit, optionally with a load hook.
#[macro_export]
macro_rules! code_unit {
	($id:expr $(,)?) => {
		const _: () = {
			static UNIT: $crate::UnitDef = $crate::UnitDef::new($id, None);

			$crate::inventory::submit! { $crate::Registration::Unit(&UNIT) }
		};
	};
	($id:expr, loader: $loader:expr $(,)?) => {
		const _: () = {
			static UNIT: $crate::UnitDef = $crate::UnitDef::new($id, Some($loader));

			$crate::inventory::submit! { $crate::Registration::Unit(&UNIT) }
		};
	};
}
