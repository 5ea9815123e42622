//! Plugin descriptors.
//!
//! A [`PluginDescriptor`] is the record a module hands to the harness: its identity,
//! the ABI and target it was built for, what it depends on, what it cannot coexist
//! with, and the [`Plugin`] object carrying its lifecycle hooks.

use itertools::Itertools ;

use crate::{ AbiVersion, ArchDescriptor, Plugin, HARNESS_ABI_VERSION };

/// Everything the harness knows about one module.
///
/// Built with [`PluginDescriptor::new`] and the `with_*` methods. The ABI version
/// defaults to [`HARNESS_ABI_VERSION`] and the architecture to
/// [`ArchDescriptor::any`], which suits modules compiled into the host binary.
#[must_use = "pass the descriptor to Harness::load"]
pub struct PluginDescriptor {
	name: String,
	abi_version: AbiVersion,
	arch: ArchDescriptor,
	brief: String,
	plugin_version: semver::Version,
	requires: Vec<String>,
	conflicts: Vec<String>,
	plugin: Box<dyn Plugin>,
}

impl PluginDescriptor {

	pub fn new( name: impl Into<String>, plugin: impl Plugin + 'static ) -> Self {
		Self {
			name: name.into(),
			abi_version: HARNESS_ABI_VERSION,
			arch: ArchDescriptor::any(),
			brief: String::new(),
			plugin_version: semver::Version::new( 0, 0, 0 ),
			requires: Vec::with_capacity( 0 ),
			conflicts: Vec::with_capacity( 0 ),
			plugin: Box::new( plugin ),
		}
	}

	pub fn with_abi_version( mut self, abi_version: AbiVersion ) -> Self {
		self.abi_version = abi_version ;
		self
	}

	pub fn with_arch( mut self, arch: ArchDescriptor ) -> Self {
		self.arch = arch ;
		self
	}

	pub fn with_brief( mut self, brief: impl Into<String> ) -> Self {
		self.brief = brief.into();
		self
	}

	pub fn with_plugin_version( mut self, version: semver::Version ) -> Self {
		self.plugin_version = version ;
		self
	}

	/// Sets the modules this one depends on.
	///
	/// Order is kept; repeated names collapse onto their first occurrence.
	pub fn with_requires( mut self, requires: impl IntoIterator<Item = impl Into<String>> ) -> Self {
		self.requires = requires.into_iter()
			.map( Into::<String>::into )
			.unique()
			.collect();
		self
	}

	/// Sets the modules that must not be loaded alongside this one.
	pub fn with_conflicts( mut self, conflicts: impl IntoIterator<Item = impl Into<String>> ) -> Self {
		self.conflicts = conflicts.into_iter()
			.map( Into::<String>::into )
			.unique()
			.collect();
		self
	}

	#[inline] pub fn name( &self ) -> &str { &self.name }
	#[inline] pub fn abi_version( &self ) -> AbiVersion { self.abi_version }
	#[inline] pub fn arch( &self ) -> &ArchDescriptor { &self.arch }
	#[inline] pub fn brief( &self ) -> &str { &self.brief }
	#[inline] pub fn plugin_version( &self ) -> &semver::Version { &self.plugin_version }
	#[inline] pub fn requires( &self ) -> &[String] { &self.requires }
	#[inline] pub fn conflicts( &self ) -> &[String] { &self.conflicts }
	#[inline] pub fn plugin( &self ) -> &dyn Plugin { self.plugin.as_ref() }

	/// Whether this module gets a thread once every module is initialized.
	#[inline] pub fn has_start( &self ) -> bool { self.plugin.has_start() }

	/// Whether `other` appears in this module's conflict list.
	pub fn conflicts_with( &self, other: &str ) -> bool {
		self.conflicts.iter().any(| name | name == other )
	}

}

impl std::fmt::Debug for PluginDescriptor {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "PluginDescriptor" )
			.field( "name", &self.name )
			.field( "abi_version", &self.abi_version.to_string())
			.field( "arch", &self.arch.to_string() )
			.field( "brief", &self.brief )
			.field( "plugin_version", &self.plugin_version.to_string() )
			.field( "requires", &self.requires )
			.field( "conflicts", &self.conflicts )
			.field( "has_start", &self.has_start() )
			.finish_non_exhaustive()
	}
}

#[cfg( test )]
mod tests {
	use super::* ;
	use crate::NoopPlugin ;

	#[test]
	fn requires_keeps_first_occurrence_order() {
		let descriptor = PluginDescriptor::new( "m", NoopPlugin )
			.with_requires([ "b", "a", "b", "c", "a" ]);
		assert_eq!( descriptor.requires(), [ "b", "a", "c" ]);
	}

	#[test]
	fn defaults_fit_the_running_harness() {
		let descriptor = PluginDescriptor::new( "m", NoopPlugin );
		assert_eq!( descriptor.abi_version(), HARNESS_ABI_VERSION );
		assert!( descriptor.arch().matches( &ArchDescriptor::host() ));
		assert!( !descriptor.has_start() );
	}

	#[test]
	fn conflict_lookup() {
		let descriptor = PluginDescriptor::new( "m", NoopPlugin ).with_conflicts([ "x" ]);
		assert!( descriptor.conflicts_with( "x" ));
		assert!( !descriptor.conflicts_with( "y" ));
	}

}
