//! Admission checks.
//!
//! Before a module's hooks are ever touched, its declared ABI version and
//! architecture descriptor are compared with the harness's own. A module that
//! fails either check is rejected; nothing about it is trusted afterwards.

use thiserror::Error ;

use crate::{ AbiVersion, ArchDescriptor, ArchField, ArchFieldKind, PluginDescriptor };

/// Reasons a descriptor is refused admission to a session.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum AdmissionError {

	/// The module's ABI major differs from the harness's, or its minor is newer.
	#[error( "Plugin '{plugin}' was built for ABI {found}, harness provides {expected}" )]
	AbiMismatch { plugin: String, found: AbiVersion, expected: AbiVersion },

	/// A non-wildcard architecture field differs from the harness's.
	#[error( "Plugin '{plugin}' targets {field} '{found}', harness is '{expected}'" )]
	ArchMismatch { plugin: String, field: ArchFieldKind, found: ArchField, expected: ArchField },

	/// Another admitted descriptor already uses this name.
	#[error( "Plugin name '{0}' is declared more than once" )]
	DuplicateName( String ),

}

impl AdmissionError {
	/// The name of the rejected plugin.
	pub fn plugin( &self ) -> &str {
		match self {
			Self::AbiMismatch { plugin, .. } | Self::ArchMismatch { plugin, .. } => plugin,
			Self::DuplicateName( plugin ) => plugin,
		}
	}
}

/// Checks `descriptor` against the harness's ABI version and architecture.
///
/// The ABI check runs first; a module failing both is reported as an ABI mismatch.
///
/// # Errors
/// Returns [`AdmissionError::AbiMismatch`] or [`AdmissionError::ArchMismatch`].
pub fn check_compatibility(
	descriptor: &PluginDescriptor,
	harness_abi: AbiVersion,
	harness_arch: &ArchDescriptor,
) -> Result<(), AdmissionError> {

	if !descriptor.abi_version().is_compatible_with( harness_abi ) {
		return Err( AdmissionError::AbiMismatch {
			plugin: descriptor.name().to_string(),
			found: descriptor.abi_version(),
			expected: harness_abi,
		});
	}

	match descriptor.arch().first_mismatch( harness_arch ) {
		None => Ok(()),
		Some(( field, found, expected )) => Err( AdmissionError::ArchMismatch {
			plugin: descriptor.name().to_string(),
			field,
			found: found.clone(),
			expected: expected.clone(),
		}),
	}

}

#[cfg( test )]
mod tests {
	use super::* ;
	use crate::NoopPlugin ;

	fn harness_arch() -> ArchDescriptor { "x86_64/linux/gnu/rust".parse().unwrap() }

	fn module( major: u8, minor: u8 ) -> PluginDescriptor {
		PluginDescriptor::new( "module", NoopPlugin ).with_abi_version( AbiVersion::new( major, minor, 0 ))
	}

	#[test]
	fn backward_compatible_minor_is_admitted() {
		assert_eq!( check_compatibility( &module( 1, 2 ), AbiVersion::new( 1, 3, 0 ), &harness_arch() ), Ok(()));
	}

	#[test]
	fn other_major_or_newer_minor_is_rejected() {
		for harness in [ AbiVersion::new( 2, 0, 0 ), AbiVersion::new( 1, 1, 0 )] {
			match check_compatibility( &module( 1, 2 ), harness, &harness_arch() ) {
				Err( AdmissionError::AbiMismatch { plugin, found, expected }) => {
					assert_eq!( plugin, "module" );
					assert_eq!( found, AbiVersion::new( 1, 2, 0 ));
					assert_eq!( expected, harness );
				},
				other => panic!( "Expected ABI mismatch against {}, found {:?}", harness, other ),
			}
		}
	}

	#[test]
	fn arch_mismatch_names_the_field() {
		let descriptor = module( 1, 0 ).with_arch( "x86_64/*/msvc/rust".parse().unwrap() );
		match check_compatibility( &descriptor, AbiVersion::new( 1, 0, 0 ), &harness_arch() ) {
			Err( AdmissionError::ArchMismatch { field, found, expected, .. }) => {
				assert_eq!( field, ArchFieldKind::CallingConvention );
				assert_eq!( found, ArchField::exact( "msvc" ));
				assert_eq!( expected, ArchField::exact( "gnu" ));
			},
			other => panic!( "Expected arch mismatch, found {:?}", other ),
		}
	}

	#[test]
	fn wildcarded_arch_is_admitted() {
		let descriptor = module( 1, 0 ).with_arch( "*/linux/*/*".parse().unwrap() );
		assert!( check_compatibility( &descriptor, AbiVersion::new( 1, 0, 0 ), &harness_arch() ).is_ok() );
	}

}
