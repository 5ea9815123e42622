//! ABI version values and their compatibility rule.
//!
//! A module declares the ABI it was built against; the harness only admits it when
//! the major versions are equal and the module's minor version is not newer than
//! the harness's own. The harness is a superset of every older minor revision of
//! its major version, never of a newer one.

use std::fmt ;
use std::str::FromStr ;
use thiserror::Error ;

/// The ABI version this harness implements.
pub const HARNESS_ABI_VERSION: AbiVersion = AbiVersion::new( 1, 0, 0 );

/// A structured `major.minor.patch` ABI version.
///
/// Only `major` and `minor` take part in [`AbiVersion::is_compatible_with`];
/// `patch` is carried for diagnostics.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord )]
pub struct AbiVersion {
	pub major: u8,
	pub minor: u8,
	pub patch: u16,
}

impl AbiVersion {

	#[inline]
	pub const fn new( major: u8, minor: u8, patch: u16 ) -> Self {
		Self { major, minor, patch }
	}

	/// Whether a module built against `self` can be hosted by a harness at `harness`.
	///
	/// ```
	/// # use plugin_harness::AbiVersion ;
	/// let module = AbiVersion::new( 1, 2, 0 );
	/// assert!( module.is_compatible_with( AbiVersion::new( 1, 3, 0 )));
	/// assert!( !module.is_compatible_with( AbiVersion::new( 1, 1, 0 )));
	/// assert!( !module.is_compatible_with( AbiVersion::new( 2, 0, 0 )));
	/// ```
	#[inline]
	pub const fn is_compatible_with( self, harness: AbiVersion ) -> bool {
		self.major == harness.major && self.minor <= harness.minor
	}

	/// Decodes the packed `major << 24 | minor << 16 | patch` layout used by
	/// descriptors that carry their version as a single integer.
	#[inline]
	pub const fn from_packed( packed: u32 ) -> Self {
		Self {
			major: ( packed >> 24 ) as u8,
			minor: ( packed >> 16 ) as u8,
			patch: packed as u16,
		}
	}

	/// Encodes this version into the packed integer layout.
	#[inline]
	pub const fn packed( self ) -> u32 {
		( self.major as u32 ) << 24 | ( self.minor as u32 ) << 16 | self.patch as u32
	}

}

impl fmt::Display for AbiVersion {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		write!( f, "{}.{}.{}", self.major, self.minor, self.patch )
	}
}

/// Failure to parse an [`AbiVersion`] from its `major.minor[.patch]` text form.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum AbiVersionParseError {
	#[error( "Expected 'major.minor[.patch]', found '{0}'" )] Malformed( String ),
	#[error( "Invalid version component '{0}'" )] InvalidComponent( String ),
}

impl FromStr for AbiVersion {
	type Err = AbiVersionParseError ;

	fn from_str( s: &str ) -> Result<Self, Self::Err> {

		let parts = s.trim().split( '.' ).collect::<Vec<_>>();
		let ( major, minor, patch ) = match parts.as_slice() {
			[ major, minor ] => ( *major, *minor, "0" ),
			[ major, minor, patch ] => ( *major, *minor, *patch ),
			_ => return Err( AbiVersionParseError::Malformed( s.to_string() )),
		};

		let invalid = | part: &str | AbiVersionParseError::InvalidComponent( part.to_string() );
		Ok( Self {
			major: major.parse().map_err(| _ | invalid( major ))?,
			minor: minor.parse().map_err(| _ | invalid( minor ))?,
			patch: patch.parse().map_err(| _ | invalid( patch ))?,
		})

	}
}

#[cfg( test )]
mod tests {
	use super::* ;

	#[test]
	fn minor_must_not_exceed_harness() {
		let harness = AbiVersion::new( 1, 3, 0 );
		assert!( AbiVersion::new( 1, 0, 0 ).is_compatible_with( harness ));
		assert!( AbiVersion::new( 1, 3, 7 ).is_compatible_with( harness ));
		assert!( !AbiVersion::new( 1, 4, 0 ).is_compatible_with( harness ));
		assert!( !AbiVersion::new( 0, 3, 0 ).is_compatible_with( harness ));
	}

	#[test]
	fn patch_is_ignored_for_compatibility() {
		assert!( AbiVersion::new( 1, 2, 900 ).is_compatible_with( AbiVersion::new( 1, 2, 0 )));
	}

	#[test]
	fn packed_layout() {
		let version = AbiVersion::new( 1, 2, 3 );
		assert_eq!( version.packed(), 0x0102_0003 );
		assert_eq!( AbiVersion::from_packed( 0x0203_0010 ), AbiVersion::new( 2, 3, 16 ));
	}

	#[test]
	fn parses_text_form() {
		assert_eq!( "1.2".parse::<AbiVersion>(), Ok( AbiVersion::new( 1, 2, 0 )));
		assert_eq!( " 3.0.4 ".parse::<AbiVersion>(), Ok( AbiVersion::new( 3, 0, 4 )));
		assert!( matches!( "1".parse::<AbiVersion>(), Err( AbiVersionParseError::Malformed( _ ))));
		assert!( matches!( "1.x".parse::<AbiVersion>(), Err( AbiVersionParseError::InvalidComponent( c )) if c == "x" ));
	}

}
