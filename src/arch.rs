//! Architecture descriptors.
//!
//! A descriptor is a four part tag, `cpu/os/abi/runtime`, naming the target a module
//! was built for. Any field may be the wildcard `*`, meaning the module does not
//! care about that part of the target.

use std::fmt ;
use std::str::FromStr ;
use thiserror::Error ;
use itertools::Itertools ;

/// The token that matches any value in a descriptor field.
pub const WILDCARD: &str = "*" ;

/// One field of an [`ArchDescriptor`].
#[derive( Debug, Clone, PartialEq, Eq, Hash )]
pub enum ArchField {
	/// Matches any value.
	Any,
	/// Matches only this exact value, byte for byte.
	Exact( String ),
}

impl ArchField {

	#[inline]
	pub fn exact( value: impl Into<String> ) -> Self { Self::Exact( value.into() ) }

	/// Whether a candidate holding `self` is acceptable to a harness holding `required`.
	///
	/// Only the candidate side wildcards: a harness describes one concrete target.
	pub fn accepts( &self, required: &ArchField ) -> bool {
		match ( self, required ) {
			( ArchField::Any, _ ) => true,
			( ArchField::Exact( own ), ArchField::Exact( required )) => own == required,
			( ArchField::Exact( _ ), ArchField::Any ) => false,
		}
	}

}

impl fmt::Display for ArchField {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		match self {
			Self::Any => f.write_str( WILDCARD ),
			Self::Exact( value ) => f.write_str( value ),
		}
	}
}

/// Names the four positions of an [`ArchDescriptor`], used in mismatch reports.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum ArchFieldKind { Cpu, Os, CallingConvention, Runtime }

impl fmt::Display for ArchFieldKind {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		f.write_str( match self {
			Self::Cpu => "cpu",
			Self::Os => "os",
			Self::CallingConvention => "calling convention",
			Self::Runtime => "runtime",
		})
	}
}

/// A `cpu/os/abi/runtime` compatibility tag.
#[derive( Debug, Clone, PartialEq, Eq, Hash )]
pub struct ArchDescriptor {
	pub cpu: ArchField,
	pub os: ArchField,
	pub calling_convention: ArchField,
	pub runtime: ArchField,
}

impl ArchDescriptor {

	/// A descriptor that accepts any harness.
	pub const fn any() -> Self {
		Self {
			cpu: ArchField::Any,
			os: ArchField::Any,
			calling_convention: ArchField::Any,
			runtime: ArchField::Any,
		}
	}

	/// The descriptor of the target this harness was compiled for.
	pub fn host() -> Self {
		let calling_convention = if cfg!( target_env = "msvc" ) { "msvc" }
			else if cfg!( target_env = "gnu" ) { "gnu" }
			else if cfg!( target_env = "musl" ) { "musl" }
			else if cfg!( target_family = "wasm" ) { "wasm" }
			else { "sysv" };
		Self {
			cpu: ArchField::exact( std::env::consts::ARCH ),
			os: ArchField::exact( std::env::consts::OS ),
			calling_convention: ArchField::exact( calling_convention ),
			runtime: ArchField::exact( "rust" ),
		}
	}

	/// The four fields in `cpu/os/abi/runtime` order, tagged with their position.
	pub fn fields( &self ) -> [( ArchFieldKind, &ArchField ); 4] {[
		( ArchFieldKind::Cpu, &self.cpu ),
		( ArchFieldKind::Os, &self.os ),
		( ArchFieldKind::CallingConvention, &self.calling_convention ),
		( ArchFieldKind::Runtime, &self.runtime ),
	]}

	/// Returns the first field of `self` that `harness` does not accept, if any.
	pub fn first_mismatch<'a>( &'a self, harness: &'a ArchDescriptor )
		-> Option<( ArchFieldKind, &'a ArchField, &'a ArchField )>
	{
		self.fields().into_iter()
			.zip( harness.fields() )
			.find(|(( _, own ), ( _, required ))| !own.accepts( required ))
			.map(|(( kind, own ), ( _, required ))| ( kind, own, required ))
	}

	#[inline]
	pub fn matches( &self, harness: &ArchDescriptor ) -> bool {
		self.first_mismatch( harness ).is_none()
	}

}

impl Default for ArchDescriptor {
	fn default() -> Self { Self::host() }
}

impl fmt::Display for ArchDescriptor {
	fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
		write!( f, "{}", self.fields().iter().map(|( _, field )| field ).join( "/" ))
	}
}

/// Failure to parse an [`ArchDescriptor`] string.
#[derive( Error, Debug, Clone, PartialEq, Eq )]
pub enum ArchParseError {
	#[error( "Expected 4 '/'-separated fields, found {0} in '{1}'" )] FieldCount( usize, String ),
	#[error( "Empty {0} field in '{1}'" )] EmptyField( ArchFieldKind, String ),
}

impl FromStr for ArchDescriptor {
	type Err = ArchParseError ;

	fn from_str( s: &str ) -> Result<Self, Self::Err> {

		let parts = s.split( '/' ).map( str::trim ).collect::<Vec<_>>();
		let &[ cpu, os, calling_convention, runtime ] = parts.as_slice() else {
			return Err( ArchParseError::FieldCount( parts.len(), s.to_string() ));
		};

		let field = | kind: ArchFieldKind, value: &str | match value {
			"" => Err( ArchParseError::EmptyField( kind, s.to_string() )),
			WILDCARD => Ok( ArchField::Any ),
			value => Ok( ArchField::exact( value )),
		};

		Ok( Self {
			cpu: field( ArchFieldKind::Cpu, cpu )?,
			os: field( ArchFieldKind::Os, os )?,
			calling_convention: field( ArchFieldKind::CallingConvention, calling_convention )?,
			runtime: field( ArchFieldKind::Runtime, runtime )?,
		})

	}
}

#[cfg( test )]
mod tests {
	use super::* ;

	fn arch( s: &str ) -> ArchDescriptor { s.parse().unwrap() }

	#[test]
	fn wildcard_matches_anything() {
		let harness = arch( "x86_64/linux/gnu/rust" );
		assert!( arch( "*/*/*/*" ).matches( &harness ));
		assert!( arch( "x86_64/*/gnu/*" ).matches( &harness ));
		assert!( ArchDescriptor::any().matches( &ArchDescriptor::host() ));
	}

	#[test]
	fn exact_field_requires_byte_equality() {
		let harness = arch( "x86_64/linux/gnu/rust" );
		assert!( arch( "x86_64/linux/gnu/rust" ).matches( &harness ));
		assert_eq!(
			arch( "x86_64/Linux/gnu/rust" ).first_mismatch( &harness ).map(|( kind, _, _ )| kind ),
			Some( ArchFieldKind::Os ),
		);
		assert!( !arch( "aarch64/linux/gnu/rust" ).matches( &harness ));
	}

	#[test]
	fn wildcard_on_harness_side_does_not_accept_exact() {
		assert!( !arch( "x86_64/linux/gnu/rust" ).matches( &arch( "*/linux/gnu/rust" )));
	}

	#[test]
	fn host_matches_itself() {
		assert!( ArchDescriptor::host().matches( &ArchDescriptor::host() ));
	}

	#[test]
	fn display_round_trips_text() {
		assert_eq!( arch( "arm/*/eabi/rust" ).to_string(), "arm/*/eabi/rust" );
	}

	#[test]
	fn rejects_malformed_strings() {
		assert!( matches!( "x86_64/linux/gnu".parse::<ArchDescriptor>(), Err( ArchParseError::FieldCount( 3, _ ))));
		assert!( matches!(
			"x86_64//gnu/rust".parse::<ArchDescriptor>(),
			Err( ArchParseError::EmptyField( ArchFieldKind::Os, _ )),
		));
	}

}
