//! The harness: admission, resolution and sessions.
//!
//! A [`Harness`] holds its own ABI version, architecture descriptor and the
//! [`AppInfo`] every module will see. [`Harness::load`] turns a collected set of
//! descriptors into a [`Session`] in resolved order, or refuses the whole set.
//! No hook of any module runs before loading has fully succeeded.

use std::collections::HashSet ;
use itertools::Itertools ;
use nonempty_collections::NEVec ;
use thiserror::Error ;

use crate::{ AbiVersion, ArchDescriptor, AppInfo, PluginDescriptor, HARNESS_ABI_VERSION };
use crate::compat::{ check_compatibility, AdmissionError };
use crate::resolver::{ resolve_indices, ResolveError };
use crate::lifecycle::{ run_session, LifecycleError, SessionReport };
use crate::utils::PartialResult ;

/// Reasons a descriptor set cannot become a session.
#[derive( Error, Debug )]
pub enum LoadError {

	/// One or more descriptors were refused. Every refusal is listed, in
	/// registration order.
	#[error( "Refused admission: {}", join_errors( .0 ))]
	Admission( NEVec<AdmissionError> ),

	/// The admitted set has no valid load order.
	#[error( transparent )]
	Resolve( #[from] ResolveError ),

}

fn join_errors( errors: &NEVec<AdmissionError> ) -> String {
	errors.into_iter().join( "; " )
}

/// Hosts modules built against a compatible ABI.
///
/// ```
/// use plugin_harness::{ Harness, AppInfo, PluginDescriptor, NoopPlugin };
///
/// let harness = Harness::new( AppInfo::new( "demo" ));
/// let session = harness.load([
/// 	PluginDescriptor::new( "storage", NoopPlugin ).with_requires([ "log" ]),
/// 	PluginDescriptor::new( "log", NoopPlugin ),
/// ])?;
/// assert_eq!( session.order().collect::<Vec<_>>(), [ "log", "storage" ]);
///
/// let ( report, failures ) = session.run().map_err(|( err, _ )| err )?;
/// assert!( failures.is_empty() );
/// assert_eq!( report.deinit_order(), [ "storage", "log" ]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive( Debug, Clone )]
pub struct Harness {
	abi_version: AbiVersion,
	arch: ArchDescriptor,
	app: AppInfo,
}

impl Harness {

	/// Creates a harness at [`HARNESS_ABI_VERSION`] for the host target.
	pub fn new( app: AppInfo ) -> Self {
		Self { abi_version: HARNESS_ABI_VERSION, arch: ArchDescriptor::host(), app }
	}

	/// Overrides the ABI version this harness claims to implement.
	pub fn with_abi_version( mut self, abi_version: AbiVersion ) -> Self {
		self.abi_version = abi_version ;
		self
	}

	/// Overrides the architecture descriptor this harness claims to run on.
	pub fn with_arch( mut self, arch: ArchDescriptor ) -> Self {
		self.arch = arch ;
		self
	}

	#[inline] pub fn abi_version( &self ) -> AbiVersion { self.abi_version }
	#[inline] pub fn arch( &self ) -> &ArchDescriptor { &self.arch }
	#[inline] pub fn app( &self ) -> &AppInfo { &self.app }

	/// Checks every descriptor for a unique name and a compatible ABI and target.
	///
	/// All descriptors are checked even after a failure so the caller sees every
	/// problem at once. A repeated name rejects the later occurrence.
	///
	/// # Errors
	/// Returns every [`AdmissionError`] found, in registration order.
	pub fn admit(
		&self,
		descriptors: impl IntoIterator<Item = PluginDescriptor>,
	) -> Result<Vec<PluginDescriptor>, NEVec<AdmissionError>> {

		let mut seen = HashSet::new();
		let ( admitted, refused ): ( Vec<_>, Vec<_> ) = descriptors.into_iter()
			.map(| descriptor | -> Result<PluginDescriptor, AdmissionError> {
				if !seen.insert( descriptor.name().to_string() ) {
					return Err( AdmissionError::DuplicateName( descriptor.name().to_string() ));
				}
				check_compatibility( &descriptor, self.abi_version, &self.arch )?;
				Ok( descriptor )
			})
			.partition_result();

		match NEVec::try_from_vec( refused ) {
			Some( refused ) => {
				for error in &refused {
					tracing::error!( plugin = error.plugin(), error = %error, "plugin refused" );
				}
				Err( refused )
			},
			None => {
				for descriptor in &admitted {
					tracing::info!(
						plugin = descriptor.name(),
						version = %descriptor.plugin_version(),
						abi = %descriptor.abi_version(),
						brief = descriptor.brief(),
						"plugin admitted"
					);
				}
				Ok( admitted )
			},
		}

	}

	/// Admits and resolves `descriptors` into a ready to run [`Session`].
	///
	/// # Errors
	/// Returns [`LoadError::Admission`] if any descriptor is refused, otherwise
	/// [`LoadError::Resolve`] if the admitted set cannot be ordered.
	pub fn load(
		&self,
		descriptors: impl IntoIterator<Item = PluginDescriptor>,
	) -> Result<Session<'_>, LoadError> {

		let admitted = self.admit( descriptors ).map_err( LoadError::Admission )?;
		let order = resolve_indices( &admitted )?;

		let mut slots = admitted.into_iter().map( Some ).collect::<Vec<_>>();
		let plugins = order.into_iter()
			.filter_map(| index | slots[ index ].take() )
			.collect();

		Ok( Session { app: &self.app, plugins })

	}

}

/// A resolved set of modules, ready to run once.
#[must_use = "call .run() to drive the plugins"]
#[derive( Debug )]
pub struct Session<'h> {
	app: &'h AppInfo,
	plugins: Vec<PluginDescriptor>,
}

impl Session<'_> {

	/// Plugin names in init order.
	pub fn order( &self ) -> impl Iterator<Item = &str> {
		self.plugins.iter().map( PluginDescriptor::name )
	}

	#[inline] pub fn len( &self ) -> usize { self.plugins.len() }

	#[inline] pub fn is_empty( &self ) -> bool { self.plugins.is_empty() }

	pub fn get( &self, name: &str ) -> Option<&PluginDescriptor> {
		self.plugins.iter().find(| descriptor | descriptor.name() == name )
	}

	/// Drives every module through init, start, run and deinit, blocking until done.
	///
	/// On success, returns the report together with every start and deinit failure
	/// that was collected along the way; an empty list means a clean run. If an
	/// `init` fails, returns that failure together with any failures raised while
	/// rolling back the modules initialized before it.
	///
	/// # Errors
	/// Returns [`LifecycleError::InitFailed`] if any module fails to initialise.
	pub fn run( self ) -> PartialResult<SessionReport, LifecycleError> {
		let span = tracing::info_span!( "session", program = self.app.program_name() );
		let _entered = span.enter();
		run_session( self.app, &self.plugins )
	}

}
