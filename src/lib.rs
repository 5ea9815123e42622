//! A plugin hosting runtime for building modular applications.
//!
//! Modules are built independently of the host and handed to it as
//! [`PluginDescriptor`]s. The harness admits only modules built for a compatible
//! ABI and target, orders them by their declared dependencies, and drives each
//! through an `init` → `start` → `deinit` lifecycle.
//!
//! # Core Concepts
//!
//! - [`PluginDescriptor`]: The record describing one module: its unique name, the
//! 	[`AbiVersion`] and [`ArchDescriptor`] it was built for, a brief description, its
//! 	own version, the modules it **requires**, the modules it **conflicts** with, and
//! 	its [`Plugin`] hooks.
//!
//! - [`Plugin`]: The lifecycle capability. `init`, `deinit` and `start` each default to
//! 	a no-op; a module opts into its own thread through [`Plugin::has_start`].
//!
//! - [`Harness`]: Owns the ABI version, architecture and [`AppInfo`] modules are
//! 	checked against and run with. [`Harness::load`] produces a [`Session`].
//!
//! - [`Session`]: One resolved set of modules. [`Session::run`] blocks until every
//! 	module has been initialized, run, and deinitialized.
//!
//! # Admission
//!
//! A module is admitted when its ABI major equals the harness's and its minor is not
//! newer, and when every field of its `cpu/os/abi/runtime` descriptor equals the
//! harness's or is the wildcard `*`. Names must be unique within a session.
//!
//! # Ordering
//!
//! If M requires D, D is initialized before M and deinitialized after it. A load
//! fails before any hook runs if two loaded modules conflict, if a requirement is
//! not loaded, or if requirements form a cycle. Ties are broken by registration
//! order, so the same input always gives the same order.
//!
//! # Threads
//!
//! `init` and `deinit` run on the thread calling [`Session::run`]. Each module with
//! a `start` hook gets one thread once every `init` has returned. Threads are never
//! cancelled: a module must notice shutdown on its own and return from `start`.
//!
//! # Example
//!
//! ```
//! use std::sync::{ Arc, Mutex };
//! use plugin_harness::{ Harness, AppInfo, ConfigSection, Plugin, PluginDescriptor, PluginResult };
//!
//! struct Recorder { name: &'static str, log: Arc<Mutex<Vec<String>>> }
//!
//! impl Plugin for Recorder {
//! 	fn init( &self, _app: &AppInfo ) -> PluginResult {
//! 		self.log.lock().unwrap().push( format!( "init {}", self.name ));
//! 		Ok(())
//! 	}
//! 	fn deinit( &self, _app: &AppInfo ) -> PluginResult {
//! 		self.log.lock().unwrap().push( format!( "deinit {}", self.name ));
//! 		Ok(())
//! 	}
//! 	fn has_start( &self ) -> bool { self.name == "server" }
//! 	fn start( &self, _app: &AppInfo, _config: &ConfigSection ) -> PluginResult {
//! 		self.log.lock().unwrap().push( format!( "start {}", self.name ));
//! 		Ok(())
//! 	}
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let log = Arc::new( Mutex::new( Vec::new() ));
//! let recorder = | name | Recorder { name, log: Arc::clone( &log ) };
//!
//! let harness = Harness::new( AppInfo::new( "example" ));
//! let session = harness.load([
//! 	PluginDescriptor::new( "server", recorder( "server" )).with_requires([ "database" ]),
//! 	PluginDescriptor::new( "database", recorder( "database" )),
//! ])?;
//!
//! let ( report, failures ) = session.run().map_err(|( err, _ )| err )?;
//! assert!( failures.is_empty() );
//! assert_eq!( report.started(), [ "server" ]);
//! assert_eq!( *log.lock().unwrap(), [
//! 	"init database", "init server", "start server", "deinit server", "deinit database",
//! ]);
//! # Ok(())
//! # }
//! ```

mod arch ;
mod compat ;
mod context ;
mod descriptor ;
mod harness ;
mod lifecycle ;
mod plugin ;
mod resolver ;
mod utils ;
mod version ;

#[doc( no_inline )]
pub use nonempty_collections::NEVec ;

pub use arch::{ ArchDescriptor, ArchField, ArchFieldKind, ArchParseError, WILDCARD };
pub use compat::{ check_compatibility, AdmissionError };
pub use context::{ AppInfo, ConfigSection, GlobalConfig };
pub use descriptor::PluginDescriptor ;
pub use harness::{ Harness, Session, LoadError };
pub use lifecycle::{ LifecycleError, Phase, PluginState, SessionReport };
pub use plugin::{ Plugin, PluginResult, BoxError, NoopPlugin };
pub use resolver::{ resolve, ResolveError };
pub use utils::{ PartialResult, PartialSuccess };
pub use version::{ AbiVersion, AbiVersionParseError, HARNESS_ABI_VERSION };
