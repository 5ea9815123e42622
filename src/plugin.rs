//! The lifecycle capability every module implements.
//!
//! A module is driven through `init`, an optional `start` on its own thread, and
//! `deinit`. Every hook has a no-op default so a module only writes the ones it
//! needs. Hooks receive the shared [`AppInfo`] explicitly; there is no global
//! harness state to reach for.

use crate::context::{ AppInfo, ConfigSection };

/// The error type module hooks fail with.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The result of a single lifecycle hook.
pub type PluginResult = Result<(), BoxError>;

/// Lifecycle hooks of one module.
///
/// The harness guarantees:
/// - `init` of every dependency returns before `init` of its dependents is called
/// - every `init` returns before any `start` is called
/// - every `start` thread has exited before any `deinit` is called
/// - `deinit` of a dependent runs before `deinit` of its dependencies
///
/// `init` and `deinit` always run on the orchestrating thread. `start` runs on a
/// dedicated thread and only if [`Plugin::has_start`] returns `true`.
///
/// # Example
///
/// ```
/// use std::sync::atomic::{ AtomicBool, Ordering };
/// use plugin_harness::{ Plugin, PluginResult, AppInfo, ConfigSection };
///
/// #[derive( Default )]
/// struct Ticker { ready: AtomicBool }
///
/// impl Plugin for Ticker {
/// 	fn init( &self, _app: &AppInfo ) -> PluginResult {
/// 		self.ready.store( true, Ordering::SeqCst );
/// 		Ok(())
/// 	}
/// 	fn has_start( &self ) -> bool { true }
/// 	fn start( &self, _app: &AppInfo, config: &ConfigSection ) -> PluginResult {
/// 		let _interval = config.get( "interval" );
/// 		Ok(())
/// 	}
/// }
/// ```
pub trait Plugin: Send + Sync {

	/// Called once, in dependency order, before any module starts.
	fn init( &self, _app: &AppInfo ) -> PluginResult { Ok(()) }

	/// Called once after every started thread has exited, in reverse dependency order.
	///
	/// Only modules whose `init` succeeded receive this call.
	fn deinit( &self, _app: &AppInfo ) -> PluginResult { Ok(()) }

	/// Whether this module defines [`Plugin::start`] and should get a thread.
	fn has_start( &self ) -> bool { false }

	/// The body of the module's thread.
	///
	/// The harness never cancels a running `start`; a module is expected to watch
	/// its own shutdown signal and return. A `start` that never returns blocks
	/// session teardown indefinitely.
	fn start( &self, _app: &AppInfo, _config: &ConfigSection ) -> PluginResult { Ok(()) }

}

/// A module with no hooks at all.
///
/// Useful for modules that exist only to satisfy a `requires` edge.
#[derive( Debug, Clone, Copy, Default )]
pub struct NoopPlugin ;

impl Plugin for NoopPlugin {}
