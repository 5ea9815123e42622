//! Lifecycle orchestration.
//!
//! Drives an already resolved module list through its four phases:
//!
//! 1. **init**, in resolved order, on the calling thread. The first failure stops
//! 	the phase and rolls back every module already initialized, newest first.
//! 2. **start**, one scoped thread per module whose [`Plugin::has_start`]( crate::Plugin::has_start )
//! 	is `true`. No thread is spawned until every `init` has returned.
//! 3. **run**, waiting for every thread to exit. A failing or panicking module is
//! 	recorded; its siblings keep running.
//! 4. **deinit**, in reverse resolved order, on the calling thread, once all threads
//! 	are joined. Every initialized module gets exactly one attempt, whatever
//! 	happened before it.
//!
//! A panic in any hook is caught and reported like an error returned by that hook.
//!
//! Nothing here cancels a thread. A module that never returns from `start` keeps
//! the session in the run phase forever.

use std::any::Any as PanicPayload ;
use std::panic::{ catch_unwind, AssertUnwindSafe };
use std::thread ;
use thiserror::Error ;

use crate::{ AppInfo, BoxError, PluginDescriptor, PluginResult };
use crate::utils::PartialResult ;

/// The phase a [`LifecycleError`] happened in.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum Phase { Init, Start, Deinit }

/// A failure raised by a module while the session was driving it.
#[derive( Error, Debug )]
pub enum LifecycleError {

	/// `init` returned an error or panicked. The session was rolled back.
	#[error( "Plugin '{plugin}' failed to initialise: {source}" )]
	InitFailed { plugin: String, source: BoxError },

	/// The thread running `start` could not be created.
	#[error( "Failed to spawn thread for plugin '{plugin}': {source}" )]
	SpawnFailed { plugin: String, source: std::io::Error },

	/// `start` returned an error.
	#[error( "Plugin '{plugin}' failed while running: {source}" )]
	StartFailed { plugin: String, source: BoxError },

	/// `start` panicked.
	#[error( "Plugin '{plugin}' panicked while running: {message}" )]
	StartPanicked { plugin: String, message: String },

	/// `deinit` returned an error. Remaining modules were still deinitialized.
	#[error( "Plugin '{plugin}' failed to deinitialise: {source}" )]
	DeinitFailed { plugin: String, source: BoxError },

	/// `deinit` panicked. Remaining modules were still deinitialized.
	#[error( "Plugin '{plugin}' panicked while deinitialising: {message}" )]
	DeinitPanicked { plugin: String, message: String },

}

impl LifecycleError {

	/// The module that failed.
	pub fn plugin( &self ) -> &str {
		match self {
			Self::InitFailed { plugin, .. }
			| Self::SpawnFailed { plugin, .. }
			| Self::StartFailed { plugin, .. }
			| Self::StartPanicked { plugin, .. }
			| Self::DeinitFailed { plugin, .. }
			| Self::DeinitPanicked { plugin, .. } => plugin,
		}
	}

	pub fn phase( &self ) -> Phase {
		match self {
			Self::InitFailed { .. } => Phase::Init,
			Self::SpawnFailed { .. } | Self::StartFailed { .. } | Self::StartPanicked { .. } => Phase::Start,
			Self::DeinitFailed { .. } | Self::DeinitPanicked { .. } => Phase::Deinit,
		}
	}

}

/// Where a module got to in its lifecycle. States only move forward.
///
/// Only modules of a running session are tracked, so every module starts out
/// [`Resolved`]( PluginState::Resolved ). Admission is the job of
/// [`Harness::admit`]( crate::Harness::admit ), and a session whose `init` phase
/// fails yields no report.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum PluginState {
	/// Placed in the load order, no hook called yet.
	Resolved,
	/// `init` succeeded.
	Initialized,
	/// Its `start` thread is live.
	Running,
	/// Its `start` thread has exited, successfully or not.
	Stopped,
	/// `deinit` succeeded.
	Deinitialized,
	/// `deinit` failed or panicked.
	Failed,
}

/// What a session did, in the order it did it.
#[derive( Debug, Clone, Default, PartialEq, Eq )]
pub struct SessionReport {
	init_order: Vec<String>,
	started: Vec<String>,
	deinit_order: Vec<String>,
	states: Vec<( String, PluginState )>,
}

impl SessionReport {

	fn new( plugins: &[PluginDescriptor] ) -> Self {
		Self {
			states: plugins.iter()
				.map(| descriptor | ( descriptor.name().to_string(), PluginState::Resolved ))
				.collect(),
			..Self::default()
		}
	}

	/// Modules whose `init` succeeded, in call order.
	#[inline] pub fn init_order( &self ) -> &[String] { &self.init_order }

	/// Modules that were given a thread, in spawn order.
	#[inline] pub fn started( &self ) -> &[String] { &self.started }

	/// Modules that received a `deinit` call, in call order, failed calls included.
	#[inline] pub fn deinit_order( &self ) -> &[String] { &self.deinit_order }

	/// The final state of `plugin`, if it was part of the session.
	pub fn state( &self, plugin: &str ) -> Option<PluginState> {
		self.states.iter()
			.find(|( name, _ )| name == plugin )
			.map(|( _, state )| *state )
	}

	fn set_state( &mut self, plugin: &str, state: PluginState ) {
		if let Some(( _, current )) = self.states.iter_mut().find(|( name, _ )| name == plugin ) {
			*current = state ;
		}
	}

}

/// Runs `plugins`, which must already be in resolved order, through the whole lifecycle.
pub(crate) fn run_session(
	app: &AppInfo,
	plugins: &[PluginDescriptor],
) -> PartialResult<SessionReport, LifecycleError> {

	let mut report = SessionReport::new( plugins );

	tracing::info!( count = plugins.len(), "initialising plugins" );
	init_all( app, plugins, &mut report )?;

	let mut failures = run_threads( app, plugins, &mut report );

	tracing::info!( "deinitialising plugins" );
	failures.extend( deinit_all( app, plugins, &mut report ));

	match failures.is_empty() {
		true => tracing::info!( "session finished" ),
		false => tracing::warn!( failures = failures.len(), "session finished with failures" ),
	}
	Ok(( report, failures ))

}

fn init_all(
	app: &AppInfo,
	plugins: &[PluginDescriptor],
	report: &mut SessionReport,
) -> Result<(), ( LifecycleError, Vec<LifecycleError> )> {

	for ( index, descriptor ) in plugins.iter().enumerate() {
		tracing::debug!( plugin = descriptor.name(), "initialising plugin" );
		let source: BoxError = match guarded(|| descriptor.plugin().init( app )) {
			Ok( Ok(())) => {
				report.init_order.push( descriptor.name().to_string() );
				report.set_state( descriptor.name(), PluginState::Initialized );
				continue ;
			},
			Ok( Err( source )) => source,
			Err( message ) => format!( "panicked: {}", message ).into(),
		};
		tracing::error!( plugin = descriptor.name(), error = %source, "plugin failed to initialise, rolling back" );
		let rollback = deinit_all( app, &plugins[ ..index ], report );
		return Err(( LifecycleError::InitFailed { plugin: descriptor.name().to_string(), source }, rollback ));
	}
	Ok(())

}

fn run_threads(
	app: &AppInfo,
	plugins: &[PluginDescriptor],
	report: &mut SessionReport,
) -> Vec<LifecycleError> {

	let mut failures = Vec::new();

	thread::scope(| scope | {

		let mut handles = Vec::new();
		for descriptor in plugins.iter().filter(| descriptor | descriptor.has_start() ) {
			let section = app.config().section( descriptor.name() );
			let spawned = thread::Builder::new()
				.name( format!( "plugin:{}", descriptor.name() ))
				.spawn_scoped( scope, move || descriptor.plugin().start( app, &section ));
			match spawned {
				Ok( handle ) => {
					tracing::debug!( plugin = descriptor.name(), "started plugin thread" );
					report.started.push( descriptor.name().to_string() );
					report.set_state( descriptor.name(), PluginState::Running );
					handles.push(( descriptor.name(), handle ));
				},
				Err( source ) => {
					tracing::error!( plugin = descriptor.name(), error = %source, "failed to spawn plugin thread" );
					failures.push( LifecycleError::SpawnFailed { plugin: descriptor.name().to_string(), source });
				},
			}
		}

		if !handles.is_empty() { tracing::info!( threads = handles.len(), "waiting for plugin threads" ); }

		for ( name, handle ) in handles {
			let outcome = handle.join();
			report.set_state( name, PluginState::Stopped );
			match outcome {
				Ok( Ok(())) => tracing::debug!( plugin = name, "plugin thread exited" ),
				Ok( Err( source )) => {
					tracing::error!( plugin = name, error = %source, "plugin thread failed" );
					failures.push( LifecycleError::StartFailed { plugin: name.to_string(), source });
				},
				Err( payload ) => {
					let message = panic_message( payload.as_ref() );
					tracing::error!( plugin = name, panic = %message, "plugin thread panicked" );
					failures.push( LifecycleError::StartPanicked { plugin: name.to_string(), message });
				},
			}
		}

	});

	failures

}

/// Deinitializes `plugins` newest first, collecting failures without stopping.
fn deinit_all(
	app: &AppInfo,
	plugins: &[PluginDescriptor],
	report: &mut SessionReport,
) -> Vec<LifecycleError> {
	plugins.iter()
		.rev()
		.filter_map(| descriptor | {
			tracing::debug!( plugin = descriptor.name(), "deinitialising plugin" );
			report.deinit_order.push( descriptor.name().to_string() );
			let plugin = descriptor.name().to_string();
			let failure = match guarded(|| descriptor.plugin().deinit( app )) {
				Ok( Ok(())) => {
					report.set_state( descriptor.name(), PluginState::Deinitialized );
					return None
				},
				Ok( Err( source )) => LifecycleError::DeinitFailed { plugin, source },
				Err( message ) => LifecycleError::DeinitPanicked { plugin, message },
			};
			tracing::error!( plugin = descriptor.name(), error = %failure, "plugin failed to deinitialise" );
			report.set_state( descriptor.name(), PluginState::Failed );
			Some( failure )
		})
		.collect()
}

/// Runs a hook on the calling thread, turning a panic into its message.
fn guarded( hook: impl FnOnce() -> PluginResult ) -> Result<PluginResult, String> {
	catch_unwind( AssertUnwindSafe( hook )).map_err(| payload | panic_message( payload.as_ref() ))
}

fn panic_message( payload: &( dyn PanicPayload + Send )) -> String {
	if let Some( message ) = payload.downcast_ref::<&str>() { return ( *message ).to_string() }
	if let Some( message ) = payload.downcast_ref::<String>() { return message.clone() }
	"<non-string panic payload>".to_string()
}

#[cfg( test )]
mod tests {
	use super::* ;
	use crate::Plugin ;
	use tracing_test::traced_test ;

	struct Fails ;
	impl Plugin for Fails {
		fn init( &self, _app: &AppInfo ) -> PluginResult { Err( "no device".into() ) }
	}

	#[test]
	fn panic_payloads_are_readable() {
		let boxed: Box<dyn PanicPayload + Send> = Box::new( "static message" );
		assert_eq!( panic_message( boxed.as_ref() ), "static message" );
		let boxed: Box<dyn PanicPayload + Send> = Box::new( String::from( "owned message" ));
		assert_eq!( panic_message( boxed.as_ref() ), "owned message" );
		let boxed: Box<dyn PanicPayload + Send> = Box::new( 7_u32 );
		assert_eq!( panic_message( boxed.as_ref() ), "<non-string panic payload>" );
	}

	#[test]
	fn errors_know_their_phase() {
		let err = LifecycleError::StartPanicked { plugin: "x".into(), message: "boom".into() };
		assert_eq!( err.phase(), Phase::Start );
		assert_eq!( err.plugin(), "x" );
		assert_eq!( err.to_string(), "Plugin 'x' panicked while running: boom" );
	}

	#[test]
	fn empty_session_is_clean() {
		let ( report, failures ) = run_session( &AppInfo::new( "test" ), &[] ).unwrap();
		assert!( failures.is_empty() );
		assert!( report.init_order().is_empty() );
		assert!( report.started().is_empty() );
	}

	#[traced_test]
	#[test]
	fn init_failure_is_logged_with_plugin_name() {
		let plugins = [
			PluginDescriptor::new( "ok", crate::NoopPlugin ),
			PluginDescriptor::new( "broken", Fails ),
		];
		let ( err, rollback ) = run_session( &AppInfo::new( "test" ), &plugins ).unwrap_err();
		assert_eq!( err.plugin(), "broken" );
		assert!( rollback.is_empty() );
		assert!( logs_contain( "initialising plugin" ));
		assert!( logs_contain( "rolling back" ));
		assert!( logs_contain( "broken" ));
	}

}
