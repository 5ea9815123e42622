use plugin_harness::{ AppInfo, Harness, LifecycleError, Phase, PluginState };
use crate::journal::{ Journal, Hook, StartBehaviour };

#[test]
fn lifecycle_deinit_failures_do_not_stop_teardown() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "deinit-test" ));

	let session = harness.load([
		journal.descriptor( "base" ),
		journal.probe( "middle" ).failing_deinit().into_descriptor().with_requires([ "base" ]),
		journal.probe( "top" ).failing_deinit().with_start( StartBehaviour::Succeed ).into_descriptor().with_requires([ "middle" ]),
	]).unwrap();

	let ( report, failures ) = session.run().unwrap();

	let failed = failures.iter()
		.map(| failure | match failure {
			LifecycleError::DeinitFailed { plugin, .. } => plugin.as_str(),
			other => panic!( "Unexpected failure: {}", other ),
		})
		.collect::<Vec<_>>();
	assert_eq!( failed, [ "top", "middle" ]);

	assert_eq!( journal.calls( Hook::Deinit ), [ "top", "middle", "base" ]);
	for name in [ "top", "middle", "base" ] {
		assert_eq!( journal.count( name, Hook::Deinit ), 1 );
	}

	assert_eq!( report.deinit_order(), [ "top", "middle", "base" ]);
	assert_eq!( report.state( "middle" ), Some( PluginState::Failed ));
	assert_eq!( report.state( "base" ), Some( PluginState::Deinitialized ));

}

#[test]
fn lifecycle_deinit_panic_does_not_stop_teardown() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "deinit-test" ));

	let session = harness.load([
		journal.descriptor( "base" ),
		journal.probe( "top" ).panicking_deinit().into_descriptor().with_requires([ "base" ]),
	]).unwrap();

	let ( report, failures ) = session.run().unwrap();

	match failures.as_slice() {
		[ failure @ LifecycleError::DeinitPanicked { plugin, message }] => {
			assert_eq!( plugin, "top" );
			assert_eq!( message, "top tripped during deinit" );
			assert_eq!( failure.phase(), Phase::Deinit );
		},
		other => panic!( "Expected one deinit panic, found {:?}", other ),
	}

	assert_eq!( journal.calls( Hook::Deinit ), [ "top", "base" ]);
	assert_eq!( report.state( "top" ), Some( PluginState::Failed ));
	assert_eq!( report.state( "base" ), Some( PluginState::Deinitialized ));

}

#[test]
fn lifecycle_rollback_survives_a_deinit_panic() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "deinit-test" ));

	let session = harness.load([
		journal.descriptor( "first" ),
		journal.probe( "second" ).panicking_deinit().into_descriptor(),
		journal.probe( "third" ).failing_init().into_descriptor(),
	]).unwrap();

	let ( err, rollback ) = session.run().unwrap_err();
	assert_eq!( err.plugin(), "third" );
	let rollback = rollback.iter().map(| failure | ( failure.plugin(), failure.phase() )).collect::<Vec<_>>();
	assert_eq!( rollback, [( "second", Phase::Deinit )]);
	assert_eq!( journal.calls( Hook::Deinit ), [ "second", "first" ]);

}
