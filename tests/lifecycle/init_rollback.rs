use plugin_harness::{ AppInfo, Harness, LifecycleError, Phase };
use crate::journal::{ Journal, Hook, StartBehaviour };

#[test]
fn lifecycle_init_failure_rolls_back_in_reverse() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "rollback-test" ));

	let session = harness.load([
		journal.descriptor( "first" ),
		journal.probe( "second" ).with_start( StartBehaviour::Succeed ).into_descriptor().with_requires([ "first" ]),
		journal.descriptor( "third" ).with_requires([ "second" ]),
		journal.probe( "broken" ).failing_init().into_descriptor().with_requires([ "third" ]),
		journal.descriptor( "after" ).with_requires([ "broken" ]),
	]).unwrap();

	let ( err, rollback ) = match session.run() {
		Err( failure ) => failure,
		Ok(( report, _ )) => panic!( "Expected failure, got {:?}", report ),
	};

	assert!( matches!( &err, LifecycleError::InitFailed { plugin, .. } if plugin == "broken" ));
	assert_eq!( err.phase(), Phase::Init );
	assert!( rollback.is_empty() );

	assert_eq!( journal.calls( Hook::Init ), [ "first", "second", "third", "broken" ]);
	assert_eq!( journal.calls( Hook::Deinit ), [ "third", "second", "first" ]);
	for name in [ "first", "second", "third" ] {
		assert_eq!( journal.count( name, Hook::Deinit ), 1 );
	}
	assert_eq!( journal.count( "broken", Hook::Deinit ), 0 );
	assert_eq!( journal.count( "after", Hook::Init ), 0 );
	assert!( journal.calls( Hook::Start ).is_empty() );

}

#[test]
fn lifecycle_init_failure_of_first_module_deinitializes_nothing() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "rollback-test" ));

	let session = harness.load([
		journal.probe( "root" ).failing_init().into_descriptor(),
		journal.descriptor( "leaf" ).with_requires([ "root" ]),
	]).unwrap();

	let ( err, rollback ) = session.run().unwrap_err();
	assert_eq!( err.plugin(), "root" );
	assert!( rollback.is_empty() );
	assert_eq!( journal.entries(), [( "root".to_string(), Hook::Init )]);

}

#[test]
fn lifecycle_rollback_collects_deinit_failures() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "rollback-test" ));

	let session = harness.load([
		journal.descriptor( "a" ),
		journal.probe( "b" ).failing_deinit().into_descriptor(),
		journal.descriptor( "c" ),
		journal.probe( "d" ).failing_init().into_descriptor(),
	]).unwrap();

	let ( err, rollback ) = session.run().unwrap_err();
	assert_eq!( err.plugin(), "d" );

	let rollback = rollback.iter().map(| failure | ( failure.plugin(), failure.phase() )).collect::<Vec<_>>();
	assert_eq!( rollback, [( "b", Phase::Deinit )]);
	assert_eq!( journal.calls( Hook::Deinit ), [ "c", "b", "a" ]);

}

#[test]
fn lifecycle_init_panic_rolls_back_like_an_error() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "rollback-test" ));

	let session = harness.load([
		journal.descriptor( "storage" ),
		journal.descriptor( "cache" ).with_requires([ "storage" ]),
		journal.probe( "frontend" ).panicking_init().into_descriptor().with_requires([ "cache" ]),
	]).unwrap();

	let ( err, rollback ) = session.run().unwrap_err();
	assert!( matches!( &err, LifecycleError::InitFailed { plugin, .. } if plugin == "frontend" ));
	assert!( err.to_string().contains( "frontend tripped during init" ), "{}", err );
	assert!( rollback.is_empty() );

	assert_eq!( journal.calls( Hook::Deinit ), [ "cache", "storage" ]);
	assert_eq!( journal.count( "frontend", Hook::Deinit ), 0 );

}
