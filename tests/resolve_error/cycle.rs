use plugin_harness::{ AppInfo, Harness, LoadError, ResolveError };
use crate::journal::Journal ;

#[test]
fn resolve_error_cycle_names_unresolved_subset() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "cycle-test" ));

	// a <- b <- c <- a, with d hanging off the cycle and e independent of it
	let result = harness.load([
		journal.descriptor( "e" ),
		journal.descriptor( "a" ).with_requires([ "c" ]),
		journal.descriptor( "b" ).with_requires([ "a", "e" ]),
		journal.descriptor( "c" ).with_requires([ "b" ]),
		journal.descriptor( "d" ).with_requires([ "b" ]),
	]);

	match result {
		Err( LoadError::Resolve( ResolveError::Cycle( names ))) => {
			let names = names.into_iter().collect::<Vec<_>>();
			assert_eq!( names, [ "a", "b", "c", "d" ]);
		},
		Err( err ) => panic!( "Unexpected error: {}", err ),
		Ok( _ ) => panic!( "Expected failure" ),
	}

	assert!( journal.entries().is_empty() );

}

#[test]
fn resolve_error_cycle_of_two() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "cycle-test" ));

	let result = harness.load([
		journal.descriptor( "ping" ).with_requires([ "pong" ]),
		journal.descriptor( "pong" ).with_requires([ "ping" ]),
	]);

	match result {
		Err( LoadError::Resolve( err @ ResolveError::Cycle( _ ))) => assert_eq!( err.plugins(), [ "ping", "pong" ]),
		Err( err ) => panic!( "Unexpected error: {}", err ),
		Ok( _ ) => panic!( "Expected failure" ),
	}

	assert!( journal.entries().is_empty() );

}
