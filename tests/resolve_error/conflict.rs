use plugin_harness::{ resolve, AppInfo, Harness, LoadError, PluginDescriptor, ResolveError };
use crate::journal::{ Journal, Hook };

fn scenario( journal: &Journal, with_c: bool ) -> Vec<PluginDescriptor> {
	let mut descriptors = vec![
		journal.descriptor( "A" ),
		journal.descriptor( "B" ).with_requires([ "A" ]),
	];
	if with_c {
		descriptors.push( journal.descriptor( "C" ).with_requires([ "A" ]).with_conflicts([ "B" ]));
	}
	descriptors
}

#[test]
fn resolve_error_conflict_absent_partner_resolves() {

	let journal = Journal::new();
	assert_eq!( resolve( &scenario( &journal, false )).unwrap(), [ "A", "B" ]);

	let harness = Harness::new( AppInfo::new( "conflict-test" ));
	let session = harness.load( scenario( &journal, false )).unwrap();
	let ( report, failures ) = session.run().unwrap();
	assert_no_failures!( failures );
	assert_eq!( report.init_order(), [ "A", "B" ]);

}

#[test]
fn resolve_error_conflict_present_partner_fails_before_init() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "conflict-test" ));

	match harness.load( scenario( &journal, true )) {
		Err( LoadError::Resolve( err @ ResolveError::Conflict { .. })) => {
			let mut cited = err.plugins();
			cited.sort_unstable();
			assert_eq!( cited, [ "B", "C" ]);
			assert_eq!( err.to_string(), "Plugin 'C' conflicts with 'B'" );
		},
		Err( err ) => panic!( "Unexpected error: {}", err ),
		Ok( _ ) => panic!( "Expected failure" ),
	}

	assert!( journal.calls( Hook::Init ).is_empty() );

}

#[test]
fn resolve_error_conflict_checked_before_missing_dependency() {

	let journal = Journal::new();
	let descriptors = [
		journal.descriptor( "x" ).with_requires([ "nowhere" ]),
		journal.descriptor( "y" ).with_conflicts([ "x" ]),
	];

	assert!( matches!( resolve( &descriptors ), Err( ResolveError::Conflict { .. })));

}
