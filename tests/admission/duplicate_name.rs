use plugin_harness::{ AdmissionError, AppInfo, Harness, LoadError };
use crate::journal::Journal ;

#[test]
fn admission_duplicate_name_is_refused() {

	let journal = Journal::new();
	let harness = Harness::new( AppInfo::new( "duplicate-test" ));

	let result = harness.load([
		journal.descriptor( "logger" ).with_brief( "writes to stdout" ),
		journal.descriptor( "metrics" ),
		journal.descriptor( "logger" ).with_brief( "writes to a file" ),
	]);

	match result {
		Err( LoadError::Admission( errors )) => {
			let errors = errors.into_iter().collect::<Vec<_>>();
			assert!( matches!(
				errors.as_slice(),
				[ AdmissionError::DuplicateName( name )] if name == "logger"
			), "Unexpected errors: {:?}", errors );
		},
		Err( err ) => panic!( "Unexpected error: {}", err ),
		Ok( _ ) => panic!( "Expected failure" ),
	}

	assert!( journal.entries().is_empty() );

}

#[test]
fn admission_duplicate_name_message() {
	let err = AdmissionError::DuplicateName( "logger".to_string() );
	assert_eq!( err.to_string(), "Plugin name 'logger' is declared more than once" );
}
