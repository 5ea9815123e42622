//! The read-only context handed to every lifecycle call.
//!
//! [`AppInfo`] is built once by the host before a session starts and is shared by
//! reference with every module and every module thread. Nothing in the harness
//! mutates it afterwards.

use std::path::{ Path, PathBuf };
use toml::{ Table, Value };

/// Process-wide information available to every module.
#[derive( Debug, Clone, Default )]
pub struct AppInfo {
	program_name: String,
	plugin_dir: PathBuf,
	config_dir: PathBuf,
	log_dir: PathBuf,
	runtime_dir: PathBuf,
	config: GlobalConfig,
}

impl AppInfo {

	/// Creates a context for `program_name` with every directory set to the
	/// current directory and an empty configuration.
	pub fn new( program_name: impl Into<String> ) -> Self {
		Self {
			program_name: program_name.into(),
			plugin_dir: PathBuf::from( "." ),
			config_dir: PathBuf::from( "." ),
			log_dir: PathBuf::from( "." ),
			runtime_dir: PathBuf::from( "." ),
			config: GlobalConfig::default(),
		}
	}

	pub fn with_plugin_dir( mut self, dir: impl Into<PathBuf> ) -> Self {
		self.plugin_dir = dir.into();
		self
	}

	pub fn with_config_dir( mut self, dir: impl Into<PathBuf> ) -> Self {
		self.config_dir = dir.into();
		self
	}

	pub fn with_log_dir( mut self, dir: impl Into<PathBuf> ) -> Self {
		self.log_dir = dir.into();
		self
	}

	pub fn with_runtime_dir( mut self, dir: impl Into<PathBuf> ) -> Self {
		self.runtime_dir = dir.into();
		self
	}

	/// Sets the already parsed global configuration.
	pub fn with_config( mut self, config: impl Into<GlobalConfig> ) -> Self {
		self.config = config.into();
		self
	}

	#[inline] pub fn program_name( &self ) -> &str { &self.program_name }
	#[inline] pub fn plugin_dir( &self ) -> &Path { &self.plugin_dir }
	#[inline] pub fn config_dir( &self ) -> &Path { &self.config_dir }
	#[inline] pub fn log_dir( &self ) -> &Path { &self.log_dir }
	#[inline] pub fn runtime_dir( &self ) -> &Path { &self.runtime_dir }
	#[inline] pub fn config( &self ) -> &GlobalConfig { &self.config }

}

/// The parsed global configuration.
///
/// Parsing is the host's job; the harness only reads the table. Each top level
/// table whose key equals a plugin name is that plugin's [`ConfigSection`].
#[derive( Debug, Clone, Default, PartialEq )]
pub struct GlobalConfig( Table );

impl GlobalConfig {

	#[inline] pub fn new( table: Table ) -> Self { Self( table ) }

	#[inline] pub fn table( &self ) -> &Table { &self.0 }

	#[inline] pub fn get( &self, key: &str ) -> Option<&Value> { self.0.get( key ) }

	/// Extracts the section for `name`, empty if the key is absent or not a table.
	pub fn section( &self, name: &str ) -> ConfigSection {
		let table = match self.0.get( name ) {
			Some( Value::Table( table )) => table.clone(),
			Some( _ ) => {
				tracing::warn!( plugin = name, "configuration key is not a table, using an empty section" );
				Table::new()
			},
			None => Table::new(),
		};
		ConfigSection { name: name.to_string(), table }
	}

}

impl From<Table> for GlobalConfig {
	fn from( table: Table ) -> Self { Self( table ) }
}

/// The configuration a single module receives in its `start` call.
#[derive( Debug, Clone, Default, PartialEq )]
pub struct ConfigSection {
	name: String,
	table: Table,
}

impl ConfigSection {

	/// The key this section was read from, equal to the owning plugin's name.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	#[inline] pub fn table( &self ) -> &Table { &self.table }

	#[inline] pub fn get( &self, key: &str ) -> Option<&Value> { self.table.get( key ) }

	#[inline] pub fn is_empty( &self ) -> bool { self.table.is_empty() }

}

#[cfg( test )]
mod tests {
	use super::* ;

	fn config( text: &str ) -> GlobalConfig {
		text.parse::<Table>().unwrap().into()
	}

	#[test]
	fn section_is_keyed_by_plugin_name() {
		let config = config( "[net]\nport = 8080\n[disk]\npath = \"/tmp\"\n" );
		let section = config.section( "net" );
		assert_eq!( section.name(), "net" );
		assert_eq!( section.get( "port" ).and_then( Value::as_integer ), Some( 8080 ));
		assert!( section.get( "path" ).is_none() );
	}

	#[test]
	fn missing_or_scalar_section_is_empty() {
		let config = config( "verbose = true\n" );
		assert!( config.section( "absent" ).is_empty() );
		assert!( config.section( "verbose" ).is_empty() );
		assert_eq!( config.section( "verbose" ).name(), "verbose" );
	}

	#[test]
	fn builder_sets_paths() {
		let app = AppInfo::new( "host" )
			.with_plugin_dir( "/opt/host/plugins" )
			.with_log_dir( "/var/log/host" );
		assert_eq!( app.program_name(), "host" );
		assert_eq!( app.plugin_dir(), Path::new( "/opt/host/plugins" ));
		assert_eq!( app.log_dir(), Path::new( "/var/log/host" ));
		assert_eq!( app.runtime_dir(), Path::new( "." ));
	}

}
