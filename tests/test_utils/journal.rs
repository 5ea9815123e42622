#[allow( dead_code )]
mod journal {

	use std::sync::{ Arc, Mutex, Barrier };
	use plugin_harness::{ AppInfo, ConfigSection, Plugin, PluginDescriptor, PluginResult };

	#[derive( Debug, Clone, Copy, PartialEq, Eq )]
	pub enum Hook { Init, Start, Deinit }

	/// Shared, ordered record of every hook call made by [`Probe`]s.
	#[derive( Debug, Clone, Default )]
	pub struct Journal( Arc<Mutex<Vec<( String, Hook )>>> );

	impl Journal {

		pub fn new() -> Self { Self::default() }

		fn record( &self, plugin: &str, hook: Hook ) {
			self.0.lock().unwrap().push(( plugin.to_string(), hook ));
		}

		pub fn entries( &self ) -> Vec<( String, Hook )> {
			self.0.lock().unwrap().clone()
		}

		/// Plugins that received `hook`, in call order.
		pub fn calls( &self, hook: Hook ) -> Vec<String> {
			self.entries().into_iter()
				.filter(|( _, recorded )| *recorded == hook )
				.map(|( plugin, _ )| plugin )
				.collect()
		}

		pub fn count( &self, plugin: &str, hook: Hook ) -> usize {
			self.entries().iter()
				.filter(|( name, recorded )| name == plugin && *recorded == hook )
				.count()
		}

		pub fn probe( &self, name: &str ) -> Probe {
			Probe {
				name: name.to_string(),
				journal: self.clone(),
				fail_init: false,
				fail_deinit: false,
				panic_init: false,
				panic_deinit: false,
				start: None,
			}
		}

		pub fn descriptor( &self, name: &str ) -> PluginDescriptor {
			PluginDescriptor::new( name, self.probe( name ))
		}

	}

	/// What a probe does on its own thread.
	pub enum StartBehaviour {
		Succeed,
		Fail,
		Panic,
		/// Waits for every party of the barrier, then succeeds.
		Rendezvous( Arc<Barrier> ),
		/// Expects its config section to contain `key = value`.
		ExpectConfig( &'static str, i64 ),
	}

	/// A plugin that records every hook call in a [`Journal`].
	pub struct Probe {
		name: String,
		journal: Journal,
		fail_init: bool,
		fail_deinit: bool,
		panic_init: bool,
		panic_deinit: bool,
		start: Option<StartBehaviour>,
	}

	impl Probe {

		pub fn failing_init( mut self ) -> Self {
			self.fail_init = true ;
			self
		}

		pub fn failing_deinit( mut self ) -> Self {
			self.fail_deinit = true ;
			self
		}

		pub fn panicking_init( mut self ) -> Self {
			self.panic_init = true ;
			self
		}

		pub fn panicking_deinit( mut self ) -> Self {
			self.panic_deinit = true ;
			self
		}

		pub fn with_start( mut self, behaviour: StartBehaviour ) -> Self {
			self.start = Some( behaviour );
			self
		}

		pub fn into_descriptor( self ) -> PluginDescriptor {
			let name = self.name.clone();
			PluginDescriptor::new( name, self )
		}

	}

	impl Plugin for Probe {

		fn init( &self, _app: &AppInfo ) -> PluginResult {
			self.journal.record( &self.name, Hook::Init );
			if self.panic_init { panic!( "{} tripped during init", self.name ) }
			match self.fail_init {
				true => Err( format!( "{} refused to initialise", self.name ).into() ),
				false => Ok(()),
			}
		}

		fn deinit( &self, _app: &AppInfo ) -> PluginResult {
			self.journal.record( &self.name, Hook::Deinit );
			if self.panic_deinit { panic!( "{} tripped during deinit", self.name ) }
			match self.fail_deinit {
				true => Err( format!( "{} refused to deinitialise", self.name ).into() ),
				false => Ok(()),
			}
		}

		fn has_start( &self ) -> bool { self.start.is_some() }

		fn start( &self, _app: &AppInfo, config: &ConfigSection ) -> PluginResult {
			self.journal.record( &self.name, Hook::Start );
			match &self.start {
				None | Some( StartBehaviour::Succeed ) => Ok(()),
				Some( StartBehaviour::Fail ) => Err( format!( "{} stopped with an error", self.name ).into() ),
				Some( StartBehaviour::Panic ) => panic!( "{} lost its mind", self.name ),
				Some( StartBehaviour::Rendezvous( barrier )) => {
					barrier.wait();
					Ok(())
				},
				Some( StartBehaviour::ExpectConfig( key, expected )) => {
					match config.get( key ).and_then( toml::Value::as_integer ) {
						Some( found ) if found == *expected && config.name() == self.name => Ok(()),
						found => Err( format!( "{}: expected {} = {}, found {:?}", self.name, key, expected, found ).into() ),
					}
				},
			}
		}

	}

}
