//! Load order resolution.
//!
//! Every `requires` entry of a module M naming D is an edge D → M: D is initialized
//! before M and deinitialized after it. The resolver refuses sets with repeated
//! names, conflicting members, dangling requirements, or cycles, and otherwise
//! produces one total order that is the same on every run for the same input
//! sequence.

use std::collections::{ BTreeSet, HashMap };
use std::collections::hash_map::Entry ;
use itertools::Itertools ;
use nonempty_collections::NEVec ;
use pipe_trait::Pipe ;
use thiserror::Error ;

use crate::PluginDescriptor ;

/// Reasons a set of admitted descriptors has no valid load order.
#[derive( Error, Debug, Clone )]
pub enum ResolveError {

	/// `plugin` requires `dependency`, which is not part of the session.
	#[error( "Plugin '{plugin}' requires '{dependency}', which is not loaded" )]
	MissingDependency { plugin: String, dependency: String },

	/// `plugin` declares a conflict with `conflicts_with` and both are loaded.
	#[error( "Plugin '{plugin}' conflicts with '{conflicts_with}'" )]
	Conflict { plugin: String, conflicts_with: String },

	/// Two descriptors share a name.
	#[error( "Plugin name '{0}' is declared more than once" )]
	DuplicateName( String ),

	/// These plugins could not be ordered; each one sits on or behind a cycle.
	/// Names are listed in registration order.
	#[error( "Dependency cycle detected among: {}", join_names( .0 ))]
	Cycle( NEVec<String> ),

}

impl ResolveError {
	/// Every plugin named by this error.
	pub fn plugins( &self ) -> Vec<&str> {
		match self {
			Self::MissingDependency { plugin, dependency } => vec![ plugin.as_str(), dependency.as_str() ],
			Self::Conflict { plugin, conflicts_with } => vec![ plugin.as_str(), conflicts_with.as_str() ],
			Self::DuplicateName( plugin ) => vec![ plugin.as_str() ],
			Self::Cycle( names ) => names.into_iter().map( String::as_str ).collect(),
		}
	}
}

fn join_names( names: &NEVec<String> ) -> String {
	names.into_iter().map(| name | format!( "'{}'", name )).join( ", " )
}

/// Resolves the load order of `descriptors`, returning plugin names.
///
/// Names must be unique. [`Harness::load`]( crate::Harness::load ) refuses
/// duplicates at admission, so this only matters for direct callers.
///
/// Checks run in this order: duplicate names, conflicts, missing dependencies, cycles. Among modules
/// that become ready at the same time, the one registered first goes first.
///
/// # Errors
/// Returns the first [`ResolveError`] found.
///
/// ```
/// use plugin_harness::{ resolve, PluginDescriptor, NoopPlugin };
///
/// let descriptors = [
/// 	PluginDescriptor::new( "app", NoopPlugin ).with_requires([ "db", "log" ]),
/// 	PluginDescriptor::new( "db", NoopPlugin ).with_requires([ "log" ]),
/// 	PluginDescriptor::new( "log", NoopPlugin ),
/// ];
/// assert_eq!( resolve( &descriptors ).unwrap(), [ "log", "db", "app" ]);
/// ```
pub fn resolve( descriptors: &[PluginDescriptor] ) -> Result<Vec<String>, ResolveError> {
	resolve_indices( descriptors )?
		.into_iter()
		.map(| index | descriptors[index].name().to_string() )
		.collect::<Vec<_>>()
		.pipe( Ok )
}

/// Like [`resolve`], but returns positions into `descriptors`.
pub(crate) fn resolve_indices( descriptors: &[PluginDescriptor] ) -> Result<Vec<usize>, ResolveError> {

	let mut positions = HashMap::with_capacity( descriptors.len() );
	for ( index, descriptor ) in descriptors.iter().enumerate() {
		match positions.entry( descriptor.name() ) {
			Entry::Vacant( slot ) => { slot.insert( index ); },
			Entry::Occupied( _ ) => return Err( ResolveError::DuplicateName( descriptor.name().to_string() )),
		}
	}

	check_conflicts( descriptors, &positions )?;

	let mut dependents = vec![ Vec::<usize>::new(); descriptors.len() ];
	let mut in_degree = vec![ 0_usize; descriptors.len() ];
	for ( index, descriptor ) in descriptors.iter().enumerate() {
		for dependency in descriptor.requires() {
			let &dependency_index = positions.get( dependency.as_str() )
				.ok_or_else(|| ResolveError::MissingDependency {
					plugin: descriptor.name().to_string(),
					dependency: dependency.clone(),
				})?;
			dependents[ dependency_index ].push( index );
			in_degree[ index ] += 1 ;
		}
	}

	let mut ready = in_degree.iter()
		.positions(| &degree | degree == 0 )
		.collect::<BTreeSet<_>>();
	let mut order = Vec::with_capacity( descriptors.len() );

	while let Some( next ) = ready.pop_first() {
		order.push( next );
		for &dependent in &dependents[ next ] {
			in_degree[ dependent ] -= 1 ;
			if in_degree[ dependent ] == 0 { ready.insert( dependent ); }
		}
	}

	let unresolved = in_degree.iter()
		.positions(| &degree | degree > 0 )
		.map(| index | descriptors[ index ].name().to_string() )
		.collect::<Vec<_>>();

	match NEVec::try_from_vec( unresolved ) {
		Some( cycle ) => {
			tracing::error!( plugins = %join_names( &cycle ), "dependency cycle" );
			Err( ResolveError::Cycle( cycle ))
		},
		None => {
			tracing::debug!( order = %order.iter().map(| &index | descriptors[ index ].name() ).join( " -> " ), "resolved load order" );
			Ok( order )
		},
	}

}

fn check_conflicts(
	descriptors: &[PluginDescriptor],
	positions: &HashMap<&str, usize>,
) -> Result<(), ResolveError> {
	for descriptor in descriptors {
		for conflict in descriptor.conflicts() {
			if conflict == descriptor.name() {
				tracing::warn!( plugin = descriptor.name(), "plugin lists itself as a conflict, ignoring" );
				continue ;
			}
			if positions.contains_key( conflict.as_str() ) {
				tracing::error!( plugin = descriptor.name(), conflicts_with = %conflict, "conflicting plugins loaded together" );
				return Err( ResolveError::Conflict {
					plugin: descriptor.name().to_string(),
					conflicts_with: conflict.clone(),
				});
			}
		}
	}
	Ok(())
}

#[cfg( test )]
mod tests {
	use super::* ;
	use crate::NoopPlugin ;

	fn module( name: &str, requires: &[&str] ) -> PluginDescriptor {
		PluginDescriptor::new( name, NoopPlugin ).with_requires( requires.iter().copied() )
	}

	#[test]
	fn independent_modules_keep_registration_order() {
		let descriptors = [ module( "c", &[] ), module( "a", &[] ), module( "b", &[] )];
		assert_eq!( resolve( &descriptors ).unwrap(), [ "c", "a", "b" ]);
	}

	#[test]
	fn dependency_registered_late_moves_forward() {
		let descriptors = [ module( "app", &[ "core" ]), module( "util", &[] ), module( "core", &[] )];
		assert_eq!( resolve( &descriptors ).unwrap(), [ "util", "core", "app" ]);
	}

	#[test]
	fn diamond_orders_every_edge() {
		let descriptors = [
			module( "top", &[ "left", "right" ]),
			module( "left", &[ "base" ]),
			module( "right", &[ "base" ]),
			module( "base", &[] ),
		];
		assert_eq!( resolve( &descriptors ).unwrap(), [ "base", "left", "right", "top" ]);
	}

	#[test]
	fn self_requirement_is_a_cycle_of_one() {
		let descriptors = [ module( "a", &[] ), module( "selfish", &[ "selfish" ])];
		match resolve( &descriptors ) {
			Err( err @ ResolveError::Cycle( _ )) => assert_eq!( err.plugins(), [ "selfish" ]),
			other => panic!( "Expected cycle, found {:?}", other ),
		}
	}

	#[test]
	fn self_conflict_is_ignored() {
		let descriptors = [ PluginDescriptor::new( "a", NoopPlugin ).with_conflicts([ "a" ])];
		assert_eq!( resolve( &descriptors ).unwrap(), [ "a" ]);
	}

	#[test]
	fn conflict_with_absent_plugin_is_fine() {
		let descriptors = [ PluginDescriptor::new( "a", NoopPlugin ).with_conflicts([ "ghost" ])];
		assert_eq!( resolve( &descriptors ).unwrap(), [ "a" ]);
	}

	#[test]
	fn repeated_name_is_refused() {
		let descriptors = [ module( "x", &[] ), module( "y", &[ "x" ]), module( "x", &[] )];
		match resolve( &descriptors ) {
			Err( ResolveError::DuplicateName( name )) => assert_eq!( name, "x" ),
			other => panic!( "Expected duplicate name, found {:?}", other ),
		}
	}

	#[test]
	fn cycle_message_lists_members() {
		let descriptors = [ module( "a", &[ "b" ]), module( "b", &[ "a" ])];
		let err = resolve( &descriptors ).unwrap_err();
		assert_eq!( err.to_string(), "Dependency cycle detected among: 'a', 'b'" );
	}

}
