//! Type aliases for operations that support partial success/failure patterns.
//! A session keeps tearing down modules after something went wrong, so its
//! result carries every failure it collected on the way rather than the first one.

/// Represents a successful operation where some parts failed but didn't prevent overall success.
/// The `Vec<E>` contains errors from the failed parts that were handled gracefully.
pub type PartialSuccess<T, E> = ( T, Vec<E> );

/// Represents an operation that may partially succeed or fail.
/// Ok: Core success data plus errors from partial failures that allowed completion.
/// Err: Primary failure cause plus errors raised while recovering from it.
pub type PartialResult<T, E> = Result<PartialSuccess<T, E>, ( E, Vec<E> )>;
