/// Router Module Index
///
/// Splits the HTTP surface by access tier. Guards are applied as route layers at the
/// module level so a handler cannot be mounted without its guard.

/// Routes any caller may hit. Identity is optional: callers without one are answered as
/// non-admins, never rejected.
pub mod public;

/// Routes behind the admin route guard.
pub mod admin;
