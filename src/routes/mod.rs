/// Router Module Index
///
/// Splits the routes by access level so the login guard is applied once, as a
/// layer, instead of being remembered in each handler.

/// Routes open to every visitor, logged in or not.
pub mod public;

/// Routes behind the `require_login` middleware.
pub mod authenticated;
