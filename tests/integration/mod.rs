//! Integration tests against a scripted stand-in for the engine executable.

#[cfg(unix)]
pub mod fake_engine;

#[cfg(unix)]
pub mod connect_test;
#[cfg(unix)]
pub mod query_test;
#[cfg(unix)]
pub mod session_test;
