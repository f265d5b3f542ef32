// Library interface for agrismart modules
// This allows tests and other binaries to import modules

pub mod article;
pub mod fallback;
pub mod markup;
pub mod resolver;
pub mod server;
pub mod sources;
pub mod weather;
