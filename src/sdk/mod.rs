pub mod config;
pub mod controller;
pub mod geo;
pub mod location;
pub mod routing;
pub mod session;
pub mod store;
pub mod util;
pub mod zone;
