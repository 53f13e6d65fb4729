pub mod credentials;
#[cfg(test)]
pub(crate) mod memory;
pub mod model;
pub mod password;
pub mod pg;
pub mod service;
pub mod store;
pub mod validation;
