pub mod machine;
pub mod registry;
pub mod session;
