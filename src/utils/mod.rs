pub mod geo;
pub mod serde_ext;
