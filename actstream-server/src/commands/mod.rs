pub mod sandbox;
pub mod stream;
