//! Create, read, update and delete flows built from the activities

pub mod apply_stream;
pub mod create_stream;
pub mod delete_stream;
pub mod import_stream;
pub mod read_stream;
pub mod update_stream;
