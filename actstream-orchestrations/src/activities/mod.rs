//! Single control plane calls used by the orchestrations

pub mod describe_db_cluster;
pub mod start_activity_stream;
pub mod stop_activity_stream;
