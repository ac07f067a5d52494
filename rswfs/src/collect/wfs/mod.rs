pub mod capabilities;
pub mod endpoint;
pub mod wfs_collect;
