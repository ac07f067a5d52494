pub mod axis;
pub mod feature_table;
pub mod wfs_layer;
