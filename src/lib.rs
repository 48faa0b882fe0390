// Library exports for synweave
pub mod chainer;
pub mod emit;
pub mod gene_index;
pub mod io_utils;
pub mod layout;
pub mod match_list;
pub mod params;
pub mod pog;
pub mod repeat_filter;
pub mod segment;
