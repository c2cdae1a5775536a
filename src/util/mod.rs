mod address_vec;

pub use address_vec::*;
