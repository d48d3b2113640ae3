pub mod catch;
pub mod filter;
pub mod finalize;
pub mod flat_map;
pub mod lifecycle;
pub mod map;
pub mod map_err;
pub mod observe_on;
pub mod ref_count;
pub mod subscribe_on;
pub mod tap;
