pub mod trade {
    pub const DEFAULT_SLIPPAGE: u64 = 500; // 5%
    pub const DEFAULT_COMPUTE_UNIT_LIMIT: u32 = 250000;
    pub const DEFAULT_COMPUTE_UNIT_PRICE: u64 = 250000;
    pub const BASIS_POINTS_DENOMINATOR: u64 = 10_000;
}

pub use trade::*;
