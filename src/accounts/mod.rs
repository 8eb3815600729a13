pub mod bonding_curve;
pub mod global;
pub mod layout;

pub use bonding_curve::BondingCurveAccount;
pub use global::GlobalAccount;
