pub mod core;
pub mod happypump;

pub use self::core::params::{
    BuyRequest, CreateRequest, SellRequest, SetBondingCurveCfgRequest, TradePlan,
};
pub use self::happypump::builder::TradeRequestBuilder;
