pub mod logs_data;
pub mod logs_dispatcher;
pub mod logs_events;
pub mod logs_parser;
pub mod logs_subscribe;

pub use logs_data::*;
pub use logs_dispatcher::*;
pub use logs_events::*;
pub use logs_parser::*;
pub use logs_subscribe::*;
