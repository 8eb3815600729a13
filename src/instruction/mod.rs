pub mod happypump;

pub use happypump::{HappyPumpInstructionEncoder, InstructionEncoder, InstructionRequest};
