pub mod builtins;
pub mod environment;
pub mod interpreter;
pub mod variant;
