pub mod call;
pub mod doctor;
pub mod serve;
pub mod tools;

// Re-export command handlers
pub use call::CallCommand;
pub use doctor::DoctorCommand;
pub use serve::ServeArgs;
pub use tools::ToolsCommand;
