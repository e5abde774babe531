pub mod animated_message;
pub mod chat;
pub mod sidebar;
