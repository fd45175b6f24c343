pub mod chat;
pub mod common;
pub mod config;
pub mod proximity;
pub mod signal;

pub use chat::{ChatSession, RateLimiter, SendError, ValidationError, sanitize, validate};
pub use common::{ChatEvent, Contact, Message, MessageSender};
pub use config::{AppConfig, ChatConfig, Identity, SimulatorConfig};
pub use proximity::{ProximityModel, ProximitySimulator};
pub use signal::bars_from_signal;
