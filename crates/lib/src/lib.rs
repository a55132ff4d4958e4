//! Frgubot core library: configuration, Telegram webhook server, and the
//! Dialogflow intent resolver used by the CLI binary.

pub mod config;
pub mod nlu;
pub mod resolver;
pub mod server;
pub mod telegram;
