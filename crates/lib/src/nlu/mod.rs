//! NLU service client (Dialogflow detectIntent).
//!
//! The relay treats the NLU engine as an external collaborator: one request in,
//! one fulfillment text out, no local intent logic.

mod dialogflow;

pub use dialogflow::{session_path, DialogflowClient, DialogflowError, LANGUAGE_CODE};
