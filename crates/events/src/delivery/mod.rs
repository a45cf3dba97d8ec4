//! External delivery channels for nudges.

pub mod ntfy;
