pub mod analysis;
pub mod chat;
pub mod dna;
pub mod events;
pub mod history;
pub mod request;
pub mod result;
pub mod style;
