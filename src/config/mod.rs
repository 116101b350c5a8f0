use thiserror::Error;

mod database;
mod mail;
mod server;
mod uploads;

pub use database::Database;
pub use mail::{Booking, Newsletter, Smtp};
pub use server::{Auth, Http, Server};
pub use uploads::Uploads;

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;
