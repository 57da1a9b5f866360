// Generic intake engine shared by the testing, design and certification workflows

pub mod aggregate;
pub mod errors;
pub mod models;
pub mod retention;
pub mod service;
pub mod store;
pub mod uploads;

pub use errors::{IntakeError, IntakeResult};
pub use models::*;
pub use service::{IntakeService, UploadLayout};
pub use store::{NewDocument, RequestStore};
