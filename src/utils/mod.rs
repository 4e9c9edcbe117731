pub mod error;

pub use error::{AppError, ScrapingError, ScrapingErrorKind};
