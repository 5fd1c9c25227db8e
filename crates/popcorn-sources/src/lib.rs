pub mod error;
pub mod omdb;
pub mod traits;

pub use error::FetchError;
pub use omdb::OmdbClient;
pub use traits::MovieApi;
