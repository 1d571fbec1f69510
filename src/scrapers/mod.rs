pub mod browser;
pub mod http;
pub mod replay;
pub mod session;
pub mod traits;
pub mod types;

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;
pub use replay::ReplayFetcher;
pub use session::FetchSession;
pub use traits::DocumentFetcher;
pub use types::{FetchedDocument, SearchParams};
