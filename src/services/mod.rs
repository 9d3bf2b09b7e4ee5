pub mod access;
pub mod catalog;
pub mod policy;
pub mod profiles;
pub mod providers;
pub mod session;
pub mod watchlist;

pub use access::AccessGate;
pub use catalog::CatalogService;
pub use policy::ContentPolicy;
pub use profiles::ProfileStore;
pub use session::{ProfileSession, Selection};
pub use watchlist::Watchlist;
