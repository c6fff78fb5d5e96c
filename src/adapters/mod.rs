// Adapters layer: concrete registry backends and file storage behind the domain ports.

pub mod dataset;
pub mod http;
pub mod storage;

pub use dataset::DatasetRegistry;
pub use http::RegistryClient;
pub use storage::LocalStorage;
