pub mod direct;
pub mod proxy;
pub mod synthetic;

pub use direct::DirectFetch;
pub use proxy::ProxyFetch;
pub use synthetic::SyntheticStage;
