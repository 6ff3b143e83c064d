// inventra-core: Resilient hybrid data-access layer between inventra-api
// and consumers (CLI, dashboards).

pub mod authz;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod hub;
pub mod hybrid;
pub mod managers;
pub mod mirror;
pub mod model;
pub mod notify;
pub mod session;
pub mod store;

mod convert;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{RemoteConfig, RuntimeConfig, TlsVerification};
pub use connectivity::ConnectivityMonitor;
pub use error::CoreError;
pub use hub::Hub;
pub use hybrid::{FetchFn, FetchFuture, HybridOptions, HybridResult, HybridSource};
pub use managers::{AssetManager, ProductManager};
pub use mirror::MirrorStore;
pub use notify::Notifier;
pub use session::{SessionManager, SessionState};
pub use store::InventoryStore;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Entities
    Asset, AssetDraft, AssetPatch, AssetStatus, Product, ProductDraft, ProductPatch, StockStatus,
    // Session / users
    Role, UserIdentity,
    // Observability
    ConnectionMetrics, Notification, Severity, Source,
};
