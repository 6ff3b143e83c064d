// ── Entity managers ──
//
// Resource-specific CRUD built on the hybrid source (reads) and the
// transport client (writes), adding capability checks and dual-write
// semantics: remote first while healthy, mirror only after confirmation,
// offline writes straight to the mirror.

mod assets;
mod products;

pub use assets::AssetManager;
pub use products::ProductManager;
