//! # Resource Group Providers
//!
//! The uniform "apply resource group" seam. Provisioning semantics live behind
//! [`ResourceGroupProvider`]; the orchestrator only needs converge/describe.
//!
//! ## Architecture
//!
//! ```text
//! Provider Registry
//! ├── ResourceGroupProvider   (apply / describe contract)
//! └── ProviderRegistry        (group id -> provider, optional fallback)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use platform_rollout::registry::{ProviderRegistry, ResourceGroupProvider};
//! use std::sync::Arc;
//!
//! # fn example(storage: Arc<dyn ResourceGroupProvider>) {
//! let registry = ProviderRegistry::new();
//! registry.register("storage", storage);
//! assert!(registry.contains("storage"));
//! # }
//! ```

pub mod provider;
pub mod provider_registry;

pub use provider::{ApplyError, ApplyRequest, GroupOutputs, GroupState, ResourceGroupProvider};
pub use provider_registry::{ProviderRegistry, RegistryStats};
