//! Error injection for Kubernetes client calls in tests.
//!
//! [`ErrorInjector`] wraps a [`Client`] and returns preconfigured errors for
//! matching Get, Create, Update, Delete and Patch calls, forwarding everything
//! else to the wrapped client. [`FakeClient`] is an in-memory client to wrap,
//! built with [`ClientBuilder`].
//!
//! # Examples
//!
//! ## Failing one object
//!
//! ```rust
//! use kube_error_injector::{Action, Client, ClientBuilder, Error, ObjectKey};
//! use k8s_openapi::api::core::v1::ConfigMap;
//! use kube::api::DeleteParams;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut cm = ConfigMap::default();
//! cm.metadata.name = Some("cm1".to_string());
//! cm.metadata.namespace = Some("default".to_string());
//!
//! let client = ClientBuilder::new()
//!     .with_object(cm.clone())
//!     .build_with_injector()?;
//!
//! client.inject_error(
//!     Action::Delete,
//!     &cm,
//!     ObjectKey::new("default", "cm1"),
//!     Error::Conflict("test error".into()),
//! )?;
//!
//! assert!(client.delete(&cm, &DeleteParams::default()).await.is_err());
//!
//! // Nothing was forwarded, so the object is still there.
//! let mut stored = ConfigMap::default();
//! client.get(&ObjectKey::new("default", "cm1"), &mut stored).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Failing every call
//!
//! ```rust
//! use kube_error_injector::{Action, AnyKind, AnyObject, Client, ClientBuilder, Error, ObjectKey};
//! use k8s_openapi::api::core::v1::Pod;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ClientBuilder::new()
//!     .with_type::<Pod>()
//!     .with_injected_error(Action::Any, AnyKind, AnyObject, Error::Internal("down".into()))
//!     .build_with_injector()?;
//!
//! let mut pod = Pod::default();
//! let err = client.get(&ObjectKey::new("default", "p"), &mut pod).await.unwrap_err();
//! assert_eq!(err.to_string(), "Internal error: down");
//! # Ok(())
//! # }
//! ```

mod action;
mod builder;
mod client;
mod client_utils;
mod error;
mod fake;
mod injector;
mod key;
pub mod label_selector;
mod rules;
mod scheme;
mod tracker;
mod utils;

#[cfg(test)]
mod action_test;
#[cfg(test)]
mod builder_test;
#[cfg(test)]
mod label_selector_test;

pub use action::Action;
pub use builder::ClientBuilder;
pub use client::{Client, Object, StatusWriter};
pub use error::{Error, Result};
pub use fake::{FakeClient, FakeStatusWriter};
pub use injector::ErrorInjector;
pub use key::{AnyKind, AnyObject, KindTarget, ObjectKey, ObjectSelector, ResourceType, RuleKey};
pub use rules::RuleTable;
pub use scheme::{Scheme, GVK};
pub use tracker::ObjectTracker;
