//! Package configuration document.
//!
//! The document is JSON with PascalCase sections, all optional:
//!
//! ```json
//! {
//!   "Https": [{ "ApplicationTypeName": "...", "ServiceManifestName": "...", "EndpointName": "...", "CertThumbprint": "..." }],
//!   "ExternalIncludes": [{ "ApplicationTypeName": "...", "ServiceManifestName": "...", "PackageName": "...",
//!                          "SourceFileName": "...", "TargetFileName": "...", "Source": "..." }],
//!   "GuestExecutables": [{ "ApplicationTypeName": "...", "PackageName": "..." }],
//!   "Cluster": { "Endpoint": "...", "Port": 19080, "PfxFile": "...", "PfxKey": "..." }
//! }
//! ```
//!
//! Only `Https` and `ExternalIncludes` reach the packaging selector;
//! `GuestExecutables` tags services during tree loading and `Cluster` is
//! carried for connection collaborators.

mod types;

pub use types::{ClusterConfig, ConfigError, ExternalInclude, GuestExecutable, HttpsConfig, PackageConfig};
