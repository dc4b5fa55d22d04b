#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::complexity)]
#![deny(clippy::correctness)]
#![deny(clippy::nursery)]
#![deny(clippy::pedantic)]
#![deny(clippy::perf)]
#![deny(clippy::style)]
#![deny(clippy::suspicious)]
#![deny(missing_docs)]
#![warn(clippy::multiple_crate_versions)]
// restriction is wild, but some good things for consistency in there, rather would allow things
// explicitly so any new lints pop up and annoy if they get added and then can decide to keep or
// ditch them!
#![warn(clippy::restriction)]
#![allow(clippy::implicit_return)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::question_mark_used)]
#![allow(clippy::separated_literal_suffix)]
#![allow(clippy::missing_inline_in_public_items)]
#![allow(clippy::exhaustive_enums)]
#![allow(clippy::exhaustive_structs)]
#![allow(clippy::self_named_module_files)]
#![allow(clippy::multiple_inherent_impl)]
#![allow(clippy::partial_pub_fields)]
#![allow(clippy::default_numeric_fallback)]
#![allow(clippy::blanket_clippy_restriction_lints)]
#![allow(clippy::std_instead_of_core)]
#![allow(clippy::single_char_lifetime_names)]
#![allow(clippy::missing_trait_methods)]
#![allow(clippy::shadow_unrelated)]
#![allow(clippy::pub_use)]

//! inspectrs is a rust client library and cli for the ironic inspector hardware-introspection
//! HTTP API.

/// The client module holds the primary objects users work with -- the client builder, the client
/// itself, and the introspection rules sub-API.
pub mod client {
    /// The client builder package, ya know, for building client stuff.
    pub mod builder;

    /// The actual client package itself.
    #[allow(clippy::module_name_repetitions)]
    pub mod client;

    /// The introspection rules sub-API, accessed via `Client::rules`.
    pub mod rules;

    /// The client builder re-exported for convenience.
    pub use crate::client::builder::Builder as ClientBuilder;

    /// The client re-exported for convenience.
    #[allow(clippy::module_name_repetitions)]
    pub use crate::client::client::Client;

    /// The rules sub-API re-exported for convenience.
    pub use crate::client::rules::RulesApi;
}

/// The cli module holds the command line interface definitions and output rendering -- only the
/// `inspectrs` binary should need to interact with it.
pub mod cli {
    /// Command definitions and dispatch for the `inspectrs` binary.
    pub mod command;

    /// Plain text table rendering for cli output.
    pub mod output;
}

/// inspectrs errors.
pub mod errors;

/// Module holding the registry of known interface/LLDP fields used by the `interface` commands.
pub mod resource;

/// Module containing the inspectrs "response" objects -- that is, objects that are returned from
/// successful client operations.
pub mod response;

/// Transport module holds the base transport and any transport implementations.
pub mod transport {
    /// Base transport module providing the trait that all transports must implement.
    pub mod base;

    /// The blocking HTTP (reqwest wrapper) inspectrs transport implementation.
    pub mod http;
}

/// Module responsible for API version handling -- parsing, comparing and negotiating versions
/// against a server advertised range.
pub mod version;

/// The crate error re-exported for convenience.
pub use crate::errors::InspectrsError;

/// The version pair re-exported for convenience.
pub use crate::version::ApiVersion;
