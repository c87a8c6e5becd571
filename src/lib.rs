//! Minimal client for the AWS Query APIs (SimpleDB, EC2).
//!
//! Requests are form-encoded, signed with signature version 2 (HMAC-SHA256),
//! posted over HTTPS and decoded from XML. Transport failures and 5xx
//! responses are retried with capped exponential backoff plus jitter.
//!
//! - [`Params`]: query parameters, encoded sorted by name
//! - [`Request`]: host, version, credential and parameters; signed once on first encode
//! - [`Client`]: async executor with retry and cancellation
//! - [`sdb`] / [`ec2`]: typed actions and response schemas
//!
//! # Quick Start (async)
//!
//! ```no_run
//! use rs_aws_query::{Client, Credential};
//! use rs_aws_query::sdb::{PutAttributes, ReplaceableAttribute};
//!
//! # async fn example() -> rs_aws_query::Result<()> {
//! let client = Client::new(Credential::new("AKIAEXAMPLE", "secret"))?;
//!
//! client.create_domain("weather").await?;
//! client
//!     .put_attributes(&PutAttributes {
//!         domain_name: "weather".into(),
//!         item_name: "seattle".into(),
//!         attributes: vec![ReplaceableAttribute::new("temp", "58")],
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let domains = client.list_domains(Some(10), None).await?;
//! println!("{:?} (box usage {})", domains.result.domain_names, domains.metadata.box_usage);
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod client;
pub mod config;
pub mod credential;
pub mod ec2;
pub mod error;
pub mod params;
pub mod request;
pub mod response;
pub mod retry;
pub mod sdb;
pub mod transport;

#[cfg(feature = "blocking")]
pub mod blocking;

mod exec;
mod sign;

pub use action::{Action, Service};
pub use client::Client;
pub use config::ClientConfig;
pub use credential::{
    ChainProvider, Credential, CredentialProvider, CredentialsFile, EnvProvider, ProfileProvider,
    StaticProvider,
};
pub use error::{ApiError, AwsError, ErrorDetail, Result};
pub use params::{Param, Params};
pub use request::Request;
pub use response::{ItemSet, ResponseMetadata};
pub use retry::{Jitter, NoJitter, RetryPolicy, SeededJitter, ThreadRngJitter};
pub use sign::percent_encode;
pub use transport::{HttpTransport, Transport, TransportResponse};

// Compile-time assertions: key types must be Send + Sync for use across threads.
const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    let _ = assert_send_sync::<Client>;
    let _ = assert_send_sync::<AwsError>;
    let _ = assert_send_sync::<Credential>;
    let _ = assert_send_sync::<Request>;
};
