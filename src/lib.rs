//! Client library and configuration for the `publer` command-line tool.
//!
//! ```no_run
//! # async fn demo() -> Result<(), publer::client::ClientError> {
//! use publer::client::PublerClient;
//!
//! let client = PublerClient::new("my-api-key")?.with_workspace(Some("ws-1".into()));
//! let profile = client.me().await?;
//! println!("{profile}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
