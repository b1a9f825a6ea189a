#[allow(clippy::all)]
#[allow(warnings)]
mod generated {
    include!("gen/mod.rs");
}
pub use generated::*;

pub use generated::dispatch::wire::v1 as wire;

mod error;
pub use error::*;

pub mod api;
pub mod api_client;
