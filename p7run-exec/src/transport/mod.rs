mod client;
mod error;
pub mod http;
mod parts;

pub use client::{child_url, ApiClient, ClientConfig, WORKFLOW_LIST_PATH};
pub use error::TransportError;
pub use http::{HttpClient, HttpError, ReqwestHttpClient};
pub use parts::{FormField, FormValue, HttpRequestParts, HttpResponseParts, RequestBody};
