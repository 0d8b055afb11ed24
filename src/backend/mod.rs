pub mod client;
pub mod credentials;
pub mod receipts;
pub mod transport;

pub use client::SessionClient;
pub use credentials::{CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore};
pub use receipts::ReceiptApi;
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
