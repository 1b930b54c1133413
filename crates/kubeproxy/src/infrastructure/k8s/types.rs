use core::error::Error;

/// Errors that can occur during Kubernetes operations.
#[derive(Debug, derive_more::Display)]
pub enum KubernetesError {
    #[display("Failed to connect to Kubernetes API: {message}")]
    ConnectionFailed { message: String },
    #[display("Invalid Kubernetes master URL: {url}")]
    InvalidMasterUrl { url: String },
    #[display("Failed to watch pods: {message}")]
    WatchFailed { message: String },
    #[display("Pod watch rejected by the API server: {message}")]
    WatchRejected { message: String },
}

impl Error for KubernetesError {}
