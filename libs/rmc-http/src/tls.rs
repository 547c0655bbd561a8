//! rustls setup for the HTTPS connector.

use std::sync::{Arc, OnceLock};

use rustls_pki_types::CertificateDer;

/// OS root certificates, loaded once per process. Empty when none were found.
static NATIVE_ROOTS: OnceLock<Vec<CertificateDer<'static>>> = OnceLock::new();

fn load_native_roots() -> Vec<CertificateDer<'static>> {
    let loaded = rustls_native_certs::load_native_certs();
    for err in &loaded.errors {
        tracing::warn!(error = %err, "failed to load a native root certificate");
    }
    tracing::debug!(count = loaded.certs.len(), "native root certificates loaded");
    loaded.certs
}

/// Crypto provider for TLS connections.
///
/// Uses the process-wide default when one is installed, otherwise an
/// aws-lc-rs provider that is not installed globally.
pub fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}

/// Build a rustls `ClientConfig` trusting the OS root store.
///
/// # Errors
///
/// Returns an error if the OS store yields no parsable root certificate.
pub fn native_roots_client_config() -> Result<rustls::ClientConfig, String> {
    let certs = NATIVE_ROOTS.get_or_init(load_native_roots);
    if certs.is_empty() {
        return Err("no native root CA certificates found in OS certificate store".to_owned());
    }

    let mut roots = rustls::RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs.iter().cloned());
    if added == 0 {
        return Err(format!(
            "none of the {ignored} native root CA certificates could be parsed"
        ));
    }
    if ignored > 0 {
        tracing::warn!(added, ignored, "some native root certificates were skipped");
    }

    rustls::ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| format!("failed to set TLS protocol versions: {e}"))
        .map(|b| b.with_root_certificates(roots).with_no_client_auth())
}
