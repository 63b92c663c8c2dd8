use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::error::ConnectError;

/// Negotiates TLS over an established TCP stream, verifying the server against the webpki
/// trust anchors.
pub(crate) async fn connect(stream: TcpStream, host: &str) -> Result<TlsStream<TcpStream>, ConnectError> {
    let server_name = ServerName::try_from(host.to_string())
        .map_err(|_| ConnectError::InvalidServerName(host.to_string()))?;

    let connector = TlsConnector::from(client_config()?);
    let stream = connector
        .connect(server_name, stream)
        .await
        .map_err(ConnectError::Transport)?;

    let (_, session) = stream.get_ref();
    debug!(
        protocol = ?session.protocol_version(),
        cipher_suite = ?session.negotiated_cipher_suite().map(|suite| suite.suite()),
        "TLS handshake complete"
    );

    Ok(stream)
}

fn client_config() -> Result<Arc<ClientConfig>, ConnectError> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| ConnectError::Transport(std::io::Error::other(e)))?
        .with_root_certificates(roots)
        .with_no_client_auth();

    Ok(Arc::new(config))
}
