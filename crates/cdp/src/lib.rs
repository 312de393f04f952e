// lumo-cdp: Chrome DevTools Protocol driver for the Lumo chat view
//
// Attaches to a browser the user already runs with remote debugging and
// exposes the chat tab as a `lumo::RemoteView`.

pub mod connection;
pub mod error;
pub mod fake_transport;
pub mod page;
pub mod probe;
pub mod transport;
pub mod view;

use std::sync::Arc;

use lumo::Layout;
use tracing::info;

pub use connection::Connection;
pub use error::{CdpError, Result};
pub use page::Page;
pub use transport::{Transport, TransportParts, TransportReceiver, WebSocketTransport};
pub use view::LumoView;

/// Default address of the chat service.
pub const DEFAULT_SERVICE_URL: &str = "https://lumo.proton.me/chat";

/// Connects to the browser at `endpoint` and attaches to the tab showing
/// `service_url`, opening it if needed.
pub async fn attach(endpoint: &str, service_url: &str, layout: Layout) -> Result<LumoView> {
	let ws_url = probe::resolve_ws_url(endpoint).await?;
	let (transport, message_rx) = WebSocketTransport::connect(&ws_url).await?;
	let connection = Arc::new(Connection::new(transport.into_transport_parts(message_rx)));

	let driver = tokio::spawn({
		let conn = Arc::clone(&connection);
		async move { conn.run().await }
	});

	let page = match Page::attach(connection, service_url).await {
		Ok(page) => page,
		Err(err) => {
			driver.abort();
			return Err(err);
		}
	};
	info!(target = "lumo.cdp", target_id = page.target_id(), "chat tab attached");
	Ok(LumoView::new(page, layout).with_driver(driver))
}
