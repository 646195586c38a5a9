mod common;

use common::{StubLookup, test_config};
use media_catalogue::catalogue::Catalogue;
use media_catalogue::mcp_server::CatalogueServer;
use rmcp::ServerHandler;
use std::sync::Arc;

fn server() -> CatalogueServer {
    let catalogue = Catalogue::new(Arc::new(StubLookup::new()), &test_config());
    CatalogueServer::new(Arc::new(catalogue))
}

#[tokio::test]
async fn test_server_info() {
    let info = server().get_info();

    assert_eq!(info.server_info.name, "media-catalogue");
    assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.resources.is_some());
    assert!(info.instructions.unwrap().contains("Media catalogue"));
}
