#![forbid(unsafe_code)]

use poem::Route;
use poem_openapi::OpenApiService;

use crate::utils::snippet_store::SnippetStore;

use self::snippets::SnippetsApi;
use self::version::VersionApi;

pub mod snippets;
pub mod version;

// From cargo.toml.
const API_VERSION: &str = env!("CARGO_PKG_VERSION");

// ---------------------------------------------------------------------------
// make_app:
// ---------------------------------------------------------------------------
/** Assemble the route tree served by the server.  The snippet endpoints are
 * mounted at the root, the generated OpenAPI documents at /spec and
 * /spec_yaml and the swagger UI at /docs.  All snippet endpoints share the
 * given store.
 */
pub fn make_app(store: SnippetStore, title: &str, server_url: &str) -> Route {
    let endpoints = (SnippetsApi::new(store), VersionApi);
    let api_service =
        OpenApiService::new(endpoints, title, API_VERSION).server(server_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/docs", ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml)
        .nest("/", api_service)
}
