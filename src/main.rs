#![forbid(unsafe_code)]

use anyhow::Result;
use log::info;
use poem::listener::{Listener, RustlsCertificate, RustlsConfig, TcpListener};

// Server Utilities
use crate::api::make_app;
use crate::utils::config::{init_log, init_runtime_context, init_snippets_dirs, RuntimeCtx, SnippetsDirs, SNIPPETS_ARGS};
use crate::utils::errors::Errors;
use crate::utils::snippet_store::SnippetStore;
use crate::utils::snippets_utils::timestamp_str;

// Modules
mod api;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "SnippetsServer"; // for poem logging

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<()> {
    // --------------- Initialize Server --------------
    // Announce ourselves.
    println!("Starting snippets_server!");

    // Create the data directories and stop if that's all we were asked to do.
    let snippets_dirs = init_snippets_dirs()?;
    if SNIPPETS_ARGS.create_dirs_only {
        println!("Data directories created under {}.", snippets_dirs.root_dir);
        return Ok(());
    }

    // Initialize the server.
    let runtime_ctx = server_init(snippets_dirs)?;

    // --------------- Main Loop Set Up ---------------
    // The snippet collection starts empty and lives for the life of the process.
    let store = SnippetStore::new();
    let app = make_app(store, &runtime_ctx.parms.config.title, &runtime_ctx.server_url());

    // ------------------ Main Loop -------------------
    let addr = runtime_ctx.listen_addr();
    info!("{} listening on {} at {}.", SERVER_NAME, addr, timestamp_str());
    if runtime_ctx.parms.config.tls_enabled {
        let key = read_tls_file(&runtime_ctx.tls_key_file())?;
        let cert = read_tls_file(&runtime_ctx.tls_cert_file())?;
        poem::Server::new(
            TcpListener::bind(addr).rustls(
                RustlsConfig::new().fallback(RustlsCertificate::new().key(key).cert(cert)),
            ),
        )
        .name(SERVER_NAME)
        .run(app)
        .await?;
    } else {
        poem::Server::new(TcpListener::bind(addr))
            .name(SERVER_NAME)
            .run(app)
            .await?;
    }

    Ok(())
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// server_init:
// ---------------------------------------------------------------------------
/** Initialize logging and the runtime context needed to configure the main
 * loop processor.
 */
fn server_init(snippets_dirs: SnippetsDirs) -> Result<RuntimeCtx> {
    // Configure our log.
    init_log(&snippets_dirs)?;

    // Read the input parameters.
    let runtime_ctx = init_runtime_context(snippets_dirs)?;
    info!("{}", Errors::InputParms(format!("{:#?}", runtime_ctx)));

    // Log build info.
    print_version_info();

    Ok(runtime_ctx)
}

// ---------------------------------------------------------------------------
// read_tls_file:
// ---------------------------------------------------------------------------
fn read_tls_file(path: &str) -> Result<Vec<u8>> {
    match std::fs::read(path) {
        Ok(b) => Ok(b),
        Err(e) => Err(Errors::ServerError(format!("Unable to read TLS file {}: {}", path, e)).into()),
    }
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("\n*** Running SNIPPETS={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}.",
          option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
          env!("GIT_BRANCH"),
          env!("GIT_COMMIT_SHORT"),
          env!("GIT_DIRTY"),
          env!("SOURCE_TIMESTAMP"),
          env!("RUSTC_VERSION"));
}
