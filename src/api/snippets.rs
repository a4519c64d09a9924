#![forbid(unsafe_code)]

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, Object, ApiResponse };
use log::{error, info};

use crate::utils::errors::HttpResult;
use crate::utils::snippet_store::{Snippet, SnippetStore};
use crate::utils::snippets_utils::{self, RequestDebug};

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct SnippetsApi {
    store: SnippetStore,
}

#[derive(Object)]
pub struct ReqAppendSnippet
{
    title: String,
    code: String,
}

#[derive(Object, Debug)]
pub struct RespAppendSnippet
{
    #[oai(rename = "OK")]
    ok: bool,
}

#[derive(Object, Debug)]
pub struct SnippetsListElement
{
    title: String,
    code: String,
}

// Implement the debug record trait for logging.
impl RequestDebug for ReqAppendSnippet {
    type Req = ReqAppendSnippet;
    fn get_request_info(&self) -> String {
        let mut s = String::with_capacity(255);
        s.push_str("  Request body:");
        s.push_str("\n    title: ");
        s.push_str(&self.title);
        s.push_str("\n    code: ");
        s.push_str(&self.code);
        s
    }
}

// ------------------- HTTP Status Codes -------------------
// Bodies that fail to decode as a snippet are routed to the 400 response.
#[derive(Debug, ApiResponse)]
#[oai(bad_request_handler = "append_bad_request_handler")]
pub enum SnippetsResponse {
    #[oai(status = 200)]
    Http200(Json<RespAppendSnippet>),
    #[oai(status = 400)]
    Http400(Json<HttpResult>),
}

fn make_http_200(resp: RespAppendSnippet) -> SnippetsResponse {
    SnippetsResponse::Http200(Json(resp))
}
fn make_http_400(msg: String) -> SnippetsResponse {
    SnippetsResponse::Http400(Json(HttpResult::new(400.to_string(), msg)))
}

fn append_bad_request_handler(err: poem::Error) -> SnippetsResponse {
    let msg = "ERROR: Unable to decode snippet: ".to_owned() + err.to_string().as_str();
    error!("{}", msg);
    make_http_400(msg)
}

// ***************************************************************************
//                             OpenAPI Endpoints
// ***************************************************************************
#[OpenApi]
impl SnippetsApi {
    #[oai(path = "/snippets", method = "get")]
    async fn list_snippets(&self) -> Json<Vec<SnippetsListElement>> {
        let snippets = self.store.list();
        Json(snippets.into_iter().map(SnippetsListElement::from).collect())
    }

    // The append operation has always been served at the root path.
    #[oai(path = "/", method = "post")]
    async fn append_snippet_root(&self, http_req: &Request, req: Json<ReqAppendSnippet>) -> SnippetsResponse {
        self.process_append(http_req, &req)
    }

    #[oai(path = "/snippets", method = "post")]
    async fn append_snippet(&self, http_req: &Request, req: Json<ReqAppendSnippet>) -> SnippetsResponse {
        self.process_append(http_req, &req)
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl SnippetsApi {
    pub fn new(store: SnippetStore) -> Self {
        Self {store}
    }

    /// Append the decoded snippet to the collection.
    fn process_append(&self, http_req: &Request, req: &ReqAppendSnippet) -> SnippetsResponse {
        // Conditional logging depending on log level.
        snippets_utils::debug_request(http_req, req);

        let size = self.store.append(Snippet::new(req.title.clone(), req.code.clone()));
        info!("Snippet '{}' appended, collection now holds {} snippets.", req.title, size);

        make_http_200(RespAppendSnippet::new())
    }
}

impl RespAppendSnippet {
    fn new() -> Self {
        Self {ok: true}
    }
}

impl From<Snippet> for SnippetsListElement {
    fn from(snippet: Snippet) -> Self {
        Self {title: snippet.title, code: snippet.code}
    }
}
