use utoipa::OpenApi;

use crate::routes::{api, health};

#[derive(OpenApi)]
#[openapi(info(
    title = "chatrelay-server",
    description = "Chat relay with conversation log and PDF replies",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(api::api_docs());
    root
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn docs_list_every_route() {
        let docs = get_docs();
        let paths: Vec<&str> = docs.paths.paths.keys().map(String::as_str).collect();
        for expected in ["/health", "/api/chat", "/api/documents"] {
            assert!(paths.contains(&expected), "missing {expected} in {paths:?}");
        }
    }
}
