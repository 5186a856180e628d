use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Todo API",
        description = "Todo lists and items"
    ),
    nest(
        (path = "/api", api = domain_todos::ApiDoc)
    )
)]
pub struct ApiDoc;
