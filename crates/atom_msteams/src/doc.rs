#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    __path_callback_handler, __path_disconnect_handler, __path_initiate_handler,
    __path_status_handler,
};
use crate::logic::TeamsStatus;

#[derive(OpenApi)]
#[openapi(
    paths(initiate_handler, callback_handler, status_handler, disconnect_handler),
    components(schemas(TeamsStatus)),
    tags(
        (name = "MS Teams", description = "Microsoft Graph OAuth connection")
    )
)]
pub struct MsTeamsApiDoc;
