// File: crates/atom_gcal/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    __path_callback_handler, __path_disconnect_handler, __path_initiate_handler,
    __path_status_handler,
};
use crate::logic::CalendarStatus;

#[derive(OpenApi)]
#[openapi(
    paths(initiate_handler, callback_handler, status_handler, disconnect_handler),
    components(schemas(CalendarStatus)),
    tags(
        (name = "Google Calendar", description = "Google Calendar OAuth connection")
    ),
    servers(
        (url = "/api", description = "Atom API server")
    )
)]
pub struct GcalApiDoc;
