// File: crates/atom_quickbooks/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::api::{EmailAddress, Invoice, QboRef};
use crate::handlers::{
    __path_callback_handler, __path_initiate_handler, __path_invoice_details_handler,
    __path_list_invoices_handler,
};
use crate::skills::{CallbackData, InvoiceList};

#[derive(OpenApi)]
#[openapi(
    paths(initiate_handler, callback_handler, list_invoices_handler, invoice_details_handler),
    components(schemas(Invoice, QboRef, EmailAddress, InvoiceList, CallbackData)),
    tags(
        (name = "QuickBooks", description = "QuickBooks Online connection and invoices")
    ),
    servers(
        (url = "/api", description = "Atom API server")
    )
)]
pub struct QuickBooksApiDoc;
