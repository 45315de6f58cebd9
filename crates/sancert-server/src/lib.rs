//! HTTP service that issues media sanitization certificates.
//!
//! A caller posts a sanitization event; the service renders it as a PDF
//! certificate, stores the PDF in object storage, records the certificate
//! in the database and answers with the certificate's identity and URL.

pub mod auth;
pub mod backend;
pub mod certificates;
pub mod error;
pub mod routes;
