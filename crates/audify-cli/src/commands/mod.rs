//! Command handlers, one module per screen.

pub(crate) mod auth;
pub(crate) mod compare;
pub(crate) mod navigate;
pub(crate) mod optimize;
