// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External contracts the core speaks through: [`Transport`],
//! [`Presenter`], and [`UpdateSource`]. None of these are implemented
//! against a real chat platform here — the actual wire protocol (HTTP
//! long-polling, webhooks, ...) is an external collaborator's
//! responsibility.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod presenter;
mod transport;
mod update_source;

pub use presenter::{PlainPresenter, Presenter, DEFAULT_PROGRESS_LABEL};
pub use transport::{MessageRef, RenderedMessage, SendOptions, Transport, TransportError};
pub use update_source::{IncomingMessage, UpdateSource};
