//! Remote side of practice-sync.
//!
//! [`ProfessionalBackend`] is the seam to the network: the production
//! [`SupabaseClient`] talks to PostgREST, tests plug in scripted fakes.
//! [`RemoteValidator`] and [`RemoteWriter`] wrap a backend and never return
//! errors. Failures are logged and degrade to [`TargetStatus::Unknown`] or
//! `false`.

mod backend;
mod client;
mod delivery;
mod error;
mod validator;
mod writer;

pub use backend::ProfessionalBackend;
pub use client::SupabaseClient;
pub use delivery::{StatisticDelivery, CONNECTION_CHECK_TYPE};
pub use error::{RemoteError, RemoteResult};
pub use validator::{RemoteValidator, TargetStatus};
pub use writer::RemoteWriter;
