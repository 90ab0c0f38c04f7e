//! # momentum-core
//!
//! Session model and rules for the momentum tracker.
//!
//! A session is shared by a player and an opponent, each with a momentum
//! and a goal value. This crate holds everything that can be decided
//! without I/O:
//!
//! - **IDs**: [`SessionId`], [`ChannelId`] and the short-code [`IdGenerator`]
//! - **State**: [`Session`], its wire view [`SessionSnapshot`], and the [`SessionStore`]
//! - **Rules**: [`ClampPolicy`] and the momentum/goal planners in [`mutation`]
//! - **Lifecycle**: guest accounting and reclaim decisions in [`lifecycle`]
//! - **Wire**: lenient request decoding and broadcast payloads in [`wire`]
//! - **Errors**: [`HubError`] via `thiserror`

#![deny(unsafe_code)]

pub mod errors;
pub mod ids;
pub mod lifecycle;
pub mod logging;
pub mod mutation;
pub mod policy;
pub mod session;
pub mod store;
pub mod wire;

pub use errors::HubError;
pub use ids::{ChannelId, IdGenerator, SessionId};
pub use lifecycle::{LifecycleState, ReclaimOutcome};
pub use policy::ClampPolicy;
pub use session::{Session, SessionSnapshot, Side};
pub use store::SessionStore;
pub use wire::{Envelope, EnvelopeKind, GoalChanged, GoalRequest, MomentumChanged, MomentumRequest, StateChange};
