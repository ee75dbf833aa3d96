//! Agent lifecycle domain
//!
//! Every agent moves through a fixed graph of eight states. Entering a state
//! costs energy (Rest restores it), and two thresholds can override the
//! requested target:
//!
//! ```text
//!   Init ─► Orient ─► Act ─► Echo ─► Consolidate
//!    ▲        │ ▲      │       │          │
//!    │        ▼ │      ▼       ▼          ▼
//!    └──────  Rest ◄─────────────────── Drift
//!             ▲
//!   Crisis ───┘ (also Crisis ─► Act)
//! ```
//!
//! The state graph and cost table are static; thresholds come from a
//! [`LifecycleProfile`](profile::LifecycleProfile) per agent type.

pub mod energy;
pub mod overrides;
pub mod profile;
pub mod record;
pub mod state;

pub use energy::EnergyModel;
pub use overrides::{Override, TransitionPlan, plan_transition};
pub use profile::LifecycleProfile;
pub use record::{AgentId, AgentRecord, TransitionRecord};
pub use state::LifecycleState;
