// lumo: session orchestration for the Lumo chat interface
//
// Everything here is driver-agnostic. The CDP driver lives in `lumo-cdp`;
// tests and dry runs use the scripted view in `fake`.

pub mod config;
pub mod convergence;
pub mod dialogue;
pub mod error;
pub mod fake;
pub mod followup;
pub mod guard;
pub mod projects;
pub mod sampler;
pub mod session;
pub mod toggle;
pub mod topic;
pub mod turn;
pub mod view;

pub use config::{Config, DialogueSettings, Layout, Timings};
pub use convergence::{ConvergenceDetector, ConvergenceResult};
pub use dialogue::{DialogueOrchestrator, DialogueReport, DialogueStatus, SkippedTurn, Turn};
pub use error::{Error, Result};
pub use followup::{FollowUpGenerator, Move, RandomSource, ThreadRandom};
pub use guard::{GuardToken, SessionGuard};
pub use projects::Projects;
pub use sampler::{Sampler, StabilitySample};
pub use session::Session;
pub use toggle::{ToggleOutcome, set_feature};
pub use topic::{Topic, categorize, classify, extract_keywords};
pub use turn::{TurnExecutor, strip_affordances};
pub use view::{ElementHandle, Feature, RemoteView};
