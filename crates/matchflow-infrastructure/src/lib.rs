pub mod config_service;
pub mod identity_provider;
pub mod in_memory_proposal_repository;
pub mod in_memory_session_repository;
pub mod logging;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::identity_provider::InMemoryIdentityProvider;
pub use crate::in_memory_proposal_repository::InMemoryProposalRepository;
pub use crate::in_memory_session_repository::InMemorySessionRepository;
pub use crate::logging::init_tracing;
