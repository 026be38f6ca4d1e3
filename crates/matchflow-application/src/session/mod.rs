mod manager;

pub use manager::SessionManager;
