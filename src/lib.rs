pub mod bot;
pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod filter;
pub mod lead;
pub mod ledger;
pub mod limiter;
pub mod logging;
pub mod report;
pub mod twitter;

pub use bot::{CycleSummary, FindReport, LeadBot};
pub use config::{Backend, Config};
pub use ledger::ReplyLedger;
