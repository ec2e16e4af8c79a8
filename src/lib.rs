pub mod aggregate;
pub mod convert;
pub mod detect;
pub mod error;
pub mod merge;
pub mod model;
pub mod provider;
pub mod report;
