pub mod checkout;
pub mod log;
pub mod show_ref;
pub mod status;
pub mod tag;
