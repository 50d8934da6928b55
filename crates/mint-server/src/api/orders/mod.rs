pub mod create;
pub mod deeplink;
pub mod qr;
pub mod status;
pub mod upload;
