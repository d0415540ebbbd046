/// HTTPサーバーとリクエスト・レスポンスの共通処理
pub mod request;
pub mod response;
pub mod server;

pub use server::{handle_request, serve};
