pub mod session_jwt;
