//! Route paths.

pub const API_PREFIX: &str = "/api/v1";

pub const GET_WELCOME: &str = "/api/v1/welcome";
pub const POST_REGISTER: &str = "/api/v1/register";
pub const POST_LOGIN: &str = "/api/v1/login";
pub const POST_LOGOUT: &str = "/api/v1/logout";
pub const GET_ME: &str = "/api/v1/me";
