pub mod csrf;
pub mod headers;

pub use csrf::{CsrfConfig, CsrfManager, CsrfToken, CsrfValidationResult};
pub use headers::{security_headers_middleware, SecurityHeadersConfig};
