pub mod codes;
pub mod i18n;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod signer;
pub mod slug;
pub mod ton;

pub use codes::*;
pub use i18n::*;
pub use jwt::*;
pub use pagination::*;
pub use password::*;
pub use signer::SwapSigner;
pub use slug::*;
pub use ton::*;
