//! Protocol data types shared by providers and clients.

pub mod capabilities;
pub mod content;
pub mod descriptor;
pub mod error;
pub mod message;
pub mod request;
pub mod response;

pub use capabilities::*;
pub use content::ContentItem;
pub use descriptor::*;
pub use error::*;
pub use message::*;
pub use request::*;
pub use response::*;
