//! Client side of the upstream REST API: request dispatch, body encoding,
//! response normalization and the superadmin gate for mutating calls.

pub mod catalog;
pub mod envelope;
pub mod gateway;
pub mod payload;
pub mod policy;

pub use catalog::{MessageCatalog, MessageContext};
pub use envelope::{ApiEnvelope, FieldErrors, GatewayFailure};
pub use gateway::{ApiGateway, ApiMethod, GatewayOutcome, LOGIN_ENDPOINT};
pub use payload::{FieldValue, OutboundPayload, UploadedFile};
pub use policy::{is_super_admin, require_super_admin, AccessDenied};
