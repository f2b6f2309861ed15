pub mod pending;
pub mod product;
pub mod session;

pub use pending::{IdTarget, PendingOp};
pub use product::{
    ProductFilter, ProductRecord, ThermocupAttributes, ThermocupDraft, ThermocupUpdate,
};
pub use session::{ConversationState, Session};
