//! The ledger operations.
//!
//! Every operation has its own module with the request, the response and the error types, and
//! is invoked through [`LogicOp::call`] on the [`crate::Ledger`].

pub mod op_claim;
pub mod op_deposit;
pub mod op_revoke;
pub mod op_set_duration;
pub mod op_transfer;

/// An operation over the ledger.
#[async_trait::async_trait]
pub trait LogicOp<Request> {
    /// The successful outcome.
    type Response;
    /// The failure.
    type Error;

    /// Execute the operation.
    async fn call(&self, req: Request) -> Result<Self::Response, Self::Error>;
}
