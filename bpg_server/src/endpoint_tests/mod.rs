mod helpers;
mod ipn;
pub(crate) mod mocks;
