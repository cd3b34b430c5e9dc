use thiserror::Error;

pub type Result<T> = std::result::Result<T, MachineError>;

#[derive(Debug, Error)]
pub enum MachineError {
    #[error("unsupported ROM size {0} bytes")]
    UnsupportedRomSize(usize),

    #[error("bank {bank} out of range for {cart} ({banks} banks)")]
    BankOutOfRange {
        cart: &'static str,
        bank: u16,
        banks: u16,
    },

    #[error(transparent)]
    State(#[from] vcs_snapshot::StateError),
}
