use std::{
    error::Error,
    fmt,
    sync::PoisonError,
};

pub type AccessResult<T> = Result<T, AccessError>;

#[derive(Debug)]
pub enum AccessError {
    NotMapped {
        address: u64,
    },
    OutOfRange {
        address: u64,
        len: usize,
        end: u64,
    },
    Overlap {
        address: u64,
        details: String,
    },
    ReadOnly {
        region: String,
        address: u64,
    },
    InvalidAddress {
        address: u64,
    },
    InvalidValue {
        type_name: &'static str,
        raw: u128,
    },
    UnsupportedWidth {
        bytes: usize,
    },
    UnsupportedBucketBits {
        bits: u8,
    },
    DivideByZero {
        type_name: &'static str,
    },
    Backend {
        source: Box<dyn Error + Send + Sync>,
    },
    Unbound,
    LockPoisoned,
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::NotMapped { address } => {
                write!(f, "address 0x{address:016X} is not mapped")
            }
            AccessError::OutOfRange { address, len, end } => write!(
                f,
                "access of {len} bytes at 0x{address:016X} exceeds region end 0x{end:016X}"
            ),
            AccessError::Overlap { address, details } => write!(
                f,
                "address 0x{address:016X} overlaps existing mapping ({details})"
            ),
            AccessError::ReadOnly { region, address } => write!(
                f,
                "region '{region}' rejected a write at 0x{address:016X}"
            ),
            AccessError::InvalidAddress { address } => write!(
                f,
                "address 0x{address:016X} is not a valid location for the pointee"
            ),
            AccessError::InvalidValue { type_name, raw } => write!(
                f,
                "raw value 0x{raw:X} is not representable as {type_name}"
            ),
            AccessError::UnsupportedWidth { bytes } => {
                write!(f, "address width of {bytes} bytes is unsupported")
            }
            AccessError::UnsupportedBucketBits { bits } => {
                write!(f, "bucket size of {bits} address bits is unsupported")
            }
            AccessError::DivideByZero { type_name } => {
                write!(f, "division of a stored {type_name} by zero")
            }
            AccessError::Backend { .. } => write!(f, "memory backend reported a fault"),
            AccessError::Unbound => write!(f, "pointer is not bound to a memory handle"),
            AccessError::LockPoisoned => {
                write!(f, "region lock has been poisoned due to a prior error")
            }
        }
    }
}

impl<T> From<PoisonError<T>> for AccessError {
    fn from(_value: PoisonError<T>) -> Self {
        AccessError::LockPoisoned
    }
}

impl Error for AccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AccessError::Backend { source } => Some(source.as_ref()),
            _ => None,
        }
    }
}
