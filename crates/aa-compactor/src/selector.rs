//! Selector catalogue: the token calls that get structural compression.

use aa_core::{CompactError, Result};
use alloy_primitives::{Address, Bytes, U256};

/// `transfer(address,uint256)`
pub const TRANSFER: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];
/// `transferFrom(address,address,uint256)`
pub const TRANSFER_FROM: [u8; 4] = [0x23, 0xb8, 0x72, 0xdd];
/// `approve(address,uint256)`
pub const APPROVE: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];
/// `mint(address,uint256)`
pub const MINT: [u8; 4] = [0x40, 0xc1, 0x0f, 0x19];

const SELECTOR_LEN: usize = 4;
const WORD_LEN: usize = 32;
const ADDRESS_PAD: usize = WORD_LEN - 20;

/// Wire tag for each catalogued call shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SelectorTag {
    /// Anything not in the catalogue; call data is stored verbatim.
    Generic = 0x00,
    Transfer = 0x01,
    TransferFrom = 0x02,
    Approve = 0x03,
    /// `approve` for `U256::MAX`; the amount is implied.
    ApproveMax = 0x04,
    Mint = 0x05,
}

impl SelectorTag {
    pub const ALL: [SelectorTag; 6] = [
        Self::Generic,
        Self::Transfer,
        Self::TransferFrom,
        Self::Approve,
        Self::ApproveMax,
        Self::Mint,
    ];

    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_byte() == byte)
    }

    /// Number of address parameters extracted from the call data, in
    /// declaration order.
    pub fn address_slots(self) -> usize {
        match self {
            Self::Generic => 0,
            Self::TransferFrom => 2,
            Self::Transfer | Self::Approve | Self::ApproveMax | Self::Mint => 1,
        }
    }

    /// Whether an amount follows the address slots on the wire.
    pub fn has_amount(self) -> bool {
        !matches!(self, Self::Generic | Self::ApproveMax)
    }

    pub fn selector(self) -> Option<[u8; 4]> {
        match self {
            Self::Generic => None,
            Self::Transfer => Some(TRANSFER),
            Self::TransferFrom => Some(TRANSFER_FROM),
            Self::Approve | Self::ApproveMax => Some(APPROVE),
            Self::Mint => Some(MINT),
        }
    }
}

/// Call data split into its catalogued shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Transfer { to: Address, amount: U256 },
    TransferFrom { from: Address, to: Address, amount: U256 },
    Approve { spender: Address, amount: U256 },
    ApproveMax { spender: Address },
    Mint { to: Address, amount: U256 },
    Generic(Bytes),
}

impl Call {
    /// Split call data. Only the exact canonical ABI encoding of a
    /// catalogued function is recognised; everything else is `Generic`.
    pub fn parse(data: &Bytes) -> Self {
        parse_structured(data).unwrap_or_else(|| Self::Generic(data.clone()))
    }

    /// Rebuild a structured call from its wire parts. `Generic` has no
    /// structured form and is rejected, as is any combination the encoder
    /// would never emit.
    pub fn from_parts(
        tag: SelectorTag,
        addresses: &[Address],
        amount: Option<U256>,
    ) -> Result<Self> {
        if addresses.len() != tag.address_slots() || amount.is_some() != tag.has_amount() {
            return Err(CompactError::corrupt(format!("field layout does not match {tag:?}")));
        }
        let amount = amount.unwrap_or(U256::MAX);
        let call = match tag {
            SelectorTag::Transfer => Self::Transfer { to: addresses[0], amount },
            SelectorTag::TransferFrom => Self::TransferFrom {
                from: addresses[0],
                to: addresses[1],
                amount,
            },
            SelectorTag::Approve if amount == U256::MAX => {
                return Err(CompactError::corrupt("maximum approval encoded as Approve"));
            }
            SelectorTag::Approve => Self::Approve { spender: addresses[0], amount },
            SelectorTag::ApproveMax => Self::ApproveMax { spender: addresses[0] },
            SelectorTag::Mint => Self::Mint { to: addresses[0], amount },
            SelectorTag::Generic => {
                return Err(CompactError::corrupt("generic call has no structured form"));
            }
        };
        Ok(call)
    }

    pub fn tag(&self) -> SelectorTag {
        match self {
            Self::Transfer { .. } => SelectorTag::Transfer,
            Self::TransferFrom { .. } => SelectorTag::TransferFrom,
            Self::Approve { .. } => SelectorTag::Approve,
            Self::ApproveMax { .. } => SelectorTag::ApproveMax,
            Self::Mint { .. } => SelectorTag::Mint,
            Self::Generic(_) => SelectorTag::Generic,
        }
    }

    /// Address parameters in declaration order.
    pub fn addresses(&self) -> Vec<Address> {
        match self {
            Self::Transfer { to, .. } | Self::Mint { to, .. } => vec![*to],
            Self::TransferFrom { from, to, .. } => vec![*from, *to],
            Self::Approve { spender, .. } | Self::ApproveMax { spender } => vec![*spender],
            Self::Generic(_) => Vec::new(),
        }
    }

    /// Amount carried on the wire, if any. `ApproveMax` carries none.
    pub fn amount(&self) -> Option<U256> {
        match self {
            Self::Transfer { amount, .. }
            | Self::TransferFrom { amount, .. }
            | Self::Approve { amount, .. }
            | Self::Mint { amount, .. } => Some(*amount),
            Self::ApproveMax { .. } | Self::Generic(_) => None,
        }
    }

    /// Canonical call data.
    pub fn encode(&self) -> Bytes {
        let (selector, amount) = match self {
            Self::Transfer { amount, .. } => (TRANSFER, *amount),
            Self::TransferFrom { amount, .. } => (TRANSFER_FROM, *amount),
            Self::Approve { amount, .. } => (APPROVE, *amount),
            Self::ApproveMax { .. } => (APPROVE, U256::MAX),
            Self::Mint { amount, .. } => (MINT, *amount),
            Self::Generic(data) => return data.clone(),
        };
        let addresses = self.addresses();
        let mut out = Vec::with_capacity(SELECTOR_LEN + WORD_LEN * (addresses.len() + 1));
        out.extend_from_slice(&selector);
        for address in &addresses {
            out.extend_from_slice(&[0u8; ADDRESS_PAD]);
            out.extend_from_slice(address.as_slice());
        }
        out.extend_from_slice(&amount.to_be_bytes::<WORD_LEN>());
        Bytes::from(out)
    }
}

/// Tag the call data would be compressed under.
pub fn classify(data: &[u8]) -> SelectorTag {
    parse_structured(data).map(|call| call.tag()).unwrap_or(SelectorTag::Generic)
}

fn parse_structured(data: &[u8]) -> Option<Call> {
    let (selector, args) = data.split_at_checked(SELECTOR_LEN)?;
    let words = |n: usize| -> Option<Vec<&[u8]>> {
        (args.len() == n * WORD_LEN).then(|| args.chunks_exact(WORD_LEN).collect())
    };
    let call = match selector {
        s if s == TRANSFER => {
            let w = words(2)?;
            Call::Transfer { to: address_word(w[0])?, amount: U256::from_be_slice(w[1]) }
        }
        s if s == TRANSFER_FROM => {
            let w = words(3)?;
            Call::TransferFrom {
                from: address_word(w[0])?,
                to: address_word(w[1])?,
                amount: U256::from_be_slice(w[2]),
            }
        }
        s if s == APPROVE => {
            let w = words(2)?;
            let spender = address_word(w[0])?;
            let amount = U256::from_be_slice(w[1]);
            if amount == U256::MAX {
                Call::ApproveMax { spender }
            } else {
                Call::Approve { spender, amount }
            }
        }
        s if s == MINT => {
            let w = words(2)?;
            Call::Mint { to: address_word(w[0])?, amount: U256::from_be_slice(w[1]) }
        }
        _ => return None,
    };
    Some(call)
}

/// An ABI address word: 12 zero bytes, then the address.
fn address_word(word: &[u8]) -> Option<Address> {
    let (pad, address) = word.split_at(ADDRESS_PAD);
    pad.iter().all(|b| *b == 0).then(|| Address::from_slice(address))
}
