//! Certificate roles carried by trust-list records (`ROLE`, tag 4).

use crate::error::EnvelopeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Role {
    SigningAuthority = 0,
    CallManager = 1,
    CallManagerPlusFileServer = 2,
    FileServer = 3,
    AuthProxy = 4,
    AppServer = 7,
    TelephonyVerificationService = 21,
}

impl TryFrom<u16> for Role {
    type Error = EnvelopeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::SigningAuthority),
            1 => Ok(Self::CallManager),
            2 => Ok(Self::CallManagerPlusFileServer),
            3 => Ok(Self::FileServer),
            4 => Ok(Self::AuthProxy),
            7 => Ok(Self::AppServer),
            21 => Ok(Self::TelephonyVerificationService),
            other => Err(EnvelopeError::UnsupportedAlgorithm {
                value: other as u32,
            }),
        }
    }
}

impl Role {
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Short name as printed by the parse driver (spec.md §8 scenario 3:
    /// `SAST`, `CCM`, ...).
    pub fn short_name(self) -> &'static str {
        match self {
            Self::SigningAuthority => "SAST",
            Self::CallManager => "CCM",
            Self::CallManagerPlusFileServer => "CCM+TFTP",
            Self::FileServer => "TFTP",
            Self::AuthProxy => "CAPF",
            Self::AppServer => "ASA",
            Self::TelephonyVerificationService => "TVS",
        }
    }
}
