// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::fmt;

use crate::protector::DataError;
use crate::wallet::WalletError;

/// Where to send users who have no wallet installed.
pub const WALLET_INSTALL_URL: &str = "https://metamask.io/download/";

/// Where to bridge ETH when the account cannot pay gas.
pub const BRIDGE_URL: &str = "https://bridge.arbitrum.io/";

/// The five reported steps of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlowStage {
    Connecting,
    NetworkCheck,
    Encrypting,
    Authorizing,
    Delivering,
}

impl FlowStage {
    pub const ALL: [FlowStage; 5] = [
        FlowStage::Connecting,
        FlowStage::NetworkCheck,
        FlowStage::Encrypting,
        FlowStage::Authorizing,
        FlowStage::Delivering,
    ];

    /// 1-based position reported through progress.
    pub fn index(self) -> u8 {
        match self {
            FlowStage::Connecting => 1,
            FlowStage::NetworkCheck => 2,
            FlowStage::Encrypting => 3,
            FlowStage::Authorizing => 4,
            FlowStage::Delivering => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FlowStage::Connecting => "Connecting wallet",
            FlowStage::NetworkCheck => "Checking network",
            FlowStage::Encrypting => "Encrypting email",
            FlowStage::Authorizing => "Granting access",
            FlowStage::Delivering => "Sending confirmation email",
        }
    }
}

impl fmt::Display for FlowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowStage::Connecting => "connecting",
            FlowStage::NetworkCheck => "network_check",
            FlowStage::Encrypting => "encrypting",
            FlowStage::Authorizing => "authorizing",
            FlowStage::Delivering => "delivering",
        };
        f.write_str(name)
    }
}

/// Classified failure of a whitelist run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("Invalid email address")]
    InvalidEmail,

    #[error("No wallet provider available")]
    WalletProviderMissing,

    #[error("Rejected in the wallet during {stage}")]
    UserRejected { stage: FlowStage },

    #[error("Wallet returned no accounts")]
    NoAccounts,

    #[error("Network switch rejected in the wallet")]
    NetworkSwitchRejected,

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(DataError),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(DataError),

    #[error("Delivery failed: {0}")]
    DeliveryFailed(DataError),

    #[error("Backend unreachable: {0}")]
    BackendUnreachable(String),

    #[error("Step {stage} timed out")]
    StepTimedOut { stage: FlowStage },

    #[error("A whitelist run is already in progress")]
    AlreadyRunning,

    #[error("Unexpected failure during {stage}: {message}")]
    UnknownFailure { stage: FlowStage, message: String },
}

impl FlowError {
    /// Wrap a wallet failure raised while in `stage`.
    pub fn from_wallet(stage: FlowStage, error: WalletError) -> Self {
        match error {
            WalletError::ProviderMissing => FlowError::WalletProviderMissing,
            WalletError::UserRejected => FlowError::UserRejected { stage },
            WalletError::NoAccounts => FlowError::NoAccounts,
            WalletError::NetworkSwitchRejected => FlowError::NetworkSwitchRejected,
            WalletError::NetworkUnavailable(message) => FlowError::NetworkUnavailable(message),
            WalletError::Provider(e) => FlowError::UnknownFailure {
                stage,
                message: e.to_string(),
            },
        }
    }

    /// Wrap a protected-data failure raised while in `stage`.
    pub fn from_data(stage: FlowStage, error: DataError) -> Self {
        if let DataError::Rejected(_) = error {
            return FlowError::UserRejected { stage };
        }
        match stage {
            FlowStage::Encrypting => FlowError::EncryptionFailed(error),
            FlowStage::Authorizing => FlowError::AuthorizationFailed(error),
            FlowStage::Delivering => FlowError::DeliveryFailed(error),
            FlowStage::Connecting | FlowStage::NetworkCheck => FlowError::UnknownFailure {
                stage,
                message: error.to_string(),
            },
        }
    }

    /// Stage the run was in, when the failure happened inside one.
    pub fn stage(&self) -> Option<FlowStage> {
        match self {
            FlowError::InvalidEmail
            | FlowError::AlreadyRunning
            | FlowError::BackendUnreachable(_) => None,
            FlowError::WalletProviderMissing | FlowError::NoAccounts => {
                Some(FlowStage::Connecting)
            }
            FlowError::NetworkSwitchRejected | FlowError::NetworkUnavailable(_) => {
                Some(FlowStage::NetworkCheck)
            }
            FlowError::EncryptionFailed(_) => Some(FlowStage::Encrypting),
            FlowError::AuthorizationFailed(_) => Some(FlowStage::Authorizing),
            FlowError::DeliveryFailed(_) => Some(FlowStage::Delivering),
            FlowError::UserRejected { stage }
            | FlowError::StepTimedOut { stage }
            | FlowError::UnknownFailure { stage, .. } => Some(*stage),
        }
    }

    /// Stable identifier for logs and clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            FlowError::InvalidEmail => "invalid_email",
            FlowError::WalletProviderMissing => "wallet_provider_missing",
            FlowError::UserRejected { .. } => "user_rejected",
            FlowError::NoAccounts => "no_accounts",
            FlowError::NetworkSwitchRejected => "network_switch_rejected",
            FlowError::NetworkUnavailable(_) => "network_unavailable",
            FlowError::EncryptionFailed(_) => "encryption_failed",
            FlowError::AuthorizationFailed(_) => "authorization_failed",
            FlowError::DeliveryFailed(_) => "delivery_failed",
            FlowError::BackendUnreachable(_) => "backend_unreachable",
            FlowError::StepTimedOut { .. } => "step_timed_out",
            FlowError::AlreadyRunning => "already_running",
            FlowError::UnknownFailure { .. } => "unknown_failure",
        }
    }

    /// Message to show the person running the flow.
    pub fn user_message(&self) -> String {
        match self {
            FlowError::InvalidEmail => {
                "Invalid email format. Please enter a valid email address like example@domain.com."
                    .to_string()
            }
            FlowError::WalletProviderMissing => format!(
                "MetaMask is not installed. Please install MetaMask to continue: {WALLET_INSTALL_URL}"
            ),
            FlowError::UserRejected { .. } => {
                "Transaction rejected. You declined the request in your wallet. Please try again if you want to join the whitelist."
                    .to_string()
            }
            FlowError::NoAccounts => {
                "No account available. Please unlock your wallet and try again.".to_string()
            }
            FlowError::NetworkSwitchRejected => {
                "Network switch rejected. Please switch your wallet to the required network to continue."
                    .to_string()
            }
            FlowError::NetworkUnavailable(_) | FlowError::BackendUnreachable(_) => {
                CONNECTION_MESSAGE.to_string()
            }
            FlowError::StepTimedOut { .. } => {
                "The request timed out waiting for a response. Please try again.".to_string()
            }
            FlowError::AlreadyRunning => {
                "A whitelist request is already in progress. Please wait for it to finish."
                    .to_string()
            }
            FlowError::EncryptionFailed(cause)
            | FlowError::AuthorizationFailed(cause)
            | FlowError::DeliveryFailed(cause) => match cause {
                DataError::Unreachable(_) => CONNECTION_MESSAGE.to_string(),
                other => cause_message(&other.to_string()),
            },
            FlowError::UnknownFailure { message, .. } => cause_message(message),
        }
    }
}

const CONNECTION_MESSAGE: &str =
    "Network error. Please check your internet connection and try again.";

fn cause_message(cause: &str) -> String {
    let lowered = cause.to_ascii_lowercase();
    if lowered.contains("insufficient") {
        format!(
            "Insufficient balance. You need some ETH on Arbitrum to complete this transaction. You can bridge ETH from {BRIDGE_URL}"
        )
    } else if lowered.contains("network") {
        CONNECTION_MESSAGE.to_string()
    } else {
        format!(
            "An error occurred: {cause}. Please try again or contact support if the problem persists."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::ProviderError;

    #[test]
    fn stages_are_numbered_in_order() {
        let indices: Vec<u8> = FlowStage::ALL.iter().map(|s| s.index()).collect();
        assert_eq!(indices, vec![1, 2, 3, 4, 5]);
        assert!(FlowStage::Encrypting < FlowStage::Delivering);
        assert_eq!(FlowStage::NetworkCheck.to_string(), "network_check");
    }

    #[test]
    fn wallet_errors_keep_their_class() {
        assert_eq!(
            FlowError::from_wallet(FlowStage::Connecting, WalletError::UserRejected),
            FlowError::UserRejected {
                stage: FlowStage::Connecting
            }
        );
        assert_eq!(
            FlowError::from_wallet(FlowStage::NetworkCheck, WalletError::NetworkSwitchRejected),
            FlowError::NetworkSwitchRejected
        );
        assert_eq!(
            FlowError::from_wallet(FlowStage::Connecting, WalletError::ProviderMissing),
            FlowError::WalletProviderMissing
        );

        let unknown = FlowError::from_wallet(
            FlowStage::NetworkCheck,
            WalletError::Provider(ProviderError::rpc(-32603, "internal")),
        );
        assert_eq!(unknown.stage(), Some(FlowStage::NetworkCheck));
        assert_eq!(unknown.error_code(), "unknown_failure");
    }

    #[test]
    fn data_errors_are_wrapped_with_their_stage() {
        let cause = DataError::Request("boom".into());
        assert_eq!(
            FlowError::from_data(FlowStage::Encrypting, cause.clone()),
            FlowError::EncryptionFailed(cause.clone())
        );
        assert_eq!(
            FlowError::from_data(FlowStage::Authorizing, cause.clone()).stage(),
            Some(FlowStage::Authorizing)
        );
        assert_eq!(
            FlowError::from_data(FlowStage::Delivering, cause).error_code(),
            "delivery_failed"
        );
        assert_eq!(
            FlowError::from_data(FlowStage::Authorizing, DataError::Rejected("denied".into())),
            FlowError::UserRejected {
                stage: FlowStage::Authorizing
            }
        );
    }

    #[test]
    fn user_messages_are_distinct_per_class() {
        let rejected = FlowError::UserRejected {
            stage: FlowStage::Encrypting,
        }
        .user_message();
        assert!(rejected.contains("declined"));

        let network = FlowError::NetworkUnavailable("add failed".into()).user_message();
        assert!(network.contains("check your internet connection"));

        let missing = FlowError::WalletProviderMissing.user_message();
        assert!(missing.contains(WALLET_INSTALL_URL));

        assert_ne!(rejected, network);
    }

    #[test]
    fn unknown_causes_fall_back_to_generic_message_with_cause() {
        let error = FlowError::UnknownFailure {
            stage: FlowStage::Delivering,
            message: "task queue full".into(),
        };
        let message = error.user_message();
        assert!(message.contains("task queue full"));
        assert!(message.contains("contact support"));

        let broke = FlowError::DeliveryFailed(DataError::Backend {
            status: 500,
            message: "insufficient funds for gas".into(),
        });
        assert!(broke.user_message().contains(BRIDGE_URL));

        let offline = FlowError::EncryptionFailed(DataError::Unreachable("refused".into()));
        assert!(offline.user_message().contains("check your internet connection"));
    }
}
