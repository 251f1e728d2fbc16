//! Contract ABI definitions
//!
//! Uses alloy's sol! macro to generate type-safe bindings for the bridge,
//! its ERC20 handler, the mintable token deployed as a mirror, and the Gnosis
//! Safe used as bridge admin for multi-signature routing.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

sol! {
    /// Bridge contract admin and query interface
    #[sol(rpc)]
    contract Bridge {
        /// Proposal as stored by the bridge. `_status` is the ProposalStatus enum:
        /// Inactive, Active, Passed, Executed, Cancelled
        struct Proposal {
            bytes32 _resourceID;
            bytes32 _dataHash;
            address[] _yesVotes;
            address[] _noVotes;
            uint8 _status;
            uint256 _proposedBlock;
        }

        /// Handler registered for a resource ID (zero if none)
        function _resourceIDToHandlerAddress(bytes32 resourceID) external view returns (address);

        function adminSetResource(address handlerAddress, bytes32 resourceID, address tokenAddress) external;

        function adminSetGenericResource(
            address handlerAddress,
            bytes32 resourceID,
            address contractAddress,
            bytes4 depositFunctionSig,
            bytes4 executeFunctionSig
        ) external;

        /// Mark a token as burned on deposit / minted on execution
        function adminSetBurnable(address handlerAddress, address tokenAddress) external;

        function adminCancelProposal(uint8 chainID, uint64 depositNonce) external;

        function getProposal(uint8 originChainID, uint64 depositNonce, bytes32 dataHash) external view returns (Proposal memory);
    }

    /// Resource mapping kept by each handler
    #[sol(rpc)]
    contract HandlerHelpers {
        function _resourceIDToTokenContractAddress(bytes32 resourceID) external view returns (address);
    }

    /// ERC20 with role-based minting (ERC20PresetMinterPauser)
    #[sol(rpc)]
    contract ERC20Mintable {
        function MINTER_ROLE() external view returns (bytes32);
        function grantRole(bytes32 role, address account) external;
    }

    /// Gnosis Safe subset used for approve/execute routing
    #[sol(rpc)]
    contract GnosisSafe {
        function nonce() external view returns (uint256);
        function isOwner(address owner) external view returns (bool);

        function getTransactionHash(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            uint256 _nonce
        ) external view returns (bytes32);

        function approveHash(bytes32 hashToApprove) external;

        function execTransaction(
            address to,
            uint256 value,
            bytes calldata data,
            uint8 operation,
            uint256 safeTxGas,
            uint256 baseGas,
            uint256 gasPrice,
            address gasToken,
            address refundReceiver,
            bytes memory signatures
        ) external payable returns (bool success);
    }
}
