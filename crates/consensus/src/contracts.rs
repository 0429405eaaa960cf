//! Solidity bindings for the contracts the stake manager reads.

use alloy_sol_types::sol;

sol! {
    /// Validator set contract: a non-transferable stake token.
    interface IValidatorSet {
        /// Emitted on stake (mint from zero) and unstake (burn to zero).
        event Transfer(address indexed from, address indexed to, uint256 value);
    }
}

sol! {
    /// Supernet manager contract on the root chain side.
    interface ICustomSupernetManager {
        /// Registration record of a validator.
        struct Validator {
            uint256[4] blsKey;
            uint256 stake;
            bool isWhitelisted;
            bool isActive;
        }

        /// Look up the registration record of `validator`.
        function getValidator(address validator) external view returns (Validator memory);
    }
}
